//! # Cadence Core Library
//!
//! Lifecycle and scoring engine for periodic checklists. Recurring cycle
//! groups reset on a daily, weekly or monthly rhythm and carry a bounded
//! momentum score; milestones derive their completion from their tasks; a
//! daily list rolls over at local midnight, dropping finished items and
//! carrying the rest forward.
//!
//! ## Architecture
//!
//! - **Clock**: the only source of "today"; injected so every date rule is
//!   testable with a fixed date
//! - **Cycle**: recurrence arithmetic, the score ledger and the reset engine
//! - **Daily**: the day-scoped list and its midnight carryover
//! - **Store**: one explicit owner of the whole model; every mutation is a
//!   reducer that publishes an immutable snapshot
//! - **Storage**: SQLite key/value documents, debounced writes and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`Store`]: application state and reducers
//! - [`CycleGroup`]: recurring checklist with momentum score
//! - [`Milestone`]: one-shot checklist with derived completion
//! - [`DailyState`]: day-scoped list with carryover
//! - [`Database`]: document persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod cycle;
pub mod daily;
pub mod error;
pub mod events;
pub mod milestone;
pub mod storage;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cycle::{CycleGroup, CycleTask, MomentumLevel, NewGroup, NextOccurrence, Progress, Recurrence};
pub use daily::{DailyState, DailyView, RolloverReport};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{DailyItemKind, Event};
pub use milestone::{Milestone, TaskDisplayStyle};
pub use storage::{Config, Database, DebouncedWriter, DocumentStore, MemoryStore};
pub use store::{AppState, Store, TickReport};
