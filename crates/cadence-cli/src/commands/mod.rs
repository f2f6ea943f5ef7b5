pub mod config;
pub mod daily;
pub mod group;
pub mod milestone;
pub mod tick;

use std::error::Error;
use std::sync::Arc;

use cadence_core::storage::save_state;
use cadence_core::{Database, Store, SystemClock, TickReport};
use serde::Serialize;

/// One CLI invocation: open the database, load state and tick.
///
/// Each invocation is a fresh "visibility transition", so resets and the
/// midnight rollover are applied before the command sees the state.
pub struct Session {
    db: Database,
    pub store: Store,
    pub tick: TickReport,
}

impl Session {
    pub fn open() -> Result<Self, Box<dyn Error>> {
        let db = Database::open()?;
        let mut store = Store::open(&db, Arc::new(SystemClock));
        let tick = store.tick();
        let session = Self { db, store, tick };
        if session.tick.changed_anything() {
            session.save()?;
        }
        Ok(session)
    }

    /// Write the current state through immediately.
    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        save_state(&self.db, self.store.state())?;
        Ok(())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
