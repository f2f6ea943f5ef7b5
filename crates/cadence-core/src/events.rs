use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cycle::{AppliedReset, Recurrence};
use crate::daily::RolloverReport;

/// Kind of daily-list item an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyItemKind {
    Todo,
    Pinned,
    Recurring,
}

/// Every state change in the store produces an Event.
/// Callers poll them with `Store::drain_events`; the snapshot channel is the
/// authoritative state, events are the narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    GroupCreated {
        group_id: String,
        name: String,
        recurrence: Recurrence,
        on: NaiveDate,
    },
    GroupDeleted {
        group_id: String,
        on: NaiveDate,
    },
    ScheduleChanged {
        group_id: String,
        recurrence: Recurrence,
        cycle_start_day: Option<u8>,
        on: NaiveDate,
    },
    GroupTaskToggled {
        group_id: String,
        task_id: String,
        completed: bool,
        on: NaiveDate,
    },
    /// Automatic rollover judged by the reset engine.
    CycleReset {
        reset: AppliedReset,
    },
    /// Board cleared on request; score untouched.
    CycleClearedManually {
        group_id: String,
        was_fully_completed: bool,
        completion_count: u32,
        on: NaiveDate,
    },
    MilestoneTaskToggled {
        milestone_id: String,
        task_id: String,
        completed: bool,
        on: NaiveDate,
    },
    /// Derived or manual milestone completion flipped.
    MilestoneCompletionChanged {
        milestone_id: String,
        completed: bool,
        on: NaiveDate,
    },
    DailyItemToggled {
        item_id: String,
        kind: DailyItemKind,
        completed: bool,
        all_time_completed: u64,
        on: NaiveDate,
    },
    DailyItemSkipped {
        item_id: String,
        on: NaiveDate,
    },
    DailyRolledOver {
        report: RolloverReport,
    },
    /// Whole state adopted from the persistence/sync collaborator.
    StateReplaced {
        on: NaiveDate,
    },
}
