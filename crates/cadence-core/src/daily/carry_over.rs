//! Midnight carry-over for the daily list.
//!
//! # Rules
//! - Ad-hoc todos: completed ones are dropped, open ones carry over as-is.
//! - Pinned items: dropped once their completion day is not the new day.
//!   Open items and items completed on the new day stay.
//! - Recurring items are never pruned; their completion is keyed by date.
//! - The all-time tally is untouched.
//!
//! Applying the same transition twice yields the same list as applying it
//! once.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::DailyState;

/// What a rollover removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverReport {
    pub previous_day_key: Option<String>,
    pub current_day_key: String,
    pub dropped_todos: usize,
    pub dropped_pinned: usize,
    pub carried_todos: usize,
}

impl RolloverReport {
    pub(crate) fn empty(previous: Option<&str>, current: &str) -> Self {
        Self {
            previous_day_key: previous.map(str::to_string),
            current_day_key: current.to_string(),
            ..Default::default()
        }
    }

    pub fn dropped_anything(&self) -> bool {
        self.dropped_todos > 0 || self.dropped_pinned > 0
    }
}

/// Prune `state` for the move from `previous_day_key` to `current_day_key`.
///
/// Equal keys are a no-op. The stored `day_key` is not modified here; see
/// [`DailyState::roll_to`] for the checkpointing wrapper.
pub fn rollover(state: &mut DailyState, previous_day_key: &str, current_day_key: &str) -> RolloverReport {
    let mut report = RolloverReport::empty(Some(previous_day_key), current_day_key);
    if previous_day_key == current_day_key {
        debug!(day = current_day_key, "daily rollover skipped, same day");
        return report;
    }

    let todos_before = state.todos.len();
    state.todos.retain(|t| !t.completed);
    report.dropped_todos = todos_before - state.todos.len();
    report.carried_todos = state.todos.len();

    report.dropped_pinned = drop_stale_pinned(state, current_day_key);

    info!(
        from = previous_day_key,
        to = current_day_key,
        dropped_todos = report.dropped_todos,
        dropped_pinned = report.dropped_pinned,
        carried_todos = report.carried_todos,
        "daily rollover"
    );
    report
}

/// Drop pinned items completed on a day other than `current_day_key`.
/// Needs no previous key, so it also applies when none was recorded.
pub(crate) fn drop_stale_pinned(state: &mut DailyState, current_day_key: &str) -> usize {
    let before = state.pinned.len();
    state.pinned.retain(|p| match p.completed_date.as_deref() {
        Some(day) => day == current_day_key,
        None => true,
    });
    before - state.pinned.len()
}

#[cfg(test)]
mod tests {
    use super::super::{DailyTodo, PinnedItem};
    use super::*;

    fn todo(id: &str, completed: bool) -> DailyTodo {
        DailyTodo {
            id: id.to_string(),
            title: id.to_string(),
            completed,
        }
    }

    fn pinned(id: &str, completed_date: Option<&str>) -> PinnedItem {
        PinnedItem {
            id: id.to_string(),
            title: id.to_string(),
            completed: completed_date.is_some(),
            completed_date: completed_date.map(str::to_string),
        }
    }

    fn sample() -> DailyState {
        DailyState {
            day_key: Some("2024-02-01".to_string()),
            todos: vec![todo("done", true), todo("open", false)],
            pinned: vec![
                pinned("yesterday", Some("2024-02-01")),
                pinned("today", Some("2024-02-02")),
                pinned("open", None),
            ],
            recurring: Vec::new(),
            all_time_completed: 7,
        }
    }

    #[test]
    fn drops_completed_todos_and_stale_pins() {
        let mut state = sample();
        let report = rollover(&mut state, "2024-02-01", "2024-02-02");

        let todos: Vec<_> = state.todos.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(todos, vec!["open"]);
        let pins: Vec<_> = state.pinned.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(pins, vec!["today", "open"]);
        assert_eq!(report.dropped_todos, 1);
        assert_eq!(report.dropped_pinned, 1);
        assert_eq!(report.carried_todos, 1);
        assert_eq!(state.all_time_completed, 7, "tally survives rollover");
    }

    #[test]
    fn same_day_is_noop() {
        let mut state = sample();
        let report = rollover(&mut state, "2024-02-01", "2024-02-01");
        assert_eq!(state, sample());
        assert!(!report.dropped_anything());
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let mut once = sample();
        rollover(&mut once, "2024-02-01", "2024-02-02");
        let mut twice = once.clone();
        rollover(&mut twice, "2024-02-01", "2024-02-02");
        assert_eq!(once, twice);
    }

    #[test]
    fn leaves_day_key_alone() {
        let mut state = sample();
        rollover(&mut state, "2024-02-01", "2024-02-02");
        assert_eq!(state.day_key.as_deref(), Some("2024-02-01"));
    }
}
