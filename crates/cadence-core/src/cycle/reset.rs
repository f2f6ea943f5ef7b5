//! Cycle rollover.
//!
//! [`evaluate`] is the automatic path: it asks the recurrence rules whether
//! each group is due, judges the cycle that just ended, and clears the board.
//! [`manual_reset`] is the "I finished early, clear it" path and never judges:
//! the score is left alone and the reset checkpoint does not move.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{recurrence, score, CycleGroup};

/// Outcome of one automatic reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedReset {
    pub group_id: String,
    pub group_name: String,
    pub reset_on: NaiveDate,
    pub was_fully_completed: bool,
    pub score_before: i32,
    pub score_after: i32,
    pub completion_count: u32,
}

/// Outcome of a manual reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualReset {
    pub group_id: String,
    pub was_fully_completed: bool,
    pub completion_count: u32,
}

/// Roll over every group that is due on `today`.
///
/// Groups are independent; one group's outcome never affects another. Calling
/// this again on the same day is a no-op because each reset moves
/// `last_reset_date` to `today`.
pub fn evaluate(groups: &mut [CycleGroup], today: NaiveDate) -> Vec<AppliedReset> {
    let mut applied = Vec::new();
    for group in groups.iter_mut() {
        if !recurrence::is_due(group, today) {
            debug!(group_id = %group.id, %today, "cycle not due");
            continue;
        }
        applied.push(reset_due_group(group, today));
    }
    applied
}

fn reset_due_group(group: &mut CycleGroup, today: NaiveDate) -> AppliedReset {
    // Judge before clearing.
    let was_fully_completed = group.is_fully_completed();
    let score_before = group.score;

    group.score = score::apply(group.score, was_fully_completed);
    if was_fully_completed {
        group.completion_count = group.completion_count.saturating_add(1);
    }
    group.clear_regular_tasks();
    group.last_reset_date = today;

    info!(
        group_id = %group.id,
        group = %group.name,
        recurrence = %group.recurrence,
        was_fully_completed,
        score_before,
        score_after = group.score,
        completion_count = group.completion_count,
        "cycle reset"
    );

    AppliedReset {
        group_id: group.id.clone(),
        group_name: group.name.clone(),
        reset_on: today,
        was_fully_completed,
        score_before,
        score_after: group.score,
        completion_count: group.completion_count,
    }
}

/// Clear the board on request.
pub fn manual_reset(group: &mut CycleGroup) -> ManualReset {
    let was_fully_completed = group.is_fully_completed();
    if was_fully_completed {
        group.completion_count = group.completion_count.saturating_add(1);
    }
    group.clear_regular_tasks();

    info!(
        group_id = %group.id,
        was_fully_completed,
        completion_count = group.completion_count,
        "manual cycle reset"
    );

    ManualReset {
        group_id: group.id.clone(),
        was_fully_completed,
        completion_count: group.completion_count,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, group, with_tasks};
    use super::super::{CycleTask, Recurrence};
    use super::*;

    #[test]
    fn anchored_weekly_resets_once_on_anchor_day() {
        let mut groups = vec![with_tasks(
            group(Recurrence::Weekly, Some(1), date(2024, 1, 1)),
            &[true, false],
        )];
        let today = date(2024, 1, 8);
        let applied = evaluate(&mut groups, today);
        assert_eq!(applied.len(), 1);
        assert_eq!(groups[0].last_reset_date, today);
        assert_eq!(groups[0].score, -1);

        let again = evaluate(&mut groups, today);
        assert!(again.is_empty());
        assert_eq!(groups[0].score, -1, "score changes exactly once");
    }

    #[test]
    fn fully_completed_cycle_is_rewarded() {
        let mut groups = vec![with_tasks(
            group(Recurrence::Daily, None, date(2024, 1, 1)),
            &[true, true, true],
        )];
        let applied = evaluate(&mut groups, date(2024, 1, 2));
        assert!(applied[0].was_fully_completed);
        assert_eq!(groups[0].completion_count, 1);
        assert_eq!(groups[0].score, 1);
        assert!(groups[0].tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn partial_cycle_is_penalised() {
        let mut groups = vec![with_tasks(
            group(Recurrence::Daily, None, date(2024, 1, 1)),
            &[true, true, false],
        )];
        let applied = evaluate(&mut groups, date(2024, 1, 2));
        assert!(!applied[0].was_fully_completed);
        assert_eq!(groups[0].completion_count, 0);
        assert_eq!(groups[0].score, -1);
        assert_eq!(applied[0].score_before, 0);
        assert_eq!(applied[0].score_after, -1);
    }

    #[test]
    fn empty_group_counts_as_incomplete() {
        let mut groups = vec![group(Recurrence::Daily, None, date(2024, 1, 1))];
        evaluate(&mut groups, date(2024, 1, 2));
        assert_eq!(groups[0].score, -1);
        assert_eq!(groups[0].completion_count, 0);
    }

    #[test]
    fn separators_survive_reset_untouched() {
        let mut g = with_tasks(group(Recurrence::Daily, None, date(2024, 1, 1)), &[true]);
        let mut sep = CycleTask::separator("Header");
        sep.completed = true;
        g.tasks.insert(0, sep);
        let mut groups = vec![g];
        evaluate(&mut groups, date(2024, 1, 2));
        assert!(groups[0].tasks[0].completed, "separator left as-is");
        assert!(!groups[0].tasks[1].completed);
        assert_eq!(groups[0].completion_count, 1);
    }

    #[test]
    fn groups_are_evaluated_independently() {
        let mut daily = with_tasks(group(Recurrence::Daily, None, date(2024, 1, 1)), &[true]);
        daily.id = "daily".into();
        let mut weekly = with_tasks(group(Recurrence::Weekly, None, date(2024, 1, 1)), &[true]);
        weekly.id = "weekly".into();
        let mut groups = vec![daily, weekly];
        let applied = evaluate(&mut groups, date(2024, 1, 3));
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].group_id, "daily");
        assert!(groups[1].tasks[0].completed, "weekly group not due yet");
    }

    #[test]
    fn manual_reset_never_touches_score_or_checkpoint() {
        let mut g = with_tasks(group(Recurrence::Weekly, None, date(2024, 1, 1)), &[true, true]);
        g.score = 12;
        let outcome = manual_reset(&mut g);
        assert!(outcome.was_fully_completed);
        assert_eq!(g.completion_count, 1);
        assert_eq!(g.score, 12);
        assert_eq!(g.last_reset_date, date(2024, 1, 1));
        assert!(g.tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn manual_reset_of_partial_cycle_keeps_count() {
        let mut g = with_tasks(group(Recurrence::Daily, None, date(2024, 1, 1)), &[true, false]);
        let outcome = manual_reset(&mut g);
        assert!(!outcome.was_fully_completed);
        assert_eq!(g.completion_count, 0);
    }
}
