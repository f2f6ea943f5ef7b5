//! Reset schedule arithmetic.
//!
//! Pure functions over local calendar dates. Time of day never enters the
//! picture, so a reset cannot be skewed by timezone or DST changes within a
//! day.
//!
//! ## Rules
//!
//! ```text
//! elapsed = max(0, today - last_reset_date)
//!
//! daily                  elapsed >= 1
//! weekly   (rolling)     elapsed >= 7
//! weekly   (anchor W)    weekday(today) == W              && elapsed >= 1
//! monthly  (rolling)     elapsed >= 30
//! monthly  (anchor D)    day(today) == min(D, month_len)  && elapsed >= 1
//! ```
//!
//! Nothing is due before `start_date`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{CycleGroup, Recurrence};
use crate::clock::weekday_index;

const ROLLING_WEEK_DAYS: i64 = 7;
const ROLLING_MONTH_DAYS: i64 = 30;

/// Next date a group will reset, relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextOccurrence {
    pub date: NaiveDate,
    /// Never negative.
    pub days_until: i64,
}

/// Number of days in the given month (28 ..= 31).
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Whole days since the last reset, clamped at zero so a clock that runs
/// behind `last_reset_date` reads as "nothing elapsed".
fn elapsed_days(group: &CycleGroup, today: NaiveDate) -> i64 {
    (today - group.last_reset_date).num_days().max(0)
}

fn anchor_matches(group: &CycleGroup, day: NaiveDate) -> bool {
    match (group.recurrence, group.cycle_start_day) {
        (Recurrence::Weekly, Some(weekday)) => weekday_index(day) == weekday,
        (Recurrence::Monthly, Some(dom)) => {
            let target = (dom as u32).min(days_in_month(day.year(), day.month()));
            day.day() == target
        }
        _ => false,
    }
}

/// Whether a rollover should happen on `today`.
pub fn is_due(group: &CycleGroup, today: NaiveDate) -> bool {
    if group.start_date > today {
        return false;
    }
    let elapsed = elapsed_days(group, today);
    match (group.recurrence, group.cycle_start_day) {
        (Recurrence::Daily, _) => elapsed >= 1,
        (Recurrence::Weekly, None) => elapsed >= ROLLING_WEEK_DAYS,
        (Recurrence::Monthly, None) => elapsed >= ROLLING_MONTH_DAYS,
        // The elapsed guard stops a second reset on the same anchor day.
        (Recurrence::Weekly | Recurrence::Monthly, Some(_)) => {
            anchor_matches(group, today) && elapsed >= 1
        }
    }
}

/// Compute the next reset date on or after `today`.
///
/// The search starts from `max(today, start_date)`. Daily groups always
/// answer the day after it. For the other cadences, a group already due on
/// that day answers that day, and rolling windows that lapsed without an
/// evaluation are clamped to it as well.
pub fn next_occurrence(group: &CycleGroup, today: NaiveDate) -> NextOccurrence {
    let reference = today.max(group.start_date);
    let date = if group.recurrence == Recurrence::Daily {
        reference + Duration::days(1)
    } else if is_due(group, reference) {
        reference
    } else {
        match (group.recurrence, group.cycle_start_day) {
            (Recurrence::Daily, _) => reference + Duration::days(1),
            (Recurrence::Weekly, None) => {
                (group.last_reset_date + Duration::days(ROLLING_WEEK_DAYS)).max(reference)
            }
            (Recurrence::Monthly, None) => {
                (group.last_reset_date + Duration::days(ROLLING_MONTH_DAYS)).max(reference)
            }
            (Recurrence::Weekly | Recurrence::Monthly, Some(_)) => next_anchor_after(group, reference),
        }
    };
    NextOccurrence {
        date,
        days_until: (date - today).num_days().max(0),
    }
}

/// First day strictly after `reference` that lands on the anchor.
///
/// A month never spans more than 31 days, so two months of candidates always
/// contain a match (the anchor is clamped to short months).
fn next_anchor_after(group: &CycleGroup, reference: NaiveDate) -> NaiveDate {
    let mut day = reference;
    for _ in 0..62 {
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
        if anchor_matches(group, day) {
            return day;
        }
    }
    day
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{date, group};
    use super::*;

    const SUNDAY: u8 = 0;
    const MONDAY: u8 = 1;

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn daily_is_due_after_one_day() {
        let g = group(Recurrence::Daily, None, date(2024, 3, 10));
        assert!(!is_due(&g, date(2024, 3, 10)));
        assert!(is_due(&g, date(2024, 3, 11)));
        assert!(is_due(&g, date(2024, 3, 20)));
    }

    #[test]
    fn rolling_weekly_needs_seven_days() {
        let g = group(Recurrence::Weekly, None, date(2024, 3, 1));
        assert!(!is_due(&g, date(2024, 3, 7)));
        assert!(is_due(&g, date(2024, 3, 8)));
    }

    #[test]
    fn anchored_weekly_fires_on_anchor_day_only() {
        // 2024-01-01 is a Monday.
        let g = group(Recurrence::Weekly, Some(MONDAY), date(2024, 1, 1));
        assert!(!is_due(&g, date(2024, 1, 1)), "same-day guard");
        assert!(!is_due(&g, date(2024, 1, 7)), "Sunday is not the anchor");
        assert!(is_due(&g, date(2024, 1, 8)));
    }

    #[test]
    fn anchored_weekly_waits_for_anchor_even_if_window_lapsed() {
        let g = group(Recurrence::Weekly, Some(SUNDAY), date(2024, 1, 1));
        // Ten days later but a Thursday.
        assert!(!is_due(&g, date(2024, 1, 11)));
        assert!(is_due(&g, date(2024, 1, 14)));
    }

    #[test]
    fn rolling_monthly_needs_thirty_days() {
        let g = group(Recurrence::Monthly, None, date(2024, 1, 1));
        assert!(!is_due(&g, date(2024, 1, 30)));
        assert!(is_due(&g, date(2024, 1, 31)));
    }

    #[test]
    fn anchored_monthly_clamps_to_short_months() {
        let g = group(Recurrence::Monthly, Some(31), date(2024, 1, 31));
        assert!(!is_due(&g, date(2024, 2, 28)));
        assert!(is_due(&g, date(2024, 2, 29)), "leap February ends on the 29th");
        let g = group(Recurrence::Monthly, Some(31), date(2024, 3, 31));
        assert!(is_due(&g, date(2024, 4, 30)));
    }

    #[test]
    fn nothing_is_due_before_start_date() {
        let mut g = group(Recurrence::Daily, None, date(2024, 1, 1));
        g.start_date = date(2024, 2, 1);
        assert!(!is_due(&g, date(2024, 1, 20)));
    }

    #[test]
    fn clock_skew_reads_as_not_due() {
        let g = group(Recurrence::Daily, None, date(2024, 5, 10));
        assert!(!is_due(&g, date(2024, 5, 1)));
        let g = group(Recurrence::Weekly, Some(MONDAY), date(2024, 5, 13));
        // 2024-05-06 is a Monday but before the last reset.
        assert!(!is_due(&g, date(2024, 5, 6)));
    }

    #[test]
    fn next_occurrence_daily_is_tomorrow() {
        let g = group(Recurrence::Daily, None, date(2024, 3, 10));
        let next = next_occurrence(&g, date(2024, 3, 10));
        assert_eq!(next.date, date(2024, 3, 11));
        assert_eq!(next.days_until, 1);

        // Due but not yet evaluated: still tomorrow.
        let g = group(Recurrence::Daily, None, date(2024, 1, 1));
        assert!(is_due(&g, date(2024, 1, 2)));
        let next = next_occurrence(&g, date(2024, 1, 2));
        assert_eq!(next.date, date(2024, 1, 3));
        assert_eq!(next.days_until, 1);
    }

    #[test]
    fn next_occurrence_anchored_weekly_finds_next_weekday() {
        // Reset on Monday 2024-01-08, asked on Wednesday 2024-01-10.
        let g = group(Recurrence::Weekly, Some(MONDAY), date(2024, 1, 8));
        let next = next_occurrence(&g, date(2024, 1, 10));
        assert_eq!(next.date, date(2024, 1, 15));
        assert_eq!(next.days_until, 5);

        // Asked on the anchor day right after resetting: a full week out.
        let next = next_occurrence(&g, date(2024, 1, 8));
        assert_eq!(next.date, date(2024, 1, 15));
        assert_eq!(next.days_until, 7);
    }

    #[test]
    fn next_occurrence_rolling_weekly_counts_from_last_reset() {
        let g = group(Recurrence::Weekly, None, date(2024, 1, 3));
        let next = next_occurrence(&g, date(2024, 1, 5));
        assert_eq!(next.date, date(2024, 1, 10));
        assert_eq!(next.days_until, 5);
    }

    #[test]
    fn next_occurrence_is_today_when_overdue() {
        let g = group(Recurrence::Weekly, None, date(2024, 1, 1));
        let next = next_occurrence(&g, date(2024, 1, 20));
        assert_eq!(next.date, date(2024, 1, 20));
        assert_eq!(next.days_until, 0);
    }

    #[test]
    fn next_occurrence_anchored_monthly_rolls_to_next_month() {
        let g = group(Recurrence::Monthly, Some(15), date(2024, 1, 15));
        let next = next_occurrence(&g, date(2024, 1, 20));
        assert_eq!(next.date, date(2024, 2, 15));

        let next = next_occurrence(&g, date(2024, 2, 3));
        assert_eq!(next.date, date(2024, 2, 15));
        assert_eq!(next.days_until, 12);
    }

    #[test]
    fn next_occurrence_anchored_monthly_clamps_day() {
        let g = group(Recurrence::Monthly, Some(31), date(2024, 1, 31));
        let next = next_occurrence(&g, date(2024, 2, 1));
        assert_eq!(next.date, date(2024, 2, 29));
    }

    #[test]
    fn next_occurrence_respects_future_start_date() {
        let mut g = group(Recurrence::Daily, None, date(2024, 6, 1));
        g.start_date = date(2024, 6, 1);
        let next = next_occurrence(&g, date(2024, 5, 25));
        assert_eq!(next.date, date(2024, 6, 2));
        assert_eq!(next.days_until, 8);
    }

    #[test]
    fn next_occurrence_never_negative_under_skew() {
        let g = group(Recurrence::Monthly, None, date(2024, 8, 1));
        let next = next_occurrence(&g, date(2024, 7, 1));
        assert!(next.days_until >= 0);
        assert_eq!(next.date, date(2024, 8, 31));
    }
}
