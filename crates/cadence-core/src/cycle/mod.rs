//! Cycle groups: named sets of recurring tasks sharing one reset schedule.
//!
//! A group's `score`, `completion_count` and `last_reset_date` are owned by
//! the reset engine ([`reset`]). Everything else here is plain editing of the
//! task list, with validation up front so a rejected call leaves the group
//! untouched.

pub mod recurrence;
pub mod reset;
pub mod score;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result, ValidationError};

pub use recurrence::{days_in_month, is_due, next_occurrence, NextOccurrence};
pub use reset::{evaluate, manual_reset, AppliedReset, ManualReset};
pub use score::{MomentumLevel, SCORE_MAX, SCORE_MIN};

/// Cadence governing when a cycle group resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }

    /// Check an optional anchor day against this cadence.
    ///
    /// Weekly anchors are weekdays 0 (Sunday) ..= 6, monthly anchors are
    /// days of month 1 ..= 31. Daily schedules take no anchor.
    pub fn validate_anchor(&self, anchor: Option<u8>) -> Result<(), ValidationError> {
        let Some(value) = anchor else {
            return Ok(());
        };
        let valid = match self {
            Recurrence::Daily => false,
            Recurrence::Weekly => value <= 6,
            Recurrence::Monthly => (1..=31).contains(&value),
        };
        if valid {
            Ok(())
        } else {
            Err(ValidationError::InvalidAnchor {
                recurrence: *self,
                value,
            })
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(ValidationError::InvalidValue {
                field: "recurrence".to_string(),
                message: format!("expected daily, weekly or monthly, got '{other}'"),
            }),
        }
    }
}

/// One entry in a cycle group's task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Display-only header. Never counted in completion math.
    #[serde(default)]
    pub is_separator: bool,
}

impl CycleTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
            is_separator: false,
        }
    }

    pub fn separator(title: impl Into<String>) -> Self {
        Self {
            is_separator: true,
            ..Self::new(title)
        }
    }
}

/// Parameters for creating a group.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub recurrence: Recurrence,
    pub cycle_start_day: Option<u8>,
    /// Defaults to the creation day.
    pub start_date: Option<NaiveDate>,
}

/// Completion summary of the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// 0.0 .. 1.0; an empty list reports 0.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// A named set of recurring tasks sharing one reset schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleGroup {
    pub id: String,
    pub name: String,
    pub recurrence: Recurrence,
    /// Weekday (weekly) or day of month (monthly). `None` means rolling window.
    #[serde(default)]
    pub cycle_start_day: Option<u8>,
    pub start_date: NaiveDate,
    pub last_reset_date: NaiveDate,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub completion_count: u32,
    #[serde(default)]
    pub tasks: Vec<CycleTask>,
}

impl CycleGroup {
    /// Validate and build a fresh group. The first cycle begins on
    /// `max(today, start_date)`.
    pub fn create(new: NewGroup, today: NaiveDate) -> Result<Self> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTitle { field: "group name" }.into());
        }
        new.recurrence.validate_anchor(new.cycle_start_day)?;
        let start_date = new.start_date.unwrap_or(today);
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            recurrence: new.recurrence,
            cycle_start_day: new.cycle_start_day,
            start_date,
            last_reset_date: start_date.max(today),
            score: 0,
            completion_count: 0,
            tasks: Vec::new(),
        })
    }

    pub fn regular_tasks(&self) -> impl Iterator<Item = &CycleTask> {
        self.tasks.iter().filter(|t| !t.is_separator)
    }

    /// True when there is at least one regular task and all are done.
    pub fn is_fully_completed(&self) -> bool {
        let mut any = false;
        for task in self.regular_tasks() {
            if !task.completed {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn progress(&self) -> Progress {
        let (completed, total) = self
            .regular_tasks()
            .fold((0, 0), |(done, total), t| (done + t.completed as usize, total + 1));
        Progress { completed, total }
    }

    pub fn momentum(&self) -> MomentumLevel {
        MomentumLevel::classify(self.score)
    }

    pub fn task(&self, task_id: &str) -> Option<&CycleTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn add_task(&mut self, title: &str) -> Result<&CycleTask> {
        let title = non_empty(title, "task title")?;
        let idx = self.tasks.len();
        self.tasks.push(CycleTask::new(title));
        Ok(&self.tasks[idx])
    }

    /// Insert a display-only header. The text is expected to be validated
    /// by the caller; blank headers are still rejected.
    pub fn add_separator(&mut self, title: &str) -> Result<&CycleTask> {
        let title = non_empty(title, "separator title")?;
        let idx = self.tasks.len();
        self.tasks.push(CycleTask::separator(title));
        Ok(&self.tasks[idx])
    }

    /// Flip a regular task's completion. Returns the new value.
    pub fn toggle_task(&mut self, task_id: &str) -> Result<bool> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        if task.is_separator {
            return Err(ValidationError::SeparatorToggle {
                task_id: task_id.to_string(),
            }
            .into());
        }
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn rename_task(&mut self, task_id: &str, title: &str) -> Result<()> {
        let title = non_empty(title, "task title")?;
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        task.title = title.to_string();
        Ok(())
    }

    pub fn remove_task(&mut self, task_id: &str) -> Result<CycleTask> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        Ok(self.tasks.remove(idx))
    }

    /// Change cadence and anchor together. Invalid combinations are rejected
    /// before anything is written.
    pub fn set_schedule(&mut self, recurrence: Recurrence, cycle_start_day: Option<u8>) -> Result<()> {
        recurrence.validate_anchor(cycle_start_day)?;
        self.recurrence = recurrence;
        self.cycle_start_day = cycle_start_day;
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> Result<()> {
        self.name = non_empty(name, "group name")?.to_string();
        Ok(())
    }

    /// Clear completion on every regular task; separators are left alone.
    pub(crate) fn clear_regular_tasks(&mut self) {
        for task in self.tasks.iter_mut().filter(|t| !t.is_separator) {
            task.completed = false;
        }
    }
}

pub(crate) fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyTitle { field })
    } else {
        Ok(trimmed)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn new_group(recurrence: Recurrence, anchor: Option<u8>) -> NewGroup {
        NewGroup {
            name: "Weekly review".to_string(),
            recurrence,
            cycle_start_day: anchor,
            start_date: None,
        }
    }

    #[test]
    fn create_rejects_out_of_range_anchor() {
        let today = date(2024, 1, 1);
        let err = CycleGroup::create(new_group(Recurrence::Weekly, Some(7)), today).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidAnchor { value: 7, .. })
        ));
        assert!(CycleGroup::create(new_group(Recurrence::Monthly, Some(0)), today).is_err());
        assert!(CycleGroup::create(new_group(Recurrence::Monthly, Some(32)), today).is_err());
        assert!(CycleGroup::create(new_group(Recurrence::Daily, Some(1)), today).is_err());
        assert!(CycleGroup::create(new_group(Recurrence::Monthly, Some(31)), today).is_ok());
    }

    #[test]
    fn create_starts_first_cycle_on_later_of_today_and_start() {
        let today = date(2024, 1, 10);
        let mut new = new_group(Recurrence::Daily, None);
        new.start_date = Some(date(2024, 1, 20));
        let g = CycleGroup::create(new, today).unwrap();
        assert_eq!(g.last_reset_date, date(2024, 1, 20));

        let mut new = new_group(Recurrence::Daily, None);
        new.start_date = Some(date(2023, 12, 1));
        let g = CycleGroup::create(new, today).unwrap();
        assert_eq!(g.last_reset_date, today);
        assert_eq!(g.score, 0);
        assert_eq!(g.completion_count, 0);
    }

    #[test]
    fn separators_are_ignored_by_completion_math() {
        let mut g = with_tasks(group(Recurrence::Daily, None, date(2024, 1, 1)), &[true, true]);
        g.add_separator("Evening").unwrap();
        assert!(g.is_fully_completed());
        assert_eq!(g.progress(), Progress { completed: 2, total: 2 });
    }

    #[test]
    fn empty_group_is_never_fully_completed() {
        let mut g = group(Recurrence::Daily, None, date(2024, 1, 1));
        assert!(!g.is_fully_completed());
        g.add_separator("Header only").unwrap();
        assert!(!g.is_fully_completed());
        assert_eq!(g.progress().ratio(), 0.0);
    }

    #[test]
    fn toggling_a_separator_is_rejected() {
        let mut g = group(Recurrence::Daily, None, date(2024, 1, 1));
        let sep_id = g.add_separator("Morning").unwrap().id.clone();
        assert!(g.toggle_task(&sep_id).is_err());
        assert!(!g.tasks[0].completed);
    }

    #[test]
    fn set_schedule_leaves_group_unchanged_on_error() {
        let mut g = group(Recurrence::Weekly, Some(1), date(2024, 1, 1));
        let before = g.clone();
        assert!(g.set_schedule(Recurrence::Monthly, Some(40)).is_err());
        assert_eq!(g, before);
        g.set_schedule(Recurrence::Monthly, Some(15)).unwrap();
        assert_eq!(g.cycle_start_day, Some(15));
    }

    #[test]
    fn recurrence_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Recurrence>().unwrap(), Recurrence::Weekly);
        assert!("fortnightly".parse::<Recurrence>().is_err());
    }

    #[test]
    fn blank_titles_are_rejected() {
        let mut g = group(Recurrence::Daily, None, date(2024, 1, 1));
        assert!(g.add_task("   ").is_err());
        assert!(g.tasks.is_empty());
    }
}
