//! Daily-scope list.
//!
//! Three kinds of item live here:
//! - ad-hoc todos, dropped at the first local midnight after completion;
//! - pinned items, which stay until a day passes with them completed;
//! - weekday-recurring items, shown only on their weekdays and tracked per day.
//!
//! Every false -> true completion bumps the all-time tally and every
//! true -> false takes one back off (never below zero). The tally survives
//! rollover.

pub mod carry_over;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{day_key, weekday_index};
use crate::cycle::non_empty;
use crate::error::{CoreError, Result, ValidationError};

pub use carry_over::{rollover, RolloverReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTodo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    /// Local day key (`YYYY-MM-DD`) of the last completion.
    #[serde(default)]
    pub completed_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringDailyItem {
    pub id: String,
    pub title: String,
    /// 0 = Sunday ..= 6 = Saturday
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub completed_dates: Vec<String>,
    #[serde(default)]
    pub skipped_dates: Vec<String>,
}

impl RecurringDailyItem {
    pub fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        self.days_of_week.contains(&weekday_index(date))
    }

    pub fn is_skipped_on(&self, date: NaiveDate) -> bool {
        let key = day_key(date);
        self.skipped_dates.iter().any(|d| *d == key)
    }

    /// Scheduled for the weekday and not skipped for this date.
    pub fn is_visible_on(&self, date: NaiveDate) -> bool {
        self.is_scheduled_on(date) && !self.is_skipped_on(date)
    }

    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        let key = day_key(date);
        self.completed_dates.iter().any(|d| *d == key)
    }
}

/// Read-only view of what the daily list shows on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct DailyView<'a> {
    pub day_key: String,
    pub todos: &'a [DailyTodo],
    pub pinned: &'a [PinnedItem],
    pub recurring: Vec<RecurringEntry<'a>>,
    pub all_time_completed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecurringEntry<'a> {
    #[serde(flatten)]
    pub item: &'a RecurringDailyItem,
    pub completed_today: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyState {
    /// Local day the list was last rolled over to. `None` on a fresh install.
    #[serde(default)]
    pub day_key: Option<String>,
    #[serde(default)]
    pub todos: Vec<DailyTodo>,
    #[serde(default)]
    pub pinned: Vec<PinnedItem>,
    #[serde(default)]
    pub recurring: Vec<RecurringDailyItem>,
    #[serde(default)]
    pub all_time_completed: u64,
}

impl DailyState {
    fn record_transition(&mut self, before: bool, after: bool) {
        match (before, after) {
            (false, true) => self.all_time_completed = self.all_time_completed.saturating_add(1),
            (true, false) => self.all_time_completed = self.all_time_completed.saturating_sub(1),
            _ => {}
        }
    }

    /// Roll the list over to `today`, using the stored day key as the
    /// previous day. Returns `None` when the key already matches.
    pub fn roll_to(&mut self, today: NaiveDate) -> Option<RolloverReport> {
        let current = day_key(today);
        let previous = self.day_key.clone();
        let report = match previous.as_deref() {
            Some(prev) if prev == current => return None,
            // No previous day recorded: todos cannot be judged, but pinned
            // items carry their own completion day.
            None => {
                let mut report = RolloverReport::empty(None, &current);
                report.dropped_pinned = carry_over::drop_stale_pinned(self, &current);
                report.carried_todos = self.todos.len();
                report
            }
            Some(prev) => rollover(self, prev, &current),
        };
        self.day_key = Some(current);
        Some(report)
    }

    pub fn view(&self, today: NaiveDate) -> DailyView<'_> {
        DailyView {
            day_key: day_key(today),
            todos: &self.todos,
            pinned: &self.pinned,
            recurring: self
                .visible_recurring(today)
                .map(|item| RecurringEntry {
                    item,
                    completed_today: item.is_completed_on(today),
                })
                .collect(),
            all_time_completed: self.all_time_completed,
        }
    }

    pub fn visible_recurring(&self, today: NaiveDate) -> impl Iterator<Item = &RecurringDailyItem> {
        self.recurring.iter().filter(move |r| r.is_visible_on(today))
    }

    // ── Ad-hoc todos ─────────────────────────────────────────────────

    pub fn add_todo(&mut self, title: &str) -> Result<String> {
        let title = non_empty(title, "todo title")?;
        let id = Uuid::new_v4().to_string();
        self.todos.push(DailyTodo {
            id: id.clone(),
            title: title.to_string(),
            completed: false,
        });
        Ok(id)
    }

    pub fn toggle_todo(&mut self, id: &str) -> Result<bool> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("todo", id))?;
        let before = todo.completed;
        todo.completed = !before;
        let after = todo.completed;
        self.record_transition(before, after);
        Ok(after)
    }

    pub fn remove_todo(&mut self, id: &str) -> Result<DailyTodo> {
        let idx = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("todo", id))?;
        Ok(self.todos.remove(idx))
    }

    // ── Pinned items ─────────────────────────────────────────────────

    pub fn add_pinned(&mut self, title: &str) -> Result<String> {
        let title = non_empty(title, "pinned title")?;
        let id = Uuid::new_v4().to_string();
        self.pinned.push(PinnedItem {
            id: id.clone(),
            title: title.to_string(),
            completed: false,
            completed_date: None,
        });
        Ok(id)
    }

    /// Toggle a pinned item, stamping (or clearing) the completion day.
    pub fn toggle_pinned(&mut self, id: &str, today: NaiveDate) -> Result<bool> {
        let item = self
            .pinned
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("pinned item", id))?;
        let before = item.completed;
        item.completed = !before;
        item.completed_date = item.completed.then(|| day_key(today));
        let after = item.completed;
        self.record_transition(before, after);
        Ok(after)
    }

    pub fn remove_pinned(&mut self, id: &str) -> Result<PinnedItem> {
        let idx = self
            .pinned
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| CoreError::not_found("pinned item", id))?;
        Ok(self.pinned.remove(idx))
    }

    // ── Weekday-recurring items ──────────────────────────────────────

    pub fn add_recurring(&mut self, title: &str, days_of_week: &[u8]) -> Result<String> {
        let title = non_empty(title, "recurring title")?;
        if days_of_week.is_empty() {
            return Err(ValidationError::EmptyCollection("days_of_week".to_string()).into());
        }
        if let Some(bad) = days_of_week.iter().find(|d| **d > 6) {
            return Err(ValidationError::InvalidWeekday(*bad).into());
        }
        let mut days = days_of_week.to_vec();
        days.sort_unstable();
        days.dedup();

        let id = Uuid::new_v4().to_string();
        self.recurring.push(RecurringDailyItem {
            id: id.clone(),
            title: title.to_string(),
            days_of_week: days,
            completed_dates: Vec::new(),
            skipped_dates: Vec::new(),
        });
        Ok(id)
    }

    fn recurring_mut(&mut self, id: &str) -> Result<&mut RecurringDailyItem> {
        self.recurring
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("recurring item", id))
    }

    /// Toggle today's occurrence. Only allowed when the item is visible today.
    pub fn toggle_recurring(&mut self, id: &str, today: NaiveDate) -> Result<bool> {
        let key = day_key(today);
        let item = self.recurring_mut(id)?;
        if !item.is_visible_on(today) {
            return Err(ValidationError::InvalidValue {
                field: "recurring item".to_string(),
                message: format!("'{}' is not scheduled for {key}", item.title),
            }
            .into());
        }
        let before = item.is_completed_on(today);
        if before {
            item.completed_dates.retain(|d| *d != key);
        } else {
            item.completed_dates.push(key);
        }
        self.record_transition(before, !before);
        Ok(!before)
    }

    /// Hide one occurrence. Later occurrences are unaffected.
    pub fn skip(&mut self, id: &str, today: NaiveDate) -> Result<()> {
        let key = day_key(today);
        let item = self.recurring_mut(id)?;
        if !item.skipped_dates.contains(&key) {
            item.skipped_dates.push(key);
        }
        Ok(())
    }

    pub fn remove_recurring(&mut self, id: &str) -> Result<RecurringDailyItem> {
        let idx = self
            .recurring
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("recurring item", id))?;
        Ok(self.recurring.remove(idx))
    }
}
