//! Explicit application store.
//!
//! Holds the whole in-memory model and exposes every mutation as a
//! synchronous reducer: validate, mutate, re-derive, publish. After each
//! successful mutation the new snapshot is published on a `watch` channel
//! (persistence subscribes to it) and domain [`Event`]s are queued for
//! polling. A failed mutation publishes nothing and leaves the state as it
//! was.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::new(load_state(&db), Arc::new(SystemClock));
//! let writer = DebouncedWriter::new(db, config.debounce()).spawn(store.subscribe());
//! store.tick();                       // on open / focus / timer
//! store.toggle_group_task(&gid, &tid)?;
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::cycle::{
    self, AppliedReset, CycleGroup, ManualReset, MomentumLevel, NewGroup, NextOccurrence, Recurrence,
};
use crate::daily::{DailyState, DailyView, RolloverReport};
use crate::error::{CoreError, Result};
use crate::events::{DailyItemKind, Event};
use crate::milestone::{Milestone, TaskDisplayStyle};
use crate::storage::{load_state, DocumentStore};

/// The whole persisted model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub groups: Vec<CycleGroup>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub daily: DailyState,
}

/// What a tick changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub today: NaiveDate,
    pub resets: Vec<AppliedReset>,
    pub rollover: Option<RolloverReport>,
}

impl TickReport {
    pub fn changed_anything(&self) -> bool {
        !self.resets.is_empty() || self.rollover.is_some()
    }
}

pub struct Store {
    state: AppState,
    clock: Arc<dyn Clock>,
    snapshots: watch::Sender<Arc<AppState>>,
    events: Vec<Event>,
}

impl Store {
    pub fn new(state: AppState, clock: Arc<dyn Clock>) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(state.clone()));
        Self {
            state,
            clock,
            snapshots,
            events: Vec::new(),
        }
    }

    /// Load from a document store; malformed documents start empty.
    pub fn open(documents: &dyn DocumentStore, clock: Arc<dyn Clock>) -> Self {
        Self::new(load_state(documents), clock)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Immutable snapshot of the last published state.
    pub fn snapshot(&self) -> Arc<AppState> {
        self.snapshots.borrow().clone()
    }

    /// Receive every published snapshot. Used by the persistence writer.
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.snapshots.subscribe()
    }

    /// Take the events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn group(&self, id: &str) -> Option<&CycleGroup> {
        self.state.groups.iter().find(|g| g.id == id)
    }

    fn require_group(&self, id: &str) -> Result<&CycleGroup> {
        self.group(id).ok_or_else(|| CoreError::not_found("group", id))
    }

    pub fn is_due(&self, group_id: &str) -> Result<bool> {
        Ok(cycle::is_due(self.require_group(group_id)?, self.today()))
    }

    pub fn next_occurrence(&self, group_id: &str) -> Result<NextOccurrence> {
        Ok(cycle::next_occurrence(self.require_group(group_id)?, self.today()))
    }

    pub fn classify(&self, group_id: &str) -> Result<MomentumLevel> {
        Ok(self.require_group(group_id)?.momentum())
    }

    pub fn milestone(&self, id: &str) -> Option<&Milestone> {
        self.state.milestones.iter().find(|m| m.id == id)
    }

    pub fn daily_view(&self) -> DailyView<'_> {
        self.state.daily.view(self.today())
    }

    // ── Plumbing ─────────────────────────────────────────────────────

    fn commit(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
        self.snapshots.send_replace(Arc::new(self.state.clone()));
    }

    fn group_mut(&mut self, id: &str) -> Result<&mut CycleGroup> {
        self.state
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| CoreError::not_found("group", id))
    }

    fn milestone_mut(&mut self, id: &str) -> Result<&mut Milestone> {
        self.state
            .milestones
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::not_found("milestone", id))
    }

    // ── Tick ─────────────────────────────────────────────────────────

    /// Re-derive everything that should have happened by today: automatic
    /// cycle resets, then the daily rollover. Safe to call as often as
    /// wanted; a second call on the same day changes nothing.
    pub fn tick(&mut self) -> TickReport {
        let today = self.today();
        let resets = cycle::evaluate(&mut self.state.groups, today);
        let rollover = self.state.daily.roll_to(today);
        let report = TickReport {
            today,
            resets,
            rollover,
        };

        if report.changed_anything() {
            let mut events: Vec<Event> = report
                .resets
                .iter()
                .cloned()
                .map(|reset| Event::CycleReset { reset })
                .collect();
            if let Some(rollover) = &report.rollover {
                events.push(Event::DailyRolledOver {
                    report: rollover.clone(),
                });
            }
            self.commit(events);
        } else {
            debug!(%today, "tick: nothing to do");
        }
        report
    }

    /// Adopt a whole document set from another session or the sync
    /// collaborator. Last writer wins; the tally is taken as-is.
    pub fn replace_from_remote(&mut self, state: AppState) {
        if state == self.state {
            return;
        }
        info!("adopting state from remote");
        self.state = state;
        let on = self.today();
        self.commit([Event::StateReplaced { on }]);
    }

    /// Reload from a document store after a change notification.
    pub fn reload_from(&mut self, documents: &dyn DocumentStore) {
        self.replace_from_remote(load_state(documents));
    }

    // ── Cycle groups ─────────────────────────────────────────────────

    pub fn add_group(&mut self, new: NewGroup) -> Result<String> {
        let on = self.today();
        let group = CycleGroup::create(new, on)?;
        let id = group.id.clone();
        let event = Event::GroupCreated {
            group_id: id.clone(),
            name: group.name.clone(),
            recurrence: group.recurrence,
            on,
        };
        self.state.groups.push(group);
        self.commit([event]);
        Ok(id)
    }

    pub fn rename_group(&mut self, group_id: &str, name: &str) -> Result<()> {
        self.group_mut(group_id)?.rename(name)?;
        self.commit([]);
        Ok(())
    }

    pub fn delete_group(&mut self, group_id: &str) -> Result<CycleGroup> {
        let idx = self
            .state
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| CoreError::not_found("group", group_id))?;
        let removed = self.state.groups.remove(idx);
        let on = self.today();
        self.commit([Event::GroupDeleted {
            group_id: removed.id.clone(),
            on,
        }]);
        Ok(removed)
    }

    pub fn set_schedule(
        &mut self,
        group_id: &str,
        recurrence: Recurrence,
        cycle_start_day: Option<u8>,
    ) -> Result<()> {
        let on = self.today();
        self.group_mut(group_id)?.set_schedule(recurrence, cycle_start_day)?;
        self.commit([Event::ScheduleChanged {
            group_id: group_id.to_string(),
            recurrence,
            cycle_start_day,
            on,
        }]);
        Ok(())
    }

    pub fn add_group_task(&mut self, group_id: &str, title: &str) -> Result<String> {
        let id = self.group_mut(group_id)?.add_task(title)?.id.clone();
        self.commit([]);
        Ok(id)
    }

    pub fn add_group_separator(&mut self, group_id: &str, title: &str) -> Result<String> {
        let id = self.group_mut(group_id)?.add_separator(title)?.id.clone();
        self.commit([]);
        Ok(id)
    }

    pub fn toggle_group_task(&mut self, group_id: &str, task_id: &str) -> Result<bool> {
        let on = self.today();
        let completed = self.group_mut(group_id)?.toggle_task(task_id)?;
        self.commit([Event::GroupTaskToggled {
            group_id: group_id.to_string(),
            task_id: task_id.to_string(),
            completed,
            on,
        }]);
        Ok(completed)
    }

    pub fn rename_group_task(&mut self, group_id: &str, task_id: &str, title: &str) -> Result<()> {
        self.group_mut(group_id)?.rename_task(task_id, title)?;
        self.commit([]);
        Ok(())
    }

    pub fn remove_group_task(&mut self, group_id: &str, task_id: &str) -> Result<()> {
        self.group_mut(group_id)?.remove_task(task_id)?;
        self.commit([]);
        Ok(())
    }

    /// Clear the board without judging the cycle.
    pub fn manual_reset(&mut self, group_id: &str) -> Result<ManualReset> {
        let on = self.today();
        let outcome = cycle::manual_reset(self.group_mut(group_id)?);
        self.commit([Event::CycleClearedManually {
            group_id: outcome.group_id.clone(),
            was_fully_completed: outcome.was_fully_completed,
            completion_count: outcome.completion_count,
            on,
        }]);
        Ok(outcome)
    }

    // ── Milestones ───────────────────────────────────────────────────

    pub fn add_milestone(&mut self, title: &str, style: TaskDisplayStyle) -> Result<String> {
        let milestone = Milestone::new(title, style)?;
        let id = milestone.id.clone();
        self.state.milestones.push(milestone);
        self.commit([]);
        Ok(id)
    }

    pub fn delete_milestone(&mut self, milestone_id: &str) -> Result<Milestone> {
        let idx = self
            .state
            .milestones
            .iter()
            .position(|m| m.id == milestone_id)
            .ok_or_else(|| CoreError::not_found("milestone", milestone_id))?;
        let removed = self.state.milestones.remove(idx);
        self.commit([]);
        Ok(removed)
    }

    /// Run a milestone mutation and emit a completion event if the derived
    /// flag flipped.
    fn with_milestone<T>(
        &mut self,
        milestone_id: &str,
        mutate: impl FnOnce(&mut Milestone) -> Result<T>,
    ) -> Result<(T, Option<Event>)> {
        let on = self.today();
        let milestone = self.milestone_mut(milestone_id)?;
        let before = milestone.completed;
        let value = mutate(milestone)?;
        let after = milestone.completed;
        let event = (before != after).then(|| Event::MilestoneCompletionChanged {
            milestone_id: milestone_id.to_string(),
            completed: after,
            on,
        });
        Ok((value, event))
    }

    pub fn add_milestone_task(&mut self, milestone_id: &str, title: &str) -> Result<String> {
        let (id, event) = self.with_milestone(milestone_id, |m| m.add_task(title))?;
        self.commit(event);
        Ok(id)
    }

    pub fn add_milestone_separator(&mut self, milestone_id: &str, title: &str) -> Result<String> {
        let (id, event) = self.with_milestone(milestone_id, |m| m.add_separator(title))?;
        self.commit(event);
        Ok(id)
    }

    pub fn toggle_milestone_task(&mut self, milestone_id: &str, task_id: &str) -> Result<bool> {
        let on = self.today();
        let (completed, event) = self.with_milestone(milestone_id, |m| m.toggle_task(task_id))?;
        let toggled = Event::MilestoneTaskToggled {
            milestone_id: milestone_id.to_string(),
            task_id: task_id.to_string(),
            completed,
            on,
        };
        self.commit(std::iter::once(toggled).chain(event));
        Ok(completed)
    }

    pub fn remove_milestone_task(&mut self, milestone_id: &str, task_id: &str) -> Result<()> {
        let (_, event) = self.with_milestone(milestone_id, |m| m.remove_task(task_id))?;
        self.commit(event);
        Ok(())
    }

    pub fn set_milestone_completed(&mut self, milestone_id: &str, completed: bool) -> Result<()> {
        let (_, event) = self.with_milestone(milestone_id, |m| m.set_completed(completed))?;
        self.commit(event);
        Ok(())
    }

    pub fn set_milestone_in_progress(&mut self, milestone_id: &str, in_progress: bool) -> Result<()> {
        self.milestone_mut(milestone_id)?.set_in_progress(in_progress);
        self.commit([]);
        Ok(())
    }

    pub fn set_milestone_style(&mut self, milestone_id: &str, style: TaskDisplayStyle) -> Result<()> {
        let (_, event) = self.with_milestone(milestone_id, |m| {
            m.set_display_style(style);
            Ok(())
        })?;
        self.commit(event);
        Ok(())
    }

    // ── Daily list ───────────────────────────────────────────────────

    /// Roll the daily list to today, then run `mutate` on it.
    ///
    /// Every daily item is stamped against the current day key, so a list
    /// edited before the first tick still rolls over at midnight. The
    /// rollover is kept even when `mutate` fails.
    fn with_daily<T>(
        &mut self,
        mutate: impl FnOnce(&mut DailyState, NaiveDate) -> Result<T>,
    ) -> Result<(T, Vec<Event>)> {
        let today = self.today();
        let rolled: Vec<Event> = self
            .state
            .daily
            .roll_to(today)
            .map(|report| Event::DailyRolledOver { report })
            .into_iter()
            .collect();
        match mutate(&mut self.state.daily, today) {
            Ok(value) => Ok((value, rolled)),
            Err(e) => {
                if !rolled.is_empty() {
                    self.commit(rolled);
                }
                Err(e)
            }
        }
    }

    fn daily_toggled(&self, item_id: &str, kind: DailyItemKind, completed: bool) -> Event {
        Event::DailyItemToggled {
            item_id: item_id.to_string(),
            kind,
            completed,
            all_time_completed: self.state.daily.all_time_completed,
            on: self.today(),
        }
    }

    fn toggle_daily(
        &mut self,
        id: &str,
        kind: DailyItemKind,
        toggle: impl FnOnce(&mut DailyState, NaiveDate) -> Result<bool>,
    ) -> Result<bool> {
        let (completed, mut events) = self.with_daily(toggle)?;
        events.push(self.daily_toggled(id, kind, completed));
        self.commit(events);
        Ok(completed)
    }

    pub fn add_todo(&mut self, title: &str) -> Result<String> {
        let (id, events) = self.with_daily(|daily, _| daily.add_todo(title))?;
        self.commit(events);
        Ok(id)
    }

    pub fn toggle_todo(&mut self, id: &str) -> Result<bool> {
        self.toggle_daily(id, DailyItemKind::Todo, |daily, _| daily.toggle_todo(id))
    }

    pub fn remove_todo(&mut self, id: &str) -> Result<()> {
        let (_, events) = self.with_daily(|daily, _| daily.remove_todo(id))?;
        self.commit(events);
        Ok(())
    }

    pub fn add_pinned(&mut self, title: &str) -> Result<String> {
        let (id, events) = self.with_daily(|daily, _| daily.add_pinned(title))?;
        self.commit(events);
        Ok(id)
    }

    pub fn toggle_pinned(&mut self, id: &str) -> Result<bool> {
        self.toggle_daily(id, DailyItemKind::Pinned, |daily, today| {
            daily.toggle_pinned(id, today)
        })
    }

    pub fn remove_pinned(&mut self, id: &str) -> Result<()> {
        let (_, events) = self.with_daily(|daily, _| daily.remove_pinned(id))?;
        self.commit(events);
        Ok(())
    }

    pub fn add_recurring(&mut self, title: &str, days_of_week: &[u8]) -> Result<String> {
        let (id, events) = self.with_daily(|daily, _| daily.add_recurring(title, days_of_week))?;
        self.commit(events);
        Ok(id)
    }

    pub fn toggle_recurring(&mut self, id: &str) -> Result<bool> {
        self.toggle_daily(id, DailyItemKind::Recurring, |daily, today| {
            daily.toggle_recurring(id, today)
        })
    }

    pub fn skip_recurring(&mut self, id: &str) -> Result<()> {
        let (on, mut events) = self.with_daily(|daily, today| daily.skip(id, today).map(|()| today))?;
        events.push(Event::DailyItemSkipped {
            item_id: id.to_string(),
            on,
        });
        self.commit(events);
        Ok(())
    }

    pub fn remove_recurring(&mut self, id: &str) -> Result<()> {
        let (_, events) = self.with_daily(|daily, _| daily.remove_recurring(id))?;
        self.commit(events);
        Ok(())
    }
}
