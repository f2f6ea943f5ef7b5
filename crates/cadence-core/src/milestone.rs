//! Milestones and derived completion.
//!
//! A checkbox-style milestone with at least one regular task is complete
//! exactly when all of its regular tasks are. The flag is recomputed by
//! [`propagate`] at the end of every task mutation, once, synchronously.
//! Bullet-style milestones (and milestones without tasks) keep completion as
//! a manual flag.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::{non_empty, CycleTask, Progress};
use crate::error::{CoreError, Result, ValidationError};

/// How a milestone's tasks are shown, which also decides whether its
/// completion is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskDisplayStyle {
    #[default]
    Checkbox,
    Bullet,
}

pub type MilestoneTask = CycleTask;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub task_display_style: TaskDisplayStyle,
    #[serde(default)]
    pub tasks: Vec<MilestoneTask>,
}

/// Recompute `completed` from the milestone's regular tasks.
///
/// Only touches `completed` and `in_progress`; never the tasks.
pub fn propagate(mut milestone: Milestone) -> Milestone {
    if !milestone.is_derived() {
        return milestone;
    }
    let all_done = milestone.regular_tasks().all(|t| t.completed);
    if all_done && !milestone.completed {
        milestone.completed = true;
        milestone.in_progress = false;
    } else if !all_done && milestone.completed {
        milestone.completed = false;
    }
    milestone
}

impl Milestone {
    pub fn new(title: &str, style: TaskDisplayStyle) -> Result<Self> {
        let title = non_empty(title, "milestone title")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            in_progress: false,
            task_display_style: style,
            tasks: Vec::new(),
        })
    }

    pub fn regular_tasks(&self) -> impl Iterator<Item = &MilestoneTask> {
        self.tasks.iter().filter(|t| !t.is_separator)
    }

    /// Whether completion is computed from tasks rather than set by hand.
    pub fn is_derived(&self) -> bool {
        self.task_display_style != TaskDisplayStyle::Bullet && self.regular_tasks().next().is_some()
    }

    pub fn progress(&self) -> Progress {
        let (completed, total) = self
            .regular_tasks()
            .fold((0, 0), |(done, total), t| (done + t.completed as usize, total + 1));
        Progress { completed, total }
    }

    fn repropagate(&mut self) {
        *self = propagate(std::mem::take(self));
    }

    pub fn add_task(&mut self, title: &str) -> Result<String> {
        let title = non_empty(title, "task title")?;
        let task = MilestoneTask::new(title);
        let id = task.id.clone();
        self.tasks.push(task);
        self.repropagate();
        Ok(id)
    }

    pub fn add_separator(&mut self, title: &str) -> Result<String> {
        let title = non_empty(title, "separator title")?;
        let task = MilestoneTask::separator(title);
        let id = task.id.clone();
        self.tasks.push(task);
        Ok(id)
    }

    /// Flip a task and re-derive the milestone. Returns the task's new value.
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
        let value = task.completed;
        self.repropagate();
        Ok(value)
    }

    pub fn remove_task(&mut self, task_id: &str) -> Result<MilestoneTask> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| CoreError::not_found("task", task_id))?;
        let removed = self.tasks.remove(idx);
        self.repropagate();
        Ok(removed)
    }

    /// Manual completion. Rejected when completion is derived.
    pub fn set_completed(&mut self, completed: bool) -> Result<()> {
        if self.is_derived() {
            return Err(ValidationError::DerivedCompletion {
                milestone_id: self.id.clone(),
            }
            .into());
        }
        self.completed = completed;
        if completed {
            self.in_progress = false;
        }
        Ok(())
    }

    pub fn set_in_progress(&mut self, in_progress: bool) {
        self.in_progress = in_progress && !self.completed;
    }

    pub fn set_display_style(&mut self, style: TaskDisplayStyle) {
        self.task_display_style = style;
        self.repropagate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkbox() -> Milestone {
        Milestone::new("Launch", TaskDisplayStyle::Checkbox).unwrap()
    }

    #[test]
    fn completing_all_tasks_completes_milestone() {
        let mut m = checkbox();
        let a = m.add_task("Write copy").unwrap();
        let b = m.add_task("Ship it").unwrap();
        m.set_in_progress(true);

        m.toggle_task(&a).unwrap();
        assert!(!m.completed);
        assert!(m.in_progress);

        m.toggle_task(&b).unwrap();
        assert!(m.completed);
        assert!(!m.in_progress, "completion clears in-progress");

        m.toggle_task(&a).unwrap();
        assert!(!m.completed);
    }

    #[test]
    fn adding_a_task_to_a_completed_milestone_reopens_it() {
        let mut m = checkbox();
        let a = m.add_task("One").unwrap();
        m.toggle_task(&a).unwrap();
        assert!(m.completed);
        m.add_task("Two").unwrap();
        assert!(!m.completed);
    }

    #[test]
    fn removing_the_last_open_task_completes_milestone() {
        let mut m = checkbox();
        let a = m.add_task("One").unwrap();
        let b = m.add_task("Two").unwrap();
        m.toggle_task(&a).unwrap();
        m.remove_task(&b).unwrap();
        assert!(m.completed);
    }

    #[test]
    fn bullet_style_is_manual() {
        let mut m = Milestone::new("Notes", TaskDisplayStyle::Bullet).unwrap();
        let a = m.add_task("Point").unwrap();
        m.toggle_task(&a).unwrap();
        assert!(!m.completed);
        m.set_completed(true).unwrap();
        m.toggle_task(&a).unwrap();
        assert!(m.completed);
    }

    #[test]
    fn derived_completion_cannot_be_set_by_hand() {
        let mut m = checkbox();
        m.add_task("One").unwrap();
        let err = m.set_completed(true).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::DerivedCompletion { .. })
        ));
        assert!(!m.completed);
    }

    #[test]
    fn milestone_without_tasks_is_manual() {
        let mut m = checkbox();
        m.set_completed(true).unwrap();
        assert!(m.completed);
        m.add_separator("Phase 1").unwrap();
        assert!(!m.is_derived());
        assert!(m.completed);
    }

    #[test]
    fn switching_to_checkbox_reestablishes_invariant() {
        let mut m = Milestone::new("Mixed", TaskDisplayStyle::Bullet).unwrap();
        m.add_task("Open").unwrap();
        m.set_completed(true).unwrap();
        m.set_display_style(TaskDisplayStyle::Checkbox);
        assert!(!m.completed);
    }

    #[test]
    fn propagate_ignores_separators() {
        let mut m = checkbox();
        let a = m.add_task("Only").unwrap();
        m.add_separator("Header").unwrap();
        m.toggle_task(&a).unwrap();
        assert!(m.completed);
        assert_eq!(m.progress(), Progress { completed: 1, total: 1 });
    }

    #[test]
    fn propagate_is_pure_over_tasks() {
        let mut m = checkbox();
        m.add_task("One").unwrap();
        m.completed = true;
        let tasks_before = m.tasks.clone();
        let out = propagate(m);
        assert_eq!(out.tasks, tasks_before);
        assert!(!out.completed);
    }
}
