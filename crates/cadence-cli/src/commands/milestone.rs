//! Milestone commands for CLI.

use std::error::Error;

use cadence_core::TaskDisplayStyle;
use clap::{Subcommand, ValueEnum};

use super::{print_json, Session};

#[derive(Clone, Copy, ValueEnum)]
pub enum StyleArg {
    /// Completion follows the tasks
    Checkbox,
    /// Completion is set by hand
    Bullet,
}

impl From<StyleArg> for TaskDisplayStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Checkbox => TaskDisplayStyle::Checkbox,
            StyleArg::Bullet => TaskDisplayStyle::Bullet,
        }
    }
}

#[derive(Subcommand)]
pub enum MilestoneAction {
    /// Create a milestone
    Add {
        /// Milestone title
        title: String,
        #[arg(long, value_enum, default_value = "checkbox")]
        style: StyleArg,
    },
    /// List milestones
    List,
    /// Add a task
    Task {
        /// Milestone ID
        id: String,
        /// Task title
        title: String,
    },
    /// Add a separator header
    Separator {
        /// Milestone ID
        id: String,
        /// Header text
        title: String,
    },
    /// Toggle a task's completion
    Toggle {
        /// Milestone ID
        id: String,
        /// Task ID
        task_id: String,
    },
    /// Remove a task or separator
    RemoveTask {
        /// Milestone ID
        id: String,
        /// Task ID
        task_id: String,
    },
    /// Mark complete by hand (bullet style or no tasks)
    Complete {
        /// Milestone ID
        id: String,
        /// Mark incomplete instead
        #[arg(long)]
        undo: bool,
    },
    /// Mark as in progress
    Start {
        /// Milestone ID
        id: String,
        /// Clear the in-progress flag instead
        #[arg(long)]
        stop: bool,
    },
    /// Change the task display style
    Style {
        /// Milestone ID
        id: String,
        #[arg(value_enum)]
        style: StyleArg,
    },
    /// Delete a milestone
    Delete {
        /// Milestone ID
        id: String,
    },
}

pub fn run(action: MilestoneAction) -> Result<(), Box<dyn Error>> {
    let mut session = Session::open()?;
    let store = &mut session.store;

    match action {
        MilestoneAction::Add { title, style } => {
            let id = store.add_milestone(&title, style.into())?;
            session.save()?;
            println!("Milestone created: {id}");
        }
        MilestoneAction::List => {
            print_json(&session.store.state().milestones)?;
        }
        MilestoneAction::Task { id, title } => {
            let task_id = store.add_milestone_task(&id, &title)?;
            session.save()?;
            println!("Task added: {task_id}");
        }
        MilestoneAction::Separator { id, title } => {
            let task_id = store.add_milestone_separator(&id, &title)?;
            session.save()?;
            println!("Separator added: {task_id}");
        }
        MilestoneAction::Toggle { id, task_id } => {
            store.toggle_milestone_task(&id, &task_id)?;
            session.save()?;
            if let Some(milestone) = session.store.milestone(&id) {
                print_json(milestone)?;
            }
        }
        MilestoneAction::RemoveTask { id, task_id } => {
            store.remove_milestone_task(&id, &task_id)?;
            session.save()?;
            println!("Task removed");
        }
        MilestoneAction::Complete { id, undo } => {
            store.set_milestone_completed(&id, !undo)?;
            session.save()?;
            println!("completed: {}", !undo);
        }
        MilestoneAction::Start { id, stop } => {
            store.set_milestone_in_progress(&id, !stop)?;
            session.save()?;
            println!("in progress: {}", !stop);
        }
        MilestoneAction::Style { id, style } => {
            store.set_milestone_style(&id, style.into())?;
            session.save()?;
            println!("Style updated");
        }
        MilestoneAction::Delete { id } => {
            let removed = store.delete_milestone(&id)?;
            session.save()?;
            println!("Milestone deleted: {}", removed.title);
        }
    }
    Ok(())
}
