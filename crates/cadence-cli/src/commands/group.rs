//! Cycle group commands for CLI.

use std::error::Error;

use cadence_core::{NewGroup, Recurrence};
use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;

use super::{print_json, Session};

#[derive(Subcommand)]
pub enum GroupAction {
    /// Create a new group
    Add {
        /// Group name
        name: String,
        /// daily, weekly or monthly
        #[arg(long, default_value = "daily")]
        recurrence: Recurrence,
        /// Weekday 0-6 (Sunday = 0) for weekly, day of month 1-31 for monthly
        #[arg(long)]
        anchor: Option<u8>,
        /// First active day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// List groups
    List,
    /// Show a group with its schedule and momentum
    Show {
        /// Group ID
        id: String,
    },
    /// Rename a group
    Rename {
        /// Group ID
        id: String,
        /// New name
        name: String,
    },
    /// Add a task to a group
    Task {
        /// Group ID
        id: String,
        /// Task title
        title: String,
    },
    /// Add a separator header to a group
    Separator {
        /// Group ID
        id: String,
        /// Header text
        title: String,
    },
    /// Toggle a task's completion
    Toggle {
        /// Group ID
        id: String,
        /// Task ID
        task_id: String,
    },
    /// Remove a task or separator
    RemoveTask {
        /// Group ID
        id: String,
        /// Task ID
        task_id: String,
    },
    /// Clear all tasks now without affecting the score
    Reset {
        /// Group ID
        id: String,
    },
    /// Change recurrence and anchor
    Schedule {
        /// Group ID
        id: String,
        /// daily, weekly or monthly
        recurrence: Recurrence,
        /// Weekday 0-6 for weekly, day of month 1-31 for monthly; omit for a rolling window
        #[arg(long)]
        anchor: Option<u8>,
    },
    /// Delete a group
    Delete {
        /// Group ID
        id: String,
    },
    /// Show the next reset date
    Next {
        /// Group ID
        id: String,
    },
}

pub fn run(action: GroupAction) -> Result<(), Box<dyn Error>> {
    let mut session = Session::open()?;
    let store = &mut session.store;

    match action {
        GroupAction::Add {
            name,
            recurrence,
            anchor,
            start,
        } => {
            let id = store.add_group(NewGroup {
                name,
                recurrence,
                cycle_start_day: anchor,
                start_date: start,
            })?;
            session.save()?;
            println!("Group created: {id}");
        }
        GroupAction::List => {
            print_json(&session.store.state().groups)?;
        }
        GroupAction::Show { id } => {
            let group = session
                .store
                .group(&id)
                .ok_or_else(|| format!("group not found: {id}"))?;
            let momentum = group.momentum();
            let summary = json!({
                "group": group,
                "progress": group.progress(),
                "is_due": session.store.is_due(&id)?,
                "next_reset": session.store.next_occurrence(&id)?,
                "momentum": momentum,
                "momentum_description": momentum.description(),
            });
            print_json(&summary)?;
        }
        GroupAction::Rename { id, name } => {
            store.rename_group(&id, &name)?;
            session.save()?;
            println!("Group renamed");
        }
        GroupAction::Task { id, title } => {
            let task_id = store.add_group_task(&id, &title)?;
            session.save()?;
            println!("Task added: {task_id}");
        }
        GroupAction::Separator { id, title } => {
            let task_id = store.add_group_separator(&id, &title)?;
            session.save()?;
            println!("Separator added: {task_id}");
        }
        GroupAction::Toggle { id, task_id } => {
            let completed = store.toggle_group_task(&id, &task_id)?;
            session.save()?;
            println!("completed: {completed}");
        }
        GroupAction::RemoveTask { id, task_id } => {
            store.remove_group_task(&id, &task_id)?;
            session.save()?;
            println!("Task removed");
        }
        GroupAction::Reset { id } => {
            let outcome = store.manual_reset(&id)?;
            session.save()?;
            print_json(&outcome)?;
        }
        GroupAction::Schedule {
            id,
            recurrence,
            anchor,
        } => {
            store.set_schedule(&id, recurrence, anchor)?;
            session.save()?;
            println!("Schedule updated");
        }
        GroupAction::Delete { id } => {
            let removed = store.delete_group(&id)?;
            session.save()?;
            println!("Group deleted: {}", removed.name);
        }
        GroupAction::Next { id } => {
            print_json(&session.store.next_occurrence(&id)?)?;
        }
    }
    Ok(())
}
