//! Daily list commands for CLI.

use std::error::Error;

use clap::Subcommand;

use super::{print_json, Session};

#[derive(Subcommand)]
pub enum DailyAction {
    /// Show today's list
    List,
    /// Add a todo for today (carried over until done)
    Todo {
        /// Todo title
        title: String,
    },
    /// Toggle a todo
    ToggleTodo {
        /// Todo ID
        id: String,
    },
    /// Pin an item to the top of the list
    Pin {
        /// Item title
        title: String,
    },
    /// Toggle a pinned item
    TogglePin {
        /// Pinned item ID
        id: String,
    },
    /// Add an item that shows on chosen weekdays
    Recurring {
        /// Item title
        title: String,
        /// Comma-separated weekdays, Sunday = 0 (e.g. 1,3,5)
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<u8>,
    },
    /// Toggle today's occurrence of a recurring item
    ToggleRecurring {
        /// Recurring item ID
        id: String,
    },
    /// Hide today's occurrence of a recurring item
    Skip {
        /// Recurring item ID
        id: String,
    },
    /// Remove any daily item
    Remove {
        /// Item ID
        id: String,
    },
}

pub fn run(action: DailyAction) -> Result<(), Box<dyn Error>> {
    let mut session = Session::open()?;
    let store = &mut session.store;

    match action {
        DailyAction::List => {
            print_json(&session.store.daily_view())?;
        }
        DailyAction::Todo { title } => {
            let id = store.add_todo(&title)?;
            session.save()?;
            println!("Todo added: {id}");
        }
        DailyAction::ToggleTodo { id } => {
            let completed = store.toggle_todo(&id)?;
            session.save()?;
            println!("completed: {completed}");
        }
        DailyAction::Pin { title } => {
            let id = store.add_pinned(&title)?;
            session.save()?;
            println!("Pinned: {id}");
        }
        DailyAction::TogglePin { id } => {
            let completed = store.toggle_pinned(&id)?;
            session.save()?;
            println!("completed: {completed}");
        }
        DailyAction::Recurring { title, days } => {
            let id = store.add_recurring(&title, &days)?;
            session.save()?;
            println!("Recurring item added: {id}");
        }
        DailyAction::ToggleRecurring { id } => {
            let completed = store.toggle_recurring(&id)?;
            session.save()?;
            println!("completed: {completed}");
        }
        DailyAction::Skip { id } => {
            store.skip_recurring(&id)?;
            session.save()?;
            println!("Skipped for today");
        }
        DailyAction::Remove { id } => {
            let daily = &store.state().daily;
            if daily.todos.iter().any(|t| t.id == id) {
                store.remove_todo(&id)?;
            } else if daily.pinned.iter().any(|p| p.id == id) {
                store.remove_pinned(&id)?;
            } else {
                store.remove_recurring(&id)?;
            }
            session.save()?;
            println!("Removed");
        }
    }
    Ok(())
}
