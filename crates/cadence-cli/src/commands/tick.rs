//! Tick and watch commands.

use std::error::Error;
use std::sync::Arc;

use cadence_core::{Config, Database, DebouncedWriter, Event, Store, SystemClock};
use tracing::info;

use super::{print_json, Session};

/// Run one tick and print what it changed.
pub fn run() -> Result<(), Box<dyn Error>> {
    let session = Session::open()?;
    print_json(&session.tick)
}

/// Long-lived session: tick on an interval and let the debounced writer
/// persist snapshots. Exits on Ctrl-C or after `ticks` ticks.
pub fn watch(ticks: Option<u64>) -> Result<(), Box<dyn Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(config, ticks))
}

async fn watch_loop(config: Config, ticks: Option<u64>) -> Result<(), Box<dyn Error>> {
    let db = Arc::new(Database::open()?);
    let mut store = Store::open(db.as_ref(), Arc::new(SystemClock));
    let writer = DebouncedWriter::new(db.clone(), config.debounce()).spawn(store.subscribe());

    let mut interval = tokio::time::interval(config.tick_interval());
    let mut remaining = ticks;
    info!(interval = ?config.tick_interval(), "watching");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let report = store.tick();
                for event in store.drain_events() {
                    log_event(&event);
                }
                if report.changed_anything() {
                    print_json(&report)?;
                }
                if let Some(left) = remaining.as_mut() {
                    *left = left.saturating_sub(1);
                    if *left == 0 {
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    drop(store);
    let stats = writer.await?;
    info!(?stats, "watch stopped");
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::CycleReset { reset } => info!(
            group = %reset.group_name,
            completed = reset.was_fully_completed,
            score = reset.score_after,
            "cycle reset"
        ),
        Event::DailyRolledOver { report } => info!(
            day = %report.current_day_key,
            dropped_todos = report.dropped_todos,
            dropped_pinned = report.dropped_pinned,
            "daily list rolled over"
        ),
        other => info!(?other, "event"),
    }
}
