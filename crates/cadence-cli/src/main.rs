use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(name = "cadence", version, about = "Cadence: recurring checklists with momentum")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recurring cycle groups
    Group {
        #[command(subcommand)]
        action: commands::group::GroupAction,
    },
    /// One-shot milestones
    Milestone {
        #[command(subcommand)]
        action: commands::milestone::MilestoneAction,
    },
    /// Today's list
    Daily {
        #[command(subcommand)]
        action: commands::daily::DailyAction,
    },
    /// Apply due resets and the midnight rollover
    Tick,
    /// Keep running, ticking on an interval with debounced writes
    Watch {
        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let config = cadence_core::Config::load_or_default();
        tracing_subscriber::EnvFilter::new(config.logging.filter)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Group { action } => commands::group::run(action),
        Commands::Milestone { action } => commands::milestone::run(action),
        Commands::Daily { action } => commands::daily::run(action),
        Commands::Tick => commands::tick::run(),
        Commands::Watch { ticks } => commands::tick::watch(ticks),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
