use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Log filter variable; falls back to `warn`.
const LOG_ENV: &str = "CLEARWATCH_LOG";

#[derive(Parser)]
#[command(name = "clearwatch", version, about = "Clearwatch activity timer and clear tracker")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preference management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// List grouped raids and dungeons with their selector keys
    Groups(commands::groups::GroupsArgs),
    /// Count and average clears in a history file
    Stats(commands::stats::StatsArgs),
    /// Feed recorded poller frames through the timer and monitor
    Replay(commands::replay::ReplayArgs),
    /// Poll a snapshot file and print live timer state
    Watch(commands::watch::WatchArgs),
    /// Generate shell completions
    Completions(commands::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Groups(args) => commands::groups::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
