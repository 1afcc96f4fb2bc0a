use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "thermalog-cli", version, about = "Thermalog CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a new session
    Log(commands::log::LogArgs),
    /// Session ledger management
    Sessions {
        #[command(subcommand)]
        action: commands::sessions::SessionsAction,
    },
    /// Aggregate statistics
    Stats,
    /// Current and longest streak
    Streak,
    /// Goal management
    Goals {
        #[command(subcommand)]
        action: commands::goals::GoalsAction,
    },
    /// Challenge management
    Challenges {
        #[command(subcommand)]
        action: commands::challenges::ChallengesAction,
    },
    /// Achievement catalog and progress
    Achievements {
        /// Only show unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
    /// Glanceable summary snapshot
    Summary,
    /// Companion sync status
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Log(args) => commands::log::run(args),
        Commands::Sessions { action } => commands::sessions::run(action),
        Commands::Stats => commands::stats::run(),
        Commands::Streak => commands::stats::run_streak(),
        Commands::Goals { action } => commands::goals::run(action),
        Commands::Challenges { action } => commands::challenges::run(action),
        Commands::Achievements { unlocked } => commands::achievements::run(unlocked),
        Commands::Summary => commands::stats::run_summary(),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
