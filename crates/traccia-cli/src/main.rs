mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::{
    alerts::AlertsSubcommand, config::ConfigSubcommand, rules::RulesSubcommand,
    settings::SettingsSubcommand, sync::SyncSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "traccia",
    about = "Certification expiry alerts and HR directory sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, global = true, env = "TRACCIA_CONFIG", default_value = "traccia.yaml")]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Serve,

    /// Certification expiry alerts
    Alerts {
        #[command(subcommand)]
        subcommand: AlertsSubcommand,
    },

    /// Employee directory reconciliation
    Sync {
        #[command(subcommand)]
        subcommand: SyncSubcommand,
    },

    /// Manage alert rules
    Rules {
        #[command(subcommand)]
        subcommand: RulesSubcommand,
    },

    /// Manage runtime settings overrides
    Settings {
        #[command(subcommand)]
        subcommand: SettingsSubcommand,
    },

    /// Inspect the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    let filter =
        tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into());
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let config = cli.config.as_path();

    let result = match cli.command {
        Commands::Serve => cmd::serve::run(config),
        Commands::Alerts { subcommand } => cmd::alerts::run(config, subcommand, cli.json),
        Commands::Sync { subcommand } => cmd::sync::run(config, subcommand, cli.json),
        Commands::Rules { subcommand } => cmd::rules::run(config, subcommand, cli.json),
        Commands::Settings { subcommand } => cmd::settings::run(config, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(config, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
