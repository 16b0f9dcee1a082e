//! CLI entry and dispatch.

use anyhow::{Context, Result};
use byte_core::config;
use byte_core::item::BucketKind;
use byte_core::logging;
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "byte")]
#[command(version)]
#[command(about = "Collect posts and events into the weekly digest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Load the feeds and list their items
    Fetch {
        /// Only list this bucket (posts, events, external-events)
        #[arg(short, long)]
        kind: Option<BucketKind>,
    },
    /// Select items and send them as one digest
    Send {
        /// Item to include, as KIND:ID or KIND:#POSITION (repeatable)
        #[arg(short, long = "select", value_name = "KIND:ID", required = true)]
        select: Vec<String>,

        /// Print the digest payload instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage UI preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum PrefsCommands {
    /// Show the path to the preferences file
    Path,
    /// Print a preference (view_mode, last_section)
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Store a preference
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Fetch { kind } => {
            let config = load_config()?;
            commands::fetch::run(&config, kind).await
        }
        Commands::Send { select, dry_run } => {
            let config = load_config()?;
            commands::send::run(&config, &select, dry_run).await
        }
        Commands::Prefs { command } => match command {
            PrefsCommands::Path => {
                commands::prefs::path();
                Ok(())
            }
            PrefsCommands::Get { key } => commands::prefs::get(&key),
            PrefsCommands::Set { key, value } => commands::prefs::set(&key, &value),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

/// Loads config and starts logging; only commands that talk to the backend need it.
fn load_config() -> Result<config::Config> {
    let config = config::Config::load().context("load config")?;
    logging::init(&config.logging).context("init logging")?;
    Ok(config)
}
