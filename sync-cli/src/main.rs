//! # breathsync
//!
//! Command-line front end for breathsync offline-first sync.
//!
//! ## Commands
//!
//! - `record`: Record a finished breathing session
//! - `list`: List recent sessions, queued ones included
//! - `settings show` / `settings set`: Read or change profile settings
//! - `flush`: Push queued work to the backend
//! - `status`: Show pending work and backend health
//! - `wipe`: Remove local data for the current user
//!
//! ## Example
//!
//! ```bash
//! export BREATHSYNC_REMOTE_URL=https://project.example.co
//! export BREATHSYNC_ANON_KEY=...
//! export BREATHSYNC_ACCESS_TOKEN=...
//!
//! # Record while offline (the user is remembered from earlier online runs)
//! breathsync --offline record --label "Reduce Anxiety" --protocol 4-6-breathing --duration 145 --hr 8
//!
//! # Later, online
//! breathsync flush
//! breathsync list
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sync_client::{connect, ConnectionStatus};
use sync_types::NewSession;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{flush, list, record, settings, status, wipe, AppContext};

/// Command-line front end for breathsync offline-first sync.
#[derive(Parser, Debug)]
#[command(name = "breathsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the local store and saved user
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to breathsync.toml in the data directory)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Treat the network as unavailable
    #[arg(long, global = true)]
    offline: bool,

    /// Owner id to use when the backend cannot be asked
    #[arg(long, global = true)]
    user: Option<String>,

    /// Show debug logs
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Record a finished breathing session
    Record {
        /// Goal label, e.g. "Reduce Anxiety"
        #[arg(long, short)]
        label: String,

        /// Breathing protocol, e.g. "4-6-breathing"
        #[arg(long, short)]
        protocol: String,

        /// Duration in seconds
        #[arg(long, short)]
        duration: u32,

        /// The session was stopped before the end
        #[arg(long)]
        incomplete: bool,

        /// Estimated heart-rate reduction in bpm
        #[arg(long, default_value = "0")]
        hr: u32,
    },

    /// List recent sessions
    List {
        /// Maximum number of sessions to show
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Read or change profile settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Push queued sessions and settings
    Flush,

    /// Show pending work and backend health
    Status,

    /// Remove local data for the current user
    Wipe {
        /// Confirm discarding unsynced data
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Show the effective settings
    Show,

    /// Change settings
    Set {
        /// Session reminders (on/off)
        #[arg(long, value_parser = settings::parse_switch)]
        notifications: Option<bool>,

        /// Heart-rate tracking (on/off)
        #[arg(long, value_parser = settings::parse_switch)]
        heart_rate: Option<bool>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,breathsync_client=debug,breathsync_cli=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,breathsync_client=info,breathsync_cli=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config::default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    let client_config = config::load_client_config(&data_dir, cli.config.as_deref())?;
    tracing::debug!(data_dir = %data_dir.display(), backend = ?client_config.storage.backend, "starting");

    if let Commands::Status = cli.command {
        if let Err(e) = connect(&client_config.remote) {
            status::print_health(&ConnectionStatus::unconfigured(&e));
            return Ok(());
        }
    }

    let ctx = AppContext::open(&data_dir, &client_config, cli.offline, cli.user.as_deref()).await?;

    match cli.command {
        Commands::Record {
            label,
            protocol,
            duration,
            incomplete,
            hr,
        } => {
            let session = NewSession::new(&label, &protocol, duration)
                .with_completed(!incomplete)
                .with_hr_reduction(hr);
            record::run(&ctx, &session).await?;
        }
        Commands::List { limit } => {
            let limit = limit.unwrap_or(client_config.sync.page_size);
            list::run(&ctx, limit).await?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::Show => {
                settings::show(&ctx).await?;
            }
            SettingsAction::Set {
                notifications,
                heart_rate,
            } => {
                settings::set(&ctx, notifications, heart_rate).await?;
            }
        },
        Commands::Flush => {
            flush::run(&ctx).await?;
        }
        Commands::Status => {
            status::run(&ctx).await?;
        }
        Commands::Wipe { yes } => {
            if !yes {
                anyhow::bail!("This discards unsynced sessions and settings. Re-run with --yes.");
            }
            wipe::run(&ctx).await?;
        }
    }

    Ok(())
}
