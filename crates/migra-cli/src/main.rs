use anyhow::Result;
use clap::{Parser, Subcommand};
use migra_core::migration::DEFAULT_MIGRATION_KEY;
use migra_infrastructure::MigrationEventLayer;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

mod commands;

#[derive(Parser)]
#[command(name = "migra")]
#[command(about = "MIGRA CLI - migrate legacy service data embedded in requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which requests carry legacy data to migrate
    Check {
        /// JSON file with one request or an array of requests
        requests: PathBuf,
        /// Id of the parameter holding the legacy data
        #[arg(long, default_value = DEFAULT_MIGRATION_KEY)]
        key: String,
    },
    /// Migrate every request in a file
    Run {
        /// JSON file with one request or an array of requests
        requests: PathBuf,
        /// Handler configuration (defaults to ~/.config/migra/handler.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to write the migrated requests (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write every migration log event to this file as JSON lines
        #[arg(long)]
        events: Option<PathBuf>,
    },
}

/// Installs the stderr logger, plus the event capture layer when requested.
fn init_tracing(events: Option<MigrationEventLayer>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .with(events)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { requests, key } => {
            init_tracing(None);
            commands::check::execute(&requests, &key)?;
        }
        Commands::Run {
            requests,
            config,
            output,
            events,
        } => {
            let (layer, receiver) = if events.is_some() {
                let (layer, receiver) = MigrationEventLayer::channel();
                (Some(layer), Some(receiver))
            } else {
                (None, None)
            };
            init_tracing(layer);

            let options = commands::run::RunOptions {
                requests,
                config,
                output,
            };
            let summary = commands::run::execute(&options)?;

            if let (Some(path), Some(receiver)) = (events, receiver) {
                commands::run::write_events(&path, receiver)?;
            }

            tracing::info!(
                "{} migrated, {} unchanged, {} aborted",
                summary.migrated,
                summary.unchanged,
                summary.aborted
            );
            if summary.aborted > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
