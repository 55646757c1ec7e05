use anyhow::{Context, Result};
use migra_core::migration::{MigrationError, MigrationHandler};
use migra_core::request::{AssetRequest, RequestRepository};
use migra_infrastructure::{ConfigService, JsonRequestRepository, MigrationEvent};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;

pub struct RunOptions {
    pub requests: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub migrated: usize,
    pub unchanged: usize,
    pub aborted: usize,
}

/// Migrates every request of the input file.
///
/// Aborted requests are reported and written out unmodified. A faulting
/// transformation stops the run.
pub fn execute(options: &RunOptions) -> Result<RunSummary> {
    let repo = JsonRequestRepository::with_path(&options.requests);
    let requests = repo
        .load_all()
        .with_context(|| format!("Failed to load requests from {}", options.requests.display()))?;

    let config_service = match &options.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let config = config_service
        .get_config()
        .context("Failed to load handler configuration")?;

    let (migrated, summary) = migrate_all(&MigrationHandler::new(config), &requests)?;

    match &options.output {
        Some(path) => JsonRequestRepository::with_path(path)
            .with_single_object(repo.is_single_object())
            .save_all(&migrated)?,
        None => {
            let json = match migrated.as_slice() {
                [request] if repo.is_single_object() => serde_json::to_string_pretty(request)?,
                _ => serde_json::to_string_pretty(&migrated)?,
            };
            println!("{}", json);
        }
    }

    Ok(summary)
}

fn migrate_all(
    handler: &MigrationHandler,
    requests: &[AssetRequest],
) -> Result<(Vec<AssetRequest>, RunSummary)> {
    let mut summary = RunSummary::default();
    let mut migrated = Vec::with_capacity(requests.len());

    for request in requests {
        match handler.migrate_with_outcome(request) {
            Ok(Some(result)) => {
                summary.migrated += 1;
                migrated.push(result.request);
            }
            Ok(None) => {
                summary.unchanged += 1;
                migrated.push(request.clone());
            }
            Err(MigrationError::Abort(abort)) => {
                tracing::warn!("Request {} was not migrated: {}", request.id, abort);
                summary.aborted += 1;
                migrated.push(request.clone());
            }
            Err(fault) => {
                return Err(anyhow::Error::new(fault)
                    .context(format!("Migration of request {} faulted", request.id)));
            }
        }
    }

    Ok((migrated, summary))
}

/// Drains captured migration events into `path` as JSON lines.
pub fn write_events(path: &Path, mut receiver: UnboundedReceiver<MigrationEvent>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create events file {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    while let Ok(event) = receiver.try_recv() {
        serde_json::to_writer(&mut writer, &event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}
