use anyhow::{Context, Result};
use migra_core::request::RequestRepository;
use migra_infrastructure::JsonRequestRepository;
use std::path::Path;

/// Prints one line per request: its id and whether it needs migration.
pub fn execute(requests: &Path, key: &str) -> Result<()> {
    let repo = JsonRequestRepository::with_path(requests);
    let requests = repo
        .load_all()
        .with_context(|| format!("Failed to load requests from {}", requests.display()))?;

    for request in &requests {
        let status = if request.needs_migration(key) {
            "needs migration"
        } else {
            "up to date"
        };
        println!("{}\t{}", request.id, status);
    }

    Ok(())
}
