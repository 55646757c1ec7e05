//! JSON file-based request repository.
//!
//! Reads request exports in either of the two shapes the request API
//! produces: a single request object, or an array of requests.

use crate::storage::AtomicJsonFile;
use migra_core::error::{MigraError, Result};
use migra_core::request::{AssetRequest, RequestRepository};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// On-disk shape of a request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<AssetRequest>),
    One(Box<AssetRequest>),
}

/// A repository that stores requests in a JSON file.
///
/// Saving keeps the shape of the last loaded file: a file that held a
/// single request object is written back as a single object.
pub struct JsonRequestRepository {
    file: AtomicJsonFile<RequestFile>,
    single: AtomicBool,
}

impl JsonRequestRepository {
    /// Creates a repository over the file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicJsonFile::new(path.into()),
            single: AtomicBool::new(false),
        }
    }

    /// Makes saves of a single request write a bare object, as if a
    /// single-object file had been loaded.
    pub fn with_single_object(self, single: bool) -> Self {
        self.single.store(single, Ordering::Relaxed);
        self
    }

    /// Whether the last loaded file held a single request object.
    pub fn is_single_object(&self) -> bool {
        self.single.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Finds a request by id.
    pub fn find_by_id(&self, id: &str) -> Result<AssetRequest> {
        self.load_all()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MigraError::not_found("request", id))
    }
}

impl RequestRepository for JsonRequestRepository {
    fn load_all(&self) -> Result<Vec<AssetRequest>> {
        let loaded = self
            .file
            .load()?
            .ok_or_else(|| MigraError::not_found("request file", self.path().display().to_string()))?;

        let requests = match loaded {
            RequestFile::Many(requests) => {
                self.single.store(false, Ordering::Relaxed);
                requests
            }
            RequestFile::One(request) => {
                self.single.store(true, Ordering::Relaxed);
                vec![*request]
            }
        };

        tracing::debug!(
            "Loaded {} request(s) from {}",
            requests.len(),
            self.path().display()
        );
        Ok(requests)
    }

    fn save_all(&self, requests: &[AssetRequest]) -> Result<()> {
        let data = match requests {
            [request] if self.is_single_object() => {
                RequestFile::One(Box::new(request.clone()))
            }
            _ => RequestFile::Many(requests.to_vec()),
        };

        self.file.save(&data)?;
        tracing::debug!(
            "Saved {} request(s) to {}",
            requests.len(),
            self.path().display()
        );
        Ok(())
    }
}
