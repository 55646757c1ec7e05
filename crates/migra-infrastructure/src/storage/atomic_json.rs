//! Whole-file JSON persistence with atomic replacement.
//!
//! A migrated export is either fully written or not written at all: data
//! goes to a hidden sibling file, is synced, and is then renamed over the
//! target while an exclusive `fs2` lock on `<name>.lock` is held.

use fs2::FileExt;
use migra_core::MigraError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicJsonError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AtomicJsonError> for MigraError {
    fn from(err: AtomicJsonError) -> Self {
        match err {
            AtomicJsonError::Io { .. } => MigraError::io(err.to_string()),
            AtomicJsonError::Json { .. } => MigraError::serialization("JSON", err),
        }
    }
}

/// A typed JSON file replaced atomically on every save.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _data: PhantomData<fn() -> T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _data: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. A missing or blank file reads as `None`.
    pub fn load(&self) -> Result<Option<T>, AtomicJsonError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicJsonError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes `data` as pretty JSON with a trailing newline.
    pub fn save(&self, data: &T) -> Result<(), AtomicJsonError> {
        let mut json = serde_json::to_string_pretty(data).map_err(|source| {
            AtomicJsonError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        json.push('\n');

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }

        let lock_path = self.sibling("lock");
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| self.io_error(e))?;
        lock.lock_exclusive().map_err(|e| self.io_error(e))?;

        let result = self.replace_with(json.as_bytes());

        drop(lock);
        let _ = fs::remove_file(&lock_path);
        result
    }

    fn replace_with(&self, bytes: &[u8]) -> Result<(), AtomicJsonError> {
        let tmp_path = self.sibling("tmp");
        let mut tmp = File::create(&tmp_path).map_err(|e| self.io_error(e))?;
        tmp.write_all(bytes).map_err(|e| self.io_error(e))?;
        tmp.sync_all().map_err(|e| self.io_error(e))?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error(e))
    }

    /// `dir/.name.<suffix>` next to the target file.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{}.{}", name, suffix))
    }

    fn io_error(&self, source: std::io::Error) -> AtomicJsonError {
        AtomicJsonError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
