//! The error type shared by repositories, configuration loading and the CLI.
//!
//! The migration engine keeps its own typed errors (see
//! [`crate::migration`]); they convert into [`MigraError::Migration`] when
//! they cross into this layer.

use crate::migration::{MigrationAbortError, MigrationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MigraError {
    #[error("{entity_type} not found: '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("IO error: {message}")]
    Io { message: String },

    /// `format` names the data format involved ("JSON", "TOML", ...).
    #[error("{format} error: {message}")]
    Serialization { format: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MigraError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn serialization(format: &str, err: impl std::fmt::Display) -> Self {
        Self::Serialization {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    pub fn is_migration(&self) -> bool {
        matches!(self, Self::Migration(_))
    }
}

impl From<std::io::Error> for MigraError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for MigraError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err)
    }
}

impl From<toml::de::Error> for MigraError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

impl From<toml::ser::Error> for MigraError {
    fn from(err: toml::ser::Error) -> Self {
        Self::serialization("TOML", err)
    }
}

/// Schema migration of a stored file (not the legacy data migration).
impl From<version_migrate::MigrationError> for MigraError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::EntityNotFound(id) => Self::not_found("schema entity", id),
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::serialization("schema", err)
            }
            MigrationError::TomlParseError(_) | MigrationError::TomlSerializeError(_) => {
                Self::serialization("TOML", err)
            }
            MigrationError::IoError { .. } => Self::io(err.to_string()),
            _ => Self::config(err.to_string()),
        }
    }
}

impl From<MigrationAbortError> for MigraError {
    fn from(err: MigrationAbortError) -> Self {
        Self::migration(err.to_string())
    }
}

impl From<MigrationError> for MigraError {
    fn from(err: MigrationError) -> Self {
        Self::migration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MigraError>;
