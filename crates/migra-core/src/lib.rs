//! Core domain of Migra: the request model and the legacy data migration
//! engine. This crate performs no I/O; see `migra-infrastructure` for
//! configuration files and request storage.

pub mod config;
pub mod error;
pub mod migration;
pub mod request;

// Re-export common error type
pub use config::HandlerSettings;
pub use error::MigraError;
pub use migration::{MigrationConfig, MigrationHandler};
pub use request::{AssetRequest, MigratableRequest, Param};
