//! Migration of legacy service data into request parameters.
//!
//! A request coming from a legacy service carries its old data as a JSON
//! object in one designated parameter (by default `migration_info`). The
//! [`MigrationHandler`] reads that payload once and fills every other
//! parameter of a copy of the request from it.
//!
//! # Flow
//!
//! ```text
//! needs_migration? ──no──▶ original request
//!        │yes
//!        ▼
//! parse payload ──invalid──▶ MigrationAbortError
//!        │
//!        ▼
//! for each parameter (except the payload one):
//!     transformation? ─▶ succeeded / failed
//!     payload field?  ─▶ succeeded / failed (non-string, serialize off)
//!     otherwise       ─▶ skipped
//!        │
//!        ▼
//! any failed? ──yes──▶ MigrationAbortError
//!        │no
//!        ▼
//! migrated copy
//! ```
//!
//! # Usage
//!
//! ```
//! use migra_core::migration::{MigrationConfig, MigrationHandler};
//! use migra_core::request::{AssetRequest, Param};
//!
//! let request = AssetRequest::new(
//!     "PR-7001-1234-5678",
//!     "AS-146-621-424-3",
//!     vec![
//!         Param::new("email", ""),
//!         Param::new("migration_info", r#"{"email": "a@b.com"}"#),
//!     ],
//! );
//!
//! let handler = MigrationHandler::new(MigrationConfig::default());
//! let migrated = handler.migrate(&request)?;
//! assert_eq!(migrated.get_param_by_id("email").unwrap().value, "a@b.com");
//! # Ok::<(), migra_core::migration::MigrationError>(())
//! ```

mod config;
mod error;
mod handler;
mod logger;
mod outcome;
mod payload;
mod transform;

// Public API
pub use config::{DEFAULT_MIGRATION_KEY, MigrationConfig, MigrationConfigBuilder, Transformations};
pub use error::{MigrationAbortError, MigrationError, MigrationParamError, TransformError};
pub use handler::{Migrated, MigrationHandler};
pub use logger::{LOG_TARGET, LogLevel, LogRecord, MemoryLogger, MigrationLogger, TracingLogger};
pub use outcome::{OutcomeSet, ParamOutcome};
pub use payload::{Payload, encode, type_name};
pub use transform::{
    Case, ConstantTransform, FieldTransform, FnTransform, RequestIdTransform, Transformation,
    from_fn,
};
