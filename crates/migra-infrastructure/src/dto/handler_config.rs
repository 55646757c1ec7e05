//! Handler configuration DTOs and migrations
//!
//! The handler configuration file (handler.toml) describes the handler
//! settings declaratively, in the flat versioned layout:
//!
//! ```toml
//! version = "1.0.0"
//! migration_key = "migration_info"
//! serialize = false
//!
//! [transformations.email]
//! kind = "field"
//! source = "teamAdminEmail"
//! case = "upper"
//! ```
//!
//! - V1.0.0: Initial version (field, constant and request_id transformations)

use migra_core::config::{HandlerSettings, TransformationRule};
use migra_core::error::Result;
use migra_core::migration::{Case, DEFAULT_MIGRATION_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use version_migrate::{IntoDomain, Migrator, Versioned};

/// Entity name of the handler configuration in the migrator.
pub const HANDLER_CONFIG_ENTITY: &str = "handler_config";

/// Version assumed for files written without a `version` key.
pub const HANDLER_CONFIG_VERSION: &str = "1.0.0";

/// Declarative form of one transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformationDto {
    Field {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        case: Option<Case>,
    },
    Constant {
        value: String,
    },
    RequestId,
}

/// Handler configuration V1.0.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
pub struct HandlerConfigV1_0_0 {
    /// Id of the parameter holding the legacy payload.
    #[serde(default = "default_migration_key")]
    pub migration_key: String,

    /// JSON-encode non-string payload values on direct assignment.
    #[serde(default)]
    pub serialize: bool,

    /// Transformations keyed by parameter id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub transformations: BTreeMap<String, TransformationDto>,
}

/// Type alias for the latest HandlerConfig version.
pub type HandlerConfig = HandlerConfigV1_0_0;

fn default_migration_key() -> String {
    DEFAULT_MIGRATION_KEY.to_string()
}

impl Default for HandlerConfigV1_0_0 {
    fn default() -> Self {
        Self {
            migration_key: default_migration_key(),
            serialize: false,
            transformations: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

impl From<TransformationDto> for TransformationRule {
    fn from(dto: TransformationDto) -> Self {
        match dto {
            TransformationDto::Field { source, case } => TransformationRule::Field { source, case },
            TransformationDto::Constant { value } => TransformationRule::Constant { value },
            TransformationDto::RequestId => TransformationRule::RequestId,
        }
    }
}

impl IntoDomain<HandlerSettings> for HandlerConfigV1_0_0 {
    fn into_domain(self) -> HandlerSettings {
        HandlerSettings {
            migration_key: self.migration_key,
            serialize: self.serialize,
            transformations: self
                .transformations
                .into_iter()
                .map(|(param_id, dto)| (param_id, dto.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates the Migrator for handler configuration files.
///
/// # Migration Path
///
/// - V1.0.0 → HandlerSettings: Converts DTO to domain model
pub fn create_handler_config_migrator() -> Result<Migrator> {
    let mut migrator = Migrator::builder().build();

    let handler_config_path = Migrator::define(HANDLER_CONFIG_ENTITY)
        .from::<HandlerConfigV1_0_0>()
        .into::<HandlerSettings>();

    migrator.register(handler_config_path)?;

    Ok(migrator)
}
