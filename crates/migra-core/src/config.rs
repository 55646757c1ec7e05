//! Declarative handler settings.
//!
//! [`HandlerSettings`] is the serializable description of a
//! [`MigrationConfig`]: plain data that configuration files migrate into,
//! turned into a runnable configuration with `MigrationConfig::try_from`.

use crate::error::{MigraError, Result};
use crate::migration::{
    Case, ConstantTransform, DEFAULT_MIGRATION_KEY, FieldTransform, MigrationConfig,
    RequestIdTransform, Transformation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One of the built-in transformations, described as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformationRule {
    /// Copy a payload field (top-level key or JSON pointer).
    Field {
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        case: Option<Case>,
    },
    /// Always the same value.
    Constant { value: String },
    /// The id of the request being migrated.
    RequestId,
}

impl TransformationRule {
    /// Builds the transformation this rule describes.
    pub fn build(self) -> Arc<dyn Transformation> {
        match self {
            TransformationRule::Field { source, case } => {
                let field = FieldTransform::new(source);
                match case {
                    Some(case) => Arc::new(field.with_case(case)),
                    None => Arc::new(field),
                }
            }
            TransformationRule::Constant { value } => Arc::new(ConstantTransform::new(value)),
            TransformationRule::RequestId => Arc::new(RequestIdTransform),
        }
    }
}

/// Settings of a migration handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSettings {
    pub migration_key: String,
    pub serialize: bool,
    /// Rules keyed by the id of the parameter they produce.
    #[serde(default)]
    pub transformations: BTreeMap<String, TransformationRule>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            migration_key: DEFAULT_MIGRATION_KEY.to_string(),
            serialize: false,
            transformations: BTreeMap::new(),
        }
    }
}

impl TryFrom<HandlerSettings> for MigrationConfig {
    type Error = MigraError;

    fn try_from(settings: HandlerSettings) -> Result<Self> {
        if settings.migration_key.trim().is_empty() {
            return Err(MigraError::config("migration_key must not be empty"));
        }

        let builder = MigrationConfig::builder()
            .migration_key(settings.migration_key)
            .serialize(settings.serialize);

        let builder = settings
            .transformations
            .into_iter()
            .fold(builder, |builder, (param_id, rule)| {
                builder.shared_transformation(param_id, rule.build())
            });

        Ok(builder.build())
    }
}
