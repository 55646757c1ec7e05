//! Immutable configuration of a [`MigrationHandler`](super::MigrationHandler).

use super::transform::Transformation;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Id of the parameter holding the legacy payload unless configured otherwise.
pub const DEFAULT_MIGRATION_KEY: &str = "migration_info";

/// Transformations keyed by the id of the parameter they produce.
pub type Transformations = BTreeMap<String, Arc<dyn Transformation>>;

/// Configuration of a migration handler.
///
/// Built once through [`MigrationConfig::builder`] and read-only afterwards,
/// so it can be shared freely between threads.
#[derive(Clone)]
pub struct MigrationConfig {
    transformations: Transformations,
    migration_key: String,
    serialize: bool,
}

impl MigrationConfig {
    /// Creates a new builder for constructing a `MigrationConfig`.
    pub fn builder() -> MigrationConfigBuilder {
        MigrationConfigBuilder::new()
    }

    /// The registered transformations.
    pub fn transformations(&self) -> &Transformations {
        &self.transformations
    }

    /// The transformation registered for `param_id`, if any.
    pub fn transformation(&self, param_id: &str) -> Option<&Arc<dyn Transformation>> {
        self.transformations.get(param_id)
    }

    /// Id of the parameter holding the legacy payload.
    pub fn migration_key(&self) -> &str {
        &self.migration_key
    }

    /// Whether non-string payload values are JSON-encoded on direct
    /// assignment instead of failing the parameter.
    pub fn serialize(&self) -> bool {
        self.serialize
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfigBuilder::new().build()
    }
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field(
                "transformations",
                &self.transformations.keys().collect::<Vec<_>>(),
            )
            .field("migration_key", &self.migration_key)
            .field("serialize", &self.serialize)
            .finish()
    }
}

/// Builder for [`MigrationConfig`].
///
/// # Example
///
/// ```
/// use migra_core::migration::{ConstantTransform, MigrationConfig};
///
/// let config = MigrationConfig::builder()
///     .migration_key("legacy_data")
///     .serialize(true)
///     .transformation("provider", ConstantTransform::new("legacy"))
///     .build();
///
/// assert_eq!(config.migration_key(), "legacy_data");
/// assert!(config.serialize());
/// ```
pub struct MigrationConfigBuilder {
    transformations: Transformations,
    migration_key: String,
    serialize: bool,
}

impl MigrationConfigBuilder {
    /// Creates a builder with no transformations, the default key and
    /// serialization disabled.
    pub fn new() -> Self {
        Self {
            transformations: BTreeMap::new(),
            migration_key: DEFAULT_MIGRATION_KEY.to_string(),
            serialize: false,
        }
    }

    /// Registers a transformation for `param_id`, replacing any previous one.
    pub fn transformation(
        self,
        param_id: impl Into<String>,
        transformation: impl Transformation + 'static,
    ) -> Self {
        self.shared_transformation(param_id, Arc::new(transformation))
    }

    /// Registers an already shared transformation for `param_id`.
    pub fn shared_transformation(
        mut self,
        param_id: impl Into<String>,
        transformation: Arc<dyn Transformation>,
    ) -> Self {
        self.transformations.insert(param_id.into(), transformation);
        self
    }

    pub fn migration_key(mut self, key: impl Into<String>) -> Self {
        self.migration_key = key.into();
        self
    }

    pub fn serialize(mut self, serialize: bool) -> Self {
        self.serialize = serialize;
        self
    }

    pub fn build(self) -> MigrationConfig {
        MigrationConfig {
            transformations: self.transformations,
            migration_key: self.migration_key,
            serialize: self.serialize,
        }
    }
}

impl Default for MigrationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
