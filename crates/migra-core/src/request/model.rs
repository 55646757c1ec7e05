use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::MigratableRequest;

/// A single parameter of an asset.
///
/// Only `id` and `value` take part in migration. The remaining fields are
/// carried so a migrated request serializes back without loss.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Param {
    /// Identifier, unique within the asset.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    /// Current value. Missing values deserialize as an empty string.
    #[serde(default)]
    pub value: String,
    /// Absent and empty are kept apart so a request serializes back as read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_error: Option<String>,
    /// Fields not modelled above, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Param {
    /// Creates a parameter with just an id and a value.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

/// The asset a request operates on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(default)]
    pub params: Vec<Param>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A purchase or change request against an asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetRequest {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub asset: Asset,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AssetRequest {
    /// Creates a request over an asset with the given parameters.
    pub fn new(id: impl Into<String>, asset_id: impl Into<String>, params: Vec<Param>) -> Self {
        Self {
            id: id.into(),
            asset: Asset {
                id: asset_id.into(),
                params,
                extra: Map::new(),
            },
            ..Self::default()
        }
    }

    /// Finds a parameter of the asset by id.
    pub fn get_param_by_id(&self, id: &str) -> Option<&Param> {
        self.asset.params.iter().find(|p| p.id == id)
    }

    /// True when the asset carries a non-empty parameter named `key`.
    pub fn needs_migration(&self, key: &str) -> bool {
        self.get_param_by_id(key)
            .is_some_and(|param| !param.value.is_empty())
    }
}

impl MigratableRequest for AssetRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn needs_migration(&self, key: &str) -> bool {
        AssetRequest::needs_migration(self, key)
    }

    fn param(&self, id: &str) -> Option<&Param> {
        self.get_param_by_id(id)
    }

    fn params(&self) -> &[Param] {
        &self.asset.params
    }

    fn params_mut(&mut self) -> &mut [Param] {
        &mut self.asset.params
    }
}
