//! Custom per-parameter transformations.
//!
//! A [`Transformation`] computes the new value of one parameter from the
//! whole legacy payload. It takes priority over direct assignment.
//!
//! # Example
//!
//! ```
//! use migra_core::migration::{from_fn, MigrationConfig, MigrationParamError, Payload};
//!
//! let config = MigrationConfig::builder()
//!     .transformation(
//!         "email",
//!         from_fn(|data: &Payload, _request_id: &str| {
//!             let email = data
//!                 .get("teamAdminEmail")
//!                 .and_then(|v| v.as_str())
//!                 .ok_or_else(|| MigrationParamError::missing_field("teamAdminEmail"))?;
//!             Ok(email.to_uppercase())
//!         }),
//!     )
//!     .build();
//!
//! assert!(config.transformation("email").is_some());
//! ```

use super::error::{MigrationParamError, TransformError};
use super::payload::{self, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Produces the value of one parameter from the legacy payload.
///
/// Return [`TransformError::Param`] to mark the parameter as failed and let
/// the migration go on to the remaining parameters. Any other error is
/// treated as a defect and propagates out of `migrate`.
pub trait Transformation: Send + Sync {
    fn transform(&self, payload: &Payload, request_id: &str) -> Result<String, TransformError>;
}

/// A [`Transformation`] backed by a function.
#[derive(Clone)]
pub struct FnTransform<F> {
    f: F,
}

/// Wraps a function as a [`Transformation`].
pub fn from_fn<F>(f: F) -> FnTransform<F>
where
    F: Fn(&Payload, &str) -> Result<String, TransformError> + Send + Sync,
{
    FnTransform { f }
}

impl<F> Transformation for FnTransform<F>
where
    F: Fn(&Payload, &str) -> Result<String, TransformError> + Send + Sync,
{
    fn transform(&self, payload: &Payload, request_id: &str) -> Result<String, TransformError> {
        (self.f)(payload, request_id)
    }
}

impl<F> std::fmt::Debug for FnTransform<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransform").finish_non_exhaustive()
    }
}

/// Letter case applied by [`FieldTransform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Case {
    Upper,
    Lower,
}

/// Copies a field of the payload, optionally changing its case.
///
/// `source` is either a top-level key or, when it starts with `/`, a JSON
/// pointer into the payload. String values are copied as-is; other values
/// are encoded the way direct assignment encodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTransform {
    source: String,
    case: Option<Case>,
}

impl FieldTransform {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            case: None,
        }
    }

    pub fn with_case(mut self, case: Case) -> Self {
        self.case = Some(case);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn lookup<'p>(&self, payload: &'p Payload) -> Option<&'p Value> {
        let Some(pointer) = self.source.strip_prefix('/') else {
            return payload.get(&self.source);
        };

        // The payload is a map, not a Value, so resolve the first segment by hand.
        let (head, rest) = match pointer.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (pointer, None),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        let value = payload.get(&head)?;

        match rest {
            Some(rest) => value.pointer(&format!("/{}", rest)),
            None => Some(value),
        }
    }
}

impl Transformation for FieldTransform {
    fn transform(&self, payload: &Payload, _request_id: &str) -> Result<String, TransformError> {
        let value = self
            .lookup(payload)
            .ok_or_else(|| MigrationParamError::missing_field(&self.source))?;

        let text = match value {
            Value::String(s) => s.clone(),
            other => payload::encode(other).map_err(anyhow::Error::from)?,
        };

        Ok(match self.case {
            Some(Case::Upper) => text.to_uppercase(),
            Some(Case::Lower) => text.to_lowercase(),
            None => text,
        })
    }
}

/// Always yields the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantTransform {
    value: String,
}

impl ConstantTransform {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Transformation for ConstantTransform {
    fn transform(&self, _payload: &Payload, _request_id: &str) -> Result<String, TransformError> {
        Ok(self.value.clone())
    }
}

/// Yields the id of the request being migrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestIdTransform;

impl Transformation for RequestIdTransform {
    fn transform(&self, _payload: &Payload, request_id: &str) -> Result<String, TransformError> {
        Ok(request_id.to_string())
    }
}
