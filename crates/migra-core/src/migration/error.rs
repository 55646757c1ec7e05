//! Two-tier error taxonomy of the migration engine.
//!
//! - [`MigrationParamError`] is parameter-scoped and recoverable: the
//!   parameter is classified as failed and the loop moves on.
//! - [`MigrationAbortError`] is call-scoped and terminal: no migrated
//!   request is returned.
//!
//! The `Display` text of both is exactly what the engine logs after the
//! `[MIGRATION::{id}] ` prefix.

use super::outcome::OutcomeSet;
use thiserror::Error;

/// A parameter could not be migrated.
///
/// Raised by direct assignment when the payload value is not a string and
/// serialization is disabled, or by a [`Transformation`](super::Transformation)
/// to flag its parameter as failed without faulting the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MigrationParamError {
    #[error("Parameter {param_id} type must be str, but {type_name} was given")]
    InvalidType {
        param_id: String,
        type_name: &'static str,
    },

    #[error("Migration data has no field `{field}`")]
    MissingField { field: String },

    #[error("{0}")]
    Custom(String),
}

impl MigrationParamError {
    /// Creates an error carrying a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Creates a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }
}

/// The migration of a request was abandoned.
#[derive(Error, Debug, Clone)]
pub enum MigrationAbortError {
    /// The payload is not valid JSON. Carries the parser message.
    #[error("{0}")]
    InvalidPayload(String),

    /// The request claims to need migration but has no payload parameter.
    #[error("Migration data parameter `{key}` not found")]
    MissingPayload { key: String },

    /// The payload is valid JSON but not an object.
    #[error("Migration data `{key}` must be a dict, but {type_name} was given")]
    PayloadNotObject {
        key: String,
        type_name: &'static str,
    },

    /// One or more parameters failed resolution.
    #[error(
        "Processing of parameters {} failed, unable to complete migration.",
        .outcome.failed().join(", ")
    )]
    ParametersFailed { outcome: OutcomeSet },
}

impl MigrationAbortError {
    /// The ids of the parameters that failed, in processing order.
    ///
    /// Empty for aborts raised before any parameter was processed.
    pub fn failed_params(&self) -> &[String] {
        match self {
            Self::ParametersFailed { outcome } => outcome.failed(),
            _ => &[],
        }
    }
}

/// Failure of a single [`Transformation`](super::Transformation) call.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Graceful: the parameter is classified as failed.
    #[error(transparent)]
    Param(#[from] MigrationParamError),

    /// A defect in the transformation. Propagates out of `migrate`.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

/// Error returned by [`MigrationHandler::migrate`](super::MigrationHandler::migrate).
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(transparent)]
    Abort(#[from] MigrationAbortError),

    /// A transformation failed with something other than a
    /// [`MigrationParamError`]. Nothing is logged for it.
    #[error("Transformation for parameter {param_id} faulted: {source}")]
    Transform {
        param_id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl MigrationError {
    /// Check if this is an abort
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Abort(_))
    }

    /// Returns the abort, if this is one.
    pub fn as_abort(&self) -> Option<&MigrationAbortError> {
        match self {
            Self::Abort(abort) => Some(abort),
            Self::Transform { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::ParamOutcome;

    #[test]
    fn test_invalid_type_message() {
        let err = MigrationParamError::InvalidType {
            param_id: "team_name".to_string(),
            type_name: "list",
        };
        assert_eq!(
            err.to_string(),
            "Parameter team_name type must be str, but list was given"
        );
    }

    #[test]
    fn test_parameters_failed_message_lists_failed_in_order() {
        let mut outcome = OutcomeSet::new();
        outcome.record("team_name", ParamOutcome::Failed);
        outcome.record("email", ParamOutcome::Succeeded);
        outcome.record("reseller_id", ParamOutcome::Failed);

        let err = MigrationAbortError::ParametersFailed { outcome };
        assert_eq!(
            err.to_string(),
            "Processing of parameters team_name, reseller_id failed, unable to complete migration."
        );
        assert_eq!(err.failed_params(), ["team_name", "reseller_id"]);
    }

    #[test]
    fn test_param_error_converts_into_transform_error() {
        let err: TransformError = MigrationParamError::new("Manual fail.").into();
        assert!(matches!(err, TransformError::Param(_)));
        assert_eq!(err.to_string(), "Manual fail.");
    }
}
