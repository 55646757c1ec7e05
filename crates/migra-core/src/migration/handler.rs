//! The migration engine.

use super::config::{MigrationConfig, Transformations};
use super::error::{MigrationAbortError, MigrationError, MigrationParamError, TransformError};
use super::logger::{MigrationLogger, RequestLog, TracingLogger};
use super::outcome::{OutcomeSet, ParamOutcome};
use super::payload::{self, Payload};
use crate::request::{MigratableRequest, Param};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A successfully migrated copy of a request.
#[derive(Debug, Clone)]
pub struct Migrated<R> {
    pub request: R,
    pub outcome: OutcomeSet,
}

/// Moves legacy data embedded in a request into its parameters.
///
/// The legacy data is a JSON object stored as the value of the parameter
/// named by [`MigrationConfig::migration_key`]. Every other parameter is
/// resolved, in order, by:
///
/// 1. its registered [`Transformation`](super::Transformation), if any;
/// 2. the payload field with the same id (direct assignment);
/// 3. otherwise it is skipped and keeps its value.
///
/// Migration is all-or-nothing: if any parameter fails, the call aborts and
/// the caller's request is left as it was.
#[derive(Clone)]
pub struct MigrationHandler {
    config: MigrationConfig,
    logger: Arc<dyn MigrationLogger>,
}

impl MigrationHandler {
    /// Creates a handler that logs through `tracing`.
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            config,
            logger: Arc::new(TracingLogger),
        }
    }

    /// Replaces the log sink.
    pub fn with_logger(mut self, logger: Arc<dyn MigrationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn transformations(&self) -> &Transformations {
        self.config.transformations()
    }

    pub fn migration_key(&self) -> &str {
        self.config.migration_key()
    }

    pub fn serialize(&self) -> bool {
        self.config.serialize()
    }

    /// Migrates one request.
    ///
    /// Returns the request itself when it does not need migration, or a
    /// migrated copy otherwise.
    ///
    /// # Errors
    ///
    /// - [`MigrationError::Abort`] if the payload is missing or not a JSON
    ///   object, or if any parameter failed
    /// - [`MigrationError::Transform`] if a transformation faulted
    pub fn migrate<'a, R: MigratableRequest>(
        &self,
        request: &'a R,
    ) -> Result<Cow<'a, R>, MigrationError> {
        Ok(match self.migrate_with_outcome(request)? {
            Some(migrated) => Cow::Owned(migrated.request),
            None => Cow::Borrowed(request),
        })
    }

    /// Like [`migrate`](Self::migrate), but also reports how each parameter
    /// was resolved. `None` means the request did not need migration.
    pub fn migrate_with_outcome<R: MigratableRequest>(
        &self,
        request: &R,
    ) -> Result<Option<Migrated<R>>, MigrationError> {
        let log = RequestLog::new(self.logger.as_ref(), request.id());

        if !request.needs_migration(self.migration_key()) {
            log.info(format_args!("AssetRequest does not need migration."));
            return Ok(None);
        }

        log.info(format_args!(
            "Running migration operations for request {}",
            request.id()
        ));

        let mut copy = request.clone();
        match self.resolve_all(request, &mut copy, &log) {
            Ok(outcome) => Ok(Some(Migrated {
                request: copy,
                outcome,
            })),
            Err(MigrationError::Abort(abort)) => {
                log.error(format_args!("{}", abort));
                Err(abort.into())
            }
            Err(fault) => Err(fault),
        }
    }

    /// Parses the payload of `original` and resolves every parameter of
    /// `copy` except the payload parameter itself.
    fn resolve_all<R: MigratableRequest>(
        &self,
        original: &R,
        copy: &mut R,
        log: &RequestLog<'_>,
    ) -> Result<OutcomeSet, MigrationError> {
        let key = self.migration_key();
        let raw = original
            .param(key)
            .map(|param| param.value.as_str())
            .ok_or_else(|| MigrationAbortError::MissingPayload {
                key: key.to_string(),
            })?;
        log.debug(format_args!("Migration data `{}`: {}", key, raw));

        let payload = payload::parse(key, raw)?;
        log.debug(format_args!("Migration data `{}` parsed correctly", key));

        let mut outcome = OutcomeSet::new();
        for param in copy.params_mut().iter_mut().filter(|p| p.id != key) {
            let resolved = match self.resolve(param, &payload, original.id(), log) {
                Ok(resolved) => resolved,
                Err(TransformError::Param(err)) => {
                    log.error(format_args!("{}", err));
                    ParamOutcome::Failed
                }
                Err(TransformError::Fault(source)) => {
                    return Err(MigrationError::Transform {
                        param_id: param.id.clone(),
                        source,
                    });
                }
            };
            outcome.record(param.id.clone(), resolved);
        }

        log.info(format_args!("{}", outcome.summary()));

        if outcome.has_failures() {
            return Err(MigrationAbortError::ParametersFailed { outcome }.into());
        }
        Ok(outcome)
    }

    fn resolve(
        &self,
        param: &mut Param,
        payload: &Payload,
        request_id: &str,
        log: &RequestLog<'_>,
    ) -> Result<ParamOutcome, TransformError> {
        if let Some(transformation) = self.config.transformation(&param.id) {
            log.info(format_args!(
                "Running transformation for parameter {}",
                param.id
            ));
            param.value = transformation.transform(payload, request_id)?;
            return Ok(ParamOutcome::Succeeded);
        }

        let Some(value) = payload.get(&param.id) else {
            return Ok(ParamOutcome::Skipped);
        };

        param.value = match value {
            Value::String(s) => s.clone(),
            other if self.serialize() => payload::encode(other).map_err(anyhow::Error::from)?,
            other => {
                return Err(MigrationParamError::InvalidType {
                    param_id: param.id.clone(),
                    type_name: payload::type_name(other),
                }
                .into());
            }
        };
        Ok(ParamOutcome::Succeeded)
    }
}

impl Default for MigrationHandler {
    fn default() -> Self {
        Self::new(MigrationConfig::default())
    }
}

impl fmt::Debug for MigrationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationHandler")
            .field("config", &self.config)
            .field("logger", &"<dyn MigrationLogger>")
            .finish()
    }
}
