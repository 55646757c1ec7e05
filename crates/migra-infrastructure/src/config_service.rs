//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the migration handler
//! configuration from a TOML file (by default
//! `~/.config/migra/handler.toml`). Files are read through version-migrate,
//! so older schema versions are migrated on load. A file without a
//! `version` key is read as the first schema version.

use crate::dto::{HANDLER_CONFIG_ENTITY, HANDLER_CONFIG_VERSION, create_handler_config_migrator};
use migra_core::config::HandlerSettings;
use migra_core::error::{MigraError, Result};
use migra_core::migration::MigrationConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// File name of the handler configuration inside the config directory.
pub const HANDLER_CONFIG_FILE: &str = "handler.toml";

/// Configuration service that loads and caches the handler configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    /// Explicit configuration file, or `None` for the default location.
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<MigrationConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the default location.
    ///
    /// A missing default file yields the default configuration.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path`, which must exist.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Default location of the handler configuration file.
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("migra").join(HANDLER_CONFIG_FILE))
            .ok_or_else(|| MigraError::config("Cannot find config directory"))
    }

    /// Gets the handler configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<MigrationConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    /// Reads the configuration file and migrates it to the current
    /// settings, without building the handler configuration.
    pub fn load_settings(&self) -> Result<HandlerSettings> {
        match &self.path {
            Some(path) => {
                if !path.exists() {
                    return Err(MigraError::not_found(
                        "handler config",
                        path.display().to_string(),
                    ));
                }
                Self::read_settings(path)
            }
            None => {
                let path = Self::default_config_path()?;
                if path.exists() {
                    Self::read_settings(&path)
                } else {
                    tracing::debug!(
                        "No handler config at {}, using defaults",
                        path.display()
                    );
                    Ok(HandlerSettings::default())
                }
            }
        }
    }

    fn load_config(&self) -> Result<MigrationConfig> {
        let settings = self.load_settings()?;
        tracing::debug!(
            "Loaded handler config ({} transformation(s))",
            settings.transformations.len()
        );
        MigrationConfig::try_from(settings)
    }

    fn read_settings(path: &Path) -> Result<HandlerSettings> {
        let content = fs::read_to_string(path)?;
        let mut toml_value: toml::Value = toml::from_str(&content)?;

        if let toml::Value::Table(table) = &mut toml_value {
            if !table.contains_key("version") {
                table.insert(
                    "version".to_string(),
                    toml::Value::String(HANDLER_CONFIG_VERSION.to_string()),
                );
            }
        }

        let migrator = create_handler_config_migrator()?;
        let settings: HandlerSettings =
            migrator.load_flat_from(HANDLER_CONFIG_ENTITY, toml_value)?;
        Ok(settings)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
