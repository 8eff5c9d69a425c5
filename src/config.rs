//! Configuration System
//!
//! Layered configuration for the registry: built-in defaults, a global file,
//! workspace files, then `FRAGMENT_REGISTRY__*` environment variables.

use crate::error::RegistryError;
use crate::logging::LoggingConfig;
use crate::slot::SLOT_PREFIX;
use config::{Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge;
mod sources;

pub use merge::merge_policy::DEFAULT_MAX_RESOLVE_DEPTH;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry behaviour
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that shape fragment assembly and resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Prefix marking a spread as a slot reference.
    #[serde(default = "default_slot_prefix")]
    pub slot_prefix: String,

    /// Maximum number of transitive resolution passes.
    #[serde(default = "default_max_resolve_depth")]
    pub max_resolve_depth: usize,

    /// Extension manifests loaded as plugins, in contribution order.
    #[serde(default)]
    pub manifests: Vec<PathBuf>,
}

fn default_slot_prefix() -> String {
    SLOT_PREFIX.to_string()
}

fn default_max_resolve_depth() -> usize {
    DEFAULT_MAX_RESOLVE_DEPTH
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            slot_prefix: default_slot_prefix(),
            max_resolve_depth: default_max_resolve_depth(),
            manifests: Vec::new(),
        }
    }
}

impl RegistrySettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.slot_prefix.is_empty() {
            return Err("Slot prefix cannot be empty".to_string());
        }
        if self.max_resolve_depth == 0 {
            return Err("max_resolve_depth must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Registry(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Registry(msg) => write!(f, "Registry: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RegistryConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.registry.validate() {
            errors.push(ValidationError::Registry(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`RegistryConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, `config/config.toml`,
    /// `config/{FRAGMENT_REGISTRY_ENV}.toml`, `FRAGMENT_REGISTRY__*` env vars.
    pub fn load(workspace_root: &Path) -> Result<RegistryConfig, RegistryError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = builder.add_source(
            Environment::with_prefix("FRAGMENT_REGISTRY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: RegistryConfig = builder.build()?.try_deserialize()?;
        Self::validated(config)
    }

    /// Load configuration from a single file on top of the defaults.
    pub fn load_from_file(path: &Path) -> Result<RegistryConfig, RegistryError> {
        let config: RegistryConfig = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .build()?
            .try_deserialize()?;
        Self::validated(config)
    }

    /// Path of the global config file, if HOME or XDG_CONFIG_HOME is set.
    pub fn global_config_path() -> Option<PathBuf> {
        global_config_path()
    }

    fn validated(config: RegistryConfig) -> Result<RegistryConfig, RegistryError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            RegistryError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
