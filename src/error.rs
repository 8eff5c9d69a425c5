//! Error types for the fragment registry.
//!
//! Registration and resolution never fail hard; anomalies on those paths are
//! reported as [`crate::diagnostics::Diagnostic`]s. The errors here cover the
//! edges: parsing GraphQL text, loading manifests, configuration and logging.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning GraphQL text into a [`crate::document::Document`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("GraphQL parse error: {0}")]
    Parse(String),
}

/// Errors produced while loading a declarative extension manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid fragment '{key}' in manifest: {source}")]
    Fragment {
        key: String,
        #[source]
        source: DocumentError,
    },
}

/// Top-level error for the crate's fallible entry points.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for RegistryError {
    fn from(err: config::ConfigError) -> Self {
        RegistryError::ConfigError(err.to_string())
    }
}
