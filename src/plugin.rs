//! Plugin discovery
//!
//! The registry asks a [`PluginSource`] for every plugin's extension exactly
//! once, when it initializes. The returned order is the contribution order and
//! must be stable between runs for merged documents to be deterministic.

use crate::error::ManifestError;
use crate::extension::{Extension, ExtensionManifest};
use crate::slot::SlotTable;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Supplies the ordered list of plugin extensions.
pub trait PluginSource<O>: Send + Sync {
    fn extensions(&self) -> Vec<Extension<O>>;
}

impl<O, F> PluginSource<O> for F
where
    F: Fn() -> Vec<Extension<O>> + Send + Sync,
{
    fn extensions(&self) -> Vec<Extension<O>> {
        self()
    }
}

/// A fixed, ordered list of extensions.
#[derive(Debug, Clone)]
pub struct StaticPlugins<O> {
    extensions: Vec<Extension<O>>,
}

impl<O> Default for StaticPlugins<O> {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }
}

impl<O> StaticPlugins<O> {
    pub fn new(extensions: Vec<Extension<O>>) -> Self {
        Self { extensions }
    }

    pub fn push(&mut self, extension: Extension<O>) {
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl<O: DeserializeOwned> StaticPlugins<O> {
    /// Load one extension per manifest, in the order given. Slot entries are
    /// added to `slots`.
    pub fn from_manifests<P: AsRef<Path>>(
        paths: &[P],
        slots: &mut SlotTable,
    ) -> Result<Self, ManifestError> {
        let mut plugins = Self::default();
        for path in paths {
            let path = path.as_ref();
            let manifest: ExtensionManifest<O> = ExtensionManifest::load(path)?;
            manifest.register_slots(slots)?;
            plugins.push(manifest.into_extension()?);
            debug!(manifest = %path.display(), "Loaded extension manifest");
        }
        Ok(plugins)
    }
}

impl<O: Clone + Send + Sync> PluginSource<O> for StaticPlugins<O> {
    fn extensions(&self) -> Vec<Extension<O>> {
        self.extensions.clone()
    }
}
