//! Extensions
//!
//! An [`Extension`] is the unit a plugin hands to the registry: up to three
//! ordered mappings of fragments, mutation options and query options. It is
//! consumed once when the registry initializes.
//!
//! Extensions can also be declared in TOML manifests:
//!
//! ```toml
//! [fragments]
//! UserFields = "fragment UserFields on User { id name }"
//!
//! [mutations.CreatePost]
//! refetch = ["Posts"]
//!
//! [[slots]]
//! slot = "userCard"
//! resource = "User"
//! fragment = "fragment UserCardAvatar on User { avatarUrl }"
//! ```

use crate::document::Document;
use crate::error::ManifestError;
use crate::slot::SlotTable;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Contributions from a single plugin.
#[derive(Debug, Clone)]
pub struct Extension<O = serde_json::Value> {
    pub fragments: Option<IndexMap<String, Document>>,
    pub mutations: Option<IndexMap<String, O>>,
    pub queries: Option<IndexMap<String, O>>,
}

impl<O> Default for Extension<O> {
    fn default() -> Self {
        Self {
            fragments: None,
            mutations: None,
            queries: None,
        }
    }
}

impl<O> Extension<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment(mut self, key: impl Into<String>, document: Document) -> Self {
        self.fragments
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), document);
        self
    }

    pub fn with_mutation(mut self, key: impl Into<String>, options: O) -> Self {
        self.mutations
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), options);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, options: O) -> Self {
        self.queries
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), options);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.as_ref().map_or(true, IndexMap::is_empty)
            && self.mutations.as_ref().map_or(true, IndexMap::is_empty)
            && self.queries.as_ref().map_or(true, IndexMap::is_empty)
    }
}

/// Slot contribution declared in a manifest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SlotManifestEntry {
    /// Slot name as referenced after normalization (first letter lower-case).
    pub slot: String,
    pub resource: String,
    pub fragment: String,
}

/// Declarative, file-backed extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "O: DeserializeOwned"))]
pub struct ExtensionManifest<O = serde_json::Value> {
    #[serde(default)]
    pub fragments: IndexMap<String, String>,
    #[serde(default)]
    pub mutations: IndexMap<String, O>,
    #[serde(default)]
    pub queries: IndexMap<String, O>,
    #[serde(default)]
    pub slots: Vec<SlotManifestEntry>,
}

impl<O: DeserializeOwned> ExtensionManifest<O> {
    /// Load a manifest from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<O> ExtensionManifest<O> {
    /// Parse fragment text and produce the extension. Slot entries are not part
    /// of the extension; see [`ExtensionManifest::register_slots`].
    pub fn into_extension(self) -> Result<Extension<O>, ManifestError> {
        let mut fragments = IndexMap::with_capacity(self.fragments.len());
        for (key, source) in self.fragments {
            let document = Document::parse(&source).map_err(|source| ManifestError::Fragment {
                key: key.clone(),
                source,
            })?;
            fragments.insert(key, document);
        }

        Ok(Extension {
            fragments: non_empty(fragments),
            mutations: non_empty(self.mutations),
            queries: non_empty(self.queries),
        })
    }

    /// Add the manifest's slot fragments to `table`.
    pub fn register_slots(&self, table: &mut SlotTable) -> Result<(), ManifestError> {
        for entry in &self.slots {
            let document =
                Document::parse(&entry.fragment).map_err(|source| ManifestError::Fragment {
                    key: format!("{}/{}", entry.slot, entry.resource),
                    source,
                })?;
            table.insert(entry.slot.clone(), entry.resource.clone(), document);
        }
        Ok(())
    }
}

fn non_empty<V>(map: IndexMap<String, V>) -> Option<IndexMap<String, V>> {
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
