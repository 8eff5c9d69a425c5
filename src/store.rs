//! Contribution Store
//!
//! Append-only accumulation of fragment groups and per-operation option lists.
//! The store itself has no notion of initialization; [`crate::registry`] decides
//! when it may be written.

use crate::diagnostics::Diagnostic;
use crate::document::Document;
use crate::extension::Extension;
use indexmap::IndexMap;

/// All fragments contributed under one key.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentGroup {
    /// Root type, taken from the first contribution.
    pub type_name: String,
    /// Definition names in contribution order.
    pub names: Vec<String>,
    /// Contributed documents, parallel to `names`.
    pub documents: Vec<Document>,
}

/// Fragment groups and option lists, keyed by contribution key.
#[derive(Debug)]
pub struct ContributionStore<O> {
    fragments: IndexMap<String, FragmentGroup>,
    mutations: IndexMap<String, Vec<O>>,
    queries: IndexMap<String, Vec<O>>,
}

impl<O> Default for ContributionStore<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> ContributionStore<O> {
    pub fn new() -> Self {
        Self {
            fragments: IndexMap::new(),
            mutations: IndexMap::new(),
            queries: IndexMap::new(),
        }
    }

    /// Add a fragment document under `key`.
    ///
    /// Returns a diagnostic if the document has no fragment definition (it is
    /// skipped) or if its root type disagrees with the group's (it is still
    /// appended).
    pub fn add_fragment(&mut self, key: &str, document: Document) -> Option<Diagnostic> {
        let (type_name, name) = match (document.type_name(), document.definition_name()) {
            (Some(type_name), Some(name)) => (type_name.to_string(), name.to_string()),
            _ => {
                return Some(Diagnostic::MissingFragmentDefinition {
                    key: key.to_string(),
                })
            }
        };

        match self.fragments.get_mut(key) {
            Some(group) => {
                let mismatch = (group.type_name != type_name).then(|| Diagnostic::TypeMismatch {
                    key: key.to_string(),
                    expected: group.type_name.clone(),
                    found: type_name,
                });
                group.names.push(name);
                group.documents.push(document);
                mismatch
            }
            None => {
                self.fragments.insert(
                    key.to_string(),
                    FragmentGroup {
                        type_name,
                        names: vec![name],
                        documents: vec![document],
                    },
                );
                None
            }
        }
    }

    pub fn add_mutation_options(&mut self, key: &str, options: O) {
        self.mutations.entry(key.to_string()).or_default().push(options);
    }

    pub fn add_query_options(&mut self, key: &str, options: O) {
        self.queries.entry(key.to_string()).or_default().push(options);
    }

    /// Apply every mapping of `extension`, in order.
    pub fn add(&mut self, extension: Extension<O>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for (key, document) in extension.fragments.into_iter().flatten() {
            diagnostics.extend(self.add_fragment(&key, document));
        }
        for (key, options) in extension.mutations.into_iter().flatten() {
            self.add_mutation_options(&key, options);
        }
        for (key, options) in extension.queries.into_iter().flatten() {
            self.add_query_options(&key, options);
        }
        diagnostics
    }

    pub fn fragment_group(&self, key: &str) -> Option<&FragmentGroup> {
        self.fragments.get(key)
    }

    pub fn fragment_keys(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    pub fn mutation_options(&self, key: &str) -> &[O] {
        self.mutations.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn query_options(&self, key: &str) -> &[O] {
        self.queries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
