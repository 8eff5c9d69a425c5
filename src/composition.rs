//! Fragment Composition
//!
//! Read-time assembly of fragment documents and resolution of fragment spreads.
//! Nothing composed here is stored: every call works against the contribution
//! store as it stands after initialization.
//!
//! Two lookup strategies back [`FragmentRegistry::fragment_document`]:
//! * registry: the key names a fragment group in the store;
//! * slot: the key is `<prefix><SlotName>_<Resource>` and the slot source
//!   supplies the fragments.
//!
//! Either way the result is a wrapper fragment named after the key that
//! spreads every contributed definition, merged with the contributed documents.

use crate::diagnostics::Diagnostic;
use crate::document::{spread_selection, Document};
use crate::registry::FragmentRegistry;
use crate::slot::SlotReference;
use std::collections::HashSet;
use tracing::debug;

impl<O> FragmentRegistry<O> {
    /// Assembled fragment document for `key`, or `None` when neither the
    /// store nor the slot source has anything for it.
    pub fn fragment_document(&self, key: &str) -> Option<Document> {
        self.ensure_initialized();
        self.registered_fragment(key)
            .or_else(|| self.slot_fragment(key))
    }

    /// Rewrite `document` into a self-contained document.
    ///
    /// Every distinct spread is looked up with
    /// [`fragment_document`](Self::fragment_document) and the assembled
    /// fragments are merged in; definitions the document already has win over
    /// fetched ones. Spreads of empty slots are removed wherever they occur,
    /// including inside fetched fragments. Other unknown spreads are left for
    /// schema validation to report. Fragments pulled in may spread further
    /// keys, which are resolved in later passes up to `max_resolve_depth`.
    ///
    /// A document without source text is returned unchanged.
    pub fn resolve_fragments(&self, document: &Document) -> Document {
        if !document.has_source() {
            self.report(Diagnostic::UnsupportedDocument);
            return document.clone();
        }
        self.ensure_initialized();

        let prefix = self.settings.slot_prefix.as_str();
        let mut attempted = HashSet::new();
        let mut empty_slots = Vec::new();
        let mut working = document.clone();
        let mut settled = false;

        for pass in 0..self.settings.max_resolve_depth {
            let pending = unattempted_spreads(&working, &attempted);
            if pending.is_empty() {
                settled = true;
                break;
            }

            let defined: HashSet<String> =
                working.fragment_names().into_iter().map(String::from).collect();
            let mut fragments = Vec::new();
            for name in pending {
                match self.fragment_document(&name) {
                    Some(fragment) => fragments.push(fragment),
                    None if name.starts_with(prefix) && !defined.contains(&name) => {
                        debug!(spread = %name, "Removing spread of empty slot");
                        empty_slots.push(name.clone());
                    }
                    None => debug!(spread = %name, "Leaving unresolved spread"),
                }
                attempted.insert(name);
            }

            debug!(pass, merged = fragments.len(), "Resolved fragment spreads");
            working = Document::merge(std::iter::once(&working).chain(&fragments));
            working = prune_all(working, &empty_slots);
            if fragments.is_empty() {
                settled = true;
                break;
            }
        }

        if !settled {
            let pending = undefined_spreads(&working, &attempted);
            if !pending.is_empty() {
                self.report(Diagnostic::ResolveDepthExceeded {
                    depth: self.settings.max_resolve_depth,
                    pending,
                });
            }
        }
        Document::merge([&working])
    }

    fn registered_fragment(&self, key: &str) -> Option<Document> {
        let store = self.store.read();
        let group = store.fragment_group(key)?;
        Some(assemble(key, &group.type_name, &group.names, &group.documents))
    }

    fn slot_fragment(&self, key: &str) -> Option<Document> {
        let reference = SlotReference::parse(key, &self.settings.slot_prefix)?;
        let documents = self.slots.fragments(&reference.slot, reference.resource);
        let type_name = documents.iter().find_map(Document::type_name)?;
        let names: Vec<String> = documents
            .iter()
            .filter_map(|document| document.definition_name().map(String::from))
            .collect();
        debug!(
            slot = %reference.slot,
            resource = reference.resource,
            fragments = names.len(),
            "Assembling slot fragment"
        );
        Some(assemble(key, type_name, &names, &documents))
    }
}

/// Spreads of `document` that were not looked up yet.
fn unattempted_spreads(document: &Document, attempted: &HashSet<String>) -> Vec<String> {
    document
        .fragment_spreads()
        .into_iter()
        .filter(|name| !attempted.contains(name))
        .collect()
}

/// Spreads of `document` that nothing defines and that were not looked up yet.
fn undefined_spreads(document: &Document, attempted: &HashSet<String>) -> Vec<String> {
    let defined: HashSet<&str> = document.fragment_names().into_iter().collect();
    unattempted_spreads(document, attempted)
        .into_iter()
        .filter(|name| !defined.contains(name.as_str()))
        .collect()
}

fn prune_all(document: Document, names: &[String]) -> Document {
    names
        .iter()
        .fold(document, |document, name| document.without_spreads(name))
}

/// Wrapper fragment `key on type_name` spreading `names`, merged with `documents`.
///
/// A contributed definition that is itself named `key` cannot be spread from a
/// wrapper of the same name; its selections are inlined into the wrapper in
/// its place instead.
fn assemble(key: &str, type_name: &str, names: &[String], documents: &[Document]) -> Document {
    let wrapper = if names.iter().any(|name| name == key) {
        let mut items = Vec::new();
        for name in names {
            if name == key {
                if let Some(own) = documents.iter().find_map(|document| document.fragment(key)) {
                    items.extend(own.selection_set.items.iter().cloned());
                }
            } else {
                items.push(spread_selection(name));
            }
        }
        Document::fragment_with_selections(key, type_name, items)
    } else {
        Document::spread_fragment(key, type_name, names)
    };

    Document::merge(std::iter::once(&wrapper).chain(documents))
}
