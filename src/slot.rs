//! Slots
//!
//! A slot is an extension point identified by a (slot, resource) pair. Documents
//! spread a slot as `...Slot_<SlotName>_<ResourceName>`; the registry asks a
//! [`SlotSource`] for every fragment contributed to that pair.

use crate::document::Document;
use indexmap::IndexMap;
use std::sync::Arc;

/// Default prefix marking a spread as a slot reference.
pub const SLOT_PREFIX: &str = "Slot_";

/// Lookup of fragments contributed to a slot.
pub trait SlotSource: Send + Sync {
    /// Fragments registered for `(slot, resource)`, in contribution order.
    fn fragments(&self, slot: &str, resource: &str) -> Vec<Document>;
}

impl<T: SlotSource + ?Sized> SlotSource for Arc<T> {
    fn fragments(&self, slot: &str, resource: &str) -> Vec<Document> {
        (**self).fragments(slot, resource)
    }
}

/// Slot source with no contributions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSlots;

impl SlotSource for NoSlots {
    fn fragments(&self, _slot: &str, _resource: &str) -> Vec<Document> {
        Vec::new()
    }
}

/// In-memory slot contributions keyed by (slot, resource).
#[derive(Debug, Default, Clone)]
pub struct SlotTable {
    entries: IndexMap<(String, String), Vec<Document>>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        slot: impl Into<String>,
        resource: impl Into<String>,
        document: Document,
    ) {
        self.entries
            .entry((slot.into(), resource.into()))
            .or_default()
            .push(document);
    }

    /// Number of (slot, resource) pairs with at least one fragment.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SlotSource for SlotTable {
    fn fragments(&self, slot: &str, resource: &str) -> Vec<Document> {
        self.entries
            .get(&(slot.to_string(), resource.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// A spread name interpreted as a slot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotReference<'a> {
    /// Slot name with its first character lower-cased.
    pub slot: String,
    pub resource: &'a str,
}

impl<'a> SlotReference<'a> {
    /// Parse `<prefix><SlotPart>_<ResourcePart>`.
    ///
    /// The split happens at the last underscore, so the slot part may itself
    /// contain underscores while the resource part may not.
    pub fn parse(name: &'a str, prefix: &str) -> Option<Self> {
        let rest = name.strip_prefix(prefix)?;
        let (slot_part, resource) = rest.rsplit_once('_')?;
        if slot_part.is_empty() || resource.is_empty() {
            return None;
        }
        Some(Self {
            slot: lower_first(slot_part),
            resource,
        })
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
