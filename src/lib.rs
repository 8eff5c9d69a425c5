//! Fragment Registry: plugin-driven composition of GraphQL fragments
//!
//! Plugins contribute named fragments, slot fragments and opaque per-operation
//! options. The registry collects them lazily on first use and composes
//! self-contained query documents on demand by resolving fragment spreads.
//!
//! ```
//! use fragment_registry::{Document, FragmentRegistry};
//!
//! let registry: FragmentRegistry = FragmentRegistry::builder()
//!     .builtin_fragment(
//!         "UserFragment",
//!         Document::parse("fragment UserFragment on User { name }").unwrap(),
//!     )
//!     .build();
//!
//! let query = Document::parse("query Viewer { viewer { ...UserFragment } }").unwrap();
//! let resolved = registry.resolve_fragments(&query);
//! assert_eq!(resolved.fragment_names(), vec!["UserFragment"]);
//! ```

pub mod composition;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod extension;
pub mod logging;
pub mod plugin;
pub mod registry;
pub mod slot;
pub mod store;

pub use config::{ConfigLoader, RegistryConfig, RegistrySettings};
pub use diagnostics::{ContributionKind, Diagnostic};
pub use document::Document;
pub use error::{DocumentError, ManifestError, RegistryError};
pub use extension::{Extension, ExtensionManifest};
pub use plugin::{PluginSource, StaticPlugins};
pub use registry::{FragmentRegistry, FragmentRegistryBuilder};
pub use slot::{NoSlots, SlotReference, SlotSource, SlotTable};
pub use store::FragmentGroup;
