//! Fragment Registry
//!
//! Owns the contribution store and the one-shot initialization gate. Plugins
//! are not consulted until the first read; at that point built-in fragments are
//! registered, then every plugin extension in discovery order. After that pass
//! the store is read-only.

use crate::config::RegistrySettings;
use crate::diagnostics::{ContributionKind, Diagnostic};
use crate::document::Document;
use crate::error::RegistryError;
use crate::extension::Extension;
use crate::plugin::{PluginSource, StaticPlugins};
use crate::slot::{NoSlots, SlotSource, SlotTable};
use crate::store::{ContributionStore, FragmentGroup};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Registry of fragments and per-operation options contributed by plugins.
///
/// `O` is the opaque option payload handed back by
/// [`mutation_options`](Self::mutation_options) and
/// [`query_options`](Self::query_options); the registry never inspects it.
pub struct FragmentRegistry<O = serde_json::Value> {
    pub(crate) settings: RegistrySettings,
    builtins: Vec<(String, Document)>,
    plugins: Box<dyn PluginSource<O>>,
    pub(crate) slots: Box<dyn SlotSource>,
    pub(crate) store: RwLock<ContributionStore<O>>,
    initialized: AtomicBool,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl<O: Clone + Send + Sync + 'static> FragmentRegistry<O> {
    /// Registry with no built-ins, no plugins and no slots.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> FragmentRegistryBuilder<O> {
        FragmentRegistryBuilder::new()
    }
}

impl<O: DeserializeOwned + Clone + Send + Sync + 'static> FragmentRegistry<O> {
    /// Builder preloaded with the extension manifests named in `settings`.
    ///
    /// Manifests are read eagerly, in order; their fragments and options
    /// become the plugin contributions and their slot entries the slot source.
    pub fn builder_from_settings(
        settings: RegistrySettings,
    ) -> Result<FragmentRegistryBuilder<O>, RegistryError> {
        let mut slots = SlotTable::new();
        let plugins = StaticPlugins::from_manifests(&settings.manifests, &mut slots)?;
        Ok(Self::builder()
            .plugins(plugins)
            .slots(slots)
            .settings(settings))
    }
}

impl<O: Clone + Send + Sync + 'static> Default for FragmentRegistry<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> FragmentRegistry<O> {
    pub fn settings(&self) -> &RegistrySettings {
        &self.settings
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run the initialization pass if it has not run yet.
    ///
    /// The flag is set before any contribution is applied, so a plugin that
    /// reads from the registry while being discovered sees a partially filled
    /// store instead of recursing.
    pub fn ensure_initialized(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        for (key, document) in &self.builtins {
            let diagnostic = self.store.write().add_fragment(key, document.clone());
            self.report_all(diagnostic);
        }

        // Discovery runs without the store lock held.
        let extensions = self.plugins.extensions();
        let plugin_count = extensions.len();
        for extension in extensions {
            let diagnostics = self.store.write().add(extension);
            self.report_all(diagnostics);
        }

        info!(
            builtins = self.builtins.len(),
            plugins = plugin_count,
            "Fragment registry initialized"
        );
    }

    /// Register a fragment document under `key`.
    ///
    /// Contributions are only accepted before initialization; later calls are
    /// dropped and reported as [`Diagnostic::LateContribution`].
    pub fn add_fragment(&self, key: &str, document: Document) {
        if self.reject_late(ContributionKind::Fragment, key) {
            return;
        }
        debug!(key, "Adding fragment");
        let diagnostic = self.store.write().add_fragment(key, document);
        self.report_all(diagnostic);
    }

    pub fn add_mutation_options(&self, key: &str, options: O) {
        if self.reject_late(ContributionKind::Mutation, key) {
            return;
        }
        debug!(key, "Adding mutation options");
        self.store.write().add_mutation_options(key, options);
    }

    pub fn add_query_options(&self, key: &str, options: O) {
        if self.reject_late(ContributionKind::Query, key) {
            return;
        }
        debug!(key, "Adding query options");
        self.store.write().add_query_options(key, options);
    }

    /// Register every contribution of `extension`.
    pub fn add(&self, extension: Extension<O>) {
        for (key, document) in extension.fragments.into_iter().flatten() {
            self.add_fragment(&key, document);
        }
        for (key, options) in extension.mutations.into_iter().flatten() {
            self.add_mutation_options(&key, options);
        }
        for (key, options) in extension.queries.into_iter().flatten() {
            self.add_query_options(&key, options);
        }
    }

    /// Snapshot of the fragment group registered under `key`.
    pub fn fragment_group(&self, key: &str) -> Option<FragmentGroup> {
        self.ensure_initialized();
        self.store.read().fragment_group(key).cloned()
    }

    /// Registered fragment keys, sorted.
    pub fn fragment_keys(&self) -> Vec<String> {
        self.ensure_initialized();
        let mut keys: Vec<String> = self.store.read().fragment_keys().map(String::from).collect();
        keys.sort();
        keys
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Drain recorded diagnostics.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        warn!(%diagnostic, "Fragment registry diagnostic");
        self.diagnostics.lock().push(diagnostic);
    }

    fn report_all(&self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    fn reject_late(&self, kind: ContributionKind, key: &str) -> bool {
        if !self.is_initialized() {
            return false;
        }
        self.report(Diagnostic::LateContribution {
            kind,
            key: key.to_string(),
        });
        true
    }
}

impl<O: Clone> FragmentRegistry<O> {
    /// Every mutation option contributed for `key`, in contribution order.
    /// Empty when nothing was registered.
    pub fn mutation_options(&self, key: &str) -> Vec<O> {
        self.ensure_initialized();
        self.store.read().mutation_options(key).to_vec()
    }

    /// Every query option contributed for `key`, in contribution order.
    /// Empty when nothing was registered.
    pub fn query_options(&self, key: &str) -> Vec<O> {
        self.ensure_initialized();
        self.store.read().query_options(key).to_vec()
    }
}

/// Builder for [`FragmentRegistry`].
pub struct FragmentRegistryBuilder<O> {
    settings: RegistrySettings,
    builtins: Vec<(String, Document)>,
    plugins: Box<dyn PluginSource<O>>,
    slots: Box<dyn SlotSource>,
}

impl<O: Clone + Send + Sync + 'static> FragmentRegistryBuilder<O> {
    pub fn new() -> Self {
        Self {
            settings: RegistrySettings::default(),
            builtins: Vec::new(),
            plugins: Box::new(StaticPlugins::<O>::default()),
            slots: Box::new(NoSlots),
        }
    }
}

impl<O: Clone + Send + Sync + 'static> Default for FragmentRegistryBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> FragmentRegistryBuilder<O> {
    pub fn settings(mut self, settings: RegistrySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Framework fragment registered ahead of all plugins.
    pub fn builtin_fragment(mut self, key: impl Into<String>, document: Document) -> Self {
        self.builtins.push((key.into(), document));
        self
    }

    pub fn plugins(mut self, plugins: impl PluginSource<O> + 'static) -> Self {
        self.plugins = Box::new(plugins);
        self
    }

    pub fn slots(mut self, slots: impl SlotSource + 'static) -> Self {
        self.slots = Box::new(slots);
        self
    }

    pub fn build(self) -> FragmentRegistry<O> {
        FragmentRegistry {
            settings: self.settings,
            builtins: self.builtins,
            plugins: self.plugins,
            slots: self.slots,
            store: RwLock::new(ContributionStore::new()),
            initialized: AtomicBool::new(false),
            diagnostics: Mutex::new(Vec::new()),
        }
    }
}
