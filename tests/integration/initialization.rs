//! Initialization gate behaviour: laziness, single pass, read-only afterwards.

use super::test_utils::doc;
use fragment_registry::{ContributionKind, Diagnostic, Extension, FragmentRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

#[test]
fn test_nothing_happens_before_first_read() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let registry: FragmentRegistry<u32> = FragmentRegistry::builder()
        .plugins(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Vec::new()
        })
        .build();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!registry.is_initialized());

    registry.fragment_document("Anything");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_contributions_appear_exactly_once() {
    let registry: FragmentRegistry<u32> = FragmentRegistry::builder()
        .builtin_fragment("UserFragment", doc("fragment UserFragment on User { name }"))
        .plugins(|| {
            vec![Extension::new()
                .with_fragment("PostFields", doc("fragment PostTitle on Post { title }"))
                .with_query("Posts", 1)]
        })
        .build();

    for _ in 0..5 {
        registry.query_options("Posts");
        registry.mutation_options("Posts");
        registry.fragment_document("PostFields");
        registry.resolve_fragments(&doc("{ ...UserFragment }"));
    }

    assert_eq!(registry.query_options("Posts"), vec![1]);
    assert_eq!(registry.fragment_group("UserFragment").unwrap().names.len(), 1);
    assert_eq!(registry.fragment_group("PostFields").unwrap().names.len(), 1);
    assert_eq!(registry.fragment_keys(), vec!["PostFields", "UserFragment"]);
}

#[test]
fn test_plugin_reading_during_discovery_does_not_recurse() {
    let handle: Arc<OnceLock<Weak<FragmentRegistry<u32>>>> = Arc::new(OnceLock::new());
    let seen = Arc::new(AtomicUsize::new(usize::MAX));

    let plugin_handle = Arc::clone(&handle);
    let plugin_seen = Arc::clone(&seen);
    let registry: Arc<FragmentRegistry<u32>> = Arc::new(
        FragmentRegistry::builder()
            .builtin_fragment("Builtin", doc("fragment Builtin on Query { ok }"))
            .plugins(move || {
                if let Some(registry) = plugin_handle.get().and_then(Weak::upgrade) {
                    // Initialization is already marked complete; this read
                    // sees only what was registered so far.
                    plugin_seen.store(registry.fragment_keys().len(), Ordering::SeqCst);
                }
                vec![Extension::new().with_query("Late", 7)]
            })
            .build(),
    );
    handle.set(Arc::downgrade(&registry)).unwrap();

    assert_eq!(registry.query_options("Late"), vec![7]);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_add_after_initialization_is_ignored() {
    let registry: FragmentRegistry<u32> = FragmentRegistry::new();
    registry.add_query_options("Posts", 1);
    assert_eq!(registry.query_options("Posts"), vec![1]);

    registry.add_query_options("Posts", 2);
    registry.add(
        Extension::new()
            .with_fragment("K", doc("fragment F on User { id }"))
            .with_mutation("M", 3),
    );

    assert_eq!(registry.query_options("Posts"), vec![1]);
    assert!(registry.mutation_options("M").is_empty());
    assert!(registry.fragment_document("K").is_none());

    let kinds: Vec<ContributionKind> = registry
        .diagnostics()
        .into_iter()
        .filter_map(|diagnostic| match diagnostic {
            Diagnostic::LateContribution { kind, .. } => Some(kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ContributionKind::Query,
            ContributionKind::Fragment,
            ContributionKind::Mutation
        ]
    );
}

#[test]
fn test_registry_is_shareable_across_threads() {
    let registry: Arc<FragmentRegistry<u32>> = Arc::new(
        FragmentRegistry::builder()
            .plugins(|| vec![Extension::new().with_mutation("M", 1)])
            .build(),
    );
    registry.ensure_initialized();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.mutation_options("M"))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![1]);
    }
}
