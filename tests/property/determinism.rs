//! Property-based tests for ordering and determinism guarantees

use fragment_registry::{Document, Extension, FragmentRegistry, SlotTable, StaticPlugins};
use proptest::prelude::*;

fn fragment_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[A-Z][a-z]{1,6}Fields", 1..6)
        .prop_map(|names| names.into_iter().collect())
}

/// Contributions under one key are spread in contribution order.
#[test]
fn test_spread_order_follows_contribution_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&fragment_names(), |names| {
            let registry: FragmentRegistry<()> = FragmentRegistry::new();
            for name in &names {
                let source = format!("fragment {} on User {{ id }}", name);
                registry.add_fragment("Key", Document::parse(&source).unwrap());
            }

            let document = registry.fragment_document("Key").unwrap();
            prop_assert_eq!(document.fragment_spreads(), names.clone());

            let mut expected = vec!["Key".to_string()];
            expected.extend(names);
            prop_assert_eq!(document.fragment_names(), expected);
            Ok(())
        })
        .unwrap();
}

/// Splitting the same contributions across plugins does not change the result.
#[test]
fn test_plugin_boundaries_do_not_affect_order() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(fragment_names(), 0usize..6), |(names, split)| {
            let split = split.min(names.len());
            let extension = |names: &[String]| {
                names.iter().fold(Extension::<()>::new(), |extension, name| {
                    let source = format!("fragment {} on Post {{ id }}", name);
                    extension.with_fragment(name.clone(), Document::parse(&source).unwrap())
                })
            };
            let keyed = |names: &[String]| {
                names
                    .iter()
                    .map(|name| {
                        let source = format!("fragment {} on Post {{ id }}", name);
                        Extension::<()>::new()
                            .with_fragment("Post", Document::parse(&source).unwrap())
                    })
                    .collect::<Vec<_>>()
            };

            let one_plugin: FragmentRegistry<()> = FragmentRegistry::builder()
                .plugins(StaticPlugins::new(vec![extension(&names)]))
                .build();
            let many_plugins: FragmentRegistry<()> = FragmentRegistry::builder()
                .plugins(StaticPlugins::new(keyed(&names)))
                .build();
            let split_plugins: FragmentRegistry<()> = FragmentRegistry::builder()
                .plugins(StaticPlugins::new(
                    keyed(&names[..split])
                        .into_iter()
                        .chain(keyed(&names[split..]))
                        .collect(),
                ))
                .build();

            prop_assert_eq!(one_plugin.fragment_keys().len(), names.len());
            let many = many_plugins.fragment_document("Post").unwrap();
            let halves = split_plugins.fragment_document("Post").unwrap();
            prop_assert_eq!(many.source(), halves.source());
            prop_assert_eq!(many.fragment_spreads(), names);
            Ok(())
        })
        .unwrap();
}

/// Resolving an already resolved document changes nothing.
#[test]
fn test_resolve_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(any::<bool>(), 1..5),
                prop::collection::vec(any::<bool>(), 1..5),
            ),
            |(registered, filled)| {
                let mut slots = SlotTable::new();
                for (index, fill) in filled.iter().enumerate() {
                    if *fill {
                        let source = format!("fragment SlotPart{} on Bar {{ f{} }}", index, index);
                        slots.insert(
                            format!("part{}", index),
                            "Bar",
                            Document::parse(&source).unwrap(),
                        );
                    }
                }
                let registry: FragmentRegistry<()> =
                    FragmentRegistry::builder().slots(slots).build();
                for (index, register) in registered.iter().enumerate() {
                    if *register {
                        let source = format!("fragment Part{} on User {{ f{} }}", index, index);
                        registry.add_fragment(&format!("Key{}", index), Document::parse(&source).unwrap());
                    }
                }

                let user_spreads: String = (0..registered.len())
                    .map(|index| format!(" ...Key{}", index))
                    .collect();
                let slot_spreads: String = (0..filled.len())
                    .map(|index| format!(" ...Slot_Part{}_Bar", index))
                    .collect();
                let query = Document::parse(&format!(
                    "query Q {{ user {{ id{} }} bar {{ id{} }} }}",
                    user_spreads, slot_spreads
                ))
                .unwrap();

                let once = registry.resolve_fragments(&query);
                let twice = registry.resolve_fragments(&once);
                prop_assert_eq!(once.source(), twice.source());

                for (index, fill) in filled.iter().enumerate() {
                    let slot_key = format!("Slot_Part{}_Bar", index);
                    prop_assert_eq!(
                        once.fragment_names().contains(&slot_key.as_str()),
                        *fill
                    );
                    prop_assert_eq!(
                        once.fragment_spreads().contains(&slot_key),
                        *fill
                    );
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Merging a document with itself yields the document.
#[test]
fn test_merge_is_idempotent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&fragment_names(), |names| {
            let source: String = names
                .iter()
                .map(|name| format!("fragment {} on User {{ id }}\n", name))
                .collect();
            let document = Document::parse(&source).unwrap();

            let merged = Document::merge([&document, &document]);
            prop_assert_eq!(merged.fragment_names(), document.fragment_names());
            prop_assert_eq!(merged.definitions(), document.definitions());
            Ok(())
        })
        .unwrap();
}

/// No slot spread survives resolution without a definition, wherever it was
/// spread from.
#[test]
fn test_resolved_slot_spreads_are_defined() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                prop::collection::vec(any::<bool>(), 1..5),
                prop::collection::vec(prop::collection::vec(0usize..5, 0..4), 1..4),
            ),
            |(filled, contributions)| {
                let slot_key = |index: usize| format!("Slot_Part{}_User", index);

                let mut slots = SlotTable::new();
                for (index, fill) in filled.iter().enumerate() {
                    if *fill {
                        let source = format!(
                            "fragment SlotPart{} on User {{ s{} ...{} }}",
                            index,
                            index,
                            slot_key((index + 1) % filled.len())
                        );
                        slots.insert(
                            format!("part{}", index),
                            "User",
                            Document::parse(&source).unwrap(),
                        );
                    }
                }
                let registry: FragmentRegistry<()> =
                    FragmentRegistry::builder().slots(slots).build();

                let mut query_spreads = String::new();
                for (index, slot_refs) in contributions.iter().enumerate() {
                    let spreads: String = slot_refs
                        .iter()
                        .map(|slot| format!(" ...{}", slot_key(slot % filled.len())))
                        .collect();
                    let source = format!("fragment Part{} on User {{ id{} }}", index, spreads);
                    registry.add_fragment(&format!("Key{}", index), Document::parse(&source).unwrap());
                    query_spreads.push_str(&format!(" ...Key{}", index));
                }

                let query = Document::parse(&format!(
                    "query Q {{ user {{ id{} ...{} }} }}",
                    query_spreads,
                    slot_key(0)
                ))
                .unwrap();
                let resolved = registry.resolve_fragments(&query);

                let defined = resolved.fragment_names();
                for spread in resolved.fragment_spreads() {
                    if spread.starts_with("Slot_") {
                        prop_assert!(defined.contains(&spread.as_str()), "dangling {}", spread);
                    }
                }
                for (index, fill) in filled.iter().enumerate() {
                    if !*fill {
                        prop_assert!(!resolved.source().unwrap().contains(&slot_key(index)));
                    }
                }
                Ok(())
            },
        )
        .unwrap();
}
