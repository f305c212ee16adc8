//! Snapshot aggregation
//!
//! Rebuilds the grouped overlay from the registry's cached entry state.
//! Every pass starts from nothing, so lines from targets that disappeared
//! can never leak into a later snapshot.

use std::collections::BTreeMap;

use crate::registry::TargetRegistry;
use crate::types::{OverlayGroup, OverlayLine, OverlaySnapshot};

/// Build a fresh grouped snapshot
///
/// Groups are ordered by name (byte-wise). Inside a group, lines keep
/// target order, then plan order.
pub fn aggregate(registry: &TargetRegistry) -> OverlaySnapshot {
    let mut groups: BTreeMap<&str, Vec<OverlayLine>> = BTreeMap::new();

    for target in registry.targets() {
        let plan = target.plan();
        for (entry, state) in plan.entries.iter().zip(target.states()) {
            let group = if entry.group.trim().is_empty() {
                plan.display_name.as_str()
            } else {
                entry.group.as_str()
            };
            groups.entry(group).or_default().push(OverlayLine {
                label: entry.label.clone(),
                value: state.last_value.clone(),
                had_error: state.had_error,
            });
        }
    }

    OverlaySnapshot {
        groups: groups
            .into_iter()
            .map(|(name, lines)| OverlayGroup {
                name: name.to_string(),
                lines,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::WatchSpec;
    use crate::instance::Instance;
    use crate::plan::{TypeShape, WatchCatalog, Watchable};
    use crate::test_utils::{Counter, Flaky, FrameStats, test_catalog};
    use crate::types::ERROR_SENTINEL;

    #[test]
    fn test_worked_example() {
        let mut registry = TargetRegistry::new(test_catalog());
        let stats = Instance::new(FrameStats { f: 3.5, fps: 60 });
        registry.register(&stats);

        let snapshot = aggregate(&registry);
        assert_eq!(
            snapshot,
            OverlaySnapshot {
                groups: vec![
                    OverlayGroup {
                        name: "FrameStats".to_string(),
                        lines: vec![OverlayLine::new("FPS", "60", false)],
                    },
                    OverlayGroup {
                        name: "Stats".to_string(),
                        lines: vec![OverlayLine::new("F", "3.5", false)],
                    },
                ],
            }
        );
    }

    #[test]
    fn test_lines_follow_target_order_not_alphabet() {
        let mut registry = TargetRegistry::new(test_catalog());
        let a = Instance::new(Counter {
            value: 2,
            ratio: 0.0,
        });
        let b = Instance::new(Counter {
            value: 1,
            ratio: 0.0,
        });
        registry.register(&a);
        registry.register(&b);

        let snapshot = aggregate(&registry);
        let counters = snapshot.group("Counters").unwrap();
        let labels: Vec<_> = counters
            .lines
            .iter()
            .map(|l| (l.label.as_str(), l.value.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("value", "2"),
                ("ratio", "0.00"),
                ("value", "1"),
                ("ratio", "0.00")
            ]
        );
    }

    #[test]
    fn test_groups_sorted_ordinally() {
        struct Mixed;
        impl Watchable for Mixed {
            fn describe(shape: &mut TypeShape<Self>) {
                shape
                    .field("x", WatchSpec::new().group("beta"), |_| 1)
                    .field("y", WatchSpec::new().group("Alpha"), |_| 1)
                    .field("z", WatchSpec::new().group("  "), |_| 1);
            }
        }

        let mut catalog = WatchCatalog::new();
        catalog.register::<Mixed>();
        let mut registry = TargetRegistry::new(catalog);
        let mixed = Instance::new(Mixed);
        registry.register(&mixed);

        let names: Vec<_> = aggregate(&registry)
            .groups
            .into_iter()
            .map(|g| g.name)
            .collect();
        // Blank group falls back to the type name
        assert_eq!(names, vec!["Alpha", "Mixed", "beta"]);
    }

    #[test]
    fn test_errors_are_carried() {
        let mut registry = TargetRegistry::new(test_catalog());
        let flaky = Instance::new(Flaky {
            broken: true,
            ..Flaky::default()
        });
        registry.register(&flaky);

        let snapshot = aggregate(&registry);
        let line = &snapshot.group("Flaky").unwrap().lines[1];
        assert_eq!(line.label, "b_checked");
        assert_eq!(line.value, ERROR_SENTINEL);
        assert!(line.had_error);
    }

    #[test]
    fn test_empty_registry_gives_empty_snapshot() {
        let registry = TargetRegistry::new(test_catalog());
        assert!(aggregate(&registry).is_empty());
    }
}
