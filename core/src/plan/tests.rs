//! Tests for plan building and caching

#![cfg(test)]

use std::any::TypeId;
use std::rc::Rc;

use super::{MemberDecl, MemberKind, PlanBuilder, PlanCache, TypePlan, TypeShape, WatchCatalog, Watchable, short_type_name};
use crate::accessor::Getter;
use crate::annotation::WatchSpec;
use crate::test_utils::{Counter, FrameStats};
use crate::types::WatchValue;

fn labels(plan: &TypePlan) -> Vec<&str> {
    plan.entries.iter().map(|e| e.label.as_str()).collect()
}

#[test]
fn test_worked_example_ordering() {
    let plan = PlanBuilder::build::<FrameStats>();
    assert_eq!(plan.display_name, "FrameStats");
    // "" sorts before "Stats"
    assert_eq!(labels(&plan), vec!["FPS", "F"]);
    assert_eq!(plan.entries[0].group, "");
    assert_eq!(plan.entries[1].group, "Stats");
}

#[test]
fn test_build_is_deterministic() {
    let a = PlanBuilder::build::<Counter>();
    let b = PlanBuilder::build::<Counter>();
    assert_eq!(a.len(), b.len());
    for (x, y) in a.entries.iter().zip(&b.entries) {
        assert_eq!(x.label, y.label);
        assert_eq!(x.group, y.group);
        assert_eq!(x.order, y.order);
        assert_eq!(x.format, y.format);
    }
}

struct Sorted;

impl Watchable for Sorted {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .field("b", WatchSpec::new().group("Z").order(0), |_| 0)
            .field("a", WatchSpec::new().group("Z").order(0), |_| 0)
            .field("first", WatchSpec::new().group("Z").order(-1), |_| 0)
            .field("lower", WatchSpec::new().group("a"), |_| 0)
            .field("upper", WatchSpec::new().group("B"), |_| 0)
            .field("late", WatchSpec::new().group("B").order(10), |_| 0)
            .field("early", WatchSpec::new().group("B").order(2), |_| 0);
    }
}

#[test]
fn test_sort_by_group_order_label_ordinal() {
    let plan = PlanBuilder::build::<Sorted>();
    // Byte-wise: "B" < "Z" < "a"; numeric order before label
    assert_eq!(
        labels(&plan),
        vec!["upper", "early", "late", "first", "a", "b", "lower"]
    );
}

struct Shapes;

impl Watchable for Shapes {
    fn describe(shape: &mut TypeShape<Self>) {
        let getter = || Getter::type_level(|| Ok(WatchValue::from(1)));
        let spec = WatchSpec::new;

        shape
            .member(MemberDecl::field("plain", getter()).watch(spec()))
            .member(MemberDecl::field("not_watched", getter()))
            .member(MemberDecl::field("backing", getter()).synthesized().watch(spec()))
            .member(MemberDecl::property("computed", Some(getter())).watch(spec()))
            .member(MemberDecl::property("write_only", None).watch(spec()))
            .member(
                MemberDecl::property("indexed", Some(getter()))
                    .kind(MemberKind::Property {
                        indexed: true,
                        generic: false,
                    })
                    .watch(spec()),
            )
            .member(
                MemberDecl::property("generic_prop", Some(getter()))
                    .kind(MemberKind::Property {
                        indexed: false,
                        generic: true,
                    })
                    .watch(spec()),
            )
            .member(MemberDecl::method("query", getter()).watch(spec()))
            .member(
                MemberDecl::method("with_args", getter())
                    .kind(MemberKind::Method {
                        params: 2,
                        generic: false,
                        returns_value: true,
                    })
                    .watch(spec()),
            )
            .member(
                MemberDecl::method("generic_fn", getter())
                    .kind(MemberKind::Method {
                        params: 0,
                        generic: true,
                        returns_value: true,
                    })
                    .watch(spec()),
            )
            .member(
                MemberDecl::method("side_effect", getter())
                    .kind(MemberKind::Method {
                        params: 0,
                        generic: false,
                        returns_value: false,
                    })
                    .watch(spec()),
            );
    }
}

#[test]
fn test_eligibility_rules() {
    let plan = PlanBuilder::build::<Shapes>();
    assert_eq!(labels(&plan), vec!["computed", "plain", "query"]);
}

#[test]
fn test_blank_label_uses_member_name() {
    struct Blank;
    impl Watchable for Blank {
        fn describe(shape: &mut TypeShape<Self>) {
            shape
                .field("raw", WatchSpec::new().label("   "), |_| 1)
                .field("named", WatchSpec::new().label("Nice Name"), |_| 1);
        }
    }

    let plan = PlanBuilder::build::<Blank>();
    assert_eq!(labels(&plan), vec!["Nice Name", "raw"]);
}

struct Body {
    mass: f32,
}

impl Watchable for Body {
    fn describe(shape: &mut TypeShape<Self>) {
        shape.field("mass", WatchSpec::new().group("Physics"), |b| b.mass);
    }
}

struct Actor {
    body: Body,
    name: &'static str,
}

impl Watchable for Actor {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .inherit(|a: &Actor| &a.body)
            .field("name", WatchSpec::new(), |a| a.name);
    }
}

struct Hero {
    actor: Actor,
    level: u32,
}

impl Watchable for Hero {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .inherit(|h: &Hero| &h.actor)
            .field("level", WatchSpec::new(), |h| h.level);
    }
}

#[test]
fn test_ancestry_is_walked() {
    let plan = PlanBuilder::build::<Hero>();
    assert_eq!(labels(&plan), vec!["level", "name", "mass"]);

    let hero = Hero {
        actor: Actor {
            body: Body { mass: 80.0 },
            name: "ada",
        },
        level: 3,
    };
    let mass = plan.entries[2].getter.read(&hero).unwrap();
    assert!(matches!(mass, WatchValue::F32(v) if v == 80.0));
    let name = plan.entries[1].getter.read(&hero).unwrap();
    assert!(matches!(name, WatchValue::Text(ref s) if s == "ada"));
}

#[test]
fn test_static_member_ignores_instance() {
    struct Global;
    impl Watchable for Global {
        fn describe(shape: &mut TypeShape<Self>) {
            shape.static_field("build", WatchSpec::new(), || "debug");
        }
    }

    let plan = PlanBuilder::build::<Global>();
    assert!(plan.entries[0].getter.is_static());
    assert!(plan.entries[0].getter.read(&0u8).is_ok());
}

#[test]
fn test_cache_builds_once() {
    let mut catalog = WatchCatalog::new();
    catalog.register::<Counter>();
    let mut cache = PlanCache::new();

    let a = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    let b = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    assert!(Rc::ptr_eq(&a, &b));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    let c = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    assert!(!Rc::ptr_eq(&a, &c));
    assert_eq!(labels(&a), labels(&c));
}

#[test]
fn test_unknown_type_gets_empty_plan() {
    let catalog = WatchCatalog::new();
    let mut cache = PlanCache::new();
    let plan = cache.resolve(&catalog, TypeId::of::<String>(), "alloc::string::String");
    assert!(plan.is_empty());
    assert_eq!(plan.display_name, "String");
    assert!(cache.get(TypeId::of::<String>()).is_some());
}

#[test]
fn test_late_catalog_entry_replaces_empty_plan() {
    let mut catalog = WatchCatalog::new();
    let mut cache = PlanCache::new();

    let before = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    assert!(before.is_empty());

    catalog.register::<Counter>();
    let after = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    assert!(!after.is_empty());
    assert_eq!(labels(&after), labels(&PlanBuilder::build::<Counter>()));

    // Built once, then served from the cache again
    let again = cache.resolve(&catalog, TypeId::of::<Counter>(), "Counter");
    assert!(Rc::ptr_eq(&after, &again));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_panicking_describe_is_contained() {
    struct Broken;
    impl Watchable for Broken {
        fn describe(_: &mut TypeShape<Self>) {
            panic!("bad table");
        }
    }

    let mut catalog = WatchCatalog::new();
    catalog.register::<Broken>();
    let mut cache = PlanCache::new();
    let plan = cache.resolve(&catalog, TypeId::of::<Broken>(), "Broken");
    assert!(plan.is_empty());
}

#[test]
fn test_short_type_name() {
    assert_eq!(short_type_name("game::player::Player"), "Player");
    assert_eq!(
        short_type_name("game::Pool<game::enemy::Enemy>"),
        "Pool<Enemy>"
    );
    assert_eq!(
        short_type_name("std::collections::HashMap<u32, alloc::string::String>"),
        "HashMap<u32, String>"
    );
    assert_eq!(short_type_name("Plain"), "Plain");
}
