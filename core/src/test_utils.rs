//! Shared fixtures for unit tests

use crate::annotation::WatchSpec;
use crate::error::AccessorError;
use crate::plan::{TypeShape, WatchCatalog, Watchable};

// ============================================================================
// Fixture Types
// ============================================================================

/// Field `F` in group "Stats" plus an ungrouped `FPS` query
pub struct FrameStats {
    pub f: f32,
    pub fps: u32,
}

impl FrameStats {
    pub fn m(&self) -> u32 {
        self.fps
    }
}

impl Watchable for FrameStats {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .field("F", WatchSpec::new().group("Stats").label(""), |s| s.f)
            .method("M", WatchSpec::new().label("FPS"), FrameStats::m);
    }
}

/// Simple counter with a formatted ratio
#[derive(Default)]
pub struct Counter {
    pub value: i64,
    pub ratio: f32,
}

impl Watchable for Counter {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .field("value", WatchSpec::new().group("Counters"), |c| c.value)
            .property(
                "ratio",
                WatchSpec::new().group("Counters").order(1).format("F2"),
                |c| c.ratio,
            );
    }
}

/// Type with one getter that fails on demand, between two healthy ones
#[derive(Default)]
pub struct Flaky {
    pub before: i32,
    pub broken: bool,
    pub after: i32,
}

impl Watchable for Flaky {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .field("a_before", WatchSpec::new(), |f| f.before)
            .try_method("b_checked", WatchSpec::new(), |f| {
                if f.broken {
                    Err(AccessorError::failed("sensor offline"))
                } else {
                    Ok(1)
                }
            })
            .field("c_after", WatchSpec::new(), |f| f.after);
    }
}

/// Type whose getter panics on demand
#[derive(Default)]
pub struct Panicky {
    pub explode: bool,
}

impl Watchable for Panicky {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .method("fuse", WatchSpec::new(), |p| {
                if p.explode {
                    panic!("fuse blown");
                }
                "ok"
            })
            .field("status", WatchSpec::new(), |_| "steady");
    }
}

/// Type with nothing watchable
pub struct Inert;

impl Watchable for Inert {
    fn describe(_: &mut TypeShape<Self>) {}
}

/// Catalog with every fixture type registered
pub fn test_catalog() -> WatchCatalog {
    let mut catalog = WatchCatalog::new();
    catalog
        .register::<FrameStats>()
        .register::<Counter>()
        .register::<Flaky>()
        .register::<Panicky>()
        .register::<Inert>();
    catalog
}
