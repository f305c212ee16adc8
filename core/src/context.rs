//! Process-scoped watch context
//!
//! Owns the registry, the refresh scheduler and the latest snapshot. There
//! is exactly one of these per host process, created at start-up and reset
//! on lifecycle boundaries.
//!
//! # Threading
//!
//! The context is `!Send`: every call must happen on the host's frame
//! thread. Within one [`WatchContext::tick_at`] the order is always prune,
//! refresh, aggregate; the returned snapshot is then handed to the renderer.

use std::time::Instant;

use crate::aggregate::aggregate;
use crate::config::WatchConfig;
use crate::instance::Instance;
use crate::plan::WatchCatalog;
use crate::registry::{RegistryOptions, TargetRegistry};
use crate::scheduler::RefreshScheduler;
use crate::types::OverlaySnapshot;

/// Watch pipeline state for one host process
pub struct WatchContext {
    registry: TargetRegistry,
    scheduler: RefreshScheduler,
    snapshot: OverlaySnapshot,
    /// Origin of [`WatchContext::tick`]'s clock
    epoch: Instant,
}

impl WatchContext {
    /// Create a context over a catalog of watchable types
    pub fn new(catalog: WatchCatalog) -> Self {
        Self::with_options(catalog, RegistryOptions::default())
    }

    /// Create a context with explicit registry options
    pub fn with_options(catalog: WatchCatalog, options: RegistryOptions) -> Self {
        Self {
            registry: TargetRegistry::with_options(catalog, options),
            scheduler: RefreshScheduler::new(),
            snapshot: OverlaySnapshot::default(),
            epoch: Instant::now(),
        }
    }

    /// Create a context and apply the refresh settings from a config
    pub fn from_config(catalog: WatchCatalog, config: &WatchConfig) -> Self {
        let mut ctx = Self::new(catalog);
        ctx.apply_config(config);
        ctx
    }

    /// Apply refresh settings
    pub fn apply_config(&mut self, config: &WatchConfig) {
        self.scheduler.set_enabled(config.refresh.enabled);
        self.scheduler.set_interval(config.refresh.interval_secs);
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Start watching an instance
    pub fn register(&mut self, instance: &Instance) -> bool {
        self.registry.register(instance)
    }

    /// Stop watching an instance
    pub fn unregister(&mut self, instance: &Instance) -> usize {
        self.registry.unregister(instance)
    }

    /// Drop every target (and optionally every cached plan)
    ///
    /// Takes effect immediately: the current snapshot is emptied and the
    /// next tick refreshes without waiting for the throttle.
    pub fn reset(&mut self, clear_cached_plans: bool) {
        self.registry.reset(clear_cached_plans);
        self.snapshot = OverlaySnapshot::default();
        self.scheduler.rearm();
    }

    // =========================================================================
    // Refresh Settings
    // =========================================================================

    /// Whether ticks refresh anything
    pub fn is_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    /// Enable or disable refreshing
    pub fn set_enabled(&mut self, enabled: bool) {
        self.scheduler.set_enabled(enabled);
    }

    /// Configured refresh interval in seconds
    pub fn refresh_interval(&self) -> f32 {
        self.scheduler.interval()
    }

    /// Set the refresh interval (floored at 0.01s when applied)
    pub fn set_refresh_interval(&mut self, seconds: f32) {
        self.scheduler.set_interval(seconds);
    }

    // =========================================================================
    // Ticking
    // =========================================================================

    /// Tick using the context's own monotonic clock
    pub fn tick(&mut self) -> Option<&OverlaySnapshot> {
        let now = self.epoch.elapsed().as_secs_f64();
        self.tick_at(now)
    }

    /// Tick at host time `now` (seconds)
    ///
    /// Returns the freshly aggregated snapshot when a refresh pass ran, or
    /// `None` while throttled or disabled.
    pub fn tick_at(&mut self, now: f64) -> Option<&OverlaySnapshot> {
        if !self.scheduler.tick(now, &mut self.registry) {
            return None;
        }
        self.snapshot = aggregate(&self.registry);
        Some(&self.snapshot)
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> &OverlaySnapshot {
        &self.snapshot
    }

    /// Registry (read-only)
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Scheduler (read-only)
    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    /// Make additional types watchable
    pub fn catalog_mut(&mut self) -> &mut WatchCatalog {
        self.registry.catalog_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{Counter, FrameStats, test_catalog};
    use crate::types::OverlayLine;
    use crate::world::World;

    #[test]
    fn test_tick_produces_snapshot_once_per_interval() {
        let mut ctx = WatchContext::new(test_catalog());
        let stats = Instance::new(FrameStats { f: 3.5, fps: 60 });
        ctx.register(&stats);

        let snapshot = ctx.tick_at(0.0).cloned().unwrap();
        assert_eq!(
            snapshot.group("FrameStats").unwrap().lines,
            vec![OverlayLine::new("FPS", "60", false)]
        );
        assert_eq!(
            snapshot.group("Stats").unwrap().lines,
            vec![OverlayLine::new("F", "3.5", false)]
        );

        stats.borrow_mut::<FrameStats>().unwrap().fps = 30;
        assert!(ctx.tick_at(0.1).is_none());
        assert_eq!(ctx.snapshot(), &snapshot, "throttled ticks keep the cached snapshot");

        let next = ctx.tick_at(0.3).unwrap();
        assert_eq!(next.group("FrameStats").unwrap().lines[0].value, "30");
    }

    #[test]
    fn test_reset_empties_snapshot_immediately() {
        let mut ctx = WatchContext::new(test_catalog());
        let counter = Instance::new(Counter::default());
        ctx.register(&counter);
        ctx.tick_at(0.0);
        assert!(!ctx.snapshot().is_empty());

        ctx.reset(false);
        assert!(ctx.snapshot().is_empty());
        assert!(!ctx.registry().contains(&counter));

        // Rearmed: the next tick runs even inside the old window
        let next = ctx.tick_at(0.01).unwrap();
        assert!(next.is_empty());

        // Cached plans still serve re-registration
        assert_eq!(ctx.registry().plans().len(), 1);
        assert!(ctx.register(&counter));
    }

    #[test]
    fn test_destroyed_object_leaves_snapshot_after_one_tick() {
        let mut ctx = WatchContext::new(test_catalog());
        let mut world = World::new("level");
        let enemy = world.spawn("enemy");
        let counter = world.add_component(enemy, Counter::default()).unwrap();
        ctx.register(&counter);
        assert!(ctx.tick_at(0.0).unwrap().group("Counters").is_some());

        world.destroy(enemy);
        let snapshot = ctx.tick_at(1.0).unwrap();
        assert!(snapshot.group("Counters").is_none());
        assert!(ctx.registry().is_empty());
    }

    #[test]
    fn test_disabled_context_never_refreshes() {
        let mut ctx = WatchContext::new(test_catalog());
        ctx.set_enabled(false);
        let counter = Instance::new(Counter::default());
        ctx.register(&counter);
        assert!(ctx.tick_at(100.0).is_none());
        assert!(ctx.snapshot().is_empty());
    }

    #[test]
    fn test_from_config() {
        let mut config = WatchConfig::default();
        config.refresh.enabled = false;
        config.refresh.interval_secs = 1.5;

        let ctx = WatchContext::from_config(test_catalog(), &config);
        assert!(!ctx.is_enabled());
        assert_eq!(ctx.refresh_interval(), 1.5);
    }
}
