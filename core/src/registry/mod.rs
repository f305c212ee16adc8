//! Target registry
//!
//! Tracks the live instances being watched. Each distinct instance gets one
//! [`Target`] holding a weak handle, its type plan and the cached display
//! state of every entry.

mod target;

pub use target::Target;

use std::rc::Rc;

use hashbrown::HashSet;

use crate::instance::{Instance, InstanceId};
use crate::plan::{PlanCache, TypePlan, WatchCatalog};

/// Registry behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Sample a new target immediately on registration so the first
    /// rendered frame is never blank
    pub eager_refresh: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            eager_refresh: true,
        }
    }
}

/// Registry of watched targets
///
/// Not thread-safe by construction: all operations are expected on the
/// host's frame thread, one tick at a time.
#[derive(Default)]
pub struct TargetRegistry {
    catalog: WatchCatalog,
    plans: PlanCache,
    /// Targets in registration order
    targets: Vec<Target>,
    /// Identities currently present in `targets`
    ids: HashSet<InstanceId>,
    options: RegistryOptions,
}

impl TargetRegistry {
    /// Create an empty registry over a catalog of watchable types
    pub fn new(catalog: WatchCatalog) -> Self {
        Self::with_options(catalog, RegistryOptions::default())
    }

    /// Create an empty registry with explicit options
    pub fn with_options(catalog: WatchCatalog, options: RegistryOptions) -> Self {
        Self {
            catalog,
            options,
            ..Self::default()
        }
    }

    /// Watchable type catalog
    pub fn catalog(&self) -> &WatchCatalog {
        &self.catalog
    }

    /// Mutable access to the catalog (for late type registration)
    pub fn catalog_mut(&mut self) -> &mut WatchCatalog {
        &mut self.catalog
    }

    /// Current options
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Resolve (building if needed) the plan for an instance's type
    pub fn plan_for(&mut self, instance: &Instance) -> Rc<TypePlan> {
        self.plans
            .resolve(&self.catalog, instance.type_id(), instance.type_name())
    }

    /// Start watching an instance
    ///
    /// Returns true if a new target was created. Invalid instances, types
    /// with nothing watchable and already registered instances are ignored.
    pub fn register(&mut self, instance: &Instance) -> bool {
        if !instance.is_valid() {
            return false;
        }

        let plan = self.plan_for(instance);
        if plan.is_empty() {
            return false;
        }

        let id = instance.id();
        if self.ids.contains(&id) {
            return false;
        }

        let mut target = Target::new(instance.downgrade(), plan);
        if self.options.eager_refresh {
            target.refresh();
        }

        tracing::debug!(
            "watch: registered {} ({} entries)",
            target.plan().display_name,
            target.states().len()
        );

        self.ids.insert(id);
        self.targets.push(target);
        true
    }

    /// Stop watching an instance
    ///
    /// Removes every target with the instance's identity and returns how
    /// many were removed.
    pub fn unregister(&mut self, instance: &Instance) -> usize {
        self.unregister_id(instance.id())
    }

    /// Stop watching an instance by identity
    pub fn unregister_id(&mut self, id: InstanceId) -> usize {
        let before = self.targets.len();
        self.targets.retain(|t| t.id() != id);
        self.ids.remove(&id);
        before - self.targets.len()
    }

    /// Drop every target whose instance is no longer alive
    ///
    /// Liveness is evaluated now, not cached. Returns the number removed.
    pub fn prune_dead(&mut self) -> usize {
        let mut removed = 0;
        // Reverse index walk: removal never shifts an unvisited element
        for i in (0..self.targets.len()).rev() {
            if !self.targets[i].is_alive() {
                let target = self.targets.remove(i);
                self.ids.remove(&target.id());
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!("watch: pruned {removed} dead target(s)");
        }
        removed
    }

    /// Resample every target
    pub fn refresh_all(&mut self) {
        for target in &mut self.targets {
            target.refresh();
        }
    }

    /// Drop all targets, and optionally every cached plan
    pub fn reset(&mut self, clear_plans: bool) {
        let dropped = self.targets.len();
        self.targets.clear();
        self.ids.clear();
        if clear_plans {
            self.plans.clear();
        }
        tracing::debug!("watch: reset registry ({dropped} target(s), clear_plans={clear_plans})");
    }

    /// Check if an instance is being watched
    pub fn contains(&self, instance: &Instance) -> bool {
        self.ids.contains(&instance.id())
    }

    /// Targets in registration order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Cached plans
    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if nothing is being watched
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
