//! Plan catalog and per-type plan cache

use std::any::TypeId;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use super::{PlanBuilder, TypePlan, Watchable, short_type_name};
use crate::error::catch_quietly;

type PlanFactory = fn() -> TypePlan;

/// Table of watchable types known to the process
///
/// This replaces runtime reflection: a type only produces a non-empty plan
/// once it has been registered here.
#[derive(Default, Clone)]
pub struct WatchCatalog {
    factories: HashMap<TypeId, PlanFactory>,
}

impl WatchCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `T` watchable
    pub fn register<T: Watchable>(&mut self) -> &mut Self {
        self.factories.insert(TypeId::of::<T>(), PlanBuilder::build::<T>);
        self
    }

    /// Check if a type is known
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.factories.contains_key(&type_id)
    }

    /// Number of known types
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    fn factory(&self, type_id: TypeId) -> Option<PlanFactory> {
        self.factories.get(&type_id).copied()
    }
}

/// Built plans, keyed by concrete type
#[derive(Default)]
pub struct PlanCache {
    plans: HashMap<TypeId, Rc<TypePlan>>,
    /// Types whose cached plan was made while they were missing from the catalog
    uncataloged: HashSet<TypeId>,
}

impl PlanCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for a type, building it on first use
    ///
    /// Types missing from the catalog get an empty plan, which is cached as
    /// well until the type shows up in the catalog. A panic inside a type's
    /// `describe` is contained here and also yields an empty plan.
    pub fn resolve(
        &mut self,
        catalog: &WatchCatalog,
        type_id: TypeId,
        type_name: &str,
    ) -> Rc<TypePlan> {
        if let Some(plan) = self.plans.get(&type_id) {
            let stale = self.uncataloged.contains(&type_id) && catalog.contains(type_id);
            if !stale {
                return Rc::clone(plan);
            }
            self.uncataloged.remove(&type_id);
        }

        let plan = match catalog.factory(type_id) {
            Some(factory) => match catch_quietly(factory) {
                Ok(plan) => plan,
                Err(msg) => {
                    tracing::warn!("watch: building plan for {type_name} panicked: {msg}");
                    TypePlan::empty(short_type_name(type_name))
                }
            },
            None => {
                self.uncataloged.insert(type_id);
                TypePlan::empty(short_type_name(type_name))
            }
        };

        if !plan.is_empty() {
            tracing::debug!(
                "watch: built plan for {} ({} entries)",
                plan.display_name,
                plan.len()
            );
        }

        let plan = Rc::new(plan);
        self.plans.insert(type_id, Rc::clone(&plan));
        plan
    }

    /// Look up a plan without building it
    pub fn get(&self, type_id: TypeId) -> Option<Rc<TypePlan>> {
        self.plans.get(&type_id).cloned()
    }

    /// Drop every cached plan
    pub fn clear(&mut self) {
        self.plans.clear();
        self.uncataloged.clear();
    }

    /// Number of cached plans
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
