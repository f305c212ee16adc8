//! A single watched instance and its cached entry state

use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::AccessorError;
use crate::format::format_value;
use crate::instance::{InstanceId, WeakInstance};
use crate::plan::TypePlan;
use crate::types::EntryState;

/// A registered instance plus the display state of each plan entry
#[derive(Debug)]
pub struct Target {
    instance: WeakInstance,
    plan: Rc<TypePlan>,
    /// Parallel to `plan.entries`
    states: SmallVec<[EntryState; 8]>,
}

impl Target {
    pub(crate) fn new(instance: WeakInstance, plan: Rc<TypePlan>) -> Self {
        let states = (0..plan.entries.len()).map(|_| EntryState::default()).collect();
        Self {
            instance,
            plan,
            states,
        }
    }

    /// Identity of the watched instance
    pub fn id(&self) -> InstanceId {
        self.instance.id()
    }

    /// Whether the watched instance is still alive
    pub fn is_alive(&self) -> bool {
        self.instance.is_alive()
    }

    /// Plan shared with every other target of the same type
    pub fn plan(&self) -> &TypePlan {
        &self.plan
    }

    /// Cached state of each entry, in plan order
    pub fn states(&self) -> &[EntryState] {
        &self.states
    }

    /// Resample every entry
    ///
    /// Each entry succeeds or fails on its own; returns the number of
    /// entries that failed.
    pub(crate) fn refresh(&mut self) -> usize {
        let cell = self.instance.upgrade();
        let guard = cell.as_ref().map(|cell| cell.try_borrow());

        let mut failures = 0;
        for (entry, state) in self.plan.entries.iter().zip(self.states.iter_mut()) {
            let sample = if entry.getter.is_static() {
                entry.getter.read(&())
            } else {
                match &guard {
                    Some(Ok(value)) => entry.getter.read(&**value),
                    Some(Err(_)) => Err(AccessorError::Borrowed),
                    None => Err(AccessorError::InstanceGone),
                }
            };

            match sample {
                Ok(value) => state.set_value(format_value(&value, &entry.format)),
                Err(err) => {
                    tracing::trace!(
                        "watch: {}.{} failed: {err}",
                        self.plan.display_name,
                        entry.label
                    );
                    state.set_error();
                    failures += 1;
                }
            }
        }
        failures
    }
}
