//! Host world model
//!
//! A generational arena of named objects, each carrying component
//! instances. Destroying an object bumps its slot generation, so every
//! [`ObjectRef`] and owned [`Instance`] that pointed at it reports dead
//! from then on, even if some other code still holds the component.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::discovery::ObjectSource;
use crate::error::DiscoveryError;
use crate::instance::Instance;

/// Generation-checked handle to a world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    /// Slot index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

struct WorldObject {
    name: String,
    active: bool,
    components: SmallVec<[Instance; 4]>,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    object: Option<WorldObject>,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl Arena {
    fn get(&self, handle: ObjectHandle) -> Option<&WorldObject> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_ref()
    }

    fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut WorldObject> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.object.as_mut()
    }
}

/// Non-owning reference to a world object
///
/// Liveness is checked lazily: the world may have destroyed the object, or
/// been dropped entirely, since the reference was taken.
#[derive(Clone)]
pub struct ObjectRef {
    arena: Weak<RefCell<Arena>>,
    handle: ObjectHandle,
}

impl ObjectRef {
    /// Handle this reference points at
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Whether the object still exists
    pub fn is_alive(&self) -> bool {
        let Some(arena) = self.arena.upgrade() else {
            return false;
        };
        let Ok(arena) = arena.try_borrow() else {
            // Only the world itself borrows mutably, and it never holds
            // the borrow across calls into the watch pipeline.
            return true;
        };
        arena.get(self.handle).is_some()
    }

    /// Name of the object, or `None` once it has been destroyed
    pub fn name(&self) -> Option<String> {
        let arena = self.arena.upgrade()?;
        let arena = arena.try_borrow().ok()?;
        arena.get(self.handle).map(|obj| obj.name.clone())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("handle", &self.handle)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && Weak::ptr_eq(&self.arena, &other.arena)
    }
}

/// A world of named, destructible objects
pub struct World {
    name: String,
    arena: Rc<RefCell<Arena>>,
}

impl World {
    /// Create an empty world
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arena: Rc::new(RefCell::new(Arena::default())),
        }
    }

    /// World name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn a new active object
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectHandle {
        let mut arena = self.arena.borrow_mut();
        let object = WorldObject {
            name: name.into(),
            active: true,
            components: SmallVec::new(),
        };

        if let Some(index) = arena.free.pop() {
            let slot = &mut arena.slots[index as usize];
            slot.object = Some(object);
            return ObjectHandle {
                index,
                generation: slot.generation,
            };
        }

        let index = arena.slots.len() as u32;
        arena.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        ObjectHandle {
            index,
            generation: 0,
        }
    }

    /// Attach a component to an object
    ///
    /// Returns the component's instance handle, or `None` if the object is
    /// gone.
    pub fn add_component<T: Any>(&mut self, handle: ObjectHandle, component: T) -> Option<Instance> {
        let owner = self.object_ref(handle);
        let mut arena = self.arena.borrow_mut();
        let object = arena.get_mut(handle)?;
        let instance = Instance::owned(component, owner);
        object.components.push(instance.clone());
        Some(instance)
    }

    /// Destroy an object, dropping its components
    ///
    /// Returns false if the handle was already stale.
    pub fn destroy(&mut self, handle: ObjectHandle) -> bool {
        let removed = {
            let mut arena = self.arena.borrow_mut();
            let Some(slot) = arena.slots.get_mut(handle.index as usize) else {
                return false;
            };
            if slot.generation != handle.generation || slot.object.is_none() {
                return false;
            }
            slot.generation = slot.generation.wrapping_add(1);
            let removed = slot.object.take();
            arena.free.push(handle.index);
            removed
        };
        // Components drop outside the borrow so their destructors may
        // query the world.
        drop(removed);
        true
    }

    /// Activate or deactivate an object
    pub fn set_active(&mut self, handle: ObjectHandle, active: bool) -> bool {
        let mut arena = self.arena.borrow_mut();
        match arena.get_mut(handle) {
            Some(object) => {
                object.active = active;
                true
            }
            None => false,
        }
    }

    /// Whether an object is active (false once destroyed)
    pub fn is_active(&self, handle: ObjectHandle) -> bool {
        self.arena
            .borrow()
            .get(handle)
            .is_some_and(|object| object.active)
    }

    /// Whether an object still exists
    pub fn is_alive(&self, handle: ObjectHandle) -> bool {
        self.arena.borrow().get(handle).is_some()
    }

    /// Name of an object
    pub fn object_name(&self, handle: ObjectHandle) -> Option<String> {
        self.arena.borrow().get(handle).map(|obj| obj.name.clone())
    }

    /// Non-owning reference to an object
    pub fn object_ref(&self, handle: ObjectHandle) -> ObjectRef {
        ObjectRef {
            arena: Rc::downgrade(&self.arena),
            handle,
        }
    }

    /// Component instances attached to an object
    pub fn components(&self, handle: ObjectHandle) -> Vec<Instance> {
        self.arena
            .borrow()
            .get(handle)
            .map(|object| object.components.to_vec())
            .unwrap_or_default()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.arena
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.object.is_some())
            .count()
    }

    /// Check if the world has no live objects
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectSource for World {
    fn for_each_candidate(&self, visit: &mut dyn FnMut(&Instance)) -> Result<(), DiscoveryError> {
        // Snapshot first: visiting may register and sample components, and
        // samples must be able to read the world.
        let candidates: Vec<Instance> = {
            let arena = self
                .arena
                .try_borrow()
                .map_err(|_| DiscoveryError::Enumeration("world is being mutated".into()))?;
            arena
                .slots
                .iter()
                .filter_map(|slot| slot.object.as_ref())
                .flat_map(|object| object.components.iter().cloned())
                .collect()
        };

        for instance in &candidates {
            visit(instance);
        }
        Ok(())
    }
}

/// A single object's components; a destroyed object yields nothing
impl ObjectSource for ObjectRef {
    fn for_each_candidate(&self, visit: &mut dyn FnMut(&Instance)) -> Result<(), DiscoveryError> {
        let arena = self.arena.upgrade().ok_or(DiscoveryError::WorldGone)?;
        let components: Vec<Instance> = {
            let arena = arena
                .try_borrow()
                .map_err(|_| DiscoveryError::Enumeration("world is being mutated".into()))?;
            arena
                .get(self.handle)
                .map(|object| object.components.to_vec())
                .unwrap_or_default()
        };

        for instance in &components {
            visit(instance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_destroy() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        let b = world.spawn("b");
        assert_eq!(world.len(), 2);
        assert!(world.is_alive(a));
        assert_eq!(world.object_name(b).as_deref(), Some("b"));

        assert!(world.destroy(a));
        assert!(!world.is_alive(a));
        assert!(!world.destroy(a), "double destroy must be rejected");
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        world.destroy(a);
        let c = world.spawn("c");

        assert_eq!(a.index(), c.index());
        assert_ne!(a.generation(), c.generation());
        assert!(!world.is_alive(a));
        assert!(world.is_alive(c));
        assert_eq!(world.object_ref(a).name(), None);
        assert_eq!(world.object_ref(c).name().as_deref(), Some("c"));
    }

    #[test]
    fn test_object_ref_dies_with_world() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        let r = world.object_ref(a);
        assert!(r.is_alive());
        drop(world);
        assert!(!r.is_alive());
        assert_eq!(r.name(), None);
    }

    #[test]
    fn test_owned_component_dies_with_object() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        let instance = world.add_component(a, 5u32).unwrap();
        let weak = instance.downgrade();
        assert!(weak.is_alive());

        world.destroy(a);
        // The strong handle held here keeps the value allocated, but the
        // owning object is gone.
        assert!(!weak.is_alive());
        assert!(!instance.is_valid());
    }

    #[test]
    fn test_enumeration_includes_inactive_objects() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        let b = world.spawn("b");
        world.add_component(a, 1u8);
        world.add_component(b, 2u8);
        world.set_active(b, false);
        assert!(!world.is_active(b));

        let mut seen = 0;
        world.for_each_candidate(&mut |_| seen += 1).unwrap();
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_object_ref_source() {
        let mut world = World::new("arena");
        let a = world.spawn("a");
        world.add_component(a, 1u8);
        world.add_component(a, 2u8);
        let r = world.object_ref(a);

        let mut seen = 0;
        r.for_each_candidate(&mut |_| seen += 1).unwrap();
        assert_eq!(seen, 2);

        world.destroy(a);
        seen = 0;
        r.for_each_candidate(&mut |_| seen += 1).unwrap();
        assert_eq!(seen, 0);

        drop(world);
        assert_eq!(
            r.for_each_candidate(&mut |_| {}),
            Err(DiscoveryError::WorldGone)
        );
    }
}
