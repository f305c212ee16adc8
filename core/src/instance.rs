//! Instance handles
//!
//! Watched values live in `Rc<RefCell<T>>` cells owned by the host. The
//! registry only ever keeps a [`WeakInstance`], so it never extends the
//! lifetime of anything it watches.

use std::any::{Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::world::ObjectRef;

/// Identity of an instance (address of its cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

/// Strong, type-erased handle to a watchable value
#[derive(Clone)]
pub struct Instance {
    cell: Rc<RefCell<dyn Any>>,
    type_id: TypeId,
    type_name: &'static str,
    owner: Option<ObjectRef>,
}

impl Instance {
    /// Wrap a plain in-memory value
    pub fn new<T: Any>(value: T) -> Self {
        Self::from_rc(Rc::new(RefCell::new(value)))
    }

    /// Wrap an existing shared cell
    pub fn from_rc<T: Any>(cell: Rc<RefCell<T>>) -> Self {
        Self {
            cell,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            owner: None,
        }
    }

    /// Wrap a value whose lifetime is bound to a world object
    pub(crate) fn owned<T: Any>(value: T, owner: ObjectRef) -> Self {
        Self {
            owner: Some(owner),
            ..Self::new(value)
        }
    }

    /// Identity used for registry deduplication
    pub fn id(&self) -> InstanceId {
        InstanceId(Rc::as_ptr(&self.cell) as *const () as usize)
    }

    /// Concrete type of the wrapped value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Full Rust type name of the wrapped value
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Owning world object, if any
    pub fn owner(&self) -> Option<&ObjectRef> {
        self.owner.as_ref()
    }

    /// Whether the instance can still be watched
    ///
    /// Plain values are always valid while a strong handle exists; owned
    /// components become invalid as soon as their object is destroyed.
    pub fn is_valid(&self) -> bool {
        self.owner.as_ref().is_none_or(ObjectRef::is_alive)
    }

    /// Borrow the value as `T`
    ///
    /// Returns `None` on a type mismatch or if the value is mutably borrowed.
    pub fn borrow<T: Any>(&self) -> Option<Ref<'_, T>> {
        let guard = self.cell.try_borrow().ok()?;
        Ref::filter_map(guard, |v| v.downcast_ref::<T>()).ok()
    }

    /// Mutably borrow the value as `T`
    pub fn borrow_mut<T: Any>(&self) -> Option<RefMut<'_, T>> {
        let guard = self.cell.try_borrow_mut().ok()?;
        RefMut::filter_map(guard, |v| v.downcast_mut::<T>()).ok()
    }

    /// Non-owning handle to this instance
    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            cell: Rc::downgrade(&self.cell),
            type_id: self.type_id,
            owner: self.owner.clone(),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id())
            .field("type", &self.type_name)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Non-owning, type-erased handle to a watched value
#[derive(Clone)]
pub struct WeakInstance {
    cell: Weak<RefCell<dyn Any>>,
    type_id: TypeId,
    owner: Option<ObjectRef>,
}

impl WeakInstance {
    /// Identity of the referenced instance
    ///
    /// Stable for as long as this handle exists, since a live weak pointer
    /// keeps the allocation from being reused.
    pub fn id(&self) -> InstanceId {
        InstanceId(self.cell.as_ptr() as *const () as usize)
    }

    /// Concrete type of the referenced value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Liveness check, evaluated fresh on every call
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0 && self.owner.as_ref().is_none_or(ObjectRef::is_alive)
    }

    /// Upgrade to the underlying cell if still alive
    pub(crate) fn upgrade(&self) -> Option<Rc<RefCell<dyn Any>>> {
        if !self.is_alive() {
            return None;
        }
        self.cell.upgrade()
    }
}

impl fmt::Debug for WeakInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakInstance")
            .field("id", &self.id())
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_by_cell_not_value() {
        let a = Instance::new(1u32);
        let b = Instance::new(1u32);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), a.clone().id());
        assert_eq!(a.id(), a.downgrade().id());
    }

    #[test]
    fn test_from_rc_shares_the_cell() {
        let cell = Rc::new(RefCell::new(10i32));
        let instance = Instance::from_rc(cell.clone());
        *cell.borrow_mut() = 11;
        assert_eq!(*instance.borrow::<i32>().unwrap(), 11);
        assert_eq!(instance.type_id(), TypeId::of::<i32>());
    }

    #[test]
    fn test_borrow_wrong_type() {
        let instance = Instance::new(1u32);
        assert!(instance.borrow::<i64>().is_none());
    }

    #[test]
    fn test_weak_dies_with_last_strong_handle() {
        let instance = Instance::new(String::from("x"));
        let weak = instance.downgrade();
        assert!(weak.is_alive());
        drop(instance);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }
}
