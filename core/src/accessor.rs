//! Unified read accessors
//!
//! Fields, computed properties and zero-argument methods all collapse into a
//! [`Getter`] once bound. The member kind only matters to the plan builder.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::{AccessorError, catch_quietly};
use crate::types::WatchValue;

type GetterFn = dyn Fn(&dyn Any) -> Result<WatchValue, AccessorError>;

/// Type-erased read accessor
#[derive(Clone)]
pub struct Getter {
    read: Rc<GetterFn>,
    is_static: bool,
}

impl Getter {
    /// Accessor reading from an instance of `T`
    pub fn instance<T, F>(read: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<WatchValue, AccessorError> + 'static,
    {
        Self {
            read: Rc::new(move |any: &dyn Any| {
                let value = any.downcast_ref::<T>().ok_or(AccessorError::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
                read(value)
            }),
            is_static: false,
        }
    }

    /// Accessor for a type-level member; the instance argument is ignored
    pub fn type_level<F>(read: F) -> Self
    where
        F: Fn() -> Result<WatchValue, AccessorError> + 'static,
    {
        Self {
            read: Rc::new(move |_: &dyn Any| read()),
            is_static: true,
        }
    }

    /// Re-target this accessor through a projection from `D` to its base
    ///
    /// Used to lift a base type's members into a type that embeds it.
    pub(crate) fn project<D, B>(self, project: fn(&D) -> &B) -> Self
    where
        D: Any,
        B: Any,
    {
        if self.is_static {
            return self;
        }
        let inner = self.read;
        Self {
            read: Rc::new(move |any: &dyn Any| {
                let derived = any.downcast_ref::<D>().ok_or(AccessorError::TypeMismatch {
                    expected: std::any::type_name::<D>(),
                })?;
                inner(project(derived) as &dyn Any)
            }),
            is_static: false,
        }
    }

    /// Whether the accessor ignores its instance
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Sample a value
    ///
    /// Panics raised by the accessor are caught and reported as
    /// [`AccessorError::Panicked`] without going through the panic hook, so
    /// a getter that always panics stays quiet on every refresh pass.
    pub fn read(&self, instance: &dyn Any) -> Result<WatchValue, AccessorError> {
        catch_quietly(|| (self.read)(instance))
            .unwrap_or_else(|msg| Err(AccessorError::Panicked(msg)))
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Getter")
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Base {
        hp: i32,
    }

    struct Derived {
        base: Base,
    }

    #[test]
    fn test_instance_getter() {
        let getter = Getter::instance(|b: &Base| Ok(b.hp.into()));
        let value = getter.read(&Base { hp: 7 }).unwrap();
        assert!(matches!(value, WatchValue::Int(7)));
    }

    #[test]
    fn test_type_mismatch() {
        let getter = Getter::instance(|b: &Base| Ok(b.hp.into()));
        let err = getter.read(&5u8).unwrap_err();
        assert!(matches!(err, AccessorError::TypeMismatch { .. }));
    }

    #[test]
    fn test_type_level_ignores_instance() {
        let getter = Getter::type_level(|| Ok("static".into()));
        assert!(getter.is_static());
        assert!(getter.read(&()).is_ok());
        assert!(getter.read(&Base { hp: 0 }).is_ok());
    }

    #[test]
    fn test_projection_reads_embedded_base() {
        let getter = Getter::instance(|b: &Base| Ok(b.hp.into()))
            .project::<Derived, Base>(|d| &d.base);
        let value = getter.read(&Derived { base: Base { hp: 42 } }).unwrap();
        assert!(matches!(value, WatchValue::Int(42)));
    }

    #[test]
    fn test_panicking_getter_is_contained() {
        let getter = Getter::type_level(|| panic!("boom"));
        let err = getter.read(&()).unwrap_err();
        assert_eq!(err, AccessorError::Panicked("boom".to_string()));
    }

    #[test]
    fn test_reads_run_with_panic_hook_silenced() {
        let getter = Getter::type_level(|| Ok(crate::error::panic_hook_silenced().into()));
        assert!(matches!(getter.read(&()), Ok(WatchValue::Bool(true))));
        assert!(!crate::error::panic_hook_silenced());
    }
}
