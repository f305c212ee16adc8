//! Type shapes: the statically declared capability table of a watchable type

use std::any::Any;
use std::marker::PhantomData;

use crate::accessor::Getter;
use crate::annotation::WatchSpec;
use crate::error::{AccessorError, PlanBuildError};
use crate::types::WatchValue;

/// A type whose members can be watched
///
/// Implementors list their members once in [`Watchable::describe`]; the
/// plan builder turns that table into a cached [`super::TypePlan`].
///
/// ```rust,ignore
/// struct Player { speed: f32, hp: i32 }
///
/// impl Watchable for Player {
///     fn describe(shape: &mut TypeShape<Self>) {
///         shape.field("speed", WatchSpec::new().group("Movement").format("F1"), |p| p.speed);
///         shape.field("hp", WatchSpec::new().label("Health"), |p| p.hp);
///     }
/// }
/// ```
pub trait Watchable: Any + Sized {
    /// Section header used for members without an explicit group
    fn display_name() -> String {
        super::short_type_name(std::any::type_name::<Self>())
    }

    /// Declare this type's members
    fn describe(shape: &mut TypeShape<Self>);
}

/// Shape of a declared member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Stored field
    Field,
    /// Computed property
    Property { indexed: bool, generic: bool },
    /// Query method
    Method {
        params: u8,
        generic: bool,
        returns_value: bool,
    },
}

/// One declared member, watchable or not
#[derive(Debug, Clone)]
pub struct MemberDecl {
    pub name: String,
    pub kind: MemberKind,
    /// Generated storage (e.g. the backing slot of a derived accessor)
    pub synthesized: bool,
    /// Present when the member is marked watchable
    pub watch: Option<WatchSpec>,
    /// Readable accessor, if one is reachable
    pub getter: Option<Getter>,
}

impl MemberDecl {
    fn new(name: impl Into<String>, kind: MemberKind, getter: Option<Getter>) -> Self {
        Self {
            name: name.into(),
            kind,
            synthesized: false,
            watch: None,
            getter,
        }
    }

    /// Stored field
    pub fn field(name: impl Into<String>, getter: Getter) -> Self {
        Self::new(name, MemberKind::Field, Some(getter))
    }

    /// Non-indexed, non-generic computed property
    pub fn property(name: impl Into<String>, getter: Option<Getter>) -> Self {
        Self::new(
            name,
            MemberKind::Property {
                indexed: false,
                generic: false,
            },
            getter,
        )
    }

    /// Zero-parameter, non-generic method returning a value
    pub fn method(name: impl Into<String>, getter: Getter) -> Self {
        Self::new(
            name,
            MemberKind::Method {
                params: 0,
                generic: false,
                returns_value: true,
            },
            Some(getter),
        )
    }

    /// Mark the member watchable
    pub fn watch(mut self, spec: WatchSpec) -> Self {
        self.watch = Some(spec);
        self
    }

    /// Mark the member as generated storage
    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }

    /// Override the member kind
    pub fn kind(mut self, kind: MemberKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check the member against the eligibility rules
    pub fn check(&self) -> Result<&Getter, PlanBuildError> {
        let member = || self.name.clone();
        if self.synthesized {
            return Err(PlanBuildError::Synthesized { member: member() });
        }
        match self.kind {
            MemberKind::Field => {}
            MemberKind::Property { indexed: true, .. } => {
                return Err(PlanBuildError::Indexed { member: member() });
            }
            MemberKind::Property { generic: true, .. }
            | MemberKind::Method { generic: true, .. } => {
                return Err(PlanBuildError::Generic { member: member() });
            }
            MemberKind::Method { params, .. } if params > 0 => {
                return Err(PlanBuildError::HasParameters {
                    member: member(),
                    count: params,
                });
            }
            MemberKind::Method {
                returns_value: false,
                ..
            } => {
                return Err(PlanBuildError::ReturnsNothing { member: member() });
            }
            MemberKind::Property { .. } | MemberKind::Method { .. } => {}
        }
        self.getter
            .as_ref()
            .ok_or_else(|| PlanBuildError::NoGetter { member: member() })
    }
}

/// Builder for a type's member table
pub struct TypeShape<T> {
    members: Vec<MemberDecl>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any> Default for TypeShape<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Any> TypeShape<T> {
    /// Create an empty shape
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declare a member with full shape metadata
    pub fn member(&mut self, decl: MemberDecl) -> &mut Self {
        self.members.push(decl);
        self
    }

    /// Watch a stored field
    pub fn field<V, F>(&mut self, name: &str, spec: WatchSpec, read: F) -> &mut Self
    where
        V: Into<WatchValue>,
        F: Fn(&T) -> V + 'static,
    {
        let getter = Getter::instance(move |t: &T| Ok(read(t).into()));
        self.member(MemberDecl::field(name, getter).watch(spec))
    }

    /// Watch a computed property
    pub fn property<V, F>(&mut self, name: &str, spec: WatchSpec, read: F) -> &mut Self
    where
        V: Into<WatchValue>,
        F: Fn(&T) -> V + 'static,
    {
        let getter = Getter::instance(move |t: &T| Ok(read(t).into()));
        self.member(MemberDecl::property(name, Some(getter)).watch(spec))
    }

    /// Watch a zero-argument query method
    pub fn method<V, F>(&mut self, name: &str, spec: WatchSpec, read: F) -> &mut Self
    where
        V: Into<WatchValue>,
        F: Fn(&T) -> V + 'static,
    {
        let getter = Getter::instance(move |t: &T| Ok(read(t).into()));
        self.member(MemberDecl::method(name, getter).watch(spec))
    }

    /// Watch a fallible query method
    pub fn try_method<V, F>(&mut self, name: &str, spec: WatchSpec, read: F) -> &mut Self
    where
        V: Into<WatchValue>,
        F: Fn(&T) -> Result<V, AccessorError> + 'static,
    {
        let getter = Getter::instance(move |t: &T| read(t).map(Into::into));
        self.member(MemberDecl::method(name, getter).watch(spec))
    }

    /// Watch a type-level value shared by all instances
    pub fn static_field<V, F>(&mut self, name: &str, spec: WatchSpec, read: F) -> &mut Self
    where
        V: Into<WatchValue>,
        F: Fn() -> V + 'static,
    {
        let getter = Getter::type_level(move || Ok(read().into()));
        self.member(MemberDecl::field(name, getter).watch(spec))
    }

    /// Include every member of an embedded base type
    ///
    /// The base's own ancestry is included as well.
    pub fn inherit<B: Watchable>(&mut self, project: fn(&T) -> &B) -> &mut Self {
        for mut decl in TypeShape::<B>::collect() {
            decl.getter = decl.getter.map(|g| g.project(project));
            self.members.push(decl);
        }
        self
    }

    /// Declared members, in declaration order
    pub fn members(&self) -> &[MemberDecl] {
        &self.members
    }

    pub(crate) fn into_members(self) -> Vec<MemberDecl> {
        self.members
    }
}

impl<T: Watchable> TypeShape<T> {
    /// Run `T::describe` and return the declared members
    pub fn collect() -> Vec<MemberDecl> {
        let mut shape = Self::new();
        T::describe(&mut shape);
        shape.into_members()
    }
}
