//! Type plans
//!
//! A [`TypePlan`] is the immutable, sorted list of accessors for one concrete
//! type. Plans are built from a type's [`TypeShape`] the first time an
//! instance of that type is registered, then cached by `TypeId`.

mod cache;
mod shape;
mod tests;

pub use cache::{PlanCache, WatchCatalog};
pub use shape::{MemberDecl, MemberKind, TypeShape, Watchable};

use std::cmp::Ordering;

use crate::accessor::Getter;

/// One watchable member, bound and ready to sample
#[derive(Debug, Clone)]
pub struct AccessorEntry {
    /// Display label (never empty)
    pub label: String,
    /// Overlay section; empty means "use the owning type's name"
    pub group: String,
    /// Sort key within the group
    pub order: i32,
    /// Format specifier; empty means default formatting
    pub format: String,
    /// Bound accessor
    pub getter: Getter,
}

impl AccessorEntry {
    /// Sort key: group, then order, then label (byte-wise for strings)
    fn plan_order(&self, other: &Self) -> Ordering {
        self.group
            .cmp(&other.group)
            .then(self.order.cmp(&other.order))
            .then_with(|| self.label.cmp(&other.label))
    }
}

/// Ordered accessor table for one type
#[derive(Debug, Clone, Default)]
pub struct TypePlan {
    /// Name used as the fallback group header
    pub display_name: String,
    /// Entries sorted by (group, order, label)
    pub entries: Vec<AccessorEntry>,
}

impl TypePlan {
    /// A plan with no entries (types that declare nothing watchable)
    pub fn empty(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            entries: Vec::new(),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the plan has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds type plans from declared member tables
pub struct PlanBuilder;

impl PlanBuilder {
    /// Build the plan for `T`
    ///
    /// Deterministic: building twice yields identical entry lists.
    pub fn build<T: Watchable>() -> TypePlan {
        Self::from_members(T::display_name(), TypeShape::<T>::collect())
    }

    /// Build a plan from an already collected member table
    ///
    /// Members without a watch annotation are ignored. Annotated members
    /// that fail the eligibility rules are dropped without affecting the
    /// rest of the plan.
    pub fn from_members(display_name: String, members: Vec<MemberDecl>) -> TypePlan {
        let mut entries = Vec::with_capacity(members.len());

        for decl in &members {
            let Some(spec) = &decl.watch else {
                continue;
            };

            let getter = match decl.check() {
                Ok(getter) => getter.clone(),
                Err(reason) => {
                    tracing::trace!("watch: {display_name}: skipping member: {reason}");
                    continue;
                }
            };

            entries.push(AccessorEntry {
                label: spec.resolved_label(&decl.name),
                group: spec.group.clone().unwrap_or_default(),
                order: spec.order,
                format: spec.format.clone().unwrap_or_default(),
                getter,
            });
        }

        entries.sort_by(AccessorEntry::plan_order);

        TypePlan {
            display_name,
            entries,
        }
    }
}

/// Strip module paths from a Rust type name
///
/// `my_game::player::Player<my_game::Stats>` becomes `Player<Stats>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();

    let flush = |segment: &mut String, out: &mut String| {
        let last = segment.rsplit("::").next().unwrap_or_default();
        out.push_str(last);
        segment.clear();
    };

    for c in full.chars() {
        match c {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                flush(&mut segment, &mut out);
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    flush(&mut segment, &mut out);
    out
}
