//! Livewatch Core - live-state introspection overlay
//!
//! Finds watchable objects in a running host, reads their annotated members
//! on a throttled schedule and hands a grouped snapshot to the overlay.
//!
//! # Architecture
//!
//! - [`DiscoveryHook`] - Scans the object graph on lifecycle events
//! - [`PlanBuilder`] - Turns a type's [`Watchable`] description into a [`TypePlan`]
//! - [`TargetRegistry`] - Watched instances and their cached entry state
//! - [`RefreshScheduler`] - Throttled prune-then-refresh passes
//! - [`aggregate`] - Groups cached values into an [`OverlaySnapshot`]
//! - [`WatchContext`] - Owns the pipeline for one host process
//! - [`OverlayPanel`] - egui renderer for snapshots

pub mod accessor;
pub mod aggregate;
pub mod annotation;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod format;
pub mod instance;
pub mod panel;
pub mod plan;
pub mod registry;
pub mod scheduler;
#[cfg(test)]
pub mod test_utils;
pub mod types;
pub mod world;

pub use accessor::Getter;
pub use aggregate::aggregate;
pub use annotation::WatchSpec;
pub use config::WatchConfig;
pub use context::WatchContext;
pub use discovery::{DiscoveryHook, LifecycleEvent, ObjectSource};
pub use error::{AccessorError, ConfigError, DiscoveryError, PlanBuildError};
pub use format::format_value;
pub use instance::{Instance, InstanceId, WeakInstance};
pub use panel::OverlayPanel;
pub use plan::{
    AccessorEntry, MemberDecl, MemberKind, PlanBuilder, PlanCache, TypePlan, TypeShape,
    WatchCatalog, Watchable,
};
pub use registry::{RegistryOptions, Target, TargetRegistry};
pub use scheduler::{DEFAULT_REFRESH_INTERVAL, MIN_REFRESH_INTERVAL, RefreshScheduler};
pub use types::{
    ERROR_SENTINEL, EntryState, OverlayGroup, OverlayLine, OverlaySnapshot, UNSAMPLED, WatchValue,
};
pub use world::{ObjectHandle, ObjectRef, World};
