//! Error types for the watch pipeline
//!
//! None of these are fatal to the host. Each one is caught at the smallest
//! boundary that can absorb it: a member is skipped, an entry is marked as
//! errored, or a discovery pass is abandoned for this frame.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Once;

/// Failure while sampling a single watched member
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessorError {
    /// The getter was handed an instance of the wrong concrete type
    #[error("instance is not a {expected}")]
    TypeMismatch { expected: &'static str },

    /// The instance is mutably borrowed elsewhere
    #[error("instance is currently borrowed mutably")]
    Borrowed,

    /// The instance was dropped or its owning object destroyed
    #[error("instance is no longer alive")]
    InstanceGone,

    /// The getter reported a failure of its own
    #[error("{0}")]
    Failed(String),

    /// The getter panicked
    #[error("getter panicked: {0}")]
    Panicked(String),
}

impl AccessorError {
    /// Convenience constructor for getter-reported failures
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Reason a declared member was left out of a type plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanBuildError {
    #[error("`{member}` is compiler-synthesized")]
    Synthesized { member: String },

    #[error("`{member}` is an indexed property")]
    Indexed { member: String },

    #[error("`{member}` has a generic accessor")]
    Generic { member: String },

    #[error("`{member}` takes {count} parameter(s)")]
    HasParameters { member: String, count: u8 },

    #[error("`{member}` returns nothing")]
    ReturnsNothing { member: String },

    #[error("`{member}` has no readable getter")]
    NoGetter { member: String },
}

/// Failure while enumerating live objects during a discovery scan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    /// The object source could not be enumerated right now
    #[error("object enumeration failed: {0}")]
    Enumeration(String),

    /// The world backing the source has been torn down
    #[error("world is no longer available")]
    WorldGone,

    /// Enumeration or registration panicked
    #[error("discovery panicked: {0}")]
    Panicked(String),
}

/// Failure loading or saving a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Render a caught panic payload as text
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

thread_local! {
    /// Nesting depth of [`catch_quietly`] calls on this thread
    static QUIET_DEPTH: Cell<u32> = const { Cell::new(0) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f` and turn a panic into its message
///
/// The panic is not printed by the panic hook; callers report it through
/// their own error path. Panics outside these calls, or on other threads,
/// still reach the hook that was installed before.
pub(crate) fn catch_quietly<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !panic_hook_silenced() {
                previous(info);
            }
        }));
    });

    QUIET_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_DEPTH.with(|depth| depth.set(depth.get() - 1));

    result.map_err(|payload| panic_message(payload.as_ref()))
}

/// Whether a panic on this thread would be kept from the panic hook
pub(crate) fn panic_hook_silenced() -> bool {
    QUIET_DEPTH.with(Cell::get) > 0
}
