//! Discovery hook
//!
//! Scans the live object graph on lifecycle events and feeds candidates to
//! the registry. Nothing raised here ever reaches the host's frame loop:
//! enumeration failures and panics are logged and dropped.

use crate::context::WatchContext;
use crate::error::{DiscoveryError, catch_quietly};
use crate::instance::Instance;
use crate::world::{ObjectHandle, World};

/// Something that can enumerate watch candidates
pub trait ObjectSource {
    /// Visit every live candidate, including inactive ones
    fn for_each_candidate(&self, visit: &mut dyn FnMut(&Instance)) -> Result<(), DiscoveryError>;
}

impl ObjectSource for [Instance] {
    fn for_each_candidate(&self, visit: &mut dyn FnMut(&Instance)) -> Result<(), DiscoveryError> {
        self.iter().for_each(visit);
        Ok(())
    }
}

impl ObjectSource for Vec<Instance> {
    fn for_each_candidate(&self, visit: &mut dyn FnMut(&Instance)) -> Result<(), DiscoveryError> {
        self.as_slice().for_each_candidate(visit)
    }
}

/// Host lifecycle events the hook reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A world finished loading (additively or not)
    WorldLoaded,
    /// The active world was replaced; previous instances are gone
    WorldTransition,
    /// An object became active after starting inactive
    ObjectActivated(ObjectHandle),
    /// Process-level reload; cached plans may capture stale state
    Reload,
}

/// Lifecycle-driven scanner
#[derive(Debug, Default)]
pub struct DiscoveryHook {
    installed: bool,
    /// Times the hook has been (re)installed
    installs: u32,
    scans: u64,
    last_error: Option<DiscoveryError>,
}

impl DiscoveryHook {
    /// Create an uninstalled hook
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hook that already listens for events
    pub fn installed() -> Self {
        let mut hook = Self::new();
        hook.install();
        hook
    }

    /// Start reacting to lifecycle events
    pub fn install(&mut self) {
        if self.installed {
            return;
        }
        self.installed = true;
        self.installs += 1;
        tracing::info!("watch: discovery hook installed");
    }

    /// Stop reacting to lifecycle events
    pub fn uninstall(&mut self) {
        self.installed = false;
    }

    /// Whether events are handled
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Number of installs so far
    pub fn installs(&self) -> u32 {
        self.installs
    }

    /// Number of completed or attempted scans
    pub fn scans(&self) -> u64 {
        self.scans
    }

    /// Most recent swallowed failure
    pub fn last_error(&self) -> Option<&DiscoveryError> {
        self.last_error.as_ref()
    }

    /// React to a lifecycle event
    ///
    /// Returns the number of newly registered targets. Ignored while
    /// uninstalled.
    pub fn handle(&mut self, event: LifecycleEvent, ctx: &mut WatchContext, world: &World) -> usize {
        if !self.installed {
            return 0;
        }

        match event {
            LifecycleEvent::WorldLoaded => self.scan(ctx, world),
            LifecycleEvent::WorldTransition => {
                // Plans stay valid across worlds; instances do not
                ctx.reset(false);
                self.scan(ctx, world)
            }
            LifecycleEvent::ObjectActivated(handle) => self.scan_object(ctx, world, handle),
            LifecycleEvent::Reload => {
                self.uninstall();
                ctx.reset(true);
                self.install();
                self.scan(ctx, world)
            }
        }
    }

    /// Register every candidate from a source
    ///
    /// Idempotent: rescanning an unchanged source adds nothing.
    pub fn scan(&mut self, ctx: &mut WatchContext, source: &dyn ObjectSource) -> usize {
        self.scans += 1;
        let mut registered = 0;

        let result = catch_quietly(|| {
            source.for_each_candidate(&mut |instance| {
                if ctx.register(instance) {
                    registered += 1;
                }
            })
        });

        let error = match result {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(msg) => Some(DiscoveryError::Panicked(msg)),
        };

        if let Some(err) = error {
            tracing::warn!("watch: discovery scan failed: {err}");
            self.last_error = Some(err);
        } else if registered > 0 {
            tracing::debug!("watch: discovery registered {registered} target(s)");
        }

        registered
    }

    /// Register the components of a single object
    pub fn scan_object(&mut self, ctx: &mut WatchContext, world: &World, handle: ObjectHandle) -> usize {
        if !world.is_alive(handle) {
            return 0;
        }
        let components = world.components(handle);
        self.scan(ctx, &components)
    }
}
