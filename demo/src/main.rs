//! Headless livewatch host
//!
//! Simulates a small game loop: spawns objects into a world, lets the
//! discovery hook find them and prints every refreshed overlay snapshot.
//! The overlay is also laid out through a headless egui context.
//!
//! Usage: `livewatch-demo [frames]`

mod scene;

use std::env;

use anyhow::{Context as _, Result};
use livewatch_core::{
    DiscoveryHook, LifecycleEvent, OverlayPanel, OverlaySnapshot, WatchContext, config,
};

use scene::{Enemy, catalog};

/// Simulated frame length
const FRAME_DT: f64 = 1.0 / 60.0;

/// Frames simulated when no count is given
const DEFAULT_FRAMES: u32 = 300;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let frames = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<u32>()
            .with_context(|| format!("invalid frame count '{arg}'"))?,
        None => DEFAULT_FRAMES,
    };

    let config = config::load();

    let mut ctx = WatchContext::from_config(catalog(), &config);
    let mut panel = OverlayPanel::from_config(&config.overlay);
    if let Some(key) = panel.toggle_key() {
        tracing::info!("overlay toggles with {}", key.name());
    }
    let egui_ctx = egui::Context::default();
    let mut hook = DiscoveryHook::installed();

    let mut world = scene::arena();
    let mut late_spawn = None;
    hook.handle(LifecycleEvent::WorldLoaded, &mut ctx, &world);
    tracing::info!(
        "watching {} target(s) in '{}'",
        ctx.registry().len(),
        world.name()
    );

    for frame in 0..frames {
        let now = f64::from(frame) * FRAME_DT;
        scene::step(&world, FRAME_DT as f32);

        match frame {
            90 => {
                if let Some(handle) = scene::find(&world, "grunt") {
                    tracing::info!("frame {frame}: grunt destroyed");
                    world.destroy(handle);
                }
            }
            120 => {
                let late = world.spawn("late-spawn");
                world.add_component(late, Enemy::new("late-spawn", 30));
                world.set_active(late, false);
                late_spawn = Some(late);
            }
            150 => {
                if let Some(late) = late_spawn.take() {
                    tracing::info!("frame {frame}: late-spawn activated");
                    world.set_active(late, true);
                    hook.handle(LifecycleEvent::ObjectActivated(late), &mut ctx, &world);
                }
            }
            180 => {
                tracing::info!("frame {frame}: transition to 'boss-room'");
                world = scene::boss_room();
                hook.handle(LifecycleEvent::WorldTransition, &mut ctx, &world);
            }
            240 => {
                tracing::info!("frame {frame}: reload");
                hook.handle(LifecycleEvent::Reload, &mut ctx, &world);
            }
            _ => {}
        }

        if let Some(snapshot) = ctx.tick_at(now) {
            log_snapshot(frame, snapshot);
            let mut drawn = 0;
            let _ = egui_ctx.run(egui::RawInput::default(), |egui_ctx| {
                drawn = panel.show(egui_ctx, snapshot);
            });
            tracing::debug!("frame {frame}: overlay drew {drawn} line(s)");
        }
    }

    if let Some(err) = hook.last_error() {
        tracing::warn!("last discovery failure: {err}");
    }
    tracing::info!(
        "done: {} refresh pass(es), {} scan(s)",
        ctx.scheduler().passes(),
        hook.scans()
    );

    Ok(())
}

fn log_snapshot(frame: u32, snapshot: &OverlaySnapshot) {
    tracing::info!("frame {frame}: {} line(s)", snapshot.line_count());
    for group in &snapshot.groups {
        for line in &group.lines {
            let marker = if line.had_error { " !" } else { "" };
            tracing::info!("  [{}] {}: {}{marker}", group.name, line.label, line.value);
        }
    }
}
