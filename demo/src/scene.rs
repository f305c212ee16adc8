//! Demo scene: watchable component types and world builders

use std::cell::Cell;

use glam::Vec2;
use livewatch_core::{
    AccessorError, ObjectHandle, ObjectRef, ObjectSource, TypeShape, WatchCatalog, WatchSpec,
    Watchable, World,
};

thread_local! {
    static SIMULATED_FRAMES: Cell<u64> = const { Cell::new(0) };
}

// ============================================================================
// Components
// ============================================================================

/// Shared base for everything with health
#[derive(Debug, Clone, Default)]
pub struct Actor {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
}

impl Actor {
    fn new(name: &str, health: i32) -> Self {
        Self {
            name: name.to_string(),
            health,
            max_health: health,
        }
    }

    fn health_ratio(&self) -> Result<f32, AccessorError> {
        if self.max_health <= 0 {
            return Err(AccessorError::failed("no max health"));
        }
        Ok(self.health as f32 / self.max_health as f32)
    }
}

impl Watchable for Actor {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .field("name", WatchSpec::new().order(-2), |a| a.name.clone())
            .field("health", WatchSpec::new().order(-1).format("D3"), |a| a.health)
            .try_method("health_ratio", WatchSpec::new().label("HP").format("P0"), |a| {
                a.health_ratio()
            });
    }
}

/// The player character
#[derive(Debug, Default)]
pub struct Player {
    pub actor: Actor,
    pub position: Vec2,
    pub velocity: Vec2,
    pub score: u64,
    /// Enemy currently locked on
    pub target: Option<ObjectRef>,
}

impl Watchable for Player {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .inherit::<Actor>(|p| &p.actor)
            .field("position", WatchSpec::new().format("F1"), |p| p.position)
            .property("speed", WatchSpec::new().format("F2"), |p| p.velocity.length())
            .field("score", WatchSpec::new().group("Score").format("N0"), |p| p.score)
            .field("target", WatchSpec::new().label("Locked on"), |p| {
                p.target.clone()
            })
            .static_field("frames", WatchSpec::new().group("Session"), || {
                SIMULATED_FRAMES.with(Cell::get)
            });
    }
}

/// A hostile actor
#[derive(Debug, Default)]
pub struct Enemy {
    pub actor: Actor,
    pub aggro: f32,
}

impl Enemy {
    pub fn new(name: &str, health: i32) -> Self {
        Self {
            actor: Actor::new(name, health),
            aggro: 0.0,
        }
    }

    fn state(&self) -> &'static str {
        if self.actor.health <= 0 {
            "down"
        } else if self.aggro > 0.5 {
            "hunting"
        } else {
            "idle"
        }
    }
}

impl Watchable for Enemy {
    fn describe(shape: &mut TypeShape<Self>) {
        shape
            .inherit::<Actor>(|e| &e.actor)
            .field("aggro", WatchSpec::new().group("Enemies").format("0.00"), |e| {
                e.aggro
            })
            .method("state", WatchSpec::new().group("Enemies"), Enemy::state);
    }
}

/// Physics marker nobody watches
#[derive(Debug, Default)]
pub struct Collider;

/// Catalog of the demo's watchable types
pub fn catalog() -> WatchCatalog {
    let mut catalog = WatchCatalog::new();
    catalog.register::<Player>().register::<Enemy>();
    catalog
}

// ============================================================================
// Worlds
// ============================================================================

/// Opening level: a player locked on to one of two enemies
pub fn arena() -> World {
    let mut world = World::new("arena");

    let grunt = world.spawn("grunt");
    world.add_component(grunt, Enemy::new("grunt", 40));
    world.add_component(grunt, Collider);

    let archer = world.spawn("archer");
    world.add_component(archer, Enemy::new("archer", 25));
    // Starts dormant; discovery still picks it up
    world.set_active(archer, false);

    let player = world.spawn("player");
    world.add_component(
        player,
        Player {
            actor: Actor::new("hero", 100),
            velocity: Vec2::new(1.5, 0.0),
            target: Some(world.object_ref(grunt)),
            ..Player::default()
        },
    );

    world
}

/// Second level with a single large enemy
pub fn boss_room() -> World {
    let mut world = World::new("boss-room");

    let boss = world.spawn("boss");
    world.add_component(boss, Enemy::new("boss", 500));

    let player = world.spawn("player");
    world.add_component(
        player,
        Player {
            actor: Actor::new("hero", 100),
            target: Some(world.object_ref(boss)),
            ..Player::default()
        },
    );

    world
}

/// Find the first object with components and the given name
pub fn find(world: &World, name: &str) -> Option<ObjectHandle> {
    let mut found = None;
    let _ = world.for_each_candidate(&mut |instance| {
        if found.is_some() {
            return;
        }
        if let Some(owner) = instance.owner() {
            if owner.name().as_deref() == Some(name) {
                found = Some(owner.handle());
            }
        }
    });
    found
}

/// Advance the simulation by one frame
pub fn step(world: &World, dt: f32) {
    SIMULATED_FRAMES.with(|frames| frames.set(frames.get() + 1));

    let _ = world.for_each_candidate(&mut |instance| {
        if let Some(mut player) = instance.borrow_mut::<Player>() {
            let velocity = player.velocity;
            player.position += velocity * dt;
            player.score += 10;
        } else if let Some(mut enemy) = instance.borrow_mut::<Enemy>() {
            enemy.aggro = (enemy.aggro + dt * 0.4).min(1.0);
            enemy.actor.health = (enemy.actor.health - 1).max(0);
        }
    });
}
