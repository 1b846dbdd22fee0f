//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;

use crate::gameplay::health::Health;
use crate::gameplay::{Behaviors, Combatant, Facing, Team};
use crate::third_party::CollisionLayer;

/// One simulated frame: 1/64 s, exact in binary so timers land on whole frames.
pub const FRAME: Duration = Duration::from_micros(15_625);
pub const FRAME_SECS: f32 = 1.0 / 64.0;

/// Size of the body/hurtbox used by test combatants.
pub const TEST_BODY: Vec2 = Vec2::new(0.8, 1.6);

/// Minimal app with a manual clock advancing one [`FRAME`] per update.
/// The first update still reports a zero delta.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app
}

/// Runs `frames` updates.
pub fn advance_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

/// Runs enough updates to cover `secs` of simulated time.
pub fn advance_secs(app: &mut App, secs: f32) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let frames = (secs / FRAME_SECS).ceil() as usize;
    advance_frames(app, frames);
}

/// Asserts the number of entities matching a query filter.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let count = app
        .world_mut()
        .query_filtered::<Entity, F>()
        .iter(app.world())
        .count();
    assert_eq!(count, expected, "expected {expected} entities, found {count}");
}

/// Spawns a bare combatant (no physics body) standing at `x` on y = 0.
pub fn spawn_test_combatant(world: &mut World, team: Team, x: f32, max_hp: i32) -> Entity {
    let transform = Transform::from_xyz(x, 0.0, 0.0);
    world
        .spawn((
            Name::new("Test Combatant"),
            Combatant,
            team,
            Health::new(max_hp),
            Behaviors::default(),
            Facing::default(),
            transform,
            GlobalTransform::from(transform),
        ))
        .id()
}

/// Spawns a hurtbox collider owned by `owner`, offset by `local` from it.
pub fn spawn_test_hurtbox(world: &mut World, owner: Entity, local: Vec2) -> Entity {
    let owner_position = world
        .get::<Transform>(owner)
        .map_or(Vec3::ZERO, |transform| transform.translation);
    let transform = Transform::from_translation(local.extend(0.0));
    world
        .spawn((
            Name::new("Test Hurtbox"),
            Collider::rectangle(TEST_BODY.x, TEST_BODY.y),
            Sensor,
            CollisionLayers::new(CollisionLayer::Hurtbox, CollisionLayer::Hitbox),
            transform,
            GlobalTransform::from_translation(owner_position + local.extend(0.0)),
            ChildOf(owner),
        ))
        .id()
}

/// Spawns a ground slab collider centred at `position`.
pub fn spawn_test_ground(world: &mut World, position: Vec2) -> Entity {
    let transform = Transform::from_translation(position.extend(0.0));
    world
        .spawn((
            Name::new("Test Ground"),
            Collider::rectangle(20.0, 1.0),
            CollisionLayers::new(CollisionLayer::Ground, CollisionLayer::Hitbox),
            transform,
            GlobalTransform::from(transform),
        ))
        .id()
}
