//! Avian2d physics configuration for the side-view arena.

use avian2d::collision::collider::contact_query;
use avian2d::prelude::*;
use bevy::prelude::*;

/// Downward acceleration (world units per second squared).
pub const GRAVITY: f32 = 9.81;

// === Collision Layers ===

/// Physics collision layers for the hitbox/hurtbox system.
///
/// - **Body**: Combatant rigid bodies.
/// - **Hitbox**: Projectile sensors.
/// - **Hurtbox**: Damageable surface owned by a combatant's `Health`.
/// - **Ground**: Arena floor, a valid anchor for sticking projectiles.
/// - **Pickup**: Falling heal drops, shot by any projectile.
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum CollisionLayer {
    #[default]
    Body,
    Hitbox,
    Hurtbox,
    Ground,
    Pickup,
}

// === Helpers ===

/// Compute the minimum distance between two collider *surfaces*.
///
/// Uses avian2d's GJK-based `contact_query::distance()` under the hood.
/// Returns `f32::MAX` if the shape is unsupported.
#[must_use]
pub fn surface_distance(c1: &Collider, pos1: Vec2, c2: &Collider, pos2: Vec2) -> f32 {
    contact_query::distance(c1, pos1, 0.0, c2, pos2, 0.0).unwrap_or(f32::MAX)
}

/// Whether any of the collider's memberships is in `mask`.
#[must_use]
pub fn layers_match(layers: &CollisionLayers, mask: LayerMask) -> bool {
    layers.memberships.0 & mask.0 != 0
}

/// Whether a collider overlaps a circle of `radius` around `center`.
#[must_use]
pub fn overlaps_circle(collider: &Collider, pos: Vec2, center: Vec2, radius: f32) -> bool {
    surface_distance(collider, pos, &Collider::circle(radius), center) <= 0.0
}

/// Point of a collider placed by `transform` nearest to `point`. A point
/// already inside the shape is returned unchanged.
#[must_use]
pub fn contact_point(collider: &Collider, transform: &GlobalTransform, point: Vec2) -> Vec2 {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    let (_, _, angle) = rotation.to_euler(EulerRot::XYZ);
    collider
        .project_point(
            Position::new(translation.xy()),
            Rotation::radians(angle),
            point,
            true,
        )
        .0
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default());
    app.insert_resource(Gravity(Vec2::NEG_Y * GRAVITY));
}
