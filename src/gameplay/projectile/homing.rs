//! Turn-rate-limited homing missile.

use std::f32::consts::{PI, TAU};

use avian2d::prelude::*;
use bevy::prelude::*;

use super::{DespawnBelowY, HitSpark, ProjectileHit, projectile_body};
use crate::Z_PROJECTILE;
use crate::config::HomingTuning;
use crate::gameplay::Team;
use crate::screens::GameState;
use crate::theme::palette;

const MISSILE_SIZE: Vec2 = Vec2::new(0.4, 0.15);

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct HomingMissile {
    pub target: Option<Entity>,
    pub speed: f32,
    pub turn_rate_deg: f32,
    pub lifetime: f32,
    age: f32,
}

impl HomingMissile {
    #[must_use]
    pub const fn new(target: Option<Entity>, speed: f32, turn_rate_deg: f32, lifetime: f32) -> Self {
        Self {
            target,
            speed,
            turn_rate_deg,
            lifetime,
            age: 0.0,
        }
    }
}

/// Rotates `velocity` toward `to_target` by at most `max_turn` radians and
/// rescales it to `speed`.
#[must_use]
pub fn steer(velocity: Vec2, to_target: Vec2, speed: f32, max_turn: f32) -> Vec2 {
    let current = velocity.to_angle();
    if to_target.length_squared() < 1e-8 {
        return Vec2::from_angle(current) * speed;
    }
    let delta = (to_target.to_angle() - current + PI).rem_euclid(TAU) - PI;
    Vec2::from_angle(current + delta.clamp(-max_turn, max_turn)) * speed
}

/// Steers toward the target, or flies straight once it is gone.
pub(super) fn steer_missiles(
    time: Res<Time>,
    mut missiles: Query<(Entity, &mut HomingMissile, &mut LinearVelocity, &mut Transform)>,
    targets: Query<&Transform, Without<HomingMissile>>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut missile, mut velocity, mut transform) in &mut missiles {
        missile.age += dt;
        if missile.age >= missile.lifetime {
            commands.entity(entity).despawn();
            continue;
        }

        let mut current = velocity.0;
        if current.length_squared() < 1e-4 {
            current = (transform.rotation * Vec3::X).xy() * missile.speed;
        }

        let target = missile.target.and_then(|target| targets.get(target).ok());
        if let Some(target) = target {
            let to_target = target.translation.xy() - transform.translation.xy();
            let max_turn = missile.turn_rate_deg.to_radians() * dt;
            velocity.0 = steer(current, to_target, missile.speed, max_turn);
            transform.rotation = Quat::from_rotation_z(velocity.0.to_angle());
        } else {
            velocity.0 = current.normalize_or_zero() * missile.speed;
        }
    }
}

/// Launches a missile toward `dir_x` that then homes on `target`.
pub fn spawn_homing_missile(
    commands: &mut Commands,
    tuning: &HomingTuning,
    team: Team,
    origin: Vec2,
    dir_x: f32,
    target: Option<Entity>,
) -> Entity {
    let velocity = Vec2::new(tuning.speed * dir_x, 0.0);
    commands
        .spawn((
            Name::new("Homing Missile"),
            team,
            HomingMissile::new(target, tuning.speed, tuning.turn_rate_deg, tuning.lifetime),
            ProjectileHit::new(tuning.damage),
            HitSpark(palette::HIT_SPARK),
            DespawnBelowY::default(),
            Sprite::from_color(palette::MISSILE, MISSILE_SIZE),
            Transform::from_translation(origin.extend(Z_PROJECTILE))
                .with_rotation(Quat::from_rotation_z(velocity.to_angle())),
            DespawnOnExit(GameState::InGame),
            Collider::rectangle(MISSILE_SIZE.x, MISSILE_SIZE.y),
            projectile_body(velocity, 0.0),
        ))
        .id()
}
