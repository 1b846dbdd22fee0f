//! Projectiles: shared contact resolution and flight helpers.
//!
//! Every damaging projectile carries a [`ProjectileHit`] next to its `Team`.
//! Physics reports overlaps through `CollidingEntities`; the first valid one
//! becomes a [`DamageRequest`] and retires the projectile. Payload-specific
//! flight lives in the submodules.

mod growing;
mod homing;
mod mark_explode;
mod rain;

pub use growing::{GrowingBullet, spawn_growing_bullet};
pub use homing::{HomingMissile, spawn_homing_missile, steer};
pub use mark_explode::{Anchored, MarkExplode, MarkPhase, MarkVisual, spawn_mark_explode};
pub use rain::{RainStyle, RainVolley, random_drop_x, spawn_rain_drop};

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::Team;
use super::health::{DamageRequest, Health};
use crate::config::ArrowTuning;
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::{CollisionLayer, contact_point, layers_match};
use crate::{GameSet, Z_EFFECT, Z_PROJECTILE, gameplay_running};

// === Constants ===

/// Stray projectiles below this height are removed.
pub const DEFAULT_MIN_Y: f32 = -1.0;

/// Upper bound on the life of any projectile (seconds).
pub const DEFAULT_MAX_LIFETIME: f32 = 6.0;

const ARROW_SIZE: Vec2 = Vec2::new(0.5, 0.08);
const PROJECTILE_MASS: f32 = 0.1;
const SPARK_SIZE: f32 = 0.3;
const SPARK_LIFETIME: f32 = 0.2;

// === Components ===

/// Fixed damage dealt to the first hostile hurtbox touched.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ProjectileHit {
    pub damage: i32,
    pub hit_mask: LayerMask,
    pub destroy_on_hit: bool,
    consumed: bool,
}

impl ProjectileHit {
    /// Hits hurtboxes and is destroyed on hit.
    #[must_use]
    pub fn new(damage: i32) -> Self {
        Self {
            damage,
            hit_mask: CollisionLayer::Hurtbox.into(),
            destroy_on_hit: true,
            consumed: false,
        }
    }

    #[must_use]
    pub const fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// Marks the projectile spent. Returns `false` if it already was.
    pub const fn consume(&mut self) -> bool {
        let fresh = !self.consumed;
        self.consumed = true;
        fresh
    }
}

/// Flash spawned where the projectile lands a hit.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitSpark(pub Color);

/// Rotates the sprite to point along its velocity.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AlignToVelocity;

/// Removes projectiles that fall out of the arena or fly too long.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DespawnBelowY {
    pub min_y: f32,
    pub max_lifetime: f32,
    age: f32,
}

impl Default for DespawnBelowY {
    fn default() -> Self {
        Self {
            min_y: DEFAULT_MIN_Y,
            max_lifetime: DEFAULT_MAX_LIFETIME,
            age: 0.0,
        }
    }
}

/// Short-lived sprite that fades out and despawns.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct FadingEffect {
    timer: Timer,
    base_alpha: f32,
}

/// Finds the `Health` owning a collider by walking up `ChildOf`.
#[derive(SystemParam)]
pub struct HealthOwners<'w, 's> {
    parents: Query<'w, 's, &'static ChildOf>,
    owners: Query<'w, 's, &'static Team, With<Health>>,
}

impl HealthOwners<'_, '_> {
    /// The owning entity and its team, starting at `collider` itself.
    #[must_use]
    pub fn resolve(&self, collider: Entity) -> Option<(Entity, Team)> {
        let mut current = collider;
        loop {
            if let Ok(team) = self.owners.get(current) {
                return Some((current, *team));
            }
            current = self.parents.get(current).ok()?.parent();
        }
    }
}

// === Spawning ===

/// Initial velocity for a shot at `angle_deg` above the horizontal.
#[must_use]
pub fn launch_velocity(angle_deg: f32, speed: f32, dir_x: f32) -> Vec2 {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Vec2::new(cos * dir_x, sin) * speed
}

/// Physics for a sensor projectile that hits hurtboxes, ground and pickups.
pub fn projectile_body(velocity: Vec2, gravity_scale: f32) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Sensor,
        Mass(PROJECTILE_MASS),
        LinearVelocity(velocity),
        GravityScale(gravity_scale),
        CollisionLayers::new(
            CollisionLayer::Hitbox,
            [
                CollisionLayer::Hurtbox,
                CollisionLayer::Ground,
                CollisionLayer::Pickup,
            ],
        ),
        CollisionEventsEnabled,
        CollidingEntities::default(),
    )
}

/// Spawns a ballistic arrow from `origin` toward `dir_x`.
pub fn spawn_arrow(
    commands: &mut Commands,
    tuning: &ArrowTuning,
    team: Team,
    origin: Vec2,
    dir_x: f32,
) -> Entity {
    let velocity = launch_velocity(tuning.launch_angle_deg, tuning.speed, dir_x);
    let gravity_scale = if tuning.gravity_scale <= 0.0 {
        1.0
    } else {
        tuning.gravity_scale
    };
    commands
        .spawn((
            Name::new("Arrow"),
            team,
            ProjectileHit::new(tuning.damage),
            AlignToVelocity,
            DespawnBelowY::default(),
            Sprite::from_color(palette::ARROW, ARROW_SIZE),
            Transform::from_translation(origin.extend(Z_PROJECTILE))
                .with_rotation(Quat::from_rotation_z(velocity.to_angle())),
            DespawnOnExit(GameState::InGame),
            Collider::rectangle(ARROW_SIZE.x, ARROW_SIZE.y),
            projectile_body(velocity, gravity_scale),
        ))
        .id()
}

pub fn spawn_effect(commands: &mut Commands, at: Vec2, color: Color, size: f32, secs: f32) {
    commands.spawn((
        Name::new("Effect"),
        FadingEffect {
            timer: Timer::from_seconds(secs, TimerMode::Once),
            base_alpha: color.alpha(),
        },
        Sprite::from_color(color, Vec2::splat(size)),
        Transform::from_translation(at.extend(Z_EFFECT)),
        DespawnOnExit(GameState::InGame),
    ));
}

// === Systems ===

/// Damages the first hostile hurtbox in contact and retires the projectile.
/// Contacts are visited in entity order so a tie resolves the same way
/// every run.
fn resolve_projectile_hits(
    mut projectiles: Query<(
        Entity,
        &mut ProjectileHit,
        &Team,
        &CollidingEntities,
        &Transform,
        Option<&HitSpark>,
    )>,
    layers: Query<(&CollisionLayers, Option<&Collider>, Option<&GlobalTransform>)>,
    owners: HealthOwners,
    mut damage: MessageWriter<DamageRequest>,
    mut commands: Commands,
) {
    for (entity, mut hit, team, colliding, transform, spark) in &mut projectiles {
        if hit.is_consumed() || colliding.0.is_empty() {
            continue;
        }
        let position = transform.translation.xy();
        let mut contacts: Vec<Entity> = colliding.0.iter().copied().collect();
        contacts.sort_unstable();

        for contact in contacts {
            let Ok((contact_layers, collider, contact_transform)) = layers.get(contact) else {
                continue;
            };
            if !layers_match(contact_layers, hit.hit_mask) {
                continue;
            }
            let Some((target, target_team)) = owners.resolve(contact) else {
                continue;
            };
            if target_team == *team {
                continue;
            }

            let at = match (collider, contact_transform) {
                (Some(collider), Some(placed)) => contact_point(collider, placed, position),
                _ => position,
            };
            hit.consume();
            damage.write(DamageRequest {
                target,
                amount: hit.damage,
                at: Some(at),
            });
            if let Some(HitSpark(color)) = spark {
                spawn_effect(&mut commands, at, *color, SPARK_SIZE, SPARK_LIFETIME);
            }
            if hit.destroy_on_hit {
                commands.entity(entity).despawn();
            }
            break;
        }
    }
}

fn align_to_velocity(
    mut projectiles: Query<(&LinearVelocity, &mut Transform), With<AlignToVelocity>>,
) {
    for (velocity, mut transform) in &mut projectiles {
        if velocity.0.length_squared() > 1e-4 {
            transform.rotation = Quat::from_rotation_z(velocity.0.to_angle());
        }
    }
}

fn despawn_strays(
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut DespawnBelowY, &Transform)>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut stray, transform) in &mut projectiles {
        stray.age += dt;
        if transform.translation.y < stray.min_y || stray.age >= stray.max_lifetime {
            commands.entity(entity).despawn();
        }
    }
}

fn tick_effects(
    time: Res<Time>,
    mut effects: Query<(Entity, &mut FadingEffect, &mut Sprite)>,
    mut commands: Commands,
) {
    for (entity, mut effect, mut sprite) in &mut effects {
        effect.timer.tick(time.delta());
        let alpha = effect.base_alpha * (1.0 - effect.timer.fraction());
        sprite.color.set_alpha(alpha);
        if effect.timer.is_finished() {
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ProjectileHit>()
        .register_type::<HitSpark>()
        .register_type::<AlignToVelocity>()
        .register_type::<DespawnBelowY>()
        .register_type::<FadingEffect>()
        .register_type::<GrowingBullet>()
        .register_type::<HomingMissile>()
        .register_type::<MarkExplode>()
        .register_type::<MarkVisual>()
        .register_type::<Anchored>();

    // Flight → contacts → sticking → detonation → cleanup.
    app.add_systems(
        Update,
        (
            (
                growing::grow_bullets,
                homing::steer_missiles,
                align_to_velocity,
                despawn_strays,
            ),
            resolve_projectile_hits,
            mark_explode::stick_marks,
            mark_explode::follow_anchors,
            mark_explode::detonate_marks,
            tick_effects,
        )
            .chain()
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
