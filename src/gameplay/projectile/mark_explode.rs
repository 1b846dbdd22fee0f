//! Detonation arrow: sticks into a hostile hurtbox or the ground, marks the
//! spot, and explodes after a delay.
//!
//! Flying → Stuck → Exploded. Sticking uses up contact eligibility, the
//! explosion deals the damage, and it happens exactly once per arrow. A stuck
//! arrow is not reparented: it stores its anchor and a local offset and
//! follows the anchor every frame.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::{
    AlignToVelocity, DespawnBelowY, HealthOwners, launch_velocity, projectile_body, spawn_effect,
};
use crate::config::DetonateTuning;
use crate::gameplay::Team;
use crate::gameplay::health::{DamageRequest, Health};
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::{CollisionLayer, contact_point, layers_match, overlaps_circle};
use crate::{Z_EFFECT, Z_PROJECTILE};

/// Radii at or below this damage only the stuck target.
pub const AREA_THRESHOLD: f32 = 0.01;

const ARROW_SIZE: Vec2 = Vec2::new(0.55, 0.1);
const MARK_SIZE: f32 = 0.25;
const HURTBOX_MARK_OFFSET: Vec3 = Vec3::new(0.0, 0.4, 0.0);
const GROUND_MARK_OFFSET: Vec3 = Vec3::new(0.0, 0.2, 0.0);
const EXPLOSION_LIFETIME: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum MarkPhase {
    Flying,
    Stuck {
        anchor: Entity,
        /// The `Health` owner when stuck in a hurtbox.
        target: Option<Entity>,
        mark: Option<Entity>,
        elapsed: f32,
    },
    Exploded,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct MarkExplode {
    pub hurtbox_mask: LayerMask,
    pub ground_mask: LayerMask,
    pub detonate_delay: f32,
    pub damage: i32,
    pub aoe_radius: f32,
    phase: MarkPhase,
}

impl MarkExplode {
    #[must_use]
    pub fn new(detonate_delay: f32, damage: i32, aoe_radius: f32) -> Self {
        Self {
            hurtbox_mask: CollisionLayer::Hurtbox.into(),
            ground_mask: CollisionLayer::Ground.into(),
            detonate_delay,
            damage,
            aoe_radius,
            phase: MarkPhase::Flying,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> MarkPhase {
        self.phase
    }
}

/// Keeps an entity at a fixed local pose relative to another one.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Anchored {
    pub anchor: Entity,
    pub local_position: Vec3,
    pub local_rotation: Quat,
}

impl Anchored {
    /// Captures `pose` relative to the anchor's current world transform.
    #[must_use]
    pub fn capture(anchor: Entity, anchor_transform: &GlobalTransform, pose: &Transform) -> Self {
        Self {
            anchor,
            local_position: anchor_transform
                .affine()
                .inverse()
                .transform_point3(pose.translation),
            local_rotation: anchor_transform.rotation().inverse() * pose.rotation,
        }
    }
}

/// The marker drawn over a stuck detonation arrow.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MarkVisual;

/// Turns the first hostile-hurtbox or ground contact into a stuck arrow.
pub(super) fn stick_marks(
    mut marks: Query<(Entity, &mut MarkExplode, &Team, &CollidingEntities, &Transform)>,
    colliders: Query<(&CollisionLayers, &GlobalTransform)>,
    owners: HealthOwners,
    mut commands: Commands,
) {
    for (entity, mut mark, team, colliding, transform) in &mut marks {
        if mark.phase != MarkPhase::Flying || colliding.0.is_empty() {
            continue;
        }
        let mut contacts: Vec<Entity> = colliding.0.iter().copied().collect();
        contacts.sort_unstable();

        for contact in contacts {
            let Ok((layers, anchor_transform)) = colliders.get(contact) else {
                continue;
            };
            let is_hurtbox = layers_match(layers, mark.hurtbox_mask);
            let is_ground = layers_match(layers, mark.ground_mask);
            if !is_hurtbox && !is_ground {
                continue;
            }

            let target = if is_hurtbox {
                let Some((owner, owner_team)) = owners.resolve(contact) else {
                    continue;
                };
                if owner_team == *team {
                    continue;
                }
                Some(owner)
            } else {
                None
            };

            let anchored = Anchored::capture(contact, anchor_transform, transform);
            let offset = if target.is_some() {
                HURTBOX_MARK_OFFSET
            } else {
                GROUND_MARK_OFFSET
            };
            let mark_entity = commands
                .spawn((
                    Name::new("Detonation Mark"),
                    MarkVisual,
                    Sprite::from_color(palette::MARK, Vec2::splat(MARK_SIZE)),
                    Transform::from_translation(
                        (transform.translation + offset).with_z(Z_EFFECT),
                    ),
                    Anchored {
                        local_position: anchored.local_position + offset,
                        local_rotation: Quat::IDENTITY,
                        ..anchored
                    },
                    DespawnOnExit(GameState::InGame),
                ))
                .id();

            commands
                .entity(entity)
                .insert((
                    ColliderDisabled,
                    RigidBody::Kinematic,
                    LinearVelocity::ZERO,
                    GravityScale(0.0),
                    anchored,
                ))
                .remove::<(AlignToVelocity, DespawnBelowY)>();

            mark.phase = MarkPhase::Stuck {
                anchor: contact,
                target,
                mark: Some(mark_entity),
                elapsed: 0.0,
            };
            debug!("Detonation arrow stuck to {contact}");
            break;
        }
    }
}

/// Recomputes world poses of anchored entities from their anchors.
pub(super) fn follow_anchors(
    anchors: Query<&GlobalTransform>,
    mut anchored: Query<(&Anchored, &mut Transform)>,
) {
    for (anchored, mut transform) in &mut anchored {
        let Ok(anchor) = anchors.get(anchored.anchor) else {
            continue;
        };
        let z = transform.translation.z;
        transform.translation = anchor.transform_point(anchored.local_position).with_z(z);
        transform.rotation = anchor.rotation() * anchored.local_rotation;
    }
}

/// Runs the detonation delay and explodes stuck arrows.
pub(super) fn detonate_marks(
    time: Res<Time>,
    mut marks: Query<(Entity, &mut MarkExplode, &Team, &Transform)>,
    healths: Query<&Health>,
    existing: Query<()>,
    hurtboxes: Query<(Entity, &Collider, &GlobalTransform, &CollisionLayers), Without<ColliderDisabled>>,
    owners: HealthOwners,
    mut damage: MessageWriter<DamageRequest>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut mark, team, transform) in &mut marks {
        let MarkPhase::Stuck {
            anchor,
            target,
            mark: mark_visual,
            elapsed,
        } = mark.phase
        else {
            continue;
        };

        let target_down =
            target.is_some_and(|target| !healths.get(target).is_ok_and(|h| h.current() > 0));
        let anchor_gone = !existing.contains(anchor);
        if !target_down && !anchor_gone && elapsed < mark.detonate_delay {
            mark.phase = MarkPhase::Stuck {
                anchor,
                target,
                mark: mark_visual,
                elapsed: elapsed + dt,
            };
            continue;
        }

        let at = transform.translation.xy();
        spawn_effect(
            &mut commands,
            at,
            palette::EXPLOSION,
            mark.aoe_radius.max(0.2) * 2.0,
            EXPLOSION_LIFETIME,
        );
        if let Some(visual) = mark_visual {
            commands.entity(visual).try_despawn();
        }

        if mark.aoe_radius > AREA_THRESHOLD {
            let mut damaged: Vec<Entity> = Vec::new();
            for (hurtbox, collider, hurtbox_transform, layers) in &hurtboxes {
                if !layers_match(layers, mark.hurtbox_mask)
                    || !overlaps_circle(
                        collider,
                        hurtbox_transform.translation().xy(),
                        at,
                        mark.aoe_radius,
                    )
                {
                    continue;
                }
                let Some((owner, owner_team)) = owners.resolve(hurtbox) else {
                    continue;
                };
                if owner_team == *team || damaged.contains(&owner) {
                    continue;
                }
                damaged.push(owner);
                damage.write(DamageRequest {
                    target: owner,
                    amount: mark.damage,
                    at: Some(contact_point(collider, hurtbox_transform, at)),
                });
            }
        } else if let Some(target) = target {
            let hit_at = hurtboxes
                .get(anchor)
                .map_or(at, |(_, collider, placed, _)| contact_point(collider, placed, at));
            damage.write(DamageRequest {
                target,
                amount: mark.damage,
                at: Some(hit_at),
            });
        }

        mark.phase = MarkPhase::Exploded;
        commands.entity(entity).despawn();
    }
}

/// Launches a detonation arrow from `origin` toward `dir_x`.
pub fn spawn_mark_explode(
    commands: &mut Commands,
    tuning: &DetonateTuning,
    team: Team,
    origin: Vec2,
    dir_x: f32,
) -> Entity {
    let velocity = launch_velocity(tuning.launch_angle_deg, tuning.speed, dir_x);
    commands
        .spawn((
            Name::new("Detonation Arrow"),
            team,
            MarkExplode::new(tuning.detonate_delay, tuning.damage, tuning.aoe_radius),
            AlignToVelocity,
            DespawnBelowY::default(),
            Sprite::from_color(palette::MARK_ARROW, ARROW_SIZE),
            Transform::from_translation(origin.extend(Z_PROJECTILE))
                .with_rotation(Quat::from_rotation_z(velocity.to_angle())),
            DespawnOnExit(GameState::InGame),
            Collider::rectangle(ARROW_SIZE.x, ARROW_SIZE.y),
            projectile_body(velocity, tuning.gravity_scale),
        ))
        .id()
}
