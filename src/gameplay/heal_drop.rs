//! Heal drops: pickups that fall into the arena every few seconds and heal
//! whichever side shoots them.

use avian2d::prelude::*;
use bevy::prelude::*;
use rand::Rng;

use super::health::Health;
use super::popup::PopupRequest;
use super::projectile::ProjectileHit;
use super::{Combatant, Team};
use crate::config::{ArenaConfig, DropXMode, HealDropTuning};
use crate::screens::GameState;
use crate::theme::palette;
use crate::third_party::CollisionLayer;
use crate::{GameSet, Z_PICKUP, gameplay_running};

const PICKUP_SIZE: f32 = 0.4;
/// Heal popup height above the healed combatant.
const HEAL_POPUP_OFFSET: Vec2 = Vec2::new(0.0, 0.6);

/// Drop schedule. Reset whenever a match starts.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct HealDropSpawner {
    /// `None` when automatic drops are off.
    timer: Option<Timer>,
    next_point: usize,
}

impl HealDropSpawner {
    #[must_use]
    pub fn new(interval: f32) -> Self {
        Self {
            timer: (interval > 0.0).then(|| Timer::from_seconds(interval, TimerMode::Repeating)),
            next_point: 0,
        }
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct HealPickup {
    pub heal_amount: i32,
    pub fall_speed: f32,
    pub kill_below_y: f32,
    /// Zero lives until it falls out.
    pub lifetime: f32,
    age: f32,
}

impl HealPickup {
    #[must_use]
    pub const fn new(tuning: &HealDropTuning) -> Self {
        Self {
            heal_amount: tuning.heal_amount,
            fall_speed: tuning.fall_speed,
            kill_below_y: tuning.kill_below_y,
            lifetime: tuning.lifetime,
            age: 0.0,
        }
    }
}

fn random_between(a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    rand::rng().random_range(lo..=hi)
}

/// Spawn x for the next drop given both combatants' x.
pub fn pick_drop_x(
    tuning: &HealDropTuning,
    player_x: f32,
    bot_x: f32,
    next_point: &mut usize,
) -> f32 {
    let midpoint = (player_x + bot_x) * 0.5;
    let x = match tuning.x_mode {
        DropXMode::Midpoint => midpoint,
        DropXMode::RandomBetweenCombatants => {
            let lo = player_x.min(bot_x) + tuning.between_padding;
            let hi = player_x.max(bot_x) - tuning.between_padding;
            if lo > hi {
                midpoint
            } else {
                random_between(lo, hi)
            }
        }
        DropXMode::RandomInRange => random_between(tuning.range_min_x, tuning.range_max_x),
        DropXMode::Points if tuning.points.is_empty() => midpoint,
        DropXMode::Points if tuning.points_sequential => {
            let x = tuning.points[*next_point % tuning.points.len()];
            *next_point = (*next_point + 1) % tuning.points.len();
            x
        }
        DropXMode::Points => tuning.points[rand::rng().random_range(0..tuning.points.len())],
    };
    x + tuning.x_offset
}

/// Spawn height: fixed, or `drop_height` above the higher combatant.
#[must_use]
pub fn pick_drop_y(tuning: &HealDropTuning, player_y: f32, bot_y: f32) -> f32 {
    tuning
        .fixed_y
        .unwrap_or_else(|| player_y.max(bot_y) + tuning.drop_height)
}

pub fn spawn_heal_pickup(commands: &mut Commands, tuning: &HealDropTuning, at: Vec2) -> Entity {
    commands
        .spawn((
            Name::new("Heal Pickup"),
            HealPickup::new(tuning),
            Sprite::from_color(palette::HEAL_PICKUP, Vec2::splat(PICKUP_SIZE)),
            Transform::from_translation(at.extend(Z_PICKUP)),
            DespawnOnExit(GameState::InGame),
            Collider::circle(PICKUP_SIZE * 0.5),
            Sensor,
            CollisionLayers::new(CollisionLayer::Pickup, CollisionLayer::Hitbox),
            CollisionEventsEnabled,
            CollidingEntities::default(),
        ))
        .id()
}

fn reset_spawner(mut commands: Commands, config: Res<ArenaConfig>) {
    commands.insert_resource(HealDropSpawner::new(config.heal_drop.interval));
}

fn spawn_heal_drops(
    time: Res<Time>,
    config: Res<ArenaConfig>,
    mut spawner: ResMut<HealDropSpawner>,
    combatants: Query<(&Team, &Transform), With<Combatant>>,
    mut commands: Commands,
) {
    let spawner = &mut *spawner;
    let Some(timer) = spawner.timer.as_mut() else {
        return;
    };
    if !timer.tick(time.delta()).just_finished() {
        return;
    }

    let position_of = |side: Team| {
        combatants
            .iter()
            .find(|(team, _)| **team == side)
            .map(|(_, transform)| transform.translation.xy())
    };
    let (Some(player), Some(bot)) = (position_of(Team::Player), position_of(Team::Bot)) else {
        return;
    };

    let tuning = &config.heal_drop;
    let x = pick_drop_x(tuning, player.x, bot.x, &mut spawner.next_point);
    let y = pick_drop_y(tuning, player.y, bot.y);
    spawn_heal_pickup(&mut commands, tuning, Vec2::new(x, y));
    debug!("Heal drop at ({x:.2}, {y:.2})");
}

fn fall_heal_pickups(
    time: Res<Time>,
    mut pickups: Query<(Entity, &mut HealPickup, &mut Transform)>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut pickup, mut transform) in &mut pickups {
        pickup.age += dt;
        transform.translation.y -= pickup.fall_speed * dt;
        let expired = pickup.lifetime > 0.0 && pickup.age >= pickup.lifetime;
        if expired || transform.translation.y < pickup.kill_below_y {
            commands.entity(entity).despawn();
        }
    }
}

/// Runs in `GameSet::Damage`, after projectile hits are resolved.
fn collect_heal_pickups(
    pickups: Query<(Entity, &HealPickup, &CollidingEntities)>,
    mut projectiles: Query<(&mut ProjectileHit, &Team)>,
    mut combatants: Query<(&Team, &mut Health, &Transform), With<Combatant>>,
    mut popups: MessageWriter<PopupRequest>,
    mut commands: Commands,
) {
    for (entity, pickup, colliding) in &pickups {
        let mut contacts: Vec<Entity> = colliding.0.iter().copied().collect();
        contacts.sort_unstable();

        for contact in contacts {
            let Ok((mut hit, team)) = projectiles.get_mut(contact) else {
                continue;
            };
            if !hit.consume() {
                continue;
            }
            commands.entity(contact).try_despawn();
            commands.entity(entity).despawn();

            let Some((_, mut health, transform)) =
                combatants.iter_mut().find(|(side, ..)| **side == *team)
            else {
                break;
            };
            let healed = health.heal(pickup.heal_amount);
            if healed > 0 {
                popups.write(PopupRequest::heal(
                    healed,
                    transform.translation.xy() + HEAL_POPUP_OFFSET,
                ));
            }
            info!("{team:?} picked up a heal: +{healed}");
            break;
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HealDropSpawner>()
        .register_type::<HealPickup>();
    app.init_resource::<HealDropSpawner>();

    app.add_systems(OnEnter(GameState::InGame), reset_spawner);
    app.add_systems(
        Update,
        (
            (spawn_heal_drops, fall_heal_pickups).in_set(GameSet::Combat),
            collect_heal_pickups.in_set(GameSet::Damage),
        )
            .run_if(gameplay_running),
    );
}
