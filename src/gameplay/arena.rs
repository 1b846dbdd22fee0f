//! The arena: camera, floor, and the two combatants.

use avian2d::prelude::*;
use bevy::camera::ScalingMode;
use bevy::prelude::*;

use super::animation::{AnimState, Animator};
use super::attack::{AttackPayload, AutoAttack, NormalAttack};
use super::bot::BotPattern;
use super::health::{
    DespawnAfterDeath, Health, HpBar, HpLabel, HpLabelFormat, HurtReaction, ShieldVisual,
};
use super::player::DragMover;
use super::{Behavior, Behaviors, Combatant, Facing, FirePoint, Team};
use crate::config::{ArenaConfig, CombatantTuning};
use crate::screens::GameState;
use crate::third_party::CollisionLayer;
use crate::theme::palette;
use crate::{GameSet, Z_BACKGROUND, Z_COMBATANT, Z_GROUND};

/// World units visible from the bottom to the top of the window.
const VIEW_HEIGHT: f32 = 12.0;
/// Camera centre height; keeps the floor in the lower third.
const CAMERA_Y: f32 = 3.0;

const BODY_SIZE: Vec2 = Vec2::new(0.8, 1.6);
/// Combatants stand with their centre on this line.
const STAND_Y: f32 = 0.0;
const GROUND_SIZE: Vec2 = Vec2::new(24.0, 1.0);
/// The floor's top edge sits under the combatants' feet.
const GROUND_TOP: f32 = STAND_Y - BODY_SIZE.y / 2.0;
/// Local offset arrows and casts leave from, for a combatant facing right.
const FIRE_POINT: Vec2 = Vec2::new(0.5, 0.3);
const SHIELD_SIZE: Vec2 = Vec2::new(1.3, 2.0);

const HURT_FLASH: Color = Color::WHITE;
const DEAD_TINT: Color = Color::srgb(0.3, 0.3, 0.3);

/// Marker for the arena camera. It renders both the world and the UI.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ArenaCamera;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Ground;

/// Resting colour of a combatant's sprite; hurt and death tint over it.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BodyColor(pub Color);

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
struct Hurtbox;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Arena Camera"),
        ArenaCamera,
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scaling_mode: ScalingMode::FixedVertical {
                viewport_height: VIEW_HEIGHT,
            },
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, CAMERA_Y, 0.0),
    ));
}

fn spawn_arena(mut commands: Commands, config: Res<ArenaConfig>) {
    commands.spawn((
        Name::new("Background"),
        Sprite::from_color(palette::BACKGROUND, Vec2::new(GROUND_SIZE.x + 8.0, VIEW_HEIGHT * 2.0)),
        Transform::from_xyz(0.0, CAMERA_Y, Z_BACKGROUND),
        DespawnOnExit(GameState::InGame),
    ));

    commands.spawn((
        Name::new("Ground"),
        Ground,
        Sprite::from_color(palette::GROUND, GROUND_SIZE),
        Transform::from_xyz(0.0, GROUND_TOP - GROUND_SIZE.y / 2.0, Z_GROUND),
        RigidBody::Static,
        Collider::rectangle(GROUND_SIZE.x, GROUND_SIZE.y),
        CollisionLayers::new(
            CollisionLayer::Ground,
            [CollisionLayer::Body, CollisionLayer::Hitbox],
        ),
        DespawnOnExit(GameState::InGame),
    ));

    let player_tuning = &config.player;
    let player = commands
        .spawn((
            Name::new("Player"),
            combatant_body(Team::Player, player_tuning.spawn_x, palette::PLAYER),
            combatant_health(
                &player_tuning.combatant,
                vec![Behavior::Movement, Behavior::Attack],
            ),
            Facing::Right,
            NormalAttack::new(Some(AttackPayload::Arrow(player_tuning.arrow.clone()))),
            AutoAttack,
            DragMover::new(player_tuning),
        ))
        .id();

    let bot_tuning = &config.bot;
    commands.spawn((
        Name::new("Bot"),
        combatant_body(Team::Bot, bot_tuning.spawn_x, palette::BOT),
        combatant_health(&bot_tuning.combatant, vec![Behavior::Pattern]),
        Facing::Left,
        NormalAttack::new(Some(AttackPayload::Bullet(bot_tuning.bullet.clone()))),
        BotPattern::new(bot_tuning).with_target(player),
    ));

    info!(
        "Arena ready: player at {:.1}, bot at {:.1}",
        player_tuning.spawn_x, bot_tuning.spawn_x
    );
}

/// Physics body, sprite, hurtbox and shield bubble of a combatant.
fn combatant_body(team: Team, x: f32, color: Color) -> impl Bundle {
    (
        Combatant,
        team,
        BodyColor(color),
        Sprite::from_color(color, BODY_SIZE),
        Transform::from_xyz(x, STAND_Y, Z_COMBATANT),
        (
            RigidBody::Dynamic,
            Collider::rectangle(BODY_SIZE.x, BODY_SIZE.y),
            CollisionLayers::new(CollisionLayer::Body, CollisionLayer::Ground),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::ZERO,
        ),
        Behaviors::default(),
        FirePoint(FIRE_POINT),
        Animator::default(),
        DespawnOnExit(GameState::InGame),
        children![
            (
                Name::new("Hurtbox"),
                Hurtbox,
                Collider::rectangle(BODY_SIZE.x, BODY_SIZE.y),
                Sensor,
                CollisionLayers::new(CollisionLayer::Hurtbox, CollisionLayer::Hitbox),
                Transform::default(),
            ),
            (
                Name::new("Shield"),
                ShieldVisual,
                Sprite::from_color(palette::SHIELD, SHIELD_SIZE),
                Transform::from_xyz(0.0, 0.0, 0.5),
                Visibility::Hidden,
            ),
        ],
    )
}

fn combatant_health(tuning: &CombatantTuning, stun_disables: Vec<Behavior>) -> impl Bundle {
    let health = Health::new(tuning.max_hp);
    let health = if tuning.use_shield {
        health
    } else {
        health.without_shield()
    };
    let stun = tuning.use_hit_stun.then_some(tuning.hit_stun_secs);
    (
        health,
        HurtReaction::new(stun, stun_disables),
        DespawnAfterDeath(tuning.destroy_delay_secs),
        HpBar {
            width: 1.0,
            height: 0.12,
            y_offset: BODY_SIZE.y / 2.0 + 0.25,
        },
        HpLabel {
            format: HpLabelFormat::CurrentOfMax,
            hide_when_full: false,
        },
    )
}

/// Tints combatant sprites by animation state and mirrors them by facing.
fn sync_body_sprites(mut bodies: Query<(&mut Sprite, &BodyColor, &Animator, &Facing)>) {
    for (mut sprite, body, animator, facing) in &mut bodies {
        let color = match animator.state() {
            AnimState::Hurt => HURT_FLASH,
            AnimState::Dead => DEAD_TINT,
            AnimState::Casting => body.0.mix(&Color::WHITE, 0.35),
            AnimState::Idle | AnimState::Run | AnimState::Attack => body.0,
        };
        if sprite.color != color {
            sprite.color = color;
        }
        let flip = *facing == Facing::Left;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ArenaCamera>()
        .register_type::<Ground>()
        .register_type::<BodyColor>()
        .register_type::<Hurtbox>();

    app.add_systems(Startup, spawn_camera);
    app.add_systems(OnEnter(GameState::InGame), spawn_arena);
    app.add_systems(
        Update,
        sync_body_sprites
            .in_set(GameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use pretty_assertions::assert_eq;

    use crate::menus::Menu;
    use crate::testing::{assert_entity_count, create_test_app};

    fn create_arena_test_app() -> App {
        let mut app = create_test_app();
        app.add_plugins(StatesPlugin);
        app.init_resource::<ArenaConfig>();
        app.init_state::<GameState>();
        app.init_state::<Menu>();
        app.add_plugins(plugin);
        app.update();

        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::InGame);
        app.update();
        app
    }

    fn combatant(app: &mut App, team: Team) -> Entity {
        let mut query = app.world_mut().query::<(Entity, &Team)>();
        query
            .iter(app.world())
            .find(|(_, t)| **t == team)
            .map(|(entity, _)| entity)
            .unwrap()
    }

    #[test]
    fn camera_spawns_at_startup() {
        let mut app = create_arena_test_app();
        assert_entity_count::<(With<ArenaCamera>, With<Camera2d>)>(&mut app, 1);
    }

    #[test]
    fn entering_game_spawns_ground_and_both_combatants() {
        let mut app = create_arena_test_app();

        assert_entity_count::<With<Ground>>(&mut app, 1);
        assert_entity_count::<With<Combatant>>(&mut app, 2);
        assert_entity_count::<(With<Combatant>, With<DespawnOnExit<GameState>>)>(&mut app, 2);
        assert_entity_count::<With<Hurtbox>>(&mut app, 2);
        assert_entity_count::<With<ShieldVisual>>(&mut app, 2);
    }

    #[test]
    fn player_and_bot_get_their_controllers() {
        let mut app = create_arena_test_app();
        let player = combatant(&mut app, Team::Player);
        let bot = combatant(&mut app, Team::Bot);

        let world = app.world();
        assert!(world.get::<DragMover>(player).is_some());
        assert!(world.get::<AutoAttack>(player).is_some());
        assert!(world.get::<BotPattern>(player).is_none());
        assert_eq!(world.get::<BotPattern>(bot).unwrap().target, Some(player));
        assert_eq!(*world.get::<Facing>(player).unwrap(), Facing::Right);
        assert_eq!(*world.get::<Facing>(bot).unwrap(), Facing::Left);
        assert!((world.get::<Transform>(player).unwrap().translation.x + 6.0).abs() < 1e-5);
        assert!((world.get::<Transform>(bot).unwrap().translation.x - 6.0).abs() < 1e-5);
    }

    #[test]
    fn combatants_get_hp_display_and_death_delay_without_stun() {
        let mut app = create_arena_test_app();
        assert_entity_count::<(With<Combatant>, With<HpBar>, With<HpLabel>)>(&mut app, 2);

        for team in [Team::Player, Team::Bot] {
            let entity = combatant(&mut app, team);
            let world = app.world();
            let delay = world.get::<DespawnAfterDeath>(entity).unwrap().0;
            assert!((delay - 1.5).abs() < f32::EPSILON);
            assert_eq!(world.get::<HurtReaction>(entity).unwrap().stun_duration, None);
        }
    }

    #[test]
    fn disabled_shield_is_not_granted() {
        let mut app = create_test_app();
        app.add_plugins(StatesPlugin);
        let mut config = ArenaConfig::default();
        config.bot.combatant.use_shield = false;
        app.insert_resource(config);
        app.init_state::<GameState>();
        app.add_plugins(plugin);
        app.update();
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(GameState::InGame);
        app.update();

        let bot = combatant(&mut app, Team::Bot);
        let mut health = app.world().get::<Health>(bot).unwrap().clone();
        assert!(!health.activate_shield(2.0, 0));
    }

    #[test]
    fn hurt_flashes_and_facing_mirrors_the_sprite() {
        let mut app = create_arena_test_app();
        let bot = combatant(&mut app, Team::Bot);
        app.world_mut()
            .get_mut::<Animator>(bot)
            .unwrap()
            .play(AnimState::Hurt);

        app.world_mut().run_system_cached(sync_body_sprites).unwrap();

        let sprite = app.world().get::<Sprite>(bot).unwrap();
        assert_eq!(sprite.color, HURT_FLASH);
        assert!(sprite.flip_x);
    }
}
