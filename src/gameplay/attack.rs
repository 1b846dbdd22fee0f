//! Normal attack: turns attack-clip cues into projectiles.
//!
//! The attack-start cue latches the facing so a combatant that turns during
//! the swing still shoots where it aimed; the release cue spawns the payload
//! from the fire point.

use bevy::prelude::*;

use super::animation::{AnimTrigger, AnimationCue, Animator, Cue};
use super::projectile::{spawn_arrow, spawn_growing_bullet};
use super::{Behavior, Behaviors, Facing, FirePoint, Team};
use crate::config::{ArrowTuning, BulletTuning};
use crate::{GameSet, gameplay_running};

#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum AttackPayload {
    /// Ballistic arrow.
    Arrow(ArrowTuning),
    /// Horizontal bullet that grows in flight.
    Bullet(BulletTuning),
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NormalAttack {
    pub payload: Option<AttackPayload>,
    latched: Facing,
}

impl NormalAttack {
    #[must_use]
    pub const fn new(payload: Option<AttackPayload>) -> Self {
        Self {
            payload,
            latched: Facing::Right,
        }
    }
}

/// Queues an attack whenever the owner stands idle.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AutoAttack;

fn auto_attack(mut archers: Query<(&mut Animator, &Behaviors), With<AutoAttack>>) {
    for (mut animator, behaviors) in &mut archers {
        if !behaviors.is_enabled(Behavior::Attack)
            || animator.is_moving
            || !animator.state().is_locomotion()
            || animator.has_pending(AnimTrigger::Attack)
        {
            continue;
        }
        animator.set_trigger(AnimTrigger::Attack);
    }
}

/// Runs in `GameSet::Combat`.
fn handle_attack_cues(
    mut cues: MessageReader<AnimationCue>,
    mut attackers: Query<(
        &mut NormalAttack,
        &Team,
        &Facing,
        &Transform,
        Option<&FirePoint>,
    )>,
    mut commands: Commands,
) {
    for cue in cues.read() {
        let Ok((mut attack, team, facing, transform, fire_point)) = attackers.get_mut(cue.entity)
        else {
            continue;
        };
        match cue.cue {
            Cue::AttackStart => attack.latched = *facing,
            Cue::Release => {
                let (Some(fire_point), Some(payload)) = (fire_point, &attack.payload) else {
                    continue;
                };
                let origin = fire_point.world_position(transform.translation.xy(), attack.latched);
                let dir_x = attack.latched.sign();
                match payload {
                    AttackPayload::Arrow(tuning) => {
                        spawn_arrow(&mut commands, tuning, *team, origin, dir_x);
                    }
                    AttackPayload::Bullet(tuning) => {
                        spawn_growing_bullet(&mut commands, tuning, *team, origin, dir_x);
                    }
                }
            }
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<NormalAttack>()
        .register_type::<AutoAttack>();

    app.add_systems(
        Update,
        (
            auto_attack.in_set(GameSet::Input),
            handle_attack_cues.in_set(GameSet::Combat),
        )
            .run_if(gameplay_running),
    );
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use avian2d::prelude::LinearVelocity;
    use pretty_assertions::assert_eq;

    use crate::gameplay::projectile::{GrowingBullet, ProjectileHit};
    use crate::testing::{assert_entity_count, create_test_app, spawn_test_combatant};

    fn create_attack_test_app() -> App {
        let mut app = create_test_app();
        app.add_message::<AnimationCue>();
        app.add_systems(Update, (auto_attack, handle_attack_cues));
        app.update();
        app
    }

    fn spawn_archer(app: &mut App, payload: Option<AttackPayload>) -> Entity {
        let archer = spawn_test_combatant(app.world_mut(), Team::Player, -6.0, 100);
        app.world_mut().entity_mut(archer).insert((
            NormalAttack::new(payload),
            FirePoint(Vec2::new(0.5, 0.3)),
            Animator::default(),
        ));
        archer
    }

    fn cue(app: &mut App, entity: Entity, cue: Cue) {
        app.world_mut().write_message(AnimationCue { entity, cue });
        app.update();
    }

    #[test]
    fn release_fires_payload_in_facing_latched_at_start() {
        let mut app = create_attack_test_app();
        let archer = spawn_archer(&mut app, Some(AttackPayload::Arrow(ArrowTuning::default())));

        cue(&mut app, archer, Cue::AttackStart);
        *app.world_mut().get_mut::<Facing>(archer).unwrap() = Facing::Left;
        cue(&mut app, archer, Cue::Release);

        let mut arrows = app
            .world_mut()
            .query_filtered::<(&Team, &LinearVelocity, &Transform), With<ProjectileHit>>();
        let (team, velocity, transform) = arrows.single(app.world()).unwrap();
        assert_eq!(*team, Team::Player);
        assert!(velocity.0.x > 0.0 && velocity.0.y > 0.0);
        assert_eq!(transform.translation.xy(), Vec2::new(-5.5, 0.3));
    }

    #[test]
    fn bullet_payload_spawns_growing_bullet() {
        let mut app = create_attack_test_app();
        let archer = spawn_archer(&mut app, Some(AttackPayload::Bullet(BulletTuning::default())));
        *app.world_mut().get_mut::<Facing>(archer).unwrap() = Facing::Left;

        cue(&mut app, archer, Cue::AttackStart);
        cue(&mut app, archer, Cue::Release);

        let mut bullets = app
            .world_mut()
            .query_filtered::<&LinearVelocity, With<GrowingBullet>>();
        let velocity = bullets.single(app.world()).unwrap();
        assert_eq!(velocity.0, Vec2::new(-10.0, 0.0));
    }

    #[test]
    fn missing_payload_or_fire_point_is_a_no_op() {
        let mut app = create_attack_test_app();
        let unarmed = spawn_archer(&mut app, None);
        let no_fire_point =
            spawn_archer(&mut app, Some(AttackPayload::Arrow(ArrowTuning::default())));
        app.world_mut().entity_mut(no_fire_point).remove::<FirePoint>();

        cue(&mut app, unarmed, Cue::Release);
        cue(&mut app, no_fire_point, Cue::Release);

        assert_entity_count::<With<ProjectileHit>>(&mut app, 0);
    }

    #[test]
    fn auto_attack_only_when_standing_still() {
        let mut app = create_attack_test_app();
        let archer = spawn_archer(&mut app, None);
        app.world_mut().entity_mut(archer).insert(AutoAttack);
        app.world_mut().get_mut::<Animator>(archer).unwrap().is_moving = true;

        app.update();
        assert!(
            !app.world()
                .get::<Animator>(archer)
                .unwrap()
                .has_pending(AnimTrigger::Attack)
        );

        app.world_mut().get_mut::<Animator>(archer).unwrap().is_moving = false;
        app.update();
        assert!(
            app.world()
                .get::<Animator>(archer)
                .unwrap()
                .has_pending(AnimTrigger::Attack)
        );
    }
}
