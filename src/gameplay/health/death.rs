//! Death handling: shuts a fallen combatant down and despawns it later.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::CombatantDied;
use crate::gameplay::animation::{AnimTrigger, Animator};
use crate::gameplay::{ALL_BEHAVIORS, Behaviors};
use crate::{GameSet, gameplay_running};

/// Delay between death and despawn, configured per combatant.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct DespawnAfterDeath(pub f32);

/// Counts down to despawn after death.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DeathTimer(pub Timer);

/// Disables behaviors and every collider in the hierarchy, starts the death
/// clip on real time, and schedules the despawn.
fn on_combatant_died(
    died: On<CombatantDied>,
    mut combatants: Query<(
        Option<&mut Behaviors>,
        Option<&mut Animator>,
        Option<&mut LinearVelocity>,
        Option<&DespawnAfterDeath>,
    )>,
    children: Query<&Children>,
    colliders: Query<(), With<Collider>>,
    mut commands: Commands,
) {
    let Ok((behaviors, animator, velocity, despawn)) = combatants.get_mut(died.entity) else {
        return;
    };

    if let Some(mut behaviors) = behaviors {
        behaviors.set_all(&ALL_BEHAVIORS, false);
    }
    if let Some(mut animator) = animator {
        animator.set_trigger(AnimTrigger::Die);
        animator.use_unscaled_time();
    }
    if let Some(mut velocity) = velocity {
        velocity.0 = Vec2::ZERO;
    }

    let mut stack = vec![died.entity];
    while let Some(entity) = stack.pop() {
        if colliders.contains(entity) {
            commands.entity(entity).try_insert(ColliderDisabled);
        }
        if let Ok(kids) = children.get(entity) {
            stack.extend(kids.iter());
        }
    }

    if let Some(DespawnAfterDeath(delay)) = despawn {
        commands
            .entity(died.entity)
            .try_insert(DeathTimer(Timer::from_seconds(*delay, TimerMode::Once)));
    }
}

fn tick_death_timers(
    time: Res<Time>,
    mut dying: Query<(Entity, &mut DeathTimer)>,
    mut commands: Commands,
) {
    for (entity, mut timer) in &mut dying {
        timer.0.tick(time.delta());
        if timer.0.just_finished() {
            commands.entity(entity).despawn();
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<DespawnAfterDeath>()
        .register_type::<DeathTimer>();

    app.add_observer(on_combatant_died);
    app.add_systems(
        Update,
        tick_death_timers
            .in_set(GameSet::Death)
            .run_if(gameplay_running),
    );
}
