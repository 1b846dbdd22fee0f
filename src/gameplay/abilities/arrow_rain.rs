//! Arrow rain ability: a volley of falling arrows that tracks the bot.

use bevy::prelude::*;

use crate::config::ArrowRainTuning;
use crate::gameplay::projectile::{RainStyle, RainVolley, random_drop_x, spawn_rain_drop};
use crate::gameplay::Team;
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

/// Shortest spacing between two arrows of one volley.
const MIN_INTERVAL: f32 = 0.01;

/// In-flight volley. Each arrow re-reads the target's position.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ArrowRainVolley {
    pub target: Entity,
    pub team: Team,
    pub tuning: ArrowRainTuning,
    volley: RainVolley,
}

impl ArrowRainVolley {
    #[must_use]
    pub fn new(target: Entity, team: Team, tuning: &ArrowRainTuning) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let interval = (tuning.duration / tuning.arrow_count.max(1) as f32).max(MIN_INTERVAL);
        Self {
            target,
            team,
            tuning: tuning.clone(),
            volley: RainVolley::new(tuning.arrow_count, interval),
        }
    }
}

pub(super) fn activate(
    commands: &mut Commands,
    tuning: &ArrowRainTuning,
    team: Team,
    target: Option<Entity>,
) -> bool {
    let Some(target) = target else {
        return false;
    };
    commands.spawn((
        Name::new("Arrow Rain"),
        ArrowRainVolley::new(target, team, tuning),
        DespawnOnExit(GameState::InGame),
    ));
    true
}

fn run_arrow_rain(
    time: Res<Time>,
    mut volleys: Query<(Entity, &mut ArrowRainVolley)>,
    targets: Query<&Transform>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut rain) in &mut volleys {
        let Ok(target) = targets.get(rain.target) else {
            commands.entity(entity).despawn();
            continue;
        };
        let target = target.translation.xy();

        let released = rain.volley.tick(dt);
        let tuning = &rain.tuning;
        for _ in 0..released {
            let at = Vec2::new(
                random_drop_x(target.x, tuning.spread_x * 0.5),
                target.y + tuning.spawn_height,
            );
            spawn_rain_drop(
                &mut commands,
                RainStyle::Arrow,
                rain.team,
                at,
                Vec2::new(0.0, -tuning.fall_speed.abs()),
                tuning.damage,
            );
        }
        if rain.volley.remaining() == 0 {
            commands.entity(entity).despawn();
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<ArrowRainVolley>();

    app.add_systems(
        Update,
        run_arrow_rain
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
