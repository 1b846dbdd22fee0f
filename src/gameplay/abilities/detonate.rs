//! Detonate ability: lobs a marking arrow that blows up after a delay.

use bevy::prelude::*;

use crate::config::DetonateTuning;
use crate::gameplay::projectile::spawn_mark_explode;
use crate::gameplay::{Facing, FirePoint, Team};

pub(super) fn activate(
    commands: &mut Commands,
    tuning: &DetonateTuning,
    team: Team,
    owner: Vec2,
    facing: Facing,
    fire_point: Option<&FirePoint>,
) -> bool {
    let Some(fire_point) = fire_point else {
        return false;
    };
    let origin = fire_point.world_position(owner, facing);
    spawn_mark_explode(commands, tuning, team, origin, facing.sign());
    true
}
