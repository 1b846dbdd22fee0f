//! Falling volleys: the bot's bullet rain and the player's arrow rain.

use avian2d::prelude::*;
use bevy::prelude::*;
use rand::Rng;

use super::{AlignToVelocity, DespawnBelowY, ProjectileHit, projectile_body};
use crate::Z_PROJECTILE;
use crate::gameplay::Team;
use crate::screens::GameState;
use crate::theme::palette;

const RAIN_ARROW_SIZE: Vec2 = Vec2::new(0.45, 0.07);
const RAIN_BULLET_RADIUS: f32 = 0.1;

/// Paces a volley: one drop `interval` apart, starting immediately.
/// A non-positive interval releases the whole volley at once.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct RainVolley {
    remaining: u32,
    interval: f32,
    next_in: f32,
}

impl RainVolley {
    #[must_use]
    pub const fn new(count: u32, interval: f32) -> Self {
        Self {
            remaining: count,
            interval,
            next_in: 0.0,
        }
    }

    /// Releases every drop that is due and returns how many.
    pub fn release(&mut self) -> u32 {
        let mut released = 0;
        while self.remaining > 0 && self.next_in <= 0.0 {
            released += 1;
            self.remaining -= 1;
            self.next_in += self.interval.max(0.0);
        }
        released
    }

    pub fn advance(&mut self, dt: f32) {
        self.next_in -= dt;
    }

    /// Releases what is due now, then lets `dt` pass.
    pub fn tick(&mut self, dt: f32) -> u32 {
        let released = self.release();
        self.advance(dt);
        released
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// All drops released and the last interval waited out.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.remaining == 0 && self.next_in <= 0.0
    }
}

/// Random x within `±half_width` of `center_x`.
#[must_use]
pub fn random_drop_x(center_x: f32, half_width: f32) -> f32 {
    let half_width = half_width.max(0.0);
    center_x + rand::rng().random_range(-half_width..=half_width)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RainStyle {
    /// Round bot bullet.
    Bullet,
    /// Player arrow, pointing along its fall.
    Arrow,
}

/// Spawns one falling projectile.
pub fn spawn_rain_drop(
    commands: &mut Commands,
    style: RainStyle,
    team: Team,
    at: Vec2,
    velocity: Vec2,
    damage: i32,
) -> Entity {
    let transform = Transform::from_translation(at.extend(Z_PROJECTILE));
    let mut drop = commands.spawn((
        Name::new("Rain Drop"),
        team,
        ProjectileHit::new(damage),
        AlignToVelocity,
        DespawnBelowY::default(),
        DespawnOnExit(GameState::InGame),
        projectile_body(velocity, 0.0),
    ));
    match style {
        RainStyle::Bullet => drop.insert((
            Sprite::from_color(palette::BULLET, Vec2::splat(RAIN_BULLET_RADIUS * 2.0)),
            Collider::circle(RAIN_BULLET_RADIUS),
            transform,
        )),
        RainStyle::Arrow => drop.insert((
            Sprite::from_color(palette::RAIN_ARROW, RAIN_ARROW_SIZE),
            Collider::rectangle(RAIN_ARROW_SIZE.x, RAIN_ARROW_SIZE.y),
            transform.with_rotation(Quat::from_rotation_z(velocity.to_angle())),
        )),
    };
    drop.id()
}
