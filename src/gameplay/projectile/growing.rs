//! Bot bullet that swells while it flies.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::{DespawnBelowY, HitSpark, ProjectileHit, projectile_body};
use crate::config::BulletTuning;
use crate::gameplay::Team;
use crate::screens::GameState;
use crate::theme::palette;
use crate::Z_PROJECTILE;

const BULLET_RADIUS: f32 = 0.15;

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct GrowingBullet {
    pub start_scale: f32,
    pub max_scale: f32,
    pub grow_time: f32,
    elapsed: f32,
}

impl GrowingBullet {
    #[must_use]
    pub const fn new(start_scale: f32, max_scale: f32, grow_time: f32) -> Self {
        Self {
            start_scale,
            max_scale,
            grow_time,
            elapsed: 0.0,
        }
    }

    /// Linear from `start_scale` to `max_scale` over `grow_time`, then held.
    #[must_use]
    pub fn scale(&self) -> f32 {
        let k = if self.grow_time <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.grow_time).clamp(0.0, 1.0)
        };
        (self.max_scale - self.start_scale).mul_add(k, self.start_scale)
    }
}

pub(super) fn grow_bullets(
    time: Res<Time>,
    mut bullets: Query<(&mut GrowingBullet, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (mut bullet, mut transform) in &mut bullets {
        bullet.elapsed += dt;
        let scale = bullet.scale();
        transform.scale = Vec3::new(scale, scale, 1.0);
    }
}

/// Fires a bullet horizontally toward `dir_x`.
pub fn spawn_growing_bullet(
    commands: &mut Commands,
    tuning: &BulletTuning,
    team: Team,
    origin: Vec2,
    dir_x: f32,
) -> Entity {
    let bullet = GrowingBullet::new(tuning.start_scale, tuning.max_scale, tuning.grow_time);
    let scale = bullet.scale();
    commands
        .spawn((
            Name::new("Growing Bullet"),
            team,
            bullet,
            ProjectileHit::new(tuning.damage),
            HitSpark(palette::HIT_SPARK),
            DespawnBelowY::default(),
            Sprite::from_color(palette::BULLET, Vec2::splat(BULLET_RADIUS * 2.0)),
            Transform::from_translation(origin.extend(Z_PROJECTILE))
                .with_scale(Vec3::new(scale, scale, 1.0)),
            DespawnOnExit(GameState::InGame),
            Collider::circle(BULLET_RADIUS),
            projectile_body(Vec2::new(tuning.speed * dir_x, 0.0), 0.0),
        ))
        .id()
}


#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::testing::{advance_frames, create_test_app};

    #[test]
    fn bullet_transform_scales_over_time() {
        let mut app = create_test_app();
        app.add_systems(Update, grow_bullets);
        let bullet = app
            .world_mut()
            .spawn((GrowingBullet::new(0.6, 1.8, 0.8), Transform::default()))
            .id();

        // The first update has a zero delta: 26 frames is 0.406 s.
        advance_frames(&mut app, 27);
        let scale = app.world().get::<Transform>(bullet).unwrap().scale;
        assert!(scale.x > 1.2 && scale.x < 1.25);
        assert!((scale.x - scale.y).abs() < f32::EPSILON);

        advance_frames(&mut app, 60);
        let scale = app.world().get::<Transform>(bullet).unwrap().scale;
        assert!((scale.x - 1.8).abs() < 1e-5);
    }
}
