//! Floating combat text: damage numbers, heals, and BLOCK.

use bevy::prelude::*;
use rand::Rng;

use super::Team;
use crate::screens::GameState;
use crate::theme::palette;
use crate::{GameSet, Z_POPUP};

const POPUP_LIFETIME: f32 = 0.6;
const POPUP_FLOAT_SPEED: f32 = 1.2;
/// Random spawn offset: x in `±x`, y in `0..y`.
const POPUP_JITTER: Vec2 = Vec2::new(0.06, 0.04);
const POPUP_FONT_SIZE: f32 = 28.0;
const POPUP_SCALE: f32 = 1.0 / 64.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    /// `team` is the side that took the hit.
    Damage { amount: i32, team: Team },
    Heal { amount: i32 },
    Block,
}

impl PopupKind {
    #[must_use]
    pub fn text(self) -> String {
        match self {
            Self::Damage { amount, .. } => format!("-{amount}"),
            Self::Heal { amount } => format!("+{amount}"),
            Self::Block => "BLOCK".to_string(),
        }
    }

    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Damage {
                team: Team::Player, ..
            } => palette::POPUP_DAMAGE_PLAYER,
            Self::Damage { team: Team::Bot, .. } => palette::POPUP_DAMAGE_BOT,
            Self::Heal { .. } => palette::POPUP_HEAL,
            Self::Block => palette::POPUP_BLOCK,
        }
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PopupRequest {
    pub kind: PopupKind,
    pub at: Vec2,
}

impl PopupRequest {
    #[must_use]
    pub const fn damage(amount: i32, team: Team, at: Vec2) -> Self {
        Self {
            kind: PopupKind::Damage { amount, team },
            at,
        }
    }

    #[must_use]
    pub const fn heal(amount: i32, at: Vec2) -> Self {
        Self {
            kind: PopupKind::Heal { amount },
            at,
        }
    }

    #[must_use]
    pub const fn block(at: Vec2) -> Self {
        Self {
            kind: PopupKind::Block,
            at,
        }
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct DamagePopup {
    elapsed: f32,
    base_color: Color,
}

fn spawn_popups(mut requests: MessageReader<PopupRequest>, mut commands: Commands) {
    let mut rng = rand::rng();
    for request in requests.read() {
        let jitter = Vec2::new(
            rng.random_range(-POPUP_JITTER.x..=POPUP_JITTER.x),
            rng.random_range(0.0..=POPUP_JITTER.y),
        );
        let color = request.kind.color();
        commands.spawn((
            Name::new("Damage Popup"),
            DamagePopup {
                elapsed: 0.0,
                base_color: color,
            },
            Text2d::new(request.kind.text()),
            TextFont::from_font_size(POPUP_FONT_SIZE),
            TextColor(color),
            Transform::from_translation((request.at + jitter).extend(Z_POPUP))
                .with_scale(Vec3::splat(POPUP_SCALE)),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

/// Floats popups upward while fading them out.
fn animate_popups(
    time: Res<Time>,
    mut popups: Query<(Entity, &mut DamagePopup, &mut Transform, &mut TextColor)>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (entity, mut popup, mut transform, mut color) in &mut popups {
        popup.elapsed += dt;
        transform.translation.y += POPUP_FLOAT_SPEED * dt;
        let alpha = 1.0 - (popup.elapsed / POPUP_LIFETIME).clamp(0.0, 1.0);
        color.0 = popup.base_color.with_alpha(alpha);
        if popup.elapsed >= POPUP_LIFETIME {
            commands.entity(entity).despawn();
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<DamagePopup>();
    app.add_message::<PopupRequest>();
    app.add_systems(
        Update,
        (spawn_popups, animate_popups).chain().in_set(GameSet::Ui),
    );
}
