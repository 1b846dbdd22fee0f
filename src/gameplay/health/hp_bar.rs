//! HP display above each combatant: a scale-x bar and an optional number.

use bevy::prelude::*;

use super::Health;
use crate::GameSet;
use crate::theme::palette;

/// World units to text pixels for labels floating in the arena.
const LABEL_SCALE: f32 = 1.0 / 64.0;

// === Components ===

/// Bar sizing. Add next to `Health` to get a bar.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct HpBar {
    pub width: f32,
    pub height: f32,
    pub y_offset: f32,
}

/// Marker: full-width background showing missing HP.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HpBarBackground;

/// Marker: foreground scaled by the HP fraction.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HpBarFill;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum HpLabelFormat {
    /// `"75/100"`
    CurrentOfMax,
    /// `"75"`
    Current,
    /// `"75%"`
    Percent,
}

/// Number shown above the bar. Add next to `HpBar`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct HpLabel {
    pub format: HpLabelFormat,
    pub hide_when_full: bool,
}

/// Marker for the spawned label text.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HpLabelText;

#[must_use]
pub fn hp_label_text(health: &Health, format: HpLabelFormat) -> String {
    match format {
        HpLabelFormat::CurrentOfMax => format!("{}/{}", health.current(), health.max),
        HpLabelFormat::Current => health.current().to_string(),
        HpLabelFormat::Percent => {
            #[allow(clippy::cast_possible_truncation)]
            let percent = (health.fraction() * 100.0).round() as i32;
            format!("{percent}%")
        }
    }
}

fn label_visibility(health: &Health, label: &HpLabel) -> Visibility {
    if label.hide_when_full && health.current() >= health.max {
        Visibility::Hidden
    } else {
        Visibility::Inherited
    }
}

// === Systems ===

/// Spawns bar children (and the label, if configured) when `Health` is added
/// to an entity with `HpBar`.
fn spawn_hp_bars(
    add: On<Add, Health>,
    configs: Query<(&HpBar, Option<&HpLabel>, &Health)>,
    mut commands: Commands,
) {
    let Ok((bar, label, health)) = configs.get(add.entity) else {
        return;
    };
    let size = Vec2::new(bar.width, bar.height);
    let ratio = health.fraction().clamp(0.0, 1.0);
    commands.entity(add.entity).with_children(|parent| {
        parent.spawn((
            Name::new("HP Bar BG"),
            Sprite::from_color(palette::HP_BAR_BG, size),
            Transform::from_xyz(0.0, bar.y_offset, 1.0),
            HpBarBackground,
        ));
        parent.spawn((
            Name::new("HP Bar Fill"),
            Sprite::from_color(palette::HP_BAR_FILL, size),
            Transform::from_xyz(bar.width.mul_add(-(1.0 - ratio), 0.0) / 2.0, bar.y_offset, 1.1)
                .with_scale(Vec3::new(ratio, 1.0, 1.0)),
            HpBarFill,
        ));
        if let Some(label) = label {
            parent.spawn((
                Name::new("HP Label"),
                Text2d::new(hp_label_text(health, label.format)),
                label_visibility(health, label),
                TextFont::from_font_size(palette::FONT_SIZE_SMALL),
                TextColor(palette::HEADER_TEXT),
                Transform::from_xyz(0.0, bar.y_offset + bar.height * 2.0, 1.2)
                    .with_scale(Vec3::splat(LABEL_SCALE)),
                HpLabelText,
            ));
        }
    });
}

/// Keeps bar fill width and label text in step with `Health`.
/// Runs in `GameSet::Ui`.
fn update_hp_bars(
    owners: Query<(&Health, &Children, &HpBar, Option<&HpLabel>), Changed<Health>>,
    mut fills: Query<&mut Transform, With<HpBarFill>>,
    mut labels: Query<(&mut Text2d, &mut Visibility), With<HpLabelText>>,
) {
    for (health, children, bar, label) in &owners {
        let ratio = health.fraction().clamp(0.0, 1.0);
        for child in children.iter() {
            if let Ok(mut transform) = fills.get_mut(child) {
                transform.scale.x = ratio;
                // Shift left to keep the bar left-aligned as it shrinks
                transform.translation.x = bar.width.mul_add(-(1.0 - ratio), 0.0) / 2.0;
            }
            if let (Some(label), Ok((mut text, mut visibility))) = (label, labels.get_mut(child)) {
                *visibility = label_visibility(health, label);
                text.0 = hp_label_text(health, label.format);
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HpBar>()
        .register_type::<HpBarBackground>()
        .register_type::<HpBarFill>()
        .register_type::<HpLabel>()
        .register_type::<HpLabelText>();

    app.add_observer(spawn_hp_bars);
    // Ungated so the final blow still shows after the arena freezes.
    app.add_systems(Update, update_hp_bars.in_set(GameSet::Ui));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn label_formats() {
        let health = Health::new(120).with_current(90);
        assert_eq!(hp_label_text(&health, HpLabelFormat::CurrentOfMax), "90/120");
        assert_eq!(hp_label_text(&health, HpLabelFormat::Current), "90");
        assert_eq!(hp_label_text(&health, HpLabelFormat::Percent), "75%");
    }
}
