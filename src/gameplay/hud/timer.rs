//! Match clock display.

use bevy::prelude::*;

use crate::GameSet;
use crate::config::ArenaConfig;
use crate::gameplay::match_flow::MatchTimer;
use crate::screens::GameState;
use crate::theme::{palette, widget};

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MatchTimerText;

/// Whole seconds left, rounded up so the clock shows `1` until it expires.
#[must_use]
pub fn whole_seconds(remaining: f32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let secs = remaining.max(0.0).ceil() as u32;
    secs
}

#[must_use]
pub fn format_remaining(remaining: f32, show_mmss: bool) -> String {
    let secs = whole_seconds(remaining);
    if show_mmss {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    } else {
        secs.to_string()
    }
}

/// Warning threshold in whole seconds; negative never warns.
#[must_use]
pub fn is_warning(remaining: f32, warn_at_secs: i32) -> bool {
    u32::try_from(warn_at_secs).is_ok_and(|warn_at| whole_seconds(remaining) <= warn_at)
}

pub(super) fn timer_text() -> impl Bundle {
    (
        Name::new("Match Timer"),
        MatchTimerText,
        widget::hud_text("", palette::FONT_SIZE_HEADER, palette::TIMER_NORMAL),
    )
}

fn update_timer_text(
    timer: Res<MatchTimer>,
    config: Res<ArenaConfig>,
    mut text: Single<(&mut Text, &mut TextColor), With<MatchTimerText>>,
) {
    let rules = &config.match_rules;
    let (text, color) = &mut *text;
    let label = format_remaining(timer.remaining(), rules.show_mmss);
    if text.0 != label {
        text.0 = label;
    }
    let tint = if is_warning(timer.remaining(), rules.warn_at_secs) {
        palette::TIMER_WARN
    } else {
        palette::TIMER_NORMAL
    };
    color.set_if_neq(TextColor(tint));
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<MatchTimerText>();

    app.add_systems(
        Update,
        update_timer_text
            .in_set(GameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}
