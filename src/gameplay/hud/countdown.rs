//! Big 3-2-1 in the middle of the screen before the fight starts.

use bevy::prelude::*;

use crate::gameplay::match_flow::{MatchPhase, PreMatchCountdown};
use crate::theme::{palette, widget};

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CountdownText;

fn spawn_countdown(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Countdown"),
        DespawnOnExit(MatchPhase::Countdown),
        children![(
            CountdownText,
            widget::hud_text("", palette::FONT_SIZE_TITLE, palette::HEADER_TEXT),
        )],
    ));
}

fn update_countdown_text(
    countdown: Res<PreMatchCountdown>,
    mut text: Single<&mut Text, With<CountdownText>>,
) {
    let label = countdown.seconds_left().max(1).to_string();
    if text.0 != label {
        text.0 = label;
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<CountdownText>();

    app.add_systems(OnEnter(MatchPhase::Countdown), spawn_countdown);
    app.add_systems(
        Update,
        update_countdown_text.run_if(in_state(MatchPhase::Countdown)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn shows_whole_seconds_left() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut countdown = PreMatchCountdown(Timer::from_seconds(3.0, TimerMode::Once));
        countdown.0.tick(Duration::from_millis(1200));
        app.insert_resource(countdown);
        app.add_systems(Update, update_countdown_text);
        let text = app
            .world_mut()
            .spawn((CountdownText, widget::hud_text("", 72.0, Color::WHITE)))
            .id();

        app.update();

        assert_eq!(app.world().get::<Text>(text).unwrap().0, "2");
    }
}
