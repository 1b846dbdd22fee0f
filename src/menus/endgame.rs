//! Win/lose/draw overlay with the final HP of both sides and a restart button.

use bevy::prelude::*;

use super::Menu;
use crate::gameplay::Team;
use crate::gameplay::health::Health;
use crate::screens::GameState;
use crate::theme::{palette, widget};

fn title(menu: Menu) -> Option<(&'static str, Color)> {
    match menu {
        Menu::Victory => Some(("YOU WIN", palette::RESULT_WIN)),
        Menu::Defeat => Some(("YOU LOSE", palette::RESULT_LOSE)),
        Menu::Draw => Some(("DRAW", palette::RESULT_DRAW)),
        Menu::None => None,
    }
}

/// `"Player 50 - 30 Bot"`; a side already despawned shows 0.
fn score_line(combatants: &Query<(&Team, &Health)>) -> String {
    let hp_of = |side: Team| {
        combatants
            .iter()
            .find(|(team, _)| **team == side)
            .map_or(0, |(_, health)| health.current())
    };
    format!("Player {} - {} Bot", hp_of(Team::Player), hp_of(Team::Bot))
}

fn spawn_result_overlay(
    mut commands: Commands,
    menu: Res<State<Menu>>,
    combatants: Query<(&Team, &Health)>,
) {
    let menu = *menu.get();
    let Some((text, color)) = title(menu) else {
        return;
    };
    commands.spawn((
        widget::ui_root("Result Screen"),
        BackgroundColor(palette::OVERLAY_BACKGROUND),
        GlobalZIndex(1),
        DespawnOnExit(menu),
        children![(
            widget::panel(color),
            children![
                widget::header(text, color),
                widget::label(score_line(&combatants)),
                widget::button(
                    "Restart",
                    "R",
                    |_: On<Pointer<Click>>,
                     mut next_game: ResMut<NextState<GameState>>,
                     mut next_menu: ResMut<NextState<Menu>>| {
                        restart(&mut next_game, &mut next_menu);
                    },
                ),
            ],
        )],
    ));
}

/// Tears the arena down through `Loading`, which rebuilds a fresh match.
fn restart(next_game: &mut NextState<GameState>, next_menu: &mut NextState<Menu>) {
    info!("Restarting match");
    next_game.set(GameState::Loading);
    next_menu.set(Menu::None);
}

fn restart_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut next_game: ResMut<NextState<GameState>>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    if keyboard.just_pressed(KeyCode::KeyR) {
        restart(&mut next_game, &mut next_menu);
    }
}

fn showing_result(menu: Res<State<Menu>>) -> bool {
    menu.get().is_result()
}

pub(super) fn plugin(app: &mut App) {
    for menu in Menu::RESULTS {
        app.add_systems(OnEnter(menu), spawn_result_overlay);
    }
    app.add_systems(Update, restart_on_key.run_if(showing_result));
}
