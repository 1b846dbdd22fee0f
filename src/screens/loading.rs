//! Loading screen. Nothing is loaded from disk, so it hands over to the
//! arena on the next frame; restarts pass through it as well.

use bevy::prelude::*;

use super::GameState;
use crate::theme::{palette, widget};

fn setup_loading_screen(mut commands: Commands) {
    commands.spawn((
        widget::ui_root("Loading Screen"),
        DespawnOnExit(GameState::Loading),
        children![widget::header("Loading...", palette::HEADER_TEXT)],
    ));
}

fn enter_arena(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::InGame);
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Loading), setup_loading_screen)
        .add_systems(Update, enter_arena.run_if(in_state(GameState::Loading)));
}
