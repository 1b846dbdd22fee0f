//! Tests for game state transitions.

use archer_duel::config::ArenaConfig;
use archer_duel::gameplay::match_flow::MatchPhase;
use archer_duel::menus::Menu;
use archer_duel::screens::GameState;
use bevy::prelude::*;
use pretty_assertions::assert_eq;

use crate::{advance_frames, create_game_app};

fn game_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

#[test]
fn game_initializes_in_loading_state() {
    let app = create_game_app(ArenaConfig::default());
    assert_eq!(game_state(&app), GameState::Loading);
}

#[test]
fn loading_enters_the_arena_with_a_countdown() {
    let mut app = create_game_app(ArenaConfig::default());

    advance_frames(&mut app, 3);

    assert_eq!(game_state(&app), GameState::InGame);
    assert_eq!(
        *app.world().resource::<State<MatchPhase>>().get(),
        MatchPhase::Countdown
    );
    assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::None);
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
}

#[test]
fn countdown_ends_in_the_fight() {
    let mut config = ArenaConfig::default();
    config.match_rules.countdown_secs = 0.5;
    let mut app = create_game_app(config);

    advance_frames(&mut app, 3 + 40);

    assert_eq!(
        *app.world().resource::<State<MatchPhase>>().get(),
        MatchPhase::Fight
    );
    assert!(!app.world().resource::<Time<Virtual>>().is_paused());
}
