//! A whole match run headlessly: fight, timeout, result, restart.

use archer_duel::config::ArenaConfig;
use archer_duel::gameplay::match_flow::{MatchPhase, MatchState};
use archer_duel::menus::Menu;
use archer_duel::screens::GameState;
use bevy::prelude::*;
use pretty_assertions::assert_eq;

use crate::{advance_frames, create_game_app};

fn short_match() -> ArenaConfig {
    let mut config = ArenaConfig::default();
    config.match_rules.duration_secs = 1.0;
    config.match_rules.countdown_secs = 0.0;
    config.heal_drop.interval = 0.0;
    config
}

fn menu(app: &App) -> Menu {
    *app.world().resource::<State<Menu>>().get()
}

#[test]
fn short_match_ends_with_a_result_and_freezes_time() {
    let mut app = create_game_app(short_match());

    // Loading, entering the arena, then a bit over one second of fighting.
    advance_frames(&mut app, 4 + 70);

    let result = app.world().resource::<MatchState>().result();
    assert!(result.is_some(), "match should be decided by now");
    assert_ne!(menu(&app), Menu::None);
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
}

/// Same transitions the Restart button requests.
fn restart(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Loading);
    app.world_mut()
        .resource_mut::<NextState<Menu>>()
        .set(Menu::None);
}

#[test]
fn restart_starts_a_fresh_match() {
    let mut app = create_game_app(short_match());
    advance_frames(&mut app, 4 + 70);
    assert_ne!(menu(&app), Menu::None);

    restart(&mut app);
    advance_frames(&mut app, 4);

    assert_eq!(
        *app.world().resource::<State<GameState>>().get(),
        GameState::InGame
    );
    assert_eq!(menu(&app), Menu::None);
    assert_eq!(
        *app.world().resource::<State<MatchPhase>>().get(),
        MatchPhase::Fight
    );
    assert_eq!(app.world().resource::<MatchState>().result(), None);
}
