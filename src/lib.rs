//! Archer duel: a player archer versus a scripted bot in a small 2D arena.

pub mod cli;
pub mod config;
#[cfg(feature = "dev")]
pub mod dev_tools;
pub mod gameplay;
pub mod menus;
pub mod screens;
#[cfg(test)]
pub mod testing;
pub mod theme;
mod third_party;

use bevy::prelude::*;

use crate::gameplay::match_flow::MatchPhase;
use crate::menus::Menu;
use crate::screens::GameState;

// === Render layers (z) ===

pub const Z_BACKGROUND: f32 = -10.0;
pub const Z_GROUND: f32 = 0.0;
pub const Z_PICKUP: f32 = 4.0;
pub const Z_COMBATANT: f32 = 5.0;
pub const Z_PROJECTILE: f32 = 6.0;
pub const Z_EFFECT: f32 = 8.0;
pub const Z_POPUP: f32 = 10.0;

/// Ordering of gameplay systems inside `Update`.
///
/// Input and AI decide what happens, the animation driver advances clips and
/// emits timeline cues, combat moves projectiles and resolves contacts into
/// damage requests, damage mutates `Health`, death reacts to fresh deaths,
/// and UI reads the settled state.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Ai,
    Animation,
    Combat,
    Damage,
    Death,
    Ui,
}

/// Run condition: the arena is live (in game, no overlay, countdown over).
pub fn gameplay_running(
    game_state: Res<State<GameState>>,
    menu: Res<State<Menu>>,
    phase: Option<Res<State<MatchPhase>>>,
) -> bool {
    *game_state.get() == GameState::InGame
        && *menu.get() == Menu::None
        && phase.is_some_and(|phase| *phase.get() == MatchPhase::Fight)
}

pub fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameSet::Input,
            GameSet::Ai,
            GameSet::Animation,
            GameSet::Combat,
            GameSet::Damage,
            GameSet::Death,
            GameSet::Ui,
        )
            .chain(),
    );

    app.add_plugins((
        third_party::plugin,
        theme::plugin,
        screens::plugin,
        menus::plugin,
        gameplay::plugin,
    ));
}
