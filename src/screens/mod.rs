//! Top-level game states.

mod loading;

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[states(scoped_entities)]
pub enum GameState {
    /// Between matches: the arena is torn down and rebuilt from here.
    #[default]
    Loading,
    InGame,
}

pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();
    app.add_plugins(loading::plugin);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn game_state_default_is_loading() {
        assert_eq!(GameState::default(), GameState::Loading);
    }
}
