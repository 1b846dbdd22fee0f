//! Result overlays shown on top of the arena once a match is decided.
//!
//! `Menu` runs beside `GameState`: the arena stays spawned underneath. While
//! a result shows, virtual time is frozen, which halts physics, projectiles
//! and the match clock. Ability cooldowns run on real time and keep going.

mod endgame;

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[states(scoped_entities)]
pub enum Menu {
    /// Match in progress or not started.
    #[default]
    None,
    /// The bot died first, or the player had more HP at the buzzer.
    Victory,
    Defeat,
    /// Equal HP when time ran out.
    Draw,
}

impl Menu {
    pub const RESULTS: [Self; 3] = [Self::Victory, Self::Defeat, Self::Draw];

    #[must_use]
    pub const fn is_result(self) -> bool {
        !matches!(self, Self::None)
    }
}

pub fn plugin(app: &mut App) {
    app.init_state::<Menu>();
    app.add_plugins(endgame::plugin);

    for result in Menu::RESULTS {
        app.add_systems(OnEnter(result), freeze_arena);
    }
    app.add_systems(OnEnter(Menu::None), thaw_arena);
}

fn freeze_arena(mut time: ResMut<Time<Virtual>>, menu: Res<State<Menu>>) {
    debug!("Arena frozen under {:?}", menu.get());
    time.pause();
}

fn thaw_arena(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}
