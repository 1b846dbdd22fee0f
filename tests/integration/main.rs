//! Integration tests driving the whole game plugin headlessly.

mod duel_flow;
mod state_transitions;

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::input::InputPlugin;
use bevy::mesh::MeshPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy::transform::TransformPlugin;

use archer_duel::config::ArenaConfig;

/// 1/64 s per update.
pub const FRAME: Duration = Duration::from_micros(15_625);

/// Headless app with the full game plugin and a manual clock.
pub fn create_game_app(config: ArenaConfig) -> App {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        InputPlugin,
        TransformPlugin,
        AssetPlugin::default(),
        MeshPlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));
    app.insert_resource(config);
    app.add_plugins(archer_duel::plugin);
    app.finish();
    app.cleanup();
    app
}

pub fn advance_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}
