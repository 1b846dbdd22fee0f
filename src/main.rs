//! Archer duel entry point.

use archer_duel::cli;
use archer_duel::config::ArenaConfig;
use bevy::prelude::*;

fn main() {
    let args = cli::parse_args();

    // LogPlugin is not up yet, so problems are reported once the app starts.
    let (mut config, config_problem) = match args.config.as_deref() {
        Some(path) => match ArenaConfig::load(path) {
            Ok(config) => (config, None),
            Err(err) => (ArenaConfig::default(), Some(format!("{}: {err}", path.display()))),
        },
        None => (ArenaConfig::default(), None),
    };
    args.apply_overrides(&mut config);

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Archer Duel".to_string(),
                    resolution: (1280, 720).into(),
                    resizable: true,
                    ..default()
                }),
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    )
    .insert_resource(config)
    .add_plugins(archer_duel::plugin)
    .add_systems(Startup, move || match &config_problem {
        Some(problem) => warn!("Falling back to default arena config ({problem})"),
        None => info!("Arena config loaded"),
    });

    #[cfg(feature = "dev")]
    app.add_plugins(archer_duel::dev_tools::plugin);

    app.run();
}
