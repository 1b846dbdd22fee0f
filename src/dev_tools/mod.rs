//! Development tools, only included with `cargo run --features dev`.
//!
//! F1 toggles the world inspector, F2 toggles collider gizmos, K and L deal
//! a lethal hit to the bot and the player.

use avian2d::prelude::{PhysicsDebugPlugin, PhysicsGizmos};
use bevy::prelude::*;
use bevy_inspector_egui::bevy_egui::EguiPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use crate::gameplay::Team;
use crate::gameplay::health::{DamageRequest, Health};
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
struct InspectorVisible(bool);

fn toggle_inspector(keyboard: Res<ButtonInput<KeyCode>>, mut visible: ResMut<InspectorVisible>) {
    if keyboard.just_pressed(KeyCode::F1) {
        visible.0 = !visible.0;
    }
}

fn toggle_physics_gizmos(keyboard: Res<ButtonInput<KeyCode>>, mut store: ResMut<GizmoConfigStore>) {
    if keyboard.just_pressed(KeyCode::F2) {
        let (config, _) = store.config_mut::<PhysicsGizmos>();
        config.enabled = !config.enabled;
        info!("Collider gizmos: {}", config.enabled);
    }
}

fn debug_kill(
    keyboard: Res<ButtonInput<KeyCode>>,
    combatants: Query<(Entity, &Team, &Health)>,
    mut damage: MessageWriter<DamageRequest>,
) {
    let side = if keyboard.just_pressed(KeyCode::KeyK) {
        Team::Bot
    } else if keyboard.just_pressed(KeyCode::KeyL) {
        Team::Player
    } else {
        return;
    };
    for (entity, team, health) in &combatants {
        if *team == side {
            warn!("Debug kill: {side:?}");
            damage.write(DamageRequest {
                target: entity,
                amount: health.max + health.shield().absorb,
                at: None,
            });
        }
    }
}

fn disable_gizmos_at_start(mut store: ResMut<GizmoConfigStore>) {
    store.config_mut::<PhysicsGizmos>().0.enabled = false;
}

/// Needs a window and a renderer, so it is added by the binary only.
pub fn plugin(app: &mut App) {
    app.init_resource::<InspectorVisible>();
    app.add_plugins((
        EguiPlugin::default(),
        WorldInspectorPlugin::new().run_if(resource_equals(InspectorVisible(true))),
        PhysicsDebugPlugin::default(),
    ));

    app.add_systems(Startup, disable_gizmos_at_start);
    app.add_systems(
        Update,
        (
            (toggle_inspector, toggle_physics_gizmos).run_if(in_state(GameState::InGame)),
            debug_kill.in_set(GameSet::Input).run_if(gameplay_running),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::testing::{create_test_app, spawn_test_combatant};

    fn create_dev_tools_test_app() -> (App, Entity) {
        let mut app = create_test_app();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_message::<DamageRequest>();
        app.add_systems(Update, debug_kill);
        app.update();
        spawn_test_combatant(app.world_mut(), Team::Player, -6.0, 100);
        let bot = spawn_test_combatant(app.world_mut(), Team::Bot, 6.0, 100);
        (app, bot)
    }

    #[test]
    fn pressing_k_sends_a_lethal_hit_to_the_bot() {
        let (mut app, bot) = create_dev_tools_test_app();

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyK);
        app.update();

        let requests: Vec<DamageRequest> = app
            .world_mut()
            .resource_mut::<Messages<DamageRequest>>()
            .drain()
            .collect();
        assert_eq!(
            requests,
            vec![DamageRequest {
                target: bot,
                amount: 100,
                at: None,
            }]
        );
    }

    #[test]
    fn no_key_no_damage() {
        let (mut app, _) = create_dev_tools_test_app();

        app.update();

        let count = app
            .world_mut()
            .resource_mut::<Messages<DamageRequest>>()
            .drain()
            .count();
        assert_eq!(count, 0);
    }
}
