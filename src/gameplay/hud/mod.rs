//! In-game HUD: match clock on top, ability buttons along the bottom, and the
//! pre-match countdown in between.

mod ability_bar;
mod countdown;
mod timer;

use bevy::prelude::*;

use crate::config::ArenaConfig;
use crate::screens::GameState;

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HudRoot;

fn spawn_hud(mut commands: Commands, config: Res<ArenaConfig>) {
    let root = commands
        .spawn((
            Name::new("HUD"),
            HudRoot,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::SpaceBetween,
                padding: UiRect::top(Val::Px(12.0)),
                ..default()
            },
            Pickable::IGNORE,
            DespawnOnExit(GameState::InGame),
            children![timer::timer_text()],
        ))
        .id();
    let bar = commands.spawn((ability_bar::ability_bar(), ChildOf(root))).id();
    ability_bar::spawn_ability_buttons(&mut commands, bar, &config);
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HudRoot>();

    app.add_systems(OnEnter(GameState::InGame), spawn_hud);
    app.add_plugins((ability_bar::plugin, countdown::plugin, timer::plugin));
}
