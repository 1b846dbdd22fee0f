//! Ability buttons: one per ability, each carrying its `AbilitySlot`.
//!
//! While an ability cools down its button is disabled, grayed out, covered by
//! a dark sweep for the time still left, and shows the seconds remaining.

use bevy::prelude::*;
use bevy::ui::InteractionDisabled;

use crate::GameSet;
use crate::config::ArenaConfig;
use crate::gameplay::abilities::{AbilityKind, AbilityRequest, AbilitySlot};
use crate::screens::GameState;
use crate::theme::interaction::InteractionPalette;
use crate::theme::{palette, widget};

const BUTTON_SIZE: f32 = 96.0;

/// Dark overlay whose height is the fraction of the cooldown left.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CooldownFill;

/// Seconds left, empty when ready.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CooldownText;

/// The ability's name, tinted while cooling.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AbilityName;

const fn ability_color(kind: AbilityKind) -> Color {
    match kind {
        AbilityKind::Shield => palette::ABILITY_SHIELD,
        AbilityKind::ArrowRain => palette::ABILITY_RAIN,
        AbilityKind::Detonate => palette::ABILITY_DETONATE,
    }
}

fn grayscale(color: Color) -> Color {
    let luminance = color.luminance();
    Color::srgb(luminance, luminance, luminance)
}

fn hotkey_label(kind: AbilityKind) -> &'static str {
    match kind {
        AbilityKind::Shield => "1",
        AbilityKind::ArrowRain => "2",
        AbilityKind::Detonate => "3",
    }
}

/// Row of ability buttons along the bottom edge.
pub(super) fn ability_bar() -> impl Bundle {
    (
        Name::new("Ability Bar"),
        Node {
            flex_direction: FlexDirection::Row,
            column_gap: Val::Px(16.0),
            margin: UiRect::bottom(Val::Px(24.0)),
            ..default()
        },
        Pickable::IGNORE,
    )
}

pub(super) fn spawn_ability_buttons(commands: &mut Commands, bar: Entity, config: &ArenaConfig) {
    for kind in AbilityKind::ALL {
        let color = ability_color(kind);
        commands
            .spawn((
                Name::new(format!("{kind:?} Button")),
                AbilitySlot::new(kind, kind.cooldown_secs(&config.abilities)),
                Button,
                Node {
                    width: Val::Px(BUTTON_SIZE),
                    height: Val::Px(BUTTON_SIZE),
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    justify_content: JustifyContent::Center,
                    border: UiRect::all(Val::Px(2.0)),
                    overflow: Overflow::clip(),
                    ..default()
                },
                BackgroundColor(color),
                BorderColor::all(palette::PANEL_BORDER),
                InteractionPalette {
                    none: color,
                    hovered: color.lighter(0.1),
                    pressed: color.darker(0.1),
                    disabled: grayscale(color),
                },
                ChildOf(bar),
                children![
                    (
                        Name::new("Cooldown Fill"),
                        CooldownFill,
                        Node {
                            position_type: PositionType::Absolute,
                            left: Val::Px(0.0),
                            bottom: Val::Px(0.0),
                            width: Val::Percent(100.0),
                            height: Val::Percent(0.0),
                            ..default()
                        },
                        BackgroundColor(palette::COOLDOWN_FILL),
                        Pickable::IGNORE,
                    ),
                    (
                        AbilityName,
                        widget::hud_text(
                            kind.label(),
                            palette::FONT_SIZE_BODY,
                            palette::ABILITY_READY
                        ),
                    ),
                    (
                        CooldownText,
                        widget::hud_text("", palette::FONT_SIZE_HUD, palette::ABILITY_READY),
                    ),
                    widget::hud_text(
                        hotkey_label(kind),
                        palette::FONT_SIZE_SMALL,
                        palette::BODY_TEXT
                    ),
                ],
            ))
            .observe(on_ability_click);
    }
}

fn on_ability_click(
    click: On<Pointer<Click>>,
    slots: Query<(&AbilitySlot, Has<InteractionDisabled>)>,
    mut requests: MessageWriter<AbilityRequest>,
) {
    let Ok((slot, disabled)) = slots.get(click.entity) else {
        return;
    };
    if !disabled {
        requests.write(AbilityRequest(slot.kind));
    }
}

fn update_ability_buttons(
    mut commands: Commands,
    buttons: Query<(Entity, &AbilitySlot, &Children, Has<InteractionDisabled>)>,
    mut fills: Query<&mut Node, With<CooldownFill>>,
    mut texts: Query<&mut Text, With<CooldownText>>,
    mut names: Query<&mut TextColor, With<AbilityName>>,
) {
    for (entity, slot, children, disabled) in &buttons {
        let cooling = !slot.cooldown.is_ready();
        if cooling && !disabled {
            commands.entity(entity).insert(InteractionDisabled);
        } else if !cooling && disabled {
            commands.entity(entity).remove::<InteractionDisabled>();
        }

        let label = slot.cooldown.label().unwrap_or_default();
        let tint = if cooling {
            palette::COOLDOWN_TINT
        } else {
            palette::ABILITY_READY
        };
        for child in children.iter() {
            if let Ok(mut node) = fills.get_mut(child) {
                node.height = Val::Percent((1.0 - slot.cooldown.fill()) * 100.0);
            }
            if let Ok(mut text) = texts.get_mut(child) {
                if text.0 != label {
                    text.0.clone_from(&label);
                }
            }
            if let Ok(mut color) = names.get_mut(child) {
                color.set_if_neq(TextColor(tint));
            }
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<CooldownFill>()
        .register_type::<CooldownText>()
        .register_type::<AbilityName>();

    app.add_systems(
        Update,
        update_ability_buttons
            .in_set(GameSet::Ui)
            .run_if(in_state(GameState::InGame)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::testing::assert_entity_count;

    fn create_bar_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, update_ability_buttons);
        let bar = app.world_mut().spawn(ability_bar()).id();
        app.world_mut()
            .run_system_cached_with(
                |In(bar): In<Entity>, mut commands: Commands| {
                    spawn_ability_buttons(&mut commands, bar, &ArenaConfig::default());
                },
                bar,
            )
            .unwrap();
        app.update();
        app
    }

    fn button(app: &mut App, kind: AbilityKind) -> Entity {
        let mut query = app.world_mut().query::<(Entity, &AbilitySlot)>();
        query
            .iter(app.world())
            .find(|(_, slot)| slot.kind == kind)
            .map(|(entity, _)| entity)
            .unwrap()
    }

    fn child_with<C: Component>(app: &mut App, button: Entity) -> Entity {
        let children: Vec<Entity> = app
            .world()
            .get::<Children>(button)
            .unwrap()
            .iter()
            .collect();
        children
            .into_iter()
            .find(|child| app.world().get::<C>(*child).is_some())
            .unwrap()
    }

    #[test]
    fn one_button_per_ability() {
        let mut app = create_bar_test_app();
        assert_entity_count::<With<AbilitySlot>>(&mut app, 3);
        assert_entity_count::<With<CooldownFill>>(&mut app, 3);
    }

    #[test]
    fn cooling_button_is_disabled_and_shows_seconds() {
        let mut app = create_bar_test_app();
        let shield = button(&mut app, AbilityKind::Shield);
        {
            let mut slot = app.world_mut().get_mut::<AbilitySlot>(shield).unwrap();
            slot.cooldown.start();
            slot.cooldown.tick(2.0);
        }

        app.update();

        assert!(app.world().get::<InteractionDisabled>(shield).is_some());
        let text = child_with::<CooldownText>(&mut app, shield);
        assert_eq!(app.world().get::<Text>(text).unwrap().0, "6");
        let fill = child_with::<CooldownFill>(&mut app, shield);
        assert_eq!(
            app.world().get::<Node>(fill).unwrap().height,
            Val::Percent(75.0)
        );
        let name = child_with::<AbilityName>(&mut app, shield);
        assert_eq!(
            app.world().get::<TextColor>(name).unwrap().0,
            palette::COOLDOWN_TINT
        );
    }

    #[test]
    fn ready_button_is_enabled_again() {
        let mut app = create_bar_test_app();
        let rain = button(&mut app, AbilityKind::ArrowRain);
        app.world_mut()
            .get_mut::<AbilitySlot>(rain)
            .unwrap()
            .cooldown
            .start();
        app.update();
        assert!(app.world().get::<InteractionDisabled>(rain).is_some());

        app.world_mut()
            .get_mut::<AbilitySlot>(rain)
            .unwrap()
            .cooldown
            .tick(10.0);
        app.update();

        assert!(app.world().get::<InteractionDisabled>(rain).is_none());
        let text = child_with::<CooldownText>(&mut app, rain);
        assert_eq!(app.world().get::<Text>(text).unwrap().0, "");
    }

    #[test]
    fn grayscale_keeps_luminance() {
        let gray = grayscale(palette::ABILITY_SHIELD);
        let srgba = gray.to_srgba();
        assert!((srgba.red - srgba.green).abs() < f32::EPSILON);
        assert!((srgba.green - srgba.blue).abs() < f32::EPSILON);
    }
}
