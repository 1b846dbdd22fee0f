//! Widget constructors for the HUD, the loading screen and the result overlay.

use std::borrow::Cow;

use bevy::ecs::hierarchy::ChildSpawner;
use bevy::ecs::spawn::SpawnWith;
use bevy::ecs::system::IntoObserverSystem;
use bevy::prelude::*;

use super::interaction::InteractionPalette;
use super::palette;

const BUTTON_SIZE: Vec2 = Vec2::new(300.0, 60.0);

fn text(text: impl Into<String>, font_size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont::from_font_size(font_size),
        TextColor(color),
    )
}

/// Full-screen column that centres its children. The layer itself lets
/// pointer events through.
pub fn ui_root(name: impl Into<Cow<'static, str>>) -> impl Bundle {
    (
        Name::new(name),
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            row_gap: Val::Px(20.0),
            ..default()
        },
        Pickable::IGNORE,
    )
}

/// Boxed column with a border in `accent`, used for the match result.
pub fn panel(accent: Color) -> impl Bundle {
    (
        Name::new("Panel"),
        Node {
            width: Val::Px(500.0),
            min_height: Val::Px(300.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::SpaceEvenly,
            padding: UiRect::all(Val::Px(40.0)),
            border: UiRect::all(Val::Px(2.0)),
            ..default()
        },
        BackgroundColor(palette::PANEL_BACKGROUND),
        BorderColor::all(accent),
    )
}

pub fn header(content: impl Into<String>, color: Color) -> impl Bundle {
    text(content, palette::FONT_SIZE_HEADER, color)
}

pub fn label(content: impl Into<String>) -> impl Bundle {
    text(content, palette::FONT_SIZE_LABEL, palette::BODY_TEXT)
}

/// HUD text never takes pointer presses away from the ability buttons.
pub fn hud_text(content: impl Into<String>, font_size: f32, color: Color) -> impl Bundle {
    (text(content, font_size, color), Pickable::IGNORE)
}

#[must_use]
pub const fn menu_palette() -> InteractionPalette {
    InteractionPalette {
        none: palette::BUTTON_BACKGROUND,
        hovered: palette::BUTTON_HOVERED_BACKGROUND,
        pressed: palette::BUTTON_PRESSED_BACKGROUND,
        disabled: palette::BUTTON_DISABLED_BACKGROUND,
    }
}

/// Button showing `caption` and the `hotkey` that does the same thing.
/// The observer sits on the inner `Button`, so the bundle wraps it.
pub fn button<E, B, M, I>(
    caption: impl Into<String>,
    hotkey: &'static str,
    action: I,
) -> impl Bundle
where
    E: EntityEvent,
    B: Bundle,
    I: IntoObserverSystem<E, B, M>,
{
    let caption = caption.into();
    let action = IntoObserverSystem::into_system(action);
    (
        Name::new("Button"),
        Node::default(),
        Children::spawn(SpawnWith(move |parent: &mut ChildSpawner| {
            parent
                .spawn((
                    Name::new(format!("{caption} Button")),
                    Button,
                    Node {
                        width: Val::Px(BUTTON_SIZE.x),
                        height: Val::Px(BUTTON_SIZE.y),
                        flex_direction: FlexDirection::Row,
                        align_items: AlignItems::Center,
                        justify_content: JustifyContent::Center,
                        column_gap: Val::Px(12.0),
                        border: UiRect::all(Val::Px(1.0)),
                        ..default()
                    },
                    BackgroundColor(palette::BUTTON_BACKGROUND),
                    BorderColor::all(palette::PANEL_BORDER),
                    menu_palette(),
                    children![
                        hud_text(caption, palette::FONT_SIZE_LABEL, palette::BUTTON_TEXT),
                        hud_text(
                            format!("[{hotkey}]"),
                            palette::FONT_SIZE_BODY,
                            palette::BODY_TEXT,
                        ),
                    ],
                ))
                .observe(action);
        })),
    )
}
