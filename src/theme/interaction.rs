//! Button hover/press feedback, plus a dimmed look for disabled buttons.

use bevy::picking::hover::Hovered;
use bevy::prelude::*;
use bevy::ui::{InteractionDisabled, Pressed};

/// Background colors for each button state.
/// Add alongside `Button` and `BackgroundColor` on clickable UI elements.
#[derive(Component, Debug, Reflect)]
#[reflect(Component)]
#[require(Hovered)]
pub struct InteractionPalette {
    pub none: Color,
    pub hovered: Color,
    pub pressed: Color,
    pub disabled: Color,
}

impl InteractionPalette {
    #[must_use]
    pub const fn color(&self, disabled: bool, pressed: bool, hovered: bool) -> Color {
        match (disabled, pressed, hovered) {
            (true, ..) => self.disabled,
            (false, true, _) => self.pressed,
            (false, false, true) => self.hovered,
            (false, false, false) => self.none,
        }
    }
}

/// Buttons are few, so every palette is re-evaluated each frame and only
/// written on change.
fn apply_interaction_palette(
    mut palette_query: Query<(
        Has<InteractionDisabled>,
        Has<Pressed>,
        &Hovered,
        &InteractionPalette,
        &mut BackgroundColor,
    )>,
) {
    for (disabled, pressed, Hovered(hovered), palette, mut background) in &mut palette_query {
        background.set_if_neq(palette.color(disabled, pressed, *hovered).into());
    }
}

pub fn plugin(app: &mut App) {
    app.register_type::<InteractionPalette>();
    app.add_systems(Update, apply_interaction_palette);
}
