//! Menu and HUD look: the color palette plus button and widget helpers.

pub mod interaction;
pub mod palette;
pub mod widget;

pub fn plugin(app: &mut bevy::prelude::App) {
    app.add_plugins(interaction::plugin);
}
