//! Third-party plugin isolation.

mod avian;

pub use avian::{CollisionLayer, contact_point, layers_match, overlaps_circle};

pub fn plugin(app: &mut bevy::prelude::App) {
    app.add_plugins(avian::plugin);
}
