//! Gameplay domain plugins: combatants, health, projectiles, the bot routine,
//! player control, abilities, heal drops, and match flow.

pub(crate) mod abilities;
pub(crate) mod animation;
mod arena;
pub(crate) mod attack;
pub(crate) mod bot;
pub(crate) mod heal_drop;
pub(crate) mod health;
mod hud;
pub mod match_flow;
pub(crate) mod player;
pub(crate) mod popup;
pub(crate) mod projectile;

use bevy::prelude::*;

use crate::config::ArenaConfig;

// === Shared Components ===

/// Which side an entity fights for. Damage only applies across teams.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Team {
    Player,
    Bot,
}

impl Team {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Bot,
            Self::Bot => Self::Player,
        }
    }
}

/// Marker for the two duelists (as opposed to projectiles carrying a `Team`).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Combatant;

/// Horizontal facing of a combatant's model.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Launch origin relative to the owner, mirrored by `Facing`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct FirePoint(pub Vec2);

impl FirePoint {
    #[must_use]
    pub fn world_position(self, owner: Vec2, facing: Facing) -> Vec2 {
        owner + Vec2::new(self.0.x * facing.sign(), self.0.y)
    }
}

/// Behaviors that hit-stun and death can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Behavior {
    Movement,
    Pattern,
    Attack,
}

/// Per-entity on/off switches for the behaviors in [`Behavior`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Behaviors {
    movement: bool,
    pattern: bool,
    attack: bool,
}

impl Default for Behaviors {
    fn default() -> Self {
        Self {
            movement: true,
            pattern: true,
            attack: true,
        }
    }
}

impl Behaviors {
    #[must_use]
    pub const fn is_enabled(&self, behavior: Behavior) -> bool {
        match behavior {
            Behavior::Movement => self.movement,
            Behavior::Pattern => self.pattern,
            Behavior::Attack => self.attack,
        }
    }

    pub const fn set(&mut self, behavior: Behavior, enabled: bool) {
        match behavior {
            Behavior::Movement => self.movement = enabled,
            Behavior::Pattern => self.pattern = enabled,
            Behavior::Attack => self.attack = enabled,
        }
    }

    pub fn set_all(&mut self, behaviors: &[Behavior], enabled: bool) {
        for behavior in behaviors {
            self.set(*behavior, enabled);
        }
    }
}

/// Every behavior, for death.
pub const ALL_BEHAVIORS: [Behavior; 3] = [Behavior::Movement, Behavior::Pattern, Behavior::Attack];

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Team>()
        .register_type::<Combatant>()
        .register_type::<Facing>()
        .register_type::<FirePoint>()
        .register_type::<Behaviors>();

    app.init_resource::<ArenaConfig>();

    app.add_plugins((
        animation::plugin,
        health::plugin,
        projectile::plugin,
        attack::plugin,
        bot::plugin,
        player::plugin,
        abilities::plugin,
        heal_drop::plugin,
        popup::plugin,
        match_flow::plugin,
        arena::plugin,
        hud::plugin,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn opponents_are_symmetric() {
        assert_eq!(Team::Player.opponent(), Team::Bot);
        assert_eq!(Team::Bot.opponent(), Team::Player);
    }

    #[test]
    fn fire_point_mirrors_with_facing() {
        let point = FirePoint(Vec2::new(0.5, 0.3));
        assert_eq!(
            point.world_position(Vec2::new(2.0, 0.0), Facing::Right),
            Vec2::new(2.5, 0.3)
        );
        assert_eq!(
            point.world_position(Vec2::new(2.0, 0.0), Facing::Left),
            Vec2::new(1.5, 0.3)
        );
    }

    #[test]
    fn behaviors_toggle_independently() {
        let mut behaviors = Behaviors::default();
        behaviors.set_all(&[Behavior::Movement, Behavior::Attack], false);

        assert!(!behaviors.is_enabled(Behavior::Movement));
        assert!(behaviors.is_enabled(Behavior::Pattern));
        assert!(!behaviors.is_enabled(Behavior::Attack));

        behaviors.set(Behavior::Movement, true);
        assert!(behaviors.is_enabled(Behavior::Movement));
    }
}
