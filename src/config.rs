//! Arena tuning loaded from a RON file.
//!
//! Every section falls back to its defaults, so a config file only needs the
//! values it changes:
//!
//! ```ron
//! (
//!     match_rules: (duration_secs: 60.0, show_mmss: true),
//!     bot: (pattern: (move_speed: 4.0)),
//! )
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// All tunable values of a match.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArenaConfig {
    pub match_rules: MatchRules,
    pub player: PlayerTuning,
    pub bot: BotTuning,
    pub abilities: AbilityTuning,
    pub heal_drop: HealDropTuning,
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.match_rules;
        if rules.duration_secs <= 0.0 {
            return Err(ConfigError::Invalid(
                "match_rules.duration_secs must be positive".to_string(),
            ));
        }
        if rules.countdown_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "match_rules.countdown_secs must not be negative".to_string(),
            ));
        }
        for (side, combatant) in [("player", &self.player.combatant), ("bot", &self.bot.combatant)] {
            if combatant.max_hp <= 0 {
                return Err(ConfigError::Invalid(format!("{side}.combatant.max_hp must be positive")));
            }
        }
        if self.player.left_bound > self.player.right_bound {
            return Err(ConfigError::Invalid(
                "player.left_bound must not exceed player.right_bound".to_string(),
            ));
        }
        let cooldowns = [
            self.abilities.shield.cooldown_secs,
            self.abilities.arrow_rain.cooldown_secs,
            self.abilities.detonate.cooldown_secs,
        ];
        if cooldowns.iter().any(|cooldown| *cooldown < 0.0) {
            return Err(ConfigError::Invalid(
                "ability cooldowns must not be negative".to_string(),
            ));
        }
        if self.heal_drop.range_min_x > self.heal_drop.range_max_x {
            return Err(ConfigError::Invalid(
                "heal_drop.range_min_x must not exceed heal_drop.range_max_x".to_string(),
            ));
        }
        Ok(())
    }
}

// === Match ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct MatchRules {
    pub duration_secs: f32,
    /// Show the match timer as `MM:SS` instead of whole seconds.
    pub show_mmss: bool,
    /// The timer label turns to the warning color at or below this many seconds.
    /// Negative disables the warning.
    pub warn_at_secs: i32,
    /// Pre-match 3-2-1 countdown length. Zero starts the fight immediately.
    pub countdown_secs: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            duration_secs: 90.0,
            show_mmss: false,
            warn_at_secs: 10,
            countdown_secs: 3.0,
        }
    }
}

// === Combatants ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct CombatantTuning {
    pub max_hp: i32,
    pub destroy_delay_secs: f32,
    pub use_hit_stun: bool,
    pub hit_stun_secs: f32,
    pub use_shield: bool,
}

impl Default for CombatantTuning {
    fn default() -> Self {
        Self {
            max_hp: 100,
            destroy_delay_secs: 1.5,
            use_hit_stun: false,
            hit_stun_secs: 0.15,
            use_shield: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct PlayerTuning {
    pub combatant: CombatantTuning,
    pub spawn_x: f32,
    pub move_speed: f32,
    pub left_bound: f32,
    pub right_bound: f32,
    pub dead_zone: f32,
    pub arrow: ArrowTuning,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            combatant: CombatantTuning::default(),
            spawn_x: -6.0,
            move_speed: 3.0,
            left_bound: -8.0,
            right_bound: -3.5,
            dead_zone: 0.02,
            arrow: ArrowTuning::default(),
        }
    }
}

/// Ballistic arrow released by the normal attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ArrowTuning {
    pub damage: i32,
    pub launch_angle_deg: f32,
    pub speed: f32,
    pub gravity_scale: f32,
}

impl Default for ArrowTuning {
    fn default() -> Self {
        Self {
            damage: 10,
            launch_angle_deg: 15.0,
            speed: 15.0,
            gravity_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BotTuning {
    pub combatant: CombatantTuning,
    pub spawn_x: f32,
    pub pattern: PatternTuning,
    pub bullet: BulletTuning,
    /// `None` turns the homing cast into a no-op.
    pub homing: Option<HomingTuning>,
    /// `None` turns the rain cast into a no-op.
    pub rain: Option<RainTuning>,
}

impl Default for BotTuning {
    fn default() -> Self {
        Self {
            combatant: CombatantTuning::default(),
            spawn_x: 6.0,
            pattern: PatternTuning::default(),
            bullet: BulletTuning::default(),
            homing: Some(HomingTuning::default()),
            rain: Some(RainTuning::default()),
        }
    }
}

/// Timings of the bot's scripted routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct PatternTuning {
    pub cell_size: f32,
    pub move_speed: f32,
    pub stop_tolerance: f32,
    pub pause_after_move: f32,
    pub attack_tail: f32,
    pub after_homing_pause: f32,
    pub after_rain_pause: f32,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            move_speed: 3.0,
            stop_tolerance: 0.02,
            pause_after_move: 0.1,
            attack_tail: 0.25,
            after_homing_pause: 0.4,
            after_rain_pause: 0.6,
        }
    }
}

/// Horizontal bullet that grows while flying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct BulletTuning {
    pub damage: i32,
    pub speed: f32,
    pub start_scale: f32,
    pub max_scale: f32,
    pub grow_time: f32,
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            damage: 20,
            speed: 10.0,
            start_scale: 0.6,
            max_scale: 1.8,
            grow_time: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct HomingTuning {
    pub damage: i32,
    pub speed: f32,
    pub turn_rate_deg: f32,
    pub lifetime: f32,
    pub windup: f32,
    pub tail: f32,
}

impl Default for HomingTuning {
    fn default() -> Self {
        Self {
            damage: 15,
            speed: 10.0,
            turn_rate_deg: 360.0,
            lifetime: 5.0,
            windup: 0.2,
            tail: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct RainTuning {
    pub damage: i32,
    pub count: u32,
    pub interval: f32,
    pub half_width: f32,
    pub height: f32,
    pub speed_y: f32,
    pub windup: f32,
    pub tail: f32,
}

impl Default for RainTuning {
    fn default() -> Self {
        Self {
            damage: 15,
            count: 14,
            interval: 0.05,
            half_width: 2.5,
            height: 5.0,
            speed_y: -12.0,
            windup: 0.35,
            tail: 0.2,
        }
    }
}

// === Abilities ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AbilityTuning {
    pub shield: ShieldAbilityTuning,
    pub arrow_rain: ArrowRainTuning,
    pub detonate: DetonateTuning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ShieldAbilityTuning {
    pub cooldown_secs: f32,
    pub duration: f32,
    pub absorb: i32,
}

impl Default for ShieldAbilityTuning {
    fn default() -> Self {
        Self {
            cooldown_secs: 8.0,
            duration: 2.0,
            absorb: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ArrowRainTuning {
    pub cooldown_secs: f32,
    pub arrow_count: u32,
    pub duration: f32,
    pub spread_x: f32,
    pub spawn_height: f32,
    pub fall_speed: f32,
    pub damage: i32,
}

impl Default for ArrowRainTuning {
    fn default() -> Self {
        Self {
            cooldown_secs: 6.0,
            arrow_count: 18,
            duration: 1.0,
            spread_x: 3.0,
            spawn_height: 4.0,
            fall_speed: 20.0,
            damage: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct DetonateTuning {
    pub cooldown_secs: f32,
    pub detonate_delay: f32,
    pub damage: i32,
    /// Radius of the blast; at or below 0.01 only the stuck target is hit.
    pub aoe_radius: f32,
    pub launch_angle_deg: f32,
    pub speed: f32,
    pub gravity_scale: f32,
}

impl Default for DetonateTuning {
    fn default() -> Self {
        Self {
            cooldown_secs: 8.0,
            detonate_delay: 2.0,
            damage: 40,
            aoe_radius: 1.2,
            launch_angle_deg: 20.0,
            speed: 14.0,
            gravity_scale: 1.0,
        }
    }
}

// === Heal drops ===

/// How a heal drop picks its spawn x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect)]
pub enum DropXMode {
    Midpoint,
    RandomBetweenCombatants,
    RandomInRange,
    Points,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct HealDropTuning {
    /// Seconds between automatic drops. Zero disables automatic drops.
    pub interval: f32,
    pub heal_amount: i32,
    pub fall_speed: f32,
    pub kill_below_y: f32,
    /// Zero means the pickup lives until it falls out.
    pub lifetime: f32,
    pub x_mode: DropXMode,
    pub x_offset: f32,
    pub between_padding: f32,
    pub range_min_x: f32,
    pub range_max_x: f32,
    pub points: Vec<f32>,
    pub points_sequential: bool,
    /// Spawn at this height; otherwise `drop_height` above the higher combatant.
    pub fixed_y: Option<f32>,
    pub drop_height: f32,
}

impl Default for HealDropTuning {
    fn default() -> Self {
        Self {
            interval: 12.0,
            heal_amount: 20,
            fall_speed: 2.5,
            kill_below_y: -4.0,
            lifetime: 0.0,
            x_mode: DropXMode::RandomBetweenCombatants,
            x_offset: 0.0,
            between_padding: 0.2,
            range_min_x: -8.0,
            range_max_x: 8.0,
            points: Vec::new(),
            points_sequential: false,
            fixed_y: None,
            drop_height: 8.0,
        }
    }
}
