//! Color constants and font size tokens for consistent theming.

use bevy::prelude::*;

// === Text Colors ===

/// Header/title text color (white).
pub const HEADER_TEXT: Color = Color::WHITE;

/// Body/subtitle text color (light gray).
pub const BODY_TEXT: Color = Color::srgb(0.7, 0.7, 0.7);

/// Button label text color.
pub const BUTTON_TEXT: Color = Color::srgb(0.925, 0.925, 0.925);

// === UI Backgrounds ===

/// Semi-transparent dark overlay for modal screens.
pub const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);

/// Panel background (dark blue-gray, nearly opaque).
pub const PANEL_BACKGROUND: Color = Color::srgba(0.1, 0.1, 0.15, 0.95);

/// Panel border (light blue-gray, semi-transparent).
pub const PANEL_BORDER: Color = Color::srgba(0.5, 0.5, 0.6, 0.8);

// === Button Colors ===

pub const BUTTON_BACKGROUND: Color = Color::srgb(0.275, 0.4, 0.75);
pub const BUTTON_HOVERED_BACKGROUND: Color = Color::srgb(0.384, 0.6, 0.82);
pub const BUTTON_PRESSED_BACKGROUND: Color = Color::srgb(0.239, 0.286, 0.6);
pub const BUTTON_DISABLED_BACKGROUND: Color = Color::srgb(0.3, 0.3, 0.32);

// === Result Titles ===

pub const RESULT_WIN: Color = Color::srgb(0.3, 0.9, 0.4);
pub const RESULT_LOSE: Color = Color::srgb(0.9, 0.25, 0.25);
pub const RESULT_DRAW: Color = Color::srgb(0.85, 0.85, 0.55);

// === Match Timer ===

pub const TIMER_NORMAL: Color = Color::WHITE;
pub const TIMER_WARN: Color = Color::srgb(1.0, 0.4, 0.4);

// === Ability Buttons ===

/// Multiplier applied to the icon while an ability cools down.
pub const COOLDOWN_TINT: Color = Color::srgb(0.45, 0.45, 0.45);
pub const ABILITY_READY: Color = Color::WHITE;
/// Dark sweep covering the fraction of the cooldown still left.
pub const COOLDOWN_FILL: Color = Color::srgba(0.0, 0.0, 0.0, 0.55);
pub const ABILITY_SHIELD: Color = Color::srgb(0.45, 0.75, 1.0);
pub const ABILITY_RAIN: Color = Color::srgb(0.95, 0.75, 0.3);
pub const ABILITY_DETONATE: Color = Color::srgb(0.95, 0.45, 0.25);

// === Arena Colors ===

pub const BACKGROUND: Color = Color::srgb(0.1, 0.1, 0.12);
pub const GROUND: Color = Color::srgb(0.25, 0.22, 0.18);
pub const PLAYER: Color = Color::srgb(0.2, 0.55, 0.9);
pub const BOT: Color = Color::srgb(0.85, 0.3, 0.3);
pub const SHIELD: Color = Color::srgba(0.5, 0.85, 1.0, 0.35);
pub const HEAL_PICKUP: Color = Color::srgb(0.9, 0.2, 0.25);

// === Projectile Colors ===

pub const ARROW: Color = Color::srgb(0.95, 0.9, 0.7);
pub const RAIN_ARROW: Color = Color::srgb(1.0, 0.85, 0.4);
pub const BULLET: Color = Color::srgb(0.9, 0.4, 0.9);
pub const MISSILE: Color = Color::srgb(1.0, 0.55, 0.2);
pub const MARK_ARROW: Color = Color::srgb(1.0, 0.3, 0.1);
pub const MARK: Color = Color::srgba(1.0, 0.2, 0.1, 0.8);
pub const EXPLOSION: Color = Color::srgba(1.0, 0.6, 0.2, 0.6);
pub const HIT_SPARK: Color = Color::srgba(1.0, 1.0, 0.8, 0.8);

// === Health Bar Colors ===

pub const HP_BAR_BG: Color = Color::srgb(0.8, 0.1, 0.1);
pub const HP_BAR_FILL: Color = Color::srgb(0.1, 0.9, 0.1);

// === Popup Colors ===

/// Damage taken by the player.
pub const POPUP_DAMAGE_PLAYER: Color = Color::srgb(1.0, 0.3, 0.3);
/// Damage taken by the bot.
pub const POPUP_DAMAGE_BOT: Color = Color::srgb(1.0, 0.9, 0.4);
pub const POPUP_HEAL: Color = Color::srgb(0.35, 0.85, 1.0);
pub const POPUP_BLOCK: Color = Color::srgb(0.6, 0.9, 1.0);

// === Font Size Tokens ===

pub const FONT_SIZE_TITLE: f32 = 72.0;
pub const FONT_SIZE_HEADER: f32 = 64.0;
pub const FONT_SIZE_LABEL: f32 = 32.0;
pub const FONT_SIZE_HUD: f32 = 28.0;
pub const FONT_SIZE_BODY: f32 = 16.0;
pub const FONT_SIZE_SMALL: f32 = 14.0;
