//! Player abilities: shield, arrow rain and the detonating arrow.
//!
//! Each ability lives in an [`AbilitySlot`] with its own [`Cooldown`]. Slots
//! sit on the HUD buttons; hotkeys and clicks both arrive as
//! [`AbilityRequest`] messages. Cooldowns tick on real time so they keep
//! counting while the match is frozen.

mod arrow_rain;
mod detonate;
mod shield;

pub use arrow_rain::ArrowRainVolley;

use bevy::prelude::*;

use super::health::Health;
use super::{Combatant, Facing, FirePoint, Team};
use crate::config::{AbilityTuning, ArenaConfig};
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum AbilityKind {
    Shield,
    ArrowRain,
    Detonate,
}

impl AbilityKind {
    pub const ALL: [Self; 3] = [Self::Shield, Self::ArrowRain, Self::Detonate];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shield => "Shield",
            Self::ArrowRain => "Rain",
            Self::Detonate => "Detonate",
        }
    }

    #[must_use]
    pub const fn hotkey(self) -> KeyCode {
        match self {
            Self::Shield => KeyCode::Digit1,
            Self::ArrowRain => KeyCode::Digit2,
            Self::Detonate => KeyCode::Digit3,
        }
    }

    #[must_use]
    pub const fn cooldown_secs(self, tuning: &AbilityTuning) -> f32 {
        match self {
            Self::Shield => tuning.shield.cooldown_secs,
            Self::ArrowRain => tuning.arrow_rain.cooldown_secs,
            Self::Detonate => tuning.detonate.cooldown_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Cooldown {
    pub duration: f32,
    remaining: f32,
}

impl Cooldown {
    #[must_use]
    pub const fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: 0.0,
        }
    }

    pub fn start(&mut self) {
        self.remaining = self.duration.max(0.0);
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// 0 right after use, 1 when ready.
    #[must_use]
    pub fn fill(&self) -> f32 {
        if self.duration <= 0.0 || self.is_ready() {
            1.0
        } else {
            1.0 - self.remaining / self.duration
        }
    }

    /// Whole seconds left, rounded up; `None` when ready.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        if self.is_ready() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let secs = self.remaining.ceil() as i32;
        Some(secs.to_string())
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AbilitySlot {
    pub kind: AbilityKind,
    pub cooldown: Cooldown,
}

impl AbilitySlot {
    #[must_use]
    pub const fn new(kind: AbilityKind, cooldown_secs: f32) -> Self {
        Self {
            kind,
            cooldown: Cooldown::new(cooldown_secs),
        }
    }
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityRequest(pub AbilityKind);

fn read_ability_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    mut requests: MessageWriter<AbilityRequest>,
) {
    for kind in AbilityKind::ALL {
        if keys.just_pressed(kind.hotkey()) {
            requests.write(AbilityRequest(kind));
        }
    }
}

/// Cooldowns run on the real clock, even under pause or the result overlay.
fn tick_cooldowns(time: Res<Time<Real>>, mut slots: Query<&mut AbilitySlot>) {
    let dt = time.delta_secs();
    for mut slot in &mut slots {
        if !slot.cooldown.is_ready() {
            slot.cooldown.tick(dt);
        }
    }
}

/// Runs in `GameSet::Input`, after the request readers.
fn activate_abilities(
    mut requests: MessageReader<AbilityRequest>,
    config: Res<ArenaConfig>,
    mut slots: Query<&mut AbilitySlot>,
    mut combatants: Query<
        (
            Entity,
            &Team,
            &mut Health,
            &Transform,
            &Facing,
            Option<&FirePoint>,
        ),
        With<Combatant>,
    >,
    mut commands: Commands,
) {
    for AbilityRequest(kind) in requests.read() {
        let Some(mut slot) = slots.iter_mut().find(|slot| slot.kind == *kind) else {
            continue;
        };
        if !slot.cooldown.is_ready() {
            debug!("{kind:?} still cooling: {:.1}s", slot.cooldown.remaining());
            continue;
        }

        let target = combatants
            .iter()
            .find(|(_, team, ..)| **team == Team::Bot)
            .map(|(entity, ..)| entity);
        let Some((_, team, mut health, transform, facing, fire_point)) = combatants
            .iter_mut()
            .find(|(_, team, ..)| **team == Team::Player)
        else {
            continue;
        };

        let tuning = &config.abilities;
        let activated = match kind {
            AbilityKind::Shield => shield::activate(&tuning.shield, &mut health),
            AbilityKind::ArrowRain => {
                arrow_rain::activate(&mut commands, &tuning.arrow_rain, *team, target)
            }
            AbilityKind::Detonate => detonate::activate(
                &mut commands,
                &tuning.detonate,
                *team,
                transform.translation.xy(),
                *facing,
                fire_point,
            ),
        };
        if activated {
            slot.cooldown.start();
            info!("Ability {kind:?} activated");
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<AbilitySlot>();
    app.add_message::<AbilityRequest>();

    app.add_plugins(arrow_rain::plugin);

    app.add_systems(
        Update,
        (
            tick_cooldowns.run_if(in_state(GameState::InGame)),
            (read_ability_hotkeys, activate_abilities)
                .chain()
                .in_set(GameSet::Input)
                .run_if(gameplay_running),
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cooldown_fill_and_label_track_remaining_time() {
        let mut cooldown = Cooldown::new(8.0);
        assert!(cooldown.is_ready());
        assert!((cooldown.fill() - 1.0).abs() < f32::EPSILON);
        assert_eq!(cooldown.label(), None);

        cooldown.start();
        assert!(cooldown.fill().abs() < f32::EPSILON);
        assert_eq!(cooldown.label().as_deref(), Some("8"));

        cooldown.tick(2.5);
        assert!((cooldown.fill() - 0.3125).abs() < 1e-5);
        assert_eq!(cooldown.label().as_deref(), Some("6"));

        cooldown.tick(10.0);
        assert!(cooldown.is_ready());
        assert!(cooldown.remaining().abs() < f32::EPSILON);
    }

    #[test]
    fn zero_cooldown_is_always_ready() {
        let mut cooldown = Cooldown::new(0.0);
        cooldown.start();
        assert!(cooldown.is_ready());
        assert!((cooldown.fill() - 1.0).abs() < f32::EPSILON);
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::gameplay::projectile::MarkExplode;
    use crate::testing::{
        FRAME_SECS, advance_frames, assert_entity_count, create_test_app, spawn_test_combatant,
    };

    fn create_ability_test_app() -> (App, Entity, Entity) {
        let mut app = create_test_app();
        app.init_resource::<ArenaConfig>();
        app.add_message::<AbilityRequest>();
        app.add_systems(Update, (activate_abilities, tick_cooldowns).chain());
        app.update();

        let player = spawn_test_combatant(app.world_mut(), Team::Player, -6.0, 100);
        app.world_mut()
            .entity_mut(player)
            .insert(FirePoint(Vec2::new(0.5, 0.3)));
        let bot = spawn_test_combatant(app.world_mut(), Team::Bot, 6.0, 100);
        let tuning = AbilityTuning::default();
        for kind in AbilityKind::ALL {
            app.world_mut()
                .spawn(AbilitySlot::new(kind, kind.cooldown_secs(&tuning)));
        }
        (app, player, bot)
    }

    fn request(app: &mut App, kind: AbilityKind) {
        app.world_mut().write_message(AbilityRequest(kind));
        app.update();
    }

    fn slot(app: &mut App, kind: AbilityKind) -> AbilitySlot {
        let mut slots = app.world_mut().query::<&AbilitySlot>();
        slots
            .iter(app.world())
            .find(|slot| slot.kind == kind)
            .cloned()
            .unwrap()
    }

    #[test]
    fn shield_raises_player_shield_and_starts_cooldown() {
        let (mut app, player, _) = create_ability_test_app();

        request(&mut app, AbilityKind::Shield);

        let health = app.world().get::<Health>(player).unwrap();
        assert!(health.shield_active());
        assert!((health.shield().remaining - 2.0).abs() < f32::EPSILON);
        assert!(!slot(&mut app, AbilityKind::Shield).cooldown.is_ready());
    }

    #[test]
    fn cooling_ability_ignores_activation() {
        let (mut app, _, _) = create_ability_test_app();

        request(&mut app, AbilityKind::Detonate);
        advance_frames(&mut app, 2);
        request(&mut app, AbilityKind::Detonate);

        assert_entity_count::<With<MarkExplode>>(&mut app, 1);
        let remaining = slot(&mut app, AbilityKind::Detonate).cooldown.remaining();
        assert!(remaining > 8.0 - 5.0 * FRAME_SECS);
    }

    #[test]
    fn detonate_without_fire_point_is_a_no_op() {
        let (mut app, player, _) = create_ability_test_app();
        app.world_mut().entity_mut(player).remove::<FirePoint>();

        request(&mut app, AbilityKind::Detonate);

        assert_entity_count::<With<MarkExplode>>(&mut app, 0);
        assert!(slot(&mut app, AbilityKind::Detonate).cooldown.is_ready());
    }

    #[test]
    fn arrow_rain_needs_a_living_target() {
        let (mut app, _, bot) = create_ability_test_app();
        app.world_mut().despawn(bot);

        request(&mut app, AbilityKind::ArrowRain);

        assert_entity_count::<With<ArrowRainVolley>>(&mut app, 0);
        assert!(slot(&mut app, AbilityKind::ArrowRain).cooldown.is_ready());
    }
}
