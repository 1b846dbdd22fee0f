//! Health: damage, heal, shield and death for both duelists.
//!
//! `Health` itself is plain data with pure methods. Damage arrives as
//! [`DamageRequest`] messages that `apply_damage` resolves once per frame,
//! turning each [`DamageOutcome`] into popups, hurt feedback, hit-stun and,
//! at zero HP, a single [`CombatantDied`] event.

mod death;
mod hp_bar;

use bevy::prelude::*;

use super::animation::{AnimTrigger, Animator};
use super::popup::PopupRequest;
use super::{Behavior, Behaviors, Team};
use crate::{GameSet, gameplay_running};

pub use death::{DeathTimer, DespawnAfterDeath};
pub use hp_bar::{HpBar, HpLabel, HpLabelFormat};

/// Minimum seconds between two hurt reactions.
pub const HURT_COOLDOWN: f32 = 0.05;

/// Popup offset above the hit position.
pub const POPUP_OFFSET: Vec2 = Vec2::new(0.0, 0.2);

// === Components ===

/// Shield layers embedded in `Health`. Both may be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Shield {
    /// Seconds of full damage immunity left.
    pub remaining: f32,
    /// Damage budget absorbed before anything passes through.
    pub absorb: i32,
}

impl Shield {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0 || self.absorb > 0
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub max: i32,
    current: i32,
    shield: Shield,
    use_shield: bool,
    dead: bool,
}

/// What a single `take_damage` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was already dead.
    Ignored,
    /// The shield swallowed the whole hit.
    Blocked,
    Hurt { dealt: i32 },
    /// This hit brought HP to zero. Happens once per `Health`.
    Killed { dealt: i32 },
}

impl Health {
    #[must_use]
    pub const fn new(max: i32) -> Self {
        Self {
            max,
            current: max,
            shield: Shield {
                remaining: 0.0,
                absorb: 0,
            },
            use_shield: true,
            dead: false,
        }
    }

    /// Starts below full HP.
    #[cfg(test)]
    #[must_use]
    pub fn with_current(mut self, current: i32) -> Self {
        self.current = current.clamp(0, self.max);
        self
    }

    #[must_use]
    pub const fn without_shield(mut self) -> Self {
        self.use_shield = false;
        self
    }

    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    #[must_use]
    pub const fn shield(&self) -> Shield {
        self.shield
    }

    #[must_use]
    pub fn shield_active(&self) -> bool {
        self.use_shield && self.shield.is_active()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f32 {
        if self.max > 0 {
            self.current as f32 / self.max as f32
        } else {
            0.0
        }
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        let mut damage = amount.max(0);
        if self.shield_active() {
            if self.shield.absorb > 0 {
                let left = self.shield.absorb - damage;
                self.shield.absorb = left.max(0);
                if left <= 0 && self.shield.remaining <= 0.0 {
                    self.end_shield();
                }
                damage = if left <= 0 { -left } else { 0 };
            } else {
                damage = 0;
            }

            if damage <= 0 {
                return DamageOutcome::Blocked;
            }
        }

        self.current = (self.current - damage).clamp(0, self.max);
        if self.current == 0 {
            self.dead = true;
            self.end_shield();
            DamageOutcome::Killed { dealt: damage }
        } else {
            DamageOutcome::Hurt { dealt: damage }
        }
    }

    /// Returns the HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.dead {
            return 0;
        }
        let before = self.current;
        self.current = (self.current + amount.max(0)).clamp(0, self.max);
        self.current - before
    }

    /// Refreshes each shield layer to the stronger of current and new.
    /// Returns `false` when shields are unavailable.
    pub fn activate_shield(&mut self, duration: f32, absorb: i32) -> bool {
        if !self.use_shield || self.dead {
            return false;
        }
        self.shield.remaining = self.shield.remaining.max(duration);
        self.shield.absorb = self.shield.absorb.max(absorb);
        true
    }

    pub const fn end_shield(&mut self) {
        self.shield = Shield {
            remaining: 0.0,
            absorb: 0,
        };
    }

    /// Drains the timed layer; ends the shield once both layers are spent.
    pub fn tick_shield(&mut self, dt: f32) {
        if self.dead || !self.use_shield || self.shield.remaining <= 0.0 {
            return;
        }
        self.shield.remaining = (self.shield.remaining - dt).max(0.0);
        if self.shield.remaining <= 0.0 && self.shield.absorb <= 0 {
            self.end_shield();
        }
    }
}

/// Hurt reaction tuning and bookkeeping.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct HurtReaction {
    /// `None` disables hit-stun.
    pub stun_duration: Option<f32>,
    pub stun_disables: Vec<Behavior>,
    last_hurt_at: Option<f32>,
    /// One countdown per stun; each re-enables the behaviors when it ends.
    recoveries: Vec<f32>,
}

impl HurtReaction {
    #[must_use]
    pub const fn new(stun_duration: Option<f32>, stun_disables: Vec<Behavior>) -> Self {
        Self {
            stun_duration,
            stun_disables,
            last_hurt_at: None,
            recoveries: Vec::new(),
        }
    }

    /// Whether a hurt at `now` passes the rate limit. Records it if so.
    fn try_hurt(&mut self, now: f32) -> bool {
        if self
            .last_hurt_at
            .is_some_and(|last| now - last < HURT_COOLDOWN)
        {
            return false;
        }
        self.last_hurt_at = Some(now);
        true
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        !self.recoveries.is_empty()
    }
}

// === Messages & Events ===

#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    /// World position of the hit. Hits without one show no damage number.
    pub at: Option<Vec2>,
}

/// Global event fired once when a combatant's HP reaches zero.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatantDied {
    pub entity: Entity,
    pub team: Team,
}

/// Marker for the child visual shown while a shield is up.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct ShieldVisual;

// === Systems ===

fn tick_shields(time: Res<Time>, mut healths: Query<&mut Health>) {
    let dt = time.delta_secs();
    for mut health in &mut healths {
        if health.shield().remaining > 0.0 {
            health.tick_shield(dt);
        }
    }
}

/// Resolves queued damage against `Health`.
/// Runs in `GameSet::Damage`.
fn apply_damage(
    time: Res<Time>,
    mut requests: MessageReader<DamageRequest>,
    mut targets: Query<(
        &mut Health,
        &Team,
        &Transform,
        Option<&mut Animator>,
        Option<&mut HurtReaction>,
        Option<&mut Behaviors>,
    )>,
    mut popups: MessageWriter<PopupRequest>,
    mut commands: Commands,
) {
    for request in requests.read() {
        let Ok((mut health, team, transform, mut animator, reaction, behaviors)) =
            targets.get_mut(request.target)
        else {
            continue;
        };

        match health.take_damage(request.amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Blocked => {
                let at = request.at.unwrap_or_else(|| transform.translation.xy());
                popups.write(PopupRequest::block(at + POPUP_OFFSET));
            }
            DamageOutcome::Hurt { dealt } => {
                if let Some(at) = request.at {
                    popups.write(PopupRequest::damage(dealt, *team, at + POPUP_OFFSET));
                }
                let Some(mut reaction) = reaction else {
                    continue;
                };
                if !reaction.try_hurt(time.elapsed_secs()) {
                    continue;
                }
                if let Some(animator) = animator.as_deref_mut() {
                    animator.set_trigger(AnimTrigger::Hurt);
                }
                let (Some(duration), Some(mut behaviors)) = (reaction.stun_duration, behaviors)
                else {
                    continue;
                };
                if duration > 0.0 {
                    behaviors.set_all(&reaction.stun_disables, false);
                    reaction.recoveries.push(duration);
                }
            }
            DamageOutcome::Killed { dealt } => {
                if let Some(at) = request.at {
                    popups.write(PopupRequest::damage(dealt, *team, at + POPUP_OFFSET));
                }
                info!("{team:?} combatant {} died", request.target);
                commands.trigger(CombatantDied {
                    entity: request.target,
                    team: *team,
                });
            }
        }
    }
}

/// Counts down pending hit-stun recoveries and re-enables behaviors as each
/// one ends. Dead combatants stay disabled.
fn recover_from_hit_stun(
    time: Res<Time>,
    mut stunned: Query<(&Health, &mut HurtReaction, &mut Behaviors)>,
) {
    let dt = time.delta_secs();
    for (health, mut reaction, mut behaviors) in &mut stunned {
        if reaction.recoveries.is_empty() {
            continue;
        }
        let before = reaction.recoveries.len();
        for remaining in &mut reaction.recoveries {
            *remaining -= dt;
        }
        reaction.recoveries.retain(|remaining| *remaining > 0.0);
        if reaction.recoveries.len() < before && !health.is_dead() {
            let disables = reaction.stun_disables.clone();
            behaviors.set_all(&disables, true);
        }
    }
}

fn sync_shield_visuals(
    mut healths: Query<(&Health, Option<&Children>, Option<&mut Animator>), Changed<Health>>,
    mut visuals: Query<&mut Visibility, With<ShieldVisual>>,
) {
    for (health, children, animator) in &mut healths {
        let active = health.shield_active();
        if let Some(mut animator) = animator {
            animator.shield = active;
        }
        let Some(children) = children else {
            continue;
        };
        for child in children.iter() {
            if let Ok(mut visibility) = visuals.get_mut(child) {
                *visibility = if active {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Health>()
        .register_type::<HurtReaction>()
        .register_type::<ShieldVisual>();
    app.add_message::<DamageRequest>();

    app.add_systems(
        Update,
        (
            (tick_shields, apply_damage, recover_from_hit_stun)
                .chain()
                .in_set(GameSet::Damage),
            sync_shield_visuals.in_set(GameSet::Ui),
        )
            .run_if(gameplay_running),
    );

    app.add_plugins((death::plugin, hp_bar::plugin));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn damage_clamps_to_zero_and_kills_once() {
        let mut health = Health::new(100);

        assert_eq!(health.take_damage(30), DamageOutcome::Hurt { dealt: 30 });
        assert_eq!(health.take_damage(500), DamageOutcome::Killed { dealt: 500 });
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());

        assert_eq!(health.take_damage(10), DamageOutcome::Ignored);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn negative_damage_is_treated_as_zero() {
        let mut health = Health::new(100);
        assert_eq!(health.take_damage(-25), DamageOutcome::Hurt { dealt: 0 });
        assert_eq!(health.current(), 100);
    }

    #[test]
    fn heal_clamps_to_max_and_is_ignored_when_dead() {
        let mut health = Health::new(100).with_current(90);
        assert_eq!(health.heal(25), 10);
        assert_eq!(health.current(), 100);
        assert_eq!(health.heal(-5), 0);

        health.take_damage(100);
        assert_eq!(health.heal(50), 0);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn absorb_shield_passes_only_overflow() {
        let mut health = Health::new(100);
        assert!(health.activate_shield(0.0, 30));

        assert_eq!(health.take_damage(10), DamageOutcome::Blocked);
        assert_eq!(health.shield().absorb, 20);

        assert_eq!(health.take_damage(25), DamageOutcome::Hurt { dealt: 5 });
        assert_eq!(health.current(), 95);
        assert_eq!(health.shield(), Shield::default());
        assert!(!health.shield_active());
    }

    #[test]
    fn exact_absorb_is_still_a_block() {
        let mut health = Health::new(100);
        health.activate_shield(0.0, 15);

        assert_eq!(health.take_damage(15), DamageOutcome::Blocked);
        assert_eq!(health.current(), 100);
        assert!(!health.shield_active());
    }

    #[test]
    fn timed_shield_blocks_until_it_expires() {
        let mut health = Health::new(100);
        health.activate_shield(2.0, 0);

        for _ in 0..19 {
            assert_eq!(health.take_damage(40), DamageOutcome::Blocked);
            health.tick_shield(0.1);
        }
        assert_eq!(health.current(), 100);

        health.tick_shield(0.2);
        assert!(!health.shield_active());
        assert_eq!(health.take_damage(40), DamageOutcome::Hurt { dealt: 40 });
        assert_eq!(health.current(), 60);
    }

    #[test]
    fn timed_layer_keeps_absorb_layer_alive() {
        let mut health = Health::new(100);
        health.activate_shield(1.0, 20);
        health.tick_shield(2.0);

        assert!(health.shield_active());
        assert_eq!(health.shield().remaining, 0.0);
        assert_eq!(health.take_damage(25), DamageOutcome::Hurt { dealt: 5 });
    }

    #[test]
    fn refresh_takes_max_instead_of_stacking() {
        let mut health = Health::new(100);
        health.activate_shield(2.0, 10);
        health.activate_shield(1.0, 30);

        assert_eq!(
            health.shield(),
            Shield {
                remaining: 2.0,
                absorb: 30
            }
        );
    }

    #[test]
    fn shield_unavailable_when_disabled_or_dead() {
        let mut disabled = Health::new(100).without_shield();
        assert!(!disabled.activate_shield(2.0, 10));
        assert_eq!(disabled.take_damage(10), DamageOutcome::Hurt { dealt: 10 });

        let mut dead = Health::new(10);
        dead.take_damage(10);
        assert!(!dead.activate_shield(2.0, 10));
    }

    #[test]
    fn death_ends_shield() {
        let mut health = Health::new(10);
        health.activate_shield(0.0, 5);
        assert_eq!(health.take_damage(20), DamageOutcome::Killed { dealt: 15 });
        assert!(!health.shield_active());
    }

    #[test]
    fn fraction_tracks_current_hp() {
        let health = Health::new(200).with_current(50);
        assert!((health.fraction() - 0.25).abs() < f32::EPSILON);
    }
}
