//! Animation driver: clip state, trigger parameters, and timeline cues.
//!
//! Combatants have no sprite sheets, so the driver only keeps the state
//! machine the gameplay code listens to: which clip is playing, how far it
//! has progressed, and the attack-start / release cues on the attack clip.

use bevy::prelude::*;

use crate::GameSet;

/// Fraction of the attack clip at which the projectile is released.
pub const DEFAULT_RELEASE_AT: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AnimState {
    #[default]
    Idle,
    Run,
    Attack,
    Casting,
    Hurt,
    Dead,
}

impl AnimState {
    /// Clips that play once and hand back to locomotion.
    const fn is_one_shot(self) -> bool {
        matches!(self, Self::Attack | Self::Casting | Self::Hurt)
    }

    #[must_use]
    pub const fn is_locomotion(self) -> bool {
        matches!(self, Self::Idle | Self::Run)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum AnimTrigger {
    Attack,
    Hurt,
    Die,
}

/// Timeline events of the attack clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    AttackStart,
    Release,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationCue {
    pub entity: Entity,
    pub cue: Cue,
}

/// Clip lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ClipLengths {
    pub attack: f32,
    pub casting: f32,
    pub hurt: f32,
    pub die: f32,
}

impl Default for ClipLengths {
    fn default() -> Self {
        Self {
            attack: 0.5,
            casting: 0.6,
            hurt: 0.25,
            die: 1.0,
        }
    }
}

impl ClipLengths {
    const fn of(&self, state: AnimState) -> f32 {
        match state {
            AnimState::Idle | AnimState::Run => 1.0,
            AnimState::Attack => self.attack,
            AnimState::Casting => self.casting,
            AnimState::Hurt => self.hurt,
            AnimState::Dead => self.die,
        }
    }
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Animator {
    pub clips: ClipLengths,
    pub release_at: f32,
    pub is_moving: bool,
    pub speed: f32,
    pub shield: bool,
    state: AnimState,
    elapsed: f32,
    pending: Vec<AnimTrigger>,
    released: bool,
    unscaled: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(ClipLengths::default())
    }
}

impl Animator {
    #[must_use]
    pub const fn new(clips: ClipLengths) -> Self {
        Self {
            clips,
            release_at: DEFAULT_RELEASE_AT,
            is_moving: false,
            speed: 0.0,
            shield: false,
            state: AnimState::Idle,
            elapsed: 0.0,
            pending: Vec::new(),
            released: false,
            unscaled: false,
        }
    }

    #[must_use]
    pub const fn state(&self) -> AnimState {
        self.state
    }

    /// Progress through the current clip; keeps growing past 1.0 until the
    /// clip hands over.
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        let length = self.clips.of(self.state);
        if length <= 0.0 {
            1.0
        } else {
            self.elapsed / length
        }
    }

    /// Triggers stay set until a transition consumes them.
    pub fn set_trigger(&mut self, trigger: AnimTrigger) {
        if self.state == AnimState::Dead || self.pending.contains(&trigger) {
            return;
        }
        self.pending.push(trigger);
    }

    #[must_use]
    pub fn has_pending(&self, trigger: AnimTrigger) -> bool {
        self.pending.contains(&trigger)
    }

    /// Jumps straight into a state, like a direct play call.
    pub fn play(&mut self, state: AnimState) {
        if self.state == AnimState::Dead {
            return;
        }
        self.enter(state);
    }

    /// Keeps the clock running on real time, so the death clip plays while
    /// the match is frozen.
    pub const fn use_unscaled_time(&mut self) {
        self.unscaled = true;
    }

    #[must_use]
    pub const fn is_unscaled(&self) -> bool {
        self.unscaled
    }

    fn enter(&mut self, state: AnimState) {
        self.state = state;
        self.elapsed = 0.0;
        self.released = false;
    }

    const fn locomotion(&self) -> AnimState {
        if self.is_moving {
            AnimState::Run
        } else {
            AnimState::Idle
        }
    }

    /// Advances the state machine by `dt` and returns the cues it crossed.
    pub fn advance(&mut self, dt: f32) -> Vec<Cue> {
        let mut cues = Vec::new();

        if self.state.is_one_shot() && self.normalized_time() >= 1.0 {
            self.enter(self.locomotion());
        }

        let mut entered = false;
        let pending = std::mem::take(&mut self.pending);
        for trigger in pending {
            match trigger {
                AnimTrigger::Die if self.state != AnimState::Dead => {
                    self.enter(AnimState::Dead);
                    entered = true;
                }
                AnimTrigger::Attack if self.state.is_locomotion() && !entered => {
                    self.enter(AnimState::Attack);
                    cues.push(Cue::AttackStart);
                    entered = true;
                }
                AnimTrigger::Hurt if self.state.is_locomotion() && !entered => {
                    self.enter(AnimState::Hurt);
                    entered = true;
                }
                _ if self.state == AnimState::Dead => {}
                other => self.pending.push(other),
            }
        }
        if self.state == AnimState::Dead {
            self.pending.clear();
        }

        if self.state.is_locomotion() && self.state != self.locomotion() {
            self.enter(self.locomotion());
        } else if !entered {
            self.elapsed += dt;
        }

        if self.state == AnimState::Attack
            && !self.released
            && self.normalized_time() >= self.release_at
        {
            self.released = true;
            cues.push(Cue::Release);
        }

        cues
    }
}

fn drive_animators(
    time: Res<Time>,
    real: Res<Time<Real>>,
    mut animators: Query<(Entity, &mut Animator)>,
    mut cues: MessageWriter<AnimationCue>,
) {
    for (entity, mut animator) in &mut animators {
        let dt = if animator.is_unscaled() {
            real.delta_secs()
        } else {
            time.delta_secs()
        };
        for cue in animator.advance(dt) {
            cues.write(AnimationCue { entity, cue });
        }
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Animator>();
    app.add_message::<AnimationCue>();

    // Not gated on the match phase: the death clip keeps playing on real
    // time after the result freezes the arena.
    app.add_systems(Update, drive_animators.in_set(GameSet::Animation));
}
