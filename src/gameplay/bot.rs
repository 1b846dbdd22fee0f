//! Bot routine: a fixed nine-step rotation of attacks, moves and casts.
//!
//! [`BotPattern`] is a resumable state machine. Each tick the system hands it
//! a [`BotView`] snapshot and applies the [`BotCommand`]s it returns, so the
//! rotation itself never touches the world. While the host is stunned the
//! routine holds its step and timers and picks up where it stopped.

use avian2d::prelude::LinearVelocity;
use bevy::prelude::*;

use super::animation::{AnimState, AnimTrigger, Animator};
use super::projectile::{RainStyle, RainVolley, random_drop_x, spawn_homing_missile, spawn_rain_drop};
use super::{Behavior, Behaviors, Combatant, Facing, FirePoint, Team};
use crate::config::{BotTuning, HomingTuning, PatternTuning, RainTuning};
use crate::{GameSet, gameplay_running};

/// Normalized attack-clip time the routine treats as "done".
pub const ATTACK_DONE_AT: f32 = 0.99;

/// Upper bound on phase changes in one tick, so zero-length steps cannot spin.
const MAX_TRANSITIONS_PER_TICK: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum BotAction {
    Attack,
    /// Move this many cells along the current facing.
    Move(i32),
    CastHoming,
    CastRain,
}

pub const ROUTINE: [BotAction; 9] = [
    BotAction::Attack,
    BotAction::Move(-2),
    BotAction::CastHoming,
    BotAction::Move(1),
    BotAction::Attack,
    BotAction::Attack,
    BotAction::Move(2),
    BotAction::CastRain,
    BotAction::Move(-1),
];

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
enum StepPhase {
    Begin,
    /// Attack trigger set, waiting for a fresh attack clip.
    AwaitAttackClip,
    /// Attack clip playing, waiting for it to reach [`ATTACK_DONE_AT`].
    AwaitAttackEnd,
    Travel {
        target_x: f32,
    },
    Windup {
        remaining: f32,
    },
    Volley {
        volley: RainVolley,
        center_x: f32,
        top_y: f32,
    },
    Settle {
        remaining: f32,
    },
}

/// What the routine needs to know about its host this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotView {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    /// `None` when the host has no animator; attack waits then pass at once.
    pub clip: Option<(AnimState, f32)>,
    pub fire_origin: Option<Vec2>,
    pub target: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BotCommand {
    /// Zero the body's velocity.
    Halt,
    SetMoving(bool),
    Face(Facing),
    TriggerAttack,
    PlayCasting,
    /// Put the body at `x` this tick.
    MoveTo(f32),
    SpawnHoming { origin: Vec2, dir_x: f32 },
    SpawnRain { center_x: f32, half_width: f32, y: f32 },
}

enum Progress {
    Wait,
    Next(StepPhase),
    StepDone,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct BotPattern {
    pub pattern: PatternTuning,
    pub homing: Option<HomingTuning>,
    pub rain: Option<RainTuning>,
    /// Entity the casts aim at.
    pub target: Option<Entity>,
    step: usize,
    phase: StepPhase,
    cycles: u32,
    paused: bool,
}

const fn settle(secs: f32) -> StepPhase {
    StepPhase::Settle { remaining: secs }
}

impl BotPattern {
    #[must_use]
    pub fn new(tuning: &BotTuning) -> Self {
        Self {
            pattern: tuning.pattern.clone(),
            homing: tuning.homing.clone(),
            rain: tuning.rain.clone(),
            target: None,
            step: 0,
            phase: StepPhase::Begin,
            cycles: 0,
            paused: false,
        }
    }

    #[must_use]
    pub const fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub const fn step(&self) -> usize {
        self.step
    }

    #[must_use]
    pub const fn current_action(&self) -> BotAction {
        ROUTINE[self.step]
    }

    /// Completed passes through the whole routine.
    #[must_use]
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// X the current move step is heading for.
    #[must_use]
    pub const fn travel_target(&self) -> Option<f32> {
        match self.phase {
            StepPhase::Travel { target_x } => Some(target_x),
            _ => None,
        }
    }

    /// Holds the routine in place until the next [`poll`](Self::poll).
    /// Returns `true` only for the first call of a pause.
    pub const fn pause(&mut self) -> bool {
        let first = !self.paused;
        self.paused = true;
        first
    }

    /// Runs the routine for one tick of `dt` seconds.
    pub fn poll(&mut self, dt: f32, view: &BotView) -> Vec<BotCommand> {
        let mut out = Vec::new();
        let mut view = *view;

        if self.paused {
            self.paused = false;
            if self.travel_target().is_some() {
                out.push(BotCommand::SetMoving(true));
            }
        }

        // Phases entered during this tick start counting on the next one.
        match &mut self.phase {
            StepPhase::Windup { remaining } | StepPhase::Settle { remaining } => *remaining -= dt,
            StepPhase::Volley { volley, .. } => volley.advance(dt),
            _ => {}
        }

        for _ in 0..MAX_TRANSITIONS_PER_TICK {
            if self.phase == StepPhase::Begin {
                debug!("Bot step {}: {:?}", self.step, self.current_action());
            }
            match self.resume(dt, &mut view, &mut out) {
                Progress::Wait => break,
                Progress::Next(phase) => self.phase = phase,
                Progress::StepDone => {
                    self.phase = StepPhase::Begin;
                    self.step += 1;
                    if self.step == ROUTINE.len() {
                        self.step = 0;
                        self.cycles += 1;
                    }
                }
            }
        }
        out
    }

    fn resume(&mut self, dt: f32, view: &mut BotView, out: &mut Vec<BotCommand>) -> Progress {
        let pattern = &self.pattern;
        match (self.current_action(), self.phase) {
            (BotAction::Attack, StepPhase::Begin) => {
                view.facing = Facing::Left;
                out.extend([
                    BotCommand::Face(Facing::Left),
                    BotCommand::Halt,
                    BotCommand::SetMoving(false),
                    BotCommand::TriggerAttack,
                ]);
                Progress::Next(StepPhase::AwaitAttackClip)
            }
            // A clip still showing the previous attack's last frame does not count.
            (_, StepPhase::AwaitAttackClip) => match view.clip {
                None => Progress::Next(StepPhase::AwaitAttackEnd),
                Some((AnimState::Attack, time)) if time < ATTACK_DONE_AT => {
                    Progress::Next(StepPhase::AwaitAttackEnd)
                }
                Some(_) => Progress::Wait,
            },
            (_, StepPhase::AwaitAttackEnd) => match view.clip {
                Some((AnimState::Attack, time)) if time < ATTACK_DONE_AT => Progress::Wait,
                _ => Progress::Next(settle(pattern.attack_tail)),
            },

            (BotAction::Move(cells), StepPhase::Begin) => {
                #[allow(clippy::cast_precision_loss)]
                let offset = cells as f32 * pattern.cell_size * view.facing.sign();
                out.push(BotCommand::SetMoving(true));
                Progress::Next(StepPhase::Travel {
                    target_x: view.x + offset,
                })
            }
            (_, StepPhase::Travel { target_x }) => {
                let gap = target_x - view.x;
                if gap.abs() <= pattern.stop_tolerance {
                    out.extend([BotCommand::Halt, BotCommand::SetMoving(false)]);
                    return Progress::Next(settle(pattern.pause_after_move));
                }
                let max_step = pattern.move_speed * dt;
                out.push(BotCommand::MoveTo(view.x + gap.clamp(-max_step, max_step)));
                Progress::Wait
            }

            (BotAction::CastHoming, StepPhase::Begin) => {
                let (Some(homing), Some(_)) = (&self.homing, view.fire_origin) else {
                    return Progress::StepDone;
                };
                out.push(BotCommand::TriggerAttack);
                Progress::Next(StepPhase::Windup {
                    remaining: homing.windup,
                })
            }
            (BotAction::CastRain, StepPhase::Begin) => {
                let Some(rain) = &self.rain else {
                    return Progress::StepDone;
                };
                out.extend([
                    BotCommand::Halt,
                    BotCommand::SetMoving(false),
                    BotCommand::PlayCasting,
                ]);
                Progress::Next(StepPhase::Windup {
                    remaining: rain.windup,
                })
            }
            (action, StepPhase::Windup { remaining }) => {
                if remaining > 0.0 {
                    return Progress::Wait;
                }
                match (action, &self.homing, &self.rain) {
                    (BotAction::CastHoming, Some(homing), _) => {
                        if let Some(origin) = view.fire_origin {
                            out.push(BotCommand::SpawnHoming {
                                origin,
                                dir_x: view.facing.sign(),
                            });
                        }
                        Progress::Next(settle(
                            homing.tail.max(0.0) + pattern.after_homing_pause.max(0.0),
                        ))
                    }
                    (BotAction::CastRain, _, Some(rain)) => {
                        // The band is fixed where the target stood when the volley began.
                        let anchor = view.target.unwrap_or(Vec2::new(view.x, view.y));
                        Progress::Next(StepPhase::Volley {
                            volley: RainVolley::new(rain.count, rain.interval),
                            center_x: anchor.x,
                            top_y: anchor.y + rain.height,
                        })
                    }
                    _ => Progress::StepDone,
                }
            }
            (
                _,
                StepPhase::Volley {
                    mut volley,
                    center_x,
                    top_y,
                },
            ) => {
                let Some(rain) = &self.rain else {
                    return Progress::StepDone;
                };
                for _ in 0..volley.release() {
                    out.push(BotCommand::SpawnRain {
                        center_x,
                        half_width: rain.half_width,
                        y: top_y,
                    });
                }
                if volley.is_finished() {
                    return Progress::Next(settle(
                        rain.tail.max(0.0) + pattern.after_rain_pause.max(0.0),
                    ));
                }
                self.phase = StepPhase::Volley {
                    volley,
                    center_x,
                    top_y,
                };
                Progress::Wait
            }

            (_, StepPhase::Settle { remaining }) => {
                if remaining > 0.0 {
                    Progress::Wait
                } else {
                    Progress::StepDone
                }
            }
        }
    }
}

/// Runs in `GameSet::Ai`.
fn run_bot_patterns(
    time: Res<Time>,
    mut bots: Query<
        (
            &mut BotPattern,
            &Behaviors,
            &Team,
            &mut Transform,
            &mut Facing,
            Option<&mut Animator>,
            Option<&mut LinearVelocity>,
            Option<&FirePoint>,
        ),
        With<Combatant>,
    >,
    targets: Query<&Transform, Without<BotPattern>>,
    mut commands: Commands,
) {
    let dt = time.delta_secs();
    for (mut bot, behaviors, team, mut transform, mut facing, mut animator, mut velocity, fire_point) in
        &mut bots
    {
        if !behaviors.is_enabled(Behavior::Pattern) {
            if bot.pause() {
                debug!("Bot routine paused at step {}", bot.step());
                if let Some(animator) = animator.as_deref_mut() {
                    animator.is_moving = false;
                    animator.speed = 0.0;
                }
            }
            if let Some(velocity) = velocity.as_deref_mut() {
                velocity.x = 0.0;
            }
            continue;
        }

        let position = transform.translation.xy();
        let view = BotView {
            x: position.x,
            y: position.y,
            facing: *facing,
            clip: animator
                .as_deref()
                .map(|animator| (animator.state(), animator.normalized_time())),
            fire_origin: fire_point.map(|point| point.world_position(position, *facing)),
            target: bot
                .target
                .and_then(|target| targets.get(target).ok())
                .map(|target| target.translation.xy()),
        };

        for command in bot.poll(dt, &view) {
            match command {
                BotCommand::Halt => {
                    if let Some(velocity) = velocity.as_deref_mut() {
                        velocity.x = 0.0;
                    }
                }
                BotCommand::SetMoving(moving) => {
                    if let Some(animator) = animator.as_deref_mut() {
                        animator.is_moving = moving;
                        animator.speed = if moving { bot.pattern.move_speed } else { 0.0 };
                    }
                }
                BotCommand::Face(next) => *facing = next,
                BotCommand::TriggerAttack => {
                    if let Some(animator) = animator.as_deref_mut() {
                        animator.set_trigger(AnimTrigger::Attack);
                    }
                }
                BotCommand::PlayCasting => {
                    if let Some(animator) = animator.as_deref_mut() {
                        animator.play(AnimState::Casting);
                    }
                }
                // Physics bodies are steered by `drive_bot_travel` instead.
                BotCommand::MoveTo(x) => {
                    if velocity.is_none() {
                        transform.translation.x = x;
                    }
                }
                BotCommand::SpawnHoming { origin, dir_x } => {
                    if let Some(homing) = &bot.homing {
                        spawn_homing_missile(&mut commands, homing, *team, origin, dir_x, bot.target);
                    }
                }
                BotCommand::SpawnRain {
                    center_x,
                    half_width,
                    y,
                } => {
                    if let Some(rain) = &bot.rain {
                        let at = Vec2::new(random_drop_x(center_x, half_width), y);
                        spawn_rain_drop(
                            &mut commands,
                            RainStyle::Bullet,
                            *team,
                            at,
                            Vec2::new(0.0, rain.speed_y),
                            rain.damage,
                        );
                    }
                }
            }
        }
    }
}

/// Runs in `FixedUpdate`: each physics step covers at most `move_speed * dt`
/// and the last one ends exactly on the target.
fn drive_bot_travel(
    time: Res<Time>,
    mut bots: Query<(&BotPattern, &Behaviors, &Transform, &mut LinearVelocity)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    for (bot, behaviors, transform, mut velocity) in &mut bots {
        if !behaviors.is_enabled(Behavior::Pattern) {
            continue;
        }
        let Some(target_x) = bot.travel_target() else {
            continue;
        };
        let speed = bot.pattern.move_speed;
        velocity.x = ((target_x - transform.translation.x) / dt).clamp(-speed, speed);
    }
}

pub(super) fn plugin(app: &mut App) {
    app.register_type::<BotPattern>();

    app.add_systems(FixedUpdate, drive_bot_travel.run_if(gameplay_running));

    app.add_systems(
        Update,
        run_bot_patterns
            .in_set(GameSet::Ai)
            .run_if(gameplay_running),
    );
}


#[cfg(test)]
mod integration_tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::gameplay::projectile::HomingMissile;
    use crate::testing::{advance_frames, advance_secs, create_test_app, spawn_test_combatant};
    use pretty_assertions::assert_eq;

    /// Stands in for the physics step: integrates x velocity.
    fn integrate_velocity(time: Res<Time>, mut bodies: Query<(&LinearVelocity, &mut Transform)>) {
        for (velocity, mut transform) in &mut bodies {
            transform.translation.x += velocity.x * time.delta_secs();
        }
    }

    fn create_bot_test_app() -> App {
        let mut app = create_test_app();
        app.add_systems(Update, run_bot_patterns);
        app.add_systems(FixedUpdate, drive_bot_travel);
        app.update();
        app
    }

    fn spawn_bot(app: &mut App, step: usize) -> (Entity, Entity) {
        let player = spawn_test_combatant(app.world_mut(), Team::Player, -6.0, 100);
        let bot = spawn_test_combatant(app.world_mut(), Team::Bot, 6.0, 100);
        let mut pattern = BotPattern::new(&BotTuning::default()).with_target(player);
        pattern.step = step;
        app.world_mut().entity_mut(bot).insert((
            pattern,
            Facing::Left,
            FirePoint(Vec2::new(0.5, 0.3)),
            LinearVelocity::ZERO,
        ));
        (player, bot)
    }

    fn set_pattern(app: &mut App, bot: Entity, enabled: bool) {
        app.world_mut()
            .get_mut::<Behaviors>(bot)
            .unwrap()
            .set(Behavior::Pattern, enabled);
    }

    #[test]
    fn disabling_the_routine_pauses_the_step_in_flight() {
        let mut app = create_bot_test_app();
        let (_, bot) = spawn_bot(&mut app, 1);

        advance_frames(&mut app, 5);
        let velocity = app.world().get::<LinearVelocity>(bot).unwrap().x;
        assert!((velocity - 3.0).abs() < 1e-3);

        set_pattern(&mut app, bot, false);
        app.update();

        let pattern = app.world().get::<BotPattern>(bot).unwrap();
        assert_eq!(pattern.step(), 1);
        assert_eq!(pattern.travel_target(), Some(8.0));
        assert!(app.world().get::<LinearVelocity>(bot).unwrap().x.abs() < f32::EPSILON);

        advance_frames(&mut app, 3);
        assert!(app.world().get::<LinearVelocity>(bot).unwrap().x.abs() < f32::EPSILON);

        set_pattern(&mut app, bot, true);
        app.update();
        let pattern = app.world().get::<BotPattern>(bot).unwrap();
        assert_eq!(pattern.step(), 1);
        assert_eq!(pattern.travel_target(), Some(8.0));
        let velocity = app.world().get::<LinearVelocity>(bot).unwrap().x;
        assert!((velocity - 3.0).abs() < 1e-3);
    }

    #[test]
    fn stun_mid_routine_resumes_the_same_step() {
        let mut app = create_bot_test_app();
        app.add_systems(FixedUpdate, integrate_velocity.after(drive_bot_travel));
        let (_, bot) = spawn_bot(&mut app, 3);

        advance_frames(&mut app, 4);
        assert_eq!(app.world().get::<BotPattern>(bot).unwrap().step(), 3);

        // Same window a 0.15 s hit-stun holds the routine for.
        set_pattern(&mut app, bot, false);
        advance_secs(&mut app, 0.15);
        set_pattern(&mut app, bot, true);
        advance_secs(&mut app, 0.15);
        assert_eq!(app.world().get::<BotPattern>(bot).unwrap().step(), 3);

        let mut frames = 0;
        while app.world().get::<BotPattern>(bot).unwrap().step() == 3 && frames < 400 {
            app.update();
            frames += 1;
        }
        let pattern = app.world().get::<BotPattern>(bot).unwrap();
        assert_eq!(pattern.step(), 4);
        // Move(+1) facing left ends one cell towards the player.
        let x = app.world().get::<Transform>(bot).unwrap().translation.x;
        assert!((x - 5.0).abs() <= pattern.pattern.stop_tolerance, "bot ended at {x}");
    }

    #[test]
    fn move_lands_on_target_at_144_hz() {
        let mut app = create_bot_test_app();
        app.add_systems(FixedUpdate, integrate_velocity.after(drive_bot_travel));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_nanos(
            6_944_444,
        )));
        let (_, bot) = spawn_bot(&mut app, 1);

        let mut frames = 0;
        while app.world().get::<BotPattern>(bot).unwrap().step() == 1 && frames < 600 {
            app.update();
            frames += 1;
        }

        assert_eq!(app.world().get::<BotPattern>(bot).unwrap().step(), 2);
        let x = app.world().get::<Transform>(bot).unwrap().translation.x;
        assert!((x - 8.0).abs() < 1e-3, "bot ended at {x}");
    }

    #[test]
    fn homing_cast_spawns_missile_aimed_at_target() {
        let mut app = create_bot_test_app();
        let (player, _) = spawn_bot(&mut app, 2);

        advance_secs(&mut app, 0.3);

        let mut missiles = app.world_mut().query::<(&HomingMissile, &Team)>();
        let (missile, team) = missiles.single(app.world()).unwrap();
        assert_eq!(missile.target, Some(player));
        assert_eq!(*team, Team::Bot);
    }
}
