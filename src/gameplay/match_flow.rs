//! Match flow: pre-match countdown, the match clock, and the result.
//!
//! The result is decided once by whichever comes first: a combatant's death
//! or the clock running out. Resolving opens the matching result overlay,
//! which freezes virtual time.

use bevy::prelude::*;

use super::Team;
use super::health::{CombatantDied, Health};
use crate::config::ArenaConfig;
use crate::menus::Menu;
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

/// Phase of a match while `GameState::InGame`.
#[derive(SubStates, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[source(GameState = GameState::InGame)]
#[states(scoped_entities)]
pub enum MatchPhase {
    #[default]
    Countdown,
    Fight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MatchResult {
    Win,
    Lose,
    Draw,
}

impl MatchResult {
    #[must_use]
    pub const fn menu(self) -> Menu {
        match self {
            Self::Win => Menu::Victory,
            Self::Lose => Menu::Defeat,
            Self::Draw => Menu::Draw,
        }
    }
}

/// Higher HP wins when time runs out; a tie is a draw.
#[must_use]
pub fn resolve_timeout(player_hp: i32, bot_hp: i32) -> MatchResult {
    match player_hp.cmp(&bot_hp) {
        std::cmp::Ordering::Greater => MatchResult::Win,
        std::cmp::Ordering::Less => MatchResult::Lose,
        std::cmp::Ordering::Equal => MatchResult::Draw,
    }
}

/// Outcome of the current match. Set at most once.
#[derive(Resource, Debug, Default, Reflect)]
#[reflect(Resource)]
pub struct MatchState {
    result: Option<MatchResult>,
}

impl MatchState {
    #[must_use]
    pub const fn result(&self) -> Option<MatchResult> {
        self.result
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// Records `result` unless the match already ended. Returns whether it
    /// was recorded.
    pub const fn resolve(&mut self, result: MatchResult) -> bool {
        if self.result.is_some() {
            return false;
        }
        self.result = Some(result);
        true
    }
}

/// Counts the match down on virtual time.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct MatchTimer {
    pub duration: f32,
    remaining: f32,
}

impl MatchTimer {
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            remaining: duration.max(0.0),
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Returns `true` on the tick the clock reaches zero.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }
}

impl Default for MatchTimer {
    fn default() -> Self {
        Self::new(ArenaConfig::default().match_rules.duration_secs)
    }
}

/// Pre-match countdown on real time.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct PreMatchCountdown(pub Timer);

impl Default for PreMatchCountdown {
    fn default() -> Self {
        Self(Timer::from_seconds(
            ArenaConfig::default().match_rules.countdown_secs,
            TimerMode::Once,
        ))
    }
}

impl PreMatchCountdown {
    /// Whole seconds left, rounded up.
    #[must_use]
    pub fn seconds_left(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let secs = self.0.remaining_secs().ceil() as u32;
        secs
    }
}

fn reset_match(mut commands: Commands, config: Res<ArenaConfig>) {
    let rules = &config.match_rules;
    commands.insert_resource(MatchState::default());
    commands.insert_resource(MatchTimer::new(rules.duration_secs));
    commands.insert_resource(PreMatchCountdown(Timer::from_seconds(
        rules.countdown_secs.max(0.0),
        TimerMode::Once,
    )));
    info!("Match reset: {:.0}s on the clock", rules.duration_secs);
}

fn pause_for_countdown(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn tick_countdown(
    time: Res<Time<Real>>,
    mut countdown: ResMut<PreMatchCountdown>,
    mut next_phase: ResMut<NextState<MatchPhase>>,
) {
    countdown.0.tick(time.delta());
    if countdown.0.is_finished() {
        next_phase.set(MatchPhase::Fight);
    }
}

fn start_fight(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
    info!("Fight!");
}

fn finish_match(state: &mut MatchState, next_menu: &mut NextState<Menu>, result: MatchResult) {
    if state.resolve(result) {
        info!("Match over: {result:?}");
        next_menu.set(result.menu());
    }
}

/// Runs in `GameSet::Death`, after death effects.
fn tick_match_timer(
    time: Res<Time>,
    mut timer: ResMut<MatchTimer>,
    mut state: ResMut<MatchState>,
    mut next_menu: ResMut<NextState<Menu>>,
    combatants: Query<(&Team, &Health)>,
) {
    if state.is_over() || !timer.tick(time.delta_secs()) {
        return;
    }
    // A combatant already gone counts as zero HP.
    let hp_of = |side: Team| {
        combatants
            .iter()
            .find(|(team, _)| **team == side)
            .map_or(0, |(_, health)| health.current())
    };
    let result = resolve_timeout(hp_of(Team::Player), hp_of(Team::Bot));
    finish_match(&mut state, &mut next_menu, result);
}

fn on_combatant_died(
    died: On<CombatantDied>,
    state: Option<ResMut<MatchState>>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    let Some(mut state) = state else {
        return;
    };
    // The other side wins.
    let result = match died.team.opponent() {
        Team::Player => MatchResult::Win,
        Team::Bot => MatchResult::Lose,
    };
    finish_match(&mut state, &mut next_menu, result);
}

pub(super) fn plugin(app: &mut App) {
    app.add_sub_state::<MatchPhase>();
    app.register_type::<MatchState>()
        .register_type::<MatchTimer>()
        .register_type::<PreMatchCountdown>();
    app.init_resource::<MatchState>()
        .init_resource::<MatchTimer>()
        .init_resource::<PreMatchCountdown>();

    app.add_systems(OnEnter(GameState::InGame), reset_match);
    app.add_systems(OnEnter(MatchPhase::Countdown), pause_for_countdown);
    app.add_systems(OnEnter(MatchPhase::Fight), start_fight);
    app.add_systems(
        Update,
        (
            tick_countdown.run_if(in_state(MatchPhase::Countdown).and(in_state(Menu::None))),
            tick_match_timer
                .in_set(GameSet::Death)
                .run_if(gameplay_running),
        ),
    );
    app.add_observer(on_combatant_died);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn timeout_goes_to_higher_hp() {
        assert_eq!(resolve_timeout(50, 30), MatchResult::Win);
        assert_eq!(resolve_timeout(30, 50), MatchResult::Lose);
        assert_eq!(resolve_timeout(40, 40), MatchResult::Draw);
        assert_eq!(resolve_timeout(0, 0), MatchResult::Draw);
    }

    #[test]
    fn only_first_result_is_kept() {
        let mut state = MatchState::default();
        assert!(state.resolve(MatchResult::Lose));
        assert!(!state.resolve(MatchResult::Win));
        assert_eq!(state.result(), Some(MatchResult::Lose));
    }

    #[test]
    fn match_timer_fires_exactly_once() {
        let mut timer = MatchTimer::new(1.0);
        assert!(!timer.tick(0.5));
        assert!(timer.tick(0.6));
        assert!(!timer.tick(0.6));
        assert!(timer.remaining().abs() < f32::EPSILON);
    }
}
