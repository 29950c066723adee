//! Turn controller: one environment step per call.
//!
//! The controller owns a simulation, seats the agent on one side and the
//! [`Opponent`] on the other, and turns every agent action into one *step*:
//! up to two *phases* (one per side), each made of a world tick, an action
//! application and a hit check.
//!
//! # Step sequence
//!
//! With [`TurnOrder::AgentFirst`]:
//!
//! ```text
//! tick -> agent action -> hit?  --yes--> terminal (agent phase)
//!                          | no
//!                    shaping reward, advance turn
//!                          |
//! tick -> opponent action -> hit? --yes--> terminal (opponent phase)
//!                          |
//!                    advance turn
//! ```
//!
//! With [`TurnOrder::OpponentFirst`] the two phases swap places; the agent's
//! phase is skipped if the opponent's phase already ended the episode.
//!
//! # Conventions
//!
//! - [`Convention::Simple`]: the agent always holds seat 0. When the step
//!   counter exceeds the cap, the step is processed normally and then marked
//!   terminal with its reward unchanged.
//! - [`Convention::Asymmetric`]: the agent's seat is drawn with a fair coin at
//!   every reset. A step whose counter exceeds the cap applies no action and
//!   is terminal with the timeout reward.
//!
//! Observations returned by [`TurnController::reset`] and
//! [`TurnController::step`] are always built for the agent's seat.

use std::collections::BTreeMap;

use airsoft_engine::{ACTOR_COUNT, HitSet, Simulation};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::{
    action::{ActionError, ActionVector, decode_and_apply},
    config::{Convention, EnvConfig},
    observation::{Observation, ObservationLayout, encode},
    policy::{Opponent, random_action},
    reward::{Phase, RewardShaper},
};

/// Which side moves first within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TurnOrder {
    /// The agent holds seat 0.
    AgentFirst,
    /// The agent holds seat 1; the opponent acts before it every step.
    OpponentFirst,
}

impl TurnOrder {
    #[must_use]
    pub const fn agent_seat(self) -> usize {
        match self {
            Self::AgentFirst => 0,
            Self::OpponentFirst => 1,
        }
    }

    #[must_use]
    pub const fn opponent_seat(self) -> usize {
        (self.agent_seat() + 1) % ACTOR_COUNT
    }
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum Termination {
    #[display("opponent hit")]
    OpponentHit,
    #[display("agent hit")]
    AgentHit,
    #[display("timeout")]
    Timeout,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StepError {
    #[display("episode has finished; reset before stepping again")]
    EpisodeFinished,
    #[display("invalid action: {_0}")]
    InvalidAction(ActionError),
}

/// Result of one step.
#[derive(Debug, Clone)]
pub struct Step {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    /// Always `false`; time limits are reported through `terminated`.
    pub truncated: bool,
    pub info: BTreeMap<String, String>,
    /// Set when `terminated` is.
    pub termination: Option<Termination>,
}

/// Drives episodes of a two-seat simulation for a learning agent.
///
/// # Example
///
/// ```
/// use airsoft_env::{
///     action::ActionVector,
///     config::EnvConfig,
///     controller::TurnController,
/// };
///
/// let config = EnvConfig::default();
/// let mut controller = TurnController::new(config.build_arena(), &config);
///
/// let (observation, _info) = controller.reset();
/// assert_eq!(observation.len(), 386);
///
/// let step = controller.step_action(&ActionVector::IDLE).unwrap();
/// assert_eq!(controller.iterations(), 1);
/// assert!(!step.truncated);
/// ```
#[derive(Debug)]
pub struct TurnController<S> {
    initial: S,
    sim: S,
    convention: Convention,
    iteration_cap: usize,
    shaper: RewardShaper,
    opponent: Opponent,
    rng: Pcg32,
    order: TurnOrder,
    iterations: usize,
    finished: bool,
}

impl<S> TurnController<S>
where
    S: Simulation + Clone,
{
    /// Creates a controller around `sim`, which is kept as the pristine state
    /// every episode starts from.
    ///
    /// The controller starts with a random opponent and is ready to step; call
    /// [`reset`](Self::reset) to draw the seat and get the first observation.
    #[must_use]
    pub fn new(sim: S, config: &EnvConfig) -> Self {
        Self {
            sim: sim.clone(),
            initial: sim,
            convention: config.convention,
            iteration_cap: config.iteration_cap,
            shaper: RewardShaper::for_convention(config.rewards.clone(), config.convention),
            opponent: Opponent::Random,
            rng: Pcg32::seed_from_u64(config.seed),
            order: TurnOrder::AgentFirst,
            iterations: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn simulation(&self) -> &S {
        &self.sim
    }

    #[must_use]
    pub fn convention(&self) -> Convention {
        self.convention
    }

    #[must_use]
    pub fn layout(&self) -> ObservationLayout {
        self.convention.layout()
    }

    #[must_use]
    pub fn order(&self) -> TurnOrder {
        self.order
    }

    #[must_use]
    pub fn agent_seat(&self) -> usize {
        self.order.agent_seat()
    }

    /// Steps taken since the last reset.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    /// Replaces the opponent; takes effect from the next phase it plays.
    pub fn set_opponent(&mut self, opponent: Opponent) {
        self.opponent = opponent;
    }

    /// Starts a new episode from the pristine simulation state.
    ///
    /// Under [`Convention::Asymmetric`] the agent's seat is drawn with a
    /// fair coin.
    pub fn reset(&mut self) -> (Observation, BTreeMap<String, String>) {
        let order = match self.convention {
            Convention::Simple => TurnOrder::AgentFirst,
            Convention::Asymmetric if self.rng.random_bool(0.5) => TurnOrder::AgentFirst,
            Convention::Asymmetric => TurnOrder::OpponentFirst,
        };
        self.reset_with_order(order)
    }

    /// Starts a new episode with a fixed seat.
    ///
    /// [`Convention::Simple`] always seats the agent first and ignores
    /// `order`.
    pub fn reset_with_order(
        &mut self,
        order: TurnOrder,
    ) -> (Observation, BTreeMap<String, String>) {
        self.sim = self.initial.clone();
        self.order = if self.convention.is_simple() {
            TurnOrder::AgentFirst
        } else {
            order
        };
        self.iterations = 0;
        self.finished = false;
        tracing::trace!(order = ?self.order, "episode reset");
        (self.observe(self.agent_seat()), BTreeMap::new())
    }

    /// Validates a raw action vector and performs one step with it.
    pub fn step(&mut self, action: &[f32]) -> Result<Step, StepError> {
        let action = ActionVector::try_from(action).map_err(StepError::InvalidAction)?;
        self.step_action(&action)
    }

    /// Performs one step with the agent playing `action`.
    pub fn step_action(&mut self, action: &ActionVector) -> Result<Step, StepError> {
        if self.finished {
            return Err(StepError::EpisodeFinished);
        }
        self.iterations += 1;

        let over_cap = self.iterations > self.iteration_cap;
        if over_cap && self.convention.is_asymmetric() {
            return Ok(self.finish(self.shaper.timeout_reward(), Some(Termination::Timeout)));
        }

        let (reward, mut termination) = match self.order {
            TurnOrder::AgentFirst => self.agent_then_opponent(action),
            TurnOrder::OpponentFirst => self.opponent_then_agent(action),
        };
        if termination.is_none() && over_cap {
            termination = Some(Termination::Timeout);
        }
        Ok(self.finish(reward, termination))
    }

    fn agent_then_opponent(&mut self, action: &ActionVector) -> (f32, Option<Termination>) {
        if let Some(outcome) = self.agent_phase(action) {
            return outcome;
        }
        let shaping = self.shaper.shaping_reward(&self.sim, self.agent_seat());
        match self.opponent_phase() {
            Some((reward, termination)) => (shaping + reward, termination),
            None => (shaping, None),
        }
    }

    fn opponent_then_agent(&mut self, action: &ActionVector) -> (f32, Option<Termination>) {
        if let Some(outcome) = self.opponent_phase() {
            return outcome;
        }
        if let Some(outcome) = self.agent_phase(action) {
            return outcome;
        }
        (self.shaper.shaping_reward(&self.sim, self.agent_seat()), None)
    }

    /// Plays the agent's action. The turn only advances if nobody was hit.
    fn agent_phase(&mut self, action: &ActionVector) -> Option<(f32, Option<Termination>)> {
        debug_assert_eq!(self.sim.turn(), self.agent_seat());
        let hits = self.play_phase(action);
        if hits.is_empty() {
            self.sim.advance_turn();
            return None;
        }
        Some(self.hit_outcome(&hits, Phase::Agent))
    }

    /// Plays the opponent's action. The turn advances even after a hit.
    fn opponent_phase(&mut self) -> Option<(f32, Option<Termination>)> {
        let seat = self.order.opponent_seat();
        debug_assert_eq!(self.sim.turn(), seat);
        let action = match &self.opponent {
            Opponent::Random => random_action(&mut self.rng),
            Opponent::Policy(policy) => policy.predict(&self.observe(seat)),
        };
        let hits = self.play_phase(&action);
        let outcome = (!hits.is_empty()).then(|| self.hit_outcome(&hits, Phase::Opponent));
        self.sim.advance_turn();
        outcome
    }

    fn play_phase(&mut self, action: &ActionVector) -> HitSet {
        self.sim.tick_projectiles();
        self.sim.tick_smoke();
        self.sim.tick_flash();
        decode_and_apply(&mut self.sim, action);
        self.sim.hit_test()
    }

    fn hit_outcome(&self, hits: &HitSet, phase: Phase) -> (f32, Option<Termination>) {
        let agent = self.agent_seat();
        let reward = self.shaper.hit_reward(&self.sim, hits, agent, phase);
        let termination = if hits.contains(&agent) {
            Termination::AgentHit
        } else {
            Termination::OpponentHit
        };
        (reward, Some(termination))
    }

    fn finish(&mut self, reward: f32, termination: Option<Termination>) -> Step {
        if let Some(termination) = termination {
            self.finished = true;
            tracing::debug!(
                iterations = self.iterations,
                agent_seat = self.agent_seat(),
                reward,
                %termination,
                "episode finished"
            );
        }
        Step {
            observation: self.observe(self.agent_seat()),
            reward,
            terminated: termination.is_some(),
            truncated: false,
            info: BTreeMap::new(),
            termination,
        }
    }

    fn observe(&self, seat: usize) -> Observation {
        encode(&self.sim, seat, self.layout())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use airsoft_engine::{Arena, ArenaConfig, ArenaMap};

    use super::*;
    use crate::{
        action::{ACTION_SIZE, field},
        observation::{HEADING_OBSERVATION_SIZE, POSE_OBSERVATION_SIZE},
        policy::Policy,
    };

    /// Plays a fixed action and counts how often it was asked.
    #[derive(Debug)]
    struct Scripted {
        action: ActionVector,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(action: ActionVector) -> Arc<Self> {
            Arc::new(Self {
                action,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Policy for Scripted {
        fn predict(&self, observation: &Observation) -> ActionVector {
            assert!(!observation.is_empty());
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.action
        }
    }

    fn fire() -> ActionVector {
        let mut values = [0.0; ACTION_SIZE];
        values[field::FIRE] = 1.0;
        ActionVector::try_from(values).unwrap()
    }

    // actor 0 at (1, 1) facing actor 1 at (1.5, 1): any shot lands at once
    fn point_blank(convention: Convention) -> TurnController<Arena> {
        let map: ArenaMap = "#####\n#01.#\n#####".parse().unwrap();
        let config = EnvConfig {
            convention,
            arena: ArenaConfig {
                spawn_rotations: [90.0, 270.0],
                ..ArenaConfig::default()
            },
            ..EnvConfig::default()
        };
        let mut arena = Arena::new(map, config.arena.clone());
        arena.place_actor(1, 1.5, 1.0, 270.0);
        TurnController::new(arena, &config)
    }

    // actors far apart with walls in between
    fn separated(convention: Convention, iteration_cap: usize) -> TurnController<Arena> {
        separated_with(convention, iteration_cap, ArenaConfig::default())
    }

    fn separated_with(
        convention: Convention,
        iteration_cap: usize,
        arena: ArenaConfig,
    ) -> TurnController<Arena> {
        let map: ArenaMap = "#######\n#0#.#1#\n#######".parse().unwrap();
        let config = EnvConfig {
            convention,
            iteration_cap,
            arena,
            ..EnvConfig::default()
        };
        let mut controller = TurnController::new(Arena::new(map, config.arena.clone()), &config);
        controller.set_opponent(Opponent::Policy(Scripted::new(ActionVector::IDLE)));
        controller
    }

    #[test]
    fn test_agent_shot_ends_step_before_opponent_acts() {
        let mut controller = point_blank(Convention::Simple);
        let opponent = Scripted::new(fire());
        controller.set_opponent(Opponent::Policy(opponent.clone()));
        controller.reset();

        let step = controller.step_action(&fire()).unwrap();
        assert!(step.terminated);
        assert!(!step.truncated);
        assert!(step.info.is_empty());
        assert_eq!(step.termination, Some(Termination::OpponentHit));
        assert!((step.reward - 100.0).abs() < 1e-6);
        assert_eq!(opponent.calls.load(Ordering::SeqCst), 0, "opponent never acted");
        assert_eq!(controller.simulation().turn(), 0, "turn does not advance on a hit");
    }

    #[test]
    fn test_opponent_hit_is_penalized() {
        let mut controller = point_blank(Convention::Simple);
        controller.set_opponent(Opponent::Policy(Scripted::new(fire())));
        controller.reset();

        let step = controller.step_action(&ActionVector::IDLE).unwrap();
        assert_eq!(step.termination, Some(Termination::AgentHit));
        assert!((step.reward + 100.0).abs() < 1e-6);
        assert_eq!(
            controller.simulation().turn(),
            0,
            "turn advances after the opponent phase"
        );
    }

    #[test]
    fn test_opponent_first_flips_reward_sign() {
        let mut controller = point_blank(Convention::Asymmetric);
        controller.set_opponent(Opponent::Policy(Scripted::new(fire())));
        let (observation, _) = controller.reset_with_order(TurnOrder::OpponentFirst);
        assert_eq!(observation.len(), POSE_OBSERVATION_SIZE);
        assert_eq!(controller.agent_seat(), 1);

        // the opponent (seat 0) shoots the agent (seat 1) before it can act
        let step = controller.step_action(&fire()).unwrap();
        assert_eq!(step.termination, Some(Termination::AgentHit));
        assert!((step.reward + 100.0).abs() < 1e-6);
        assert_eq!(controller.simulation().actors()[1].ammo(), 30, "agent never acted");
    }

    #[test]
    fn test_agent_in_second_seat_scores_positive() {
        let mut controller = point_blank(Convention::Asymmetric);
        controller.set_opponent(Opponent::Policy(Scripted::new(ActionVector::IDLE)));
        controller.reset_with_order(TurnOrder::OpponentFirst);

        let step = controller.step_action(&fire()).unwrap();
        assert_eq!(step.termination, Some(Termination::OpponentHit));
        assert!((step.reward - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_observation_is_for_agent_seat() {
        let mut controller = point_blank(Convention::Asymmetric);
        controller.set_opponent(Opponent::Policy(Scripted::new(ActionVector::IDLE)));
        let (observation, _) = controller.reset_with_order(TurnOrder::OpponentFirst);
        let rays_end = crate::observation::RAY_COUNT * 2;
        // pose layout: x, y of seat 1
        assert_eq!(&observation.as_slice()[rays_end..rays_end + 2], &[1.5, 1.0]);

        let step = controller.step_action(&ActionVector::IDLE).unwrap();
        assert!(!step.terminated);
        assert_eq!(&step.observation.as_slice()[rays_end..rays_end + 2], &[1.5, 1.0]);
        assert_eq!(controller.simulation().turn(), 0, "back to the opponent's seat");
    }

    #[test]
    fn test_stepping_finished_episode_is_an_error() {
        let mut controller = point_blank(Convention::Simple);
        controller.reset();
        controller.step_action(&fire()).unwrap();
        assert!(controller.is_finished());
        assert!(matches!(
            controller.step_action(&ActionVector::IDLE),
            Err(StepError::EpisodeFinished)
        ));

        controller.reset();
        assert!(!controller.is_finished());
        assert_eq!(controller.iterations(), 0);
    }

    #[test]
    fn test_invalid_action_is_rejected() {
        let mut controller = point_blank(Convention::Simple);
        controller.reset();
        assert!(matches!(
            controller.step(&[0.0; 3]),
            Err(StepError::InvalidAction(ActionError::WrongLength { len: 3 }))
        ));
        assert_eq!(controller.iterations(), 0);
    }

    #[test]
    fn test_simple_timeout_after_cap() {
        let mut controller = separated(Convention::Simple, 1000);
        let (observation, _) = controller.reset();
        assert_eq!(observation.len(), HEADING_OBSERVATION_SIZE);

        for i in 1..=1000 {
            let step = controller.step_action(&ActionVector::IDLE).unwrap();
            assert!(!step.terminated, "terminated early at step {i}");
        }
        let step = controller.step_action(&ActionVector::IDLE).unwrap();
        assert!(step.terminated);
        assert_eq!(step.termination, Some(Termination::Timeout));
        assert_eq!(controller.iterations(), 1001);
        assert!(step.reward.abs() < 1e-6, "reward of a simple timeout is not overridden");
    }

    #[test]
    fn test_simple_idle_episode_returns_zero() {
        // aiming at each other through the walls
        let facing = ArenaConfig {
            spawn_rotations: [90.0, 270.0],
            ..ArenaConfig::default()
        };
        let mut controller = separated_with(Convention::Simple, 1000, facing);
        controller.reset();

        let mut total = 0.0;
        let step = loop {
            let step = controller.step_action(&ActionVector::IDLE).unwrap();
            assert!(step.reward.abs() < 1e-6, "step {}", controller.iterations());
            total += step.reward;
            if step.terminated {
                break step;
            }
        };
        assert_eq!(step.termination, Some(Termination::Timeout));
        assert_eq!(controller.iterations(), 1001);
        assert!(total.abs() < 1e-6);
    }

    #[test]
    fn test_asymmetric_idle_step_is_shaped() {
        let facing = ArenaConfig {
            spawn_rotations: [90.0, 270.0],
            ..ArenaConfig::default()
        };
        let mut controller = separated_with(Convention::Asymmetric, 1000, facing);
        controller.reset_with_order(TurnOrder::AgentFirst);
        let step = controller.step_action(&ActionVector::IDLE).unwrap();
        assert!(!step.terminated);
        assert!((step.reward - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_asymmetric_timeout_preempts_step() {
        let mut controller = separated(Convention::Asymmetric, 3);
        controller.reset_with_order(TurnOrder::AgentFirst);
        for _ in 0..3 {
            assert!(!controller.step_action(&ActionVector::IDLE).unwrap().terminated);
        }
        let step = controller.step_action(&fire()).unwrap();
        assert_eq!(step.termination, Some(Termination::Timeout));
        assert!((step.reward + 50.0).abs() < 1e-6);
        assert_eq!(controller.simulation().actors()[0].ammo(), 30, "no action applied");
    }

    #[test]
    fn test_reset_restores_initial_world() {
        let mut controller = separated(Convention::Simple, 1000);
        controller.reset();
        controller.step_action(&fire()).unwrap();
        assert_eq!(controller.simulation().actors()[0].ammo(), 29);
        controller.reset();
        assert_eq!(controller.simulation().actors()[0].ammo(), 30);
        assert!(controller.simulation().projectiles().is_empty());
    }

    #[test]
    fn test_asymmetric_reset_draws_both_seats() {
        let map: ArenaMap = "#######\n#0#.#1#\n#######".parse().unwrap();
        let config = EnvConfig {
            convention: Convention::Asymmetric,
            seed: 11,
            ..EnvConfig::default()
        };
        let mut controller = TurnController::new(Arena::new(map, ArenaConfig::default()), &config);
        let mut seats = [0; 2];
        for _ in 0..200 {
            controller.reset();
            seats[controller.agent_seat()] += 1;
        }
        assert!(seats[0] > 50 && seats[1] > 50, "{seats:?}");
    }

    #[test]
    fn test_random_opponent_acts_with_sampled_actions() {
        let mut controller = separated(Convention::Simple, 1000);
        controller.set_opponent(Opponent::Random);
        controller.reset();
        for _ in 0..20 {
            assert!(!controller.step_action(&ActionVector::IDLE).unwrap().terminated);
        }

        let actors = controller.simulation().actors();
        assert_eq!(actors[0].ammo(), 30, "the idle agent never fired");
        assert!(actors[0].memory().is_empty());
        // fire and remember gates open about half of the time
        assert!(actors[1].ammo() < 30);
        assert!(!actors[1].memory().is_empty());
    }
}
