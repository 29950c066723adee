//! Playing whole episodes between a policy and an opponent.

use airsoft_env::{
    config::EnvConfig,
    controller::{StepError, Termination, TurnController},
    policy::{Opponent, Policy},
};
use serde::{Deserialize, Serialize};

use crate::stats::DescriptiveStats;

/// Returns and outcomes of a series of episodes, from the agent's viewpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Undiscounted return of each episode, in play order.
    pub returns: Vec<f32>,
    pub wins: usize,
    pub losses: usize,
    pub timeouts: usize,
}

impl MatchRecord {
    #[must_use]
    pub fn episodes(&self) -> usize {
        self.returns.len()
    }

    /// Mean episode return; zero when no episode was played.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean_return(&self) -> f32 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f32>() / self.returns.len() as f32
    }

    #[must_use]
    pub fn return_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.returns.iter().copied())
    }

    fn record(&mut self, total: f32, termination: Option<Termination>) {
        self.returns.push(total);
        match termination {
            Some(Termination::OpponentHit) => self.wins += 1,
            Some(Termination::AgentHit) => self.losses += 1,
            Some(Termination::Timeout) | None => self.timeouts += 1,
        }
    }
}

/// Plays a fixed number of episodes against a fixed opponent.
///
/// Every call starts from the same seed, so all policies evaluated by one
/// evaluator face the same seats and the same random opponent stream as long
/// as they act identically.
#[derive(Debug, Clone)]
pub struct EpisodeEvaluator {
    config: EnvConfig,
    opponent: Opponent,
    episodes: usize,
}

impl EpisodeEvaluator {
    #[must_use]
    pub fn new(config: EnvConfig, opponent: Opponent, episodes: usize) -> Self {
        Self {
            config,
            opponent,
            episodes,
        }
    }

    #[must_use]
    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    #[must_use]
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    pub fn play<P>(&self, agent: &P) -> Result<MatchRecord, StepError>
    where
        P: Policy + ?Sized,
    {
        let mut controller = TurnController::new(self.config.build_arena(), &self.config);
        controller.set_opponent(self.opponent.clone());

        let mut record = MatchRecord::default();
        for _ in 0..self.episodes {
            let (mut observation, _info) = controller.reset();
            let mut total = 0.0;
            loop {
                let step = controller.step_action(&agent.predict(&observation))?;
                total += step.reward;
                if step.terminated {
                    record.record(total, step.termination);
                    break;
                }
                observation = step.observation;
            }
        }
        Ok(record)
    }

    /// Mean episode return of `agent`.
    pub fn fitness<P>(&self, agent: &P) -> Result<f32, StepError>
    where
        P: Policy + ?Sized,
    {
        Ok(self.play(agent)?.mean_return())
    }
}
