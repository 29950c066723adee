//! Phase-by-phase self-play training.
//!
//! A phase is one generation: the whole population is evaluated against a
//! single opponent, the best policy joins the [`SelfPlayPool`], the next
//! opponent is drawn from the pool and the population is evolved. The first
//! phase always faces [`Opponent::Random`].

use std::sync::Arc;

use airsoft_env::{config::EnvConfig, controller::StepError, policy::Opponent};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    evaluation::EpisodeEvaluator,
    genetic::{Population, PopulationEvolver},
    policy::LinearPolicy,
    pool::{DEFAULT_LATEST_PROBABILITY, DEFAULT_POOL_CAPACITY, SelfPlayPool},
    stats::DescriptiveStats,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub population_size: usize,
    /// Episodes each individual plays per phase.
    pub episodes_per_individual: usize,
    pub pool_capacity: usize,
    pub latest_probability: f64,
    /// Seeds population initialization, evolution and opponent draws.
    pub seed: u64,
    pub evolver: PopulationEvolver,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            population_size: 16,
            episodes_per_individual: 4,
            pool_capacity: DEFAULT_POOL_CAPACITY,
            latest_probability: DEFAULT_LATEST_PROBABILITY,
            seed: 0,
            evolver: PopulationEvolver::default(),
        }
    }
}

/// Outcome of one training phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    pub phase: u64,
    /// `"random"` or `"pool"`.
    pub opponent: &'static str,
    pub fitness: DescriptiveStats,
    pub best_fitness: f32,
    pub pool_size: usize,
}

#[derive(Debug)]
pub struct SelfPlayTrainer {
    env: EnvConfig,
    config: TrainingConfig,
    rng: Pcg32,
    population: Population,
    pool: SelfPlayPool,
    opponent: Opponent,
    champion: Option<LinearPolicy>,
    phase: u64,
}

impl SelfPlayTrainer {
    /// # Panics
    ///
    /// Panics if the population size or pool capacity is zero.
    #[must_use]
    pub fn new(env: EnvConfig, config: TrainingConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let input_size = env.convention.layout().size();
        let population = Population::random(
            input_size,
            config.population_size,
            &mut rng,
            config.evolver.max_weight,
        );
        let pool = SelfPlayPool::new(config.pool_capacity, config.latest_probability);
        Self {
            env,
            config,
            rng,
            population,
            pool,
            opponent: Opponent::Random,
            champion: None,
            phase: 0,
        }
    }

    #[must_use]
    pub fn env(&self) -> &EnvConfig {
        &self.env
    }

    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> &SelfPlayPool {
        &self.pool
    }

    /// Opponent the next phase will face.
    #[must_use]
    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    /// Best policy of the most recent phase.
    #[must_use]
    pub fn champion(&self) -> Option<&LinearPolicy> {
        self.champion.as_ref()
    }

    #[must_use]
    pub fn phases_completed(&self) -> u64 {
        self.phase
    }

    pub fn run_phase(&mut self) -> Result<PhaseSummary, StepError> {
        // every phase sees fresh seats and random-opponent noise
        let env = EnvConfig {
            seed: self.env.seed.wrapping_add(self.phase),
            ..self.env.clone()
        };
        let evaluator = EpisodeEvaluator::new(
            env,
            self.opponent.clone(),
            self.config.episodes_per_individual,
        );
        self.population.evaluate_fitness(&evaluator)?;

        let fitness = self.population.compute_fitness_stats();
        let best = self.population.best();
        let best_fitness = best.fitness();
        let champion = best.policy().clone();
        self.pool.push(Arc::new(champion.clone()));
        self.champion = Some(champion);

        let summary = PhaseSummary {
            phase: self.phase,
            opponent: if self.opponent.is_random() { "random" } else { "pool" },
            fitness,
            best_fitness,
            pool_size: self.pool.len(),
        };
        tracing::info!(
            phase = summary.phase,
            opponent = summary.opponent,
            best = summary.best_fitness,
            mean = summary.fitness.mean,
            pool = summary.pool_size,
            "phase complete"
        );

        self.opponent = self.pool.select_opponent(&mut self.rng);
        self.population = self.config.evolver.evolve(&self.population, &mut self.rng);
        self.phase += 1;
        Ok(summary)
    }
}
