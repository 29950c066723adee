//! Genetic algorithm evolving linear policies.
//!
//! Each individual is a [`LinearPolicy`]; its fitness is the mean episode
//! return it achieves against the current phase's opponent.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - Every individual plays the same series of
//!    episodes; individuals are then sorted best first
//! 2. **Elite Selection** - The top individuals survive unchanged
//! 3. **Tournament Selection** - Parents are the fittest of small random
//!    groups
//! 4. **Crossover (BLX-α)** - Two parents blend into one child
//! 5. **Mutation** - Gaussian noise on a fraction of the child's weights
//!
//! Weights stay within `[-max_weight, max_weight]` throughout (see
//! [`weights`](crate::weights)).
//!
//! # Parallelization
//!
//! Fitness evaluation runs one scoped thread per individual. Each thread
//! builds its own turn controller; only the evaluator (configuration and
//! opponent handle) is shared.
//!
//! # Example
//!
//! ```
//! use airsoft_env::{config::EnvConfig, policy::Opponent};
//! use airsoft_training::{
//!     evaluation::EpisodeEvaluator,
//!     genetic::{Population, PopulationEvolver},
//! };
//! use rand::SeedableRng;
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
//! let env = EnvConfig {
//!     iteration_cap: 3,
//!     ..EnvConfig::default()
//! };
//! let input_size = env.convention.layout().size();
//!
//! let mut population = Population::random(input_size, 4, &mut rng, 1.0);
//! let evaluator = EpisodeEvaluator::new(env, Opponent::Random, 1);
//! population.evaluate_fitness(&evaluator).unwrap();
//!
//! let population = PopulationEvolver::default().evolve(&population, &mut rng);
//! assert_eq!(population.individuals().len(), 4);
//! ```
//!
//! # Current Limitations
//!
//! - **Noisy fitness**: A handful of episodes against a partly random
//!   opponent gives a high-variance estimate; elites may survive on luck
//! - **Linear policies only**: No hidden layers, so the policy cannot combine
//!   ray features non-linearly

use std::{panic, thread};

use airsoft_env::controller::StepError;
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{evaluation::EpisodeEvaluator, policy::LinearPolicy, stats::DescriptiveStats, weights};

/// A candidate policy and its fitness.
#[derive(Debug, Clone)]
pub struct Individual {
    policy: LinearPolicy,
    fitness: f32,
}

impl Individual {
    /// Creates an individual with weights uniform in `[-max_weight, max_weight]`.
    pub fn random<R>(rng: &mut R, max_weight: f32, input_size: usize) -> Self
    where
        R: Rng + ?Sized,
    {
        let weights = weights::random(
            rng,
            max_weight,
            LinearPolicy::parameter_count(input_size),
        );
        Self {
            policy: LinearPolicy::with_weights(input_size, weights),
            fitness: f32::MIN,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &LinearPolicy {
        &self.policy
    }

    /// Mean episode return from the last evaluation; `f32::MIN` if never
    /// evaluated.
    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    input_size: usize,
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` random individuals for observations of `input_size`.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    #[must_use]
    pub fn random<R>(input_size: usize, count: usize, rng: &mut R, max_weight: f32) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(count > 0, "population must not be empty");
        let individuals = (0..count)
            .map(|_| Individual::random(rng, max_weight, input_size))
            .collect();
        Self {
            input_size,
            individuals,
        }
    }

    #[must_use]
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// The fittest individual; only meaningful after [`evaluate_fitness`](Self::evaluate_fitness).
    #[must_use]
    pub fn best(&self) -> &Individual {
        &self.individuals[0]
    }

    /// Evaluates every individual in parallel and sorts them best first.
    pub fn evaluate_fitness(&mut self, evaluator: &EpisodeEvaluator) -> Result<(), StepError> {
        let results: Vec<Result<(), StepError>> = thread::scope(|s| {
            let handles = self
                .individuals
                .iter_mut()
                .map(|ind| {
                    s.spawn(move || -> Result<(), StepError> {
                        ind.fitness = evaluator.fitness(&ind.policy)?;
                        Ok(())
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect()
        });
        results.into_iter().collect::<Result<(), _>>()?;

        // sort by fitness descending
        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        Ok(())
    }

    #[must_use]
    pub fn compute_fitness_stats(&self) -> DescriptiveStats {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
            .expect("population is never empty")
    }
}

/// Evolution parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationEvolver {
    /// Number of top individuals preserved unchanged (elitism)
    pub elite_count: usize,
    /// Weights are clamped to `[-max_weight, max_weight]`
    pub max_weight: f32,
    /// Tournament size for selection (larger = stronger selection pressure)
    pub tournament_size: usize,
    /// Standard deviation for Gaussian mutation noise
    pub mutation_sigma: f32,
    /// BLX-α crossover parameter (controls exploration beyond parent range)
    pub blx_alpha: f32,
    /// Probability of mutating each weight
    pub mutation_rate: f32,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_count: 2,
            max_weight: 1.0,
            tournament_size: 3,
            mutation_sigma: 0.2,
            blx_alpha: 0.5,
            mutation_rate: 0.05,
        }
    }
}

impl PopulationEvolver {
    /// Builds the next generation, the same size as `population`.
    ///
    /// `population` must be sorted best first, as left by
    /// [`Population::evaluate_fitness`].
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let individuals = &population.individuals;
        assert!(individuals.is_sorted_by(|a, b| a.fitness >= b.fitness));

        let elite_count = self.elite_count.min(individuals.len());
        let mut next_individuals = individuals[..elite_count].to_vec();

        while next_individuals.len() < individuals.len() {
            let p1 = tournament_select(individuals, self.tournament_size, rng);
            let p2 = tournament_select(individuals, self.tournament_size, rng);

            let mut child = weights::blx_alpha(
                p1.policy.weights(),
                p2.policy.weights(),
                self.blx_alpha,
                self.max_weight,
                rng,
            );
            weights::mutate(
                &mut child,
                self.mutation_sigma,
                self.max_weight,
                self.mutation_rate,
                rng,
            );

            next_individuals.push(Individual {
                policy: LinearPolicy::with_weights(population.input_size, child),
                fitness: f32::MIN,
            });
        }

        Population {
            input_size: population.input_size,
            individuals: next_individuals,
        }
    }
}

/// Returns the fittest of `tournament_size` distinct random individuals.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0);
    population
        .choose_multiple(rng, tournament_size)
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .expect("population is never empty")
}
