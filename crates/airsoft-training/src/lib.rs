//! Self-play training for airsoft agents using genetic algorithms.
//!
//! This crate evolves [`LinearPolicy`](policy::LinearPolicy) weights against
//! opponents drawn from a [`SelfPlayPool`](pool::SelfPlayPool) of earlier
//! champions.
//!
//! # How Training Works
//!
//! 1. **Population** - Create a population of individuals (each a random linear policy)
//! 2. **Evaluation** - Each individual plays several episodes against the phase opponent
//! 3. **Fitness** - Mean undiscounted episode return
//! 4. **Pool** - The phase champion joins the self-play pool
//! 5. **Reproduction** - Create next generation through crossover and mutation
//! 6. **Repeat** - The next phase faces an opponent drawn from the pool
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm (genetic)
//!     ↓ evolves
//! Linear Policies (policy, weights)
//!     ↓ played by
//! Episode Evaluator (evaluation) ── Turn Controller (airsoft-env)
//!     ↓ produces
//! Fitness Score
//!     ↓ champion pushed into
//! Self-Play Pool (pool)
//!     ↓ supplies
//! Next Phase Opponent (selfplay)
//! ```

pub mod evaluation;
pub mod genetic;
pub mod policy;
pub mod pool;
pub mod selfplay;
pub mod stats;
pub mod weights;
