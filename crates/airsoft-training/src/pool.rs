//! Self-play opponent pool.
//!
//! The pool remembers the most recent policies produced by training, oldest
//! first. After every phase the phase's best policy is added, evicting the
//! oldest entry once the pool is full, and the opponent for the next phase is
//! drawn from it:
//!
//! - with probability [`SelfPlayPool::latest_probability`], the most recent
//!   entry;
//! - otherwise, an entry chosen uniformly at random (which may again be the
//!   most recent one).
//!
//! An empty pool yields [`Opponent::Random`].

use std::collections::VecDeque;

use airsoft_env::policy::{Opponent, SharedPolicy};
use rand::Rng;

/// Number of policies kept by default.
pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Default chance of facing the most recent policy.
pub const DEFAULT_LATEST_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SelfPlayPool {
    capacity: usize,
    latest_probability: f64,
    entries: VecDeque<SharedPolicy>,
}

impl Default for SelfPlayPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, DEFAULT_LATEST_PROBABILITY)
    }
}

impl SelfPlayPool {
    /// # Panics
    ///
    /// Panics if `capacity` is zero or `latest_probability` is outside `[0, 1]`.
    #[must_use]
    pub fn new(capacity: usize, latest_probability: f64) -> Self {
        assert!(capacity > 0, "pool capacity must be positive");
        assert!(
            (0.0..=1.0).contains(&latest_probability),
            "latest_probability must be a probability"
        );
        Self {
            capacity,
            latest_probability,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn latest_probability(&self) -> f64 {
        self.latest_probability
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&SharedPolicy> {
        self.entries.back()
    }

    /// Entries from oldest to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &SharedPolicy> + '_ {
        self.entries.iter()
    }

    /// Adds a policy as the most recent entry, returning the evicted oldest
    /// entry if the pool was full.
    pub fn push(&mut self, policy: SharedPolicy) -> Option<SharedPolicy> {
        self.entries.push_back(policy);
        let evicted = if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        assert!(
            self.entries.len() <= self.capacity,
            "self-play pool grew beyond its capacity"
        );
        if evicted.is_some() {
            tracing::debug!(capacity = self.capacity, "evicted oldest policy from pool");
        }
        evicted
    }

    /// Draws the opponent for the next phase.
    pub fn select_opponent<R>(&self, rng: &mut R) -> Opponent
    where
        R: Rng + ?Sized,
    {
        let Some(latest) = self.entries.back() else {
            return Opponent::Random;
        };
        let chosen = if rng.random_bool(self.latest_probability) {
            latest
        } else {
            &self.entries[rng.random_range(0..self.entries.len())]
        };
        Opponent::Policy(chosen.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airsoft_engine::{Arena, Simulation};
    use airsoft_env::{
        action::ActionVector, config::EnvConfig, controller::TurnController,
        observation::Observation, policy::Policy,
    };
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;

    #[derive(Debug)]
    struct Idle;

    impl Policy for Idle {
        fn predict(&self, _observation: &Observation) -> ActionVector {
            ActionVector::IDLE
        }
    }

    fn filled(pool: &mut SelfPlayPool, count: usize) -> Vec<SharedPolicy> {
        let handles: Vec<SharedPolicy> = (0..count)
            .map(|_| Arc::new(Idle) as SharedPolicy)
            .collect();
        for handle in &handles {
            pool.push(handle.clone());
        }
        handles
    }

    fn index_of(handles: &[SharedPolicy], opponent: &Opponent) -> usize {
        let Opponent::Policy(policy) = opponent else {
            panic!("expected a policy opponent");
        };
        handles.iter().position(|h| Arc::ptr_eq(h, policy)).unwrap()
    }

    #[test]
    fn test_empty_pool_yields_random() {
        let pool = SelfPlayPool::default();
        let mut rng = Pcg32::seed_from_u64(0);
        assert!(pool.select_opponent(&mut rng).is_random());
    }

    #[test]
    fn test_empty_pool_opponent_plays_sampled_actions() {
        let mut rng = Pcg32::seed_from_u64(3);
        let opponent = SelfPlayPool::default().select_opponent(&mut rng);

        // both actors boxed in by walls
        let config = EnvConfig {
            map: "#######\n#0#.#1#\n#######".parse().unwrap(),
            ..EnvConfig::default()
        };
        let arena = Arena::new(config.map.clone(), config.arena.clone());
        let mut controller = TurnController::new(arena, &config);
        controller.set_opponent(opponent);
        controller.reset();
        for _ in 0..20 {
            let step = controller.step_action(&ActionVector::IDLE).unwrap();
            assert!(!step.terminated);
        }

        let actors = controller.simulation().actors();
        assert_eq!(actors[0].ammo(), 30);
        assert!(actors[1].ammo() < 30);
    }

    #[test]
    fn test_push_evicts_oldest_at_capacity() {
        let mut pool = SelfPlayPool::default();
        let handles = filled(&mut pool, DEFAULT_POOL_CAPACITY);
        assert_eq!(pool.len(), DEFAULT_POOL_CAPACITY);

        let newest: SharedPolicy = Arc::new(Idle);
        let evicted = pool.push(newest.clone()).unwrap();
        assert!(Arc::ptr_eq(&evicted, &handles[0]));
        assert_eq!(pool.len(), DEFAULT_POOL_CAPACITY);
        assert!(Arc::ptr_eq(pool.latest().unwrap(), &newest));
        assert!(Arc::ptr_eq(pool.iter().next().unwrap(), &handles[1]));
    }

    #[test]
    fn test_push_below_capacity_never_evicts() {
        let mut pool = SelfPlayPool::new(2, 0.5);
        assert!(pool.push(Arc::new(Idle)).is_none());
        assert!(pool.push(Arc::new(Idle)).is_none());
        assert!(pool.push(Arc::new(Idle)).is_some());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_selection_favors_latest() {
        let mut pool = SelfPlayPool::default();
        let handles = filled(&mut pool, 4);
        let mut rng = Pcg32::seed_from_u64(5);
        let mut counts = [0; 4];
        for _ in 0..4000 {
            counts[index_of(&handles, &pool.select_opponent(&mut rng))] += 1;
        }
        // latest: 0.5 + 0.5 / 4 = 0.625, others: 0.125 each
        assert!((2300..2700).contains(&counts[3]), "{counts:?}");
        for count in &counts[..3] {
            assert!((350..650).contains(count), "{counts:?}");
        }
    }

    #[test]
    fn test_probability_one_always_picks_latest() {
        let mut pool = SelfPlayPool::new(3, 1.0);
        let handles = filled(&mut pool, 3);
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(index_of(&handles, &pool.select_opponent(&mut rng)), 2);
        }
    }
}
