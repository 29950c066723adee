//! Opponent behavior.

use std::{array, fmt, sync::Arc};

use rand::Rng;
use rand_distr::StandardNormal;

use crate::{
    action::{ACTION_SIZE, ActionVector},
    observation::Observation,
};

/// Maps an observation to an action.
///
/// Policies are shared between controllers running on different threads, so
/// prediction takes `&self` and implementations must be thread-safe.
pub trait Policy: fmt::Debug + Send + Sync {
    fn predict(&self, observation: &Observation) -> ActionVector;
}

pub type SharedPolicy = Arc<dyn Policy>;

/// The side of a match that is not being trained.
#[derive(Debug, Clone, Default, derive_more::IsVariant)]
pub enum Opponent {
    /// Samples every action field independently from a standard normal
    /// distribution, without looking at the observation.
    #[default]
    Random,
    Policy(SharedPolicy),
}

/// Draws a random action, the fallback when no trained opponent exists.
///
/// Every field, gates included, is standard normal, so each gate is open
/// with probability one half.
pub fn random_action<R>(rng: &mut R) -> ActionVector
where
    R: Rng + ?Sized,
{
    let values: [f32; ACTION_SIZE] = array::from_fn(|_| rng.sample(StandardNormal));
    ActionVector::new_lossy(values)
}
