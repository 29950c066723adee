//! Weight vector operations for the genetic algorithm.
//!
//! Weight vectors are flat parameter vectors of a
//! [`LinearPolicy`](crate::policy::LinearPolicy). Every operation keeps each
//! weight inside the symmetric box `[-max_weight, max_weight]`; policies pass
//! their outputs through `tanh`, so bounded weights are enough to keep the
//! search space bounded without any normalization step.
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws uniform weights
//! - **Crossover**: [`blx_alpha`] implements the BLX-α operator
//! - **Mutation**: [`mutate`] applies Gaussian noise

use rand::Rng;
use rand_distr::Normal;

/// Creates a weight vector by applying a function to each index.
///
/// ```
/// use airsoft_training::weights;
///
/// let weights = weights::from_fn(|i| i as f32 - 1.0, 3);
/// assert_eq!(weights, vec![-1.0, 0.0, 1.0]);
/// ```
pub fn from_fn<F>(f: F, len: usize) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    (0..len).map(f).collect()
}

/// Draws `len` weights uniformly from `[-max_weight, max_weight]`.
pub fn random<R>(rng: &mut R, max_weight: f32, len: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    from_fn(|_| rng.random_range(-max_weight..=max_weight), len)
}

/// BLX-α crossover between two parents.
///
/// For each position, with parents `x1` and `x2` and `d = |x2 - x1|`, the
/// child is sampled uniformly from `[min - α·d, max + α·d]` and clamped to
/// `[-max_weight, max_weight]`. `alpha = 0` keeps children between their
/// parents; larger values explore beyond them.
///
/// # Panics
///
/// Panics if the parents have different lengths.
pub fn blx_alpha<R>(p1: &[f32], p2: &[f32], alpha: f32, max_weight: f32, rng: &mut R) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    assert_eq!(p1.len(), p2.len());
    from_fn(
        |i| {
            let min = f32::min(p1[i], p2[i]);
            let max = f32::max(p1[i], p2[i]);
            let d = max - min;
            rng.random_range((min - alpha * d)..=(max + alpha * d))
                .clamp(-max_weight, max_weight)
        },
        p1.len(),
    )
}

/// Gaussian mutation in place.
///
/// Each weight is perturbed by `N(0, sigma)` with probability `rate`, then
/// clamped to `[-max_weight, max_weight]`.
///
/// # Panics
///
/// Panics if `sigma` is negative or not finite.
pub fn mutate<R>(weights: &mut [f32], sigma: f32, max_weight: f32, rate: f32, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let normal = Normal::new(0.0, sigma).expect("mutation sigma must be finite and non-negative");
    for w in weights {
        if rng.random_bool(rate.into()) {
            *w = (*w + rng.sample(normal)).clamp(-max_weight, max_weight);
        }
    }
}
