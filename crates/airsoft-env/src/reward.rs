//! Reward shaping for the learning agent.
//!
//! Rewards are computed from the agent's point of view; the agent's seat is
//! passed explicitly, so the sign of terminal rewards follows the seat
//! automatically when the agent plays second.
//!
//! # Terminal rewards
//!
//! Exactly one applies to a terminating step:
//!
//! - **Hit**: [`RewardConfig::hit_penalty`] if the agent was struck,
//!   otherwise [`RewardConfig::hit_reward`]. If the hit happened during the
//!   agent's own phase and the agent's magazine is full again,
//!   [`RewardConfig::reload_penalty`] is added.
//! - **Timeout**: [`RewardConfig::timeout_penalty`], regardless of seat.
//!
//! # Shaping
//!
//! Only a shaped [`RewardShaper`] (the [`Convention::Asymmetric`] one) adds
//! the reload penalty above and the terms below. Under
//! [`Convention::Simple`] a step is worth exactly the hit reward, the hit
//! penalty or nothing.
//!
//! Applied once per step, after the agent's own phase did not end the
//! episode. Nothing is credited for the opponent's half of a step.
//!
//! - Suppression: [`RewardConfig::suppression_bonus`] per live projectile
//!   fired by the agent within [`RewardConfig::suppression_radius`] of the
//!   opponent.
//! - Aim: [`RewardConfig::aim_bonus`] if the agent faces the opponent within
//!   [`RewardConfig::aim_tolerance_degrees`]. Line of sight is not required.
//! - Attrition: [`RewardConfig::empty_magazine_penalty`] if the agent has no
//!   ammunition.

use airsoft_engine::{
    ACTOR_COUNT, HitSet, Simulation,
    geometry::{angle_difference, bearing, distance},
};
use serde::{Deserialize, Serialize};

use crate::config::Convention;

/// Reward constants.
///
/// ```
/// use airsoft_env::reward::RewardConfig;
///
/// let config: RewardConfig = serde_json::from_str(r#"{ "timeout_penalty": -10.0 }"#).unwrap();
/// assert_eq!(config.timeout_penalty, -10.0);
/// assert_eq!(config.hit_reward, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub hit_reward: f32,
    pub hit_penalty: f32,
    pub reload_penalty: f32,
    pub timeout_penalty: f32,
    pub suppression_bonus: f32,
    pub suppression_radius: f64,
    pub aim_bonus: f32,
    pub aim_tolerance_degrees: f64,
    pub empty_magazine_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            hit_reward: 100.0,
            hit_penalty: -100.0,
            reload_penalty: -25.0,
            timeout_penalty: -50.0,
            suppression_bonus: 5.0,
            suppression_radius: 1.0,
            aim_bonus: 5.0,
            aim_tolerance_degrees: 5.0,
            empty_magazine_penalty: -5.0,
        }
    }
}

/// Who acted in the part of a step being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Phase {
    Agent,
    Opponent,
}

#[derive(Debug, Clone)]
pub struct RewardShaper {
    config: RewardConfig,
    shaped: bool,
}

impl Default for RewardShaper {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

impl RewardShaper {
    /// A shaper applying every term.
    #[must_use]
    pub fn new(config: RewardConfig) -> Self {
        Self {
            config,
            shaped: true,
        }
    }

    /// A shaper paying terminal hit and timeout rewards only.
    #[must_use]
    pub fn unshaped(config: RewardConfig) -> Self {
        Self {
            config,
            shaped: false,
        }
    }

    #[must_use]
    pub fn for_convention(config: RewardConfig, convention: Convention) -> Self {
        match convention {
            Convention::Simple => Self::unshaped(config),
            Convention::Asymmetric => Self::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    #[must_use]
    pub fn is_shaped(&self) -> bool {
        self.shaped
    }

    /// Terminal reward for a non-empty hit set produced during `phase`.
    #[must_use]
    pub fn hit_reward<S>(&self, sim: &S, hits: &HitSet, agent: usize, phase: Phase) -> f32
    where
        S: Simulation + ?Sized,
    {
        debug_assert!(!hits.is_empty());
        let mut reward = if hits.contains(&agent) {
            self.config.hit_penalty
        } else {
            self.config.hit_reward
        };
        if self.shaped && phase.is_agent() && sim.actors()[agent].ammo() == sim.ammo_total() {
            reward += self.config.reload_penalty;
        }
        reward
    }

    #[must_use]
    pub fn timeout_reward(&self) -> f32 {
        self.config.timeout_penalty
    }

    /// Shaping reward for the agent in the current state; zero when unshaped.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn shaping_reward<S>(&self, sim: &S, agent: usize) -> f32
    where
        S: Simulation + ?Sized,
    {
        if !self.shaped {
            return 0.0;
        }
        let actors = sim.actors();
        let me = &actors[agent];
        let opponent = &actors[(agent + 1) % ACTOR_COUNT];
        let mut reward = 0.0;

        let suppressing = sim
            .projectiles()
            .iter()
            .filter(|p| {
                p.fired_by == agent
                    && distance(p.x, p.y, opponent.x(), opponent.y())
                        <= self.config.suppression_radius
            })
            .count();
        reward += self.config.suppression_bonus * suppressing as f32;

        let towards = bearing(me.x(), me.y(), opponent.x(), opponent.y());
        if angle_difference(me.rotation(), towards) <= self.config.aim_tolerance_degrees {
            reward += self.config.aim_bonus;
        }

        if me.ammo() == 0 {
            reward += self.config.empty_magazine_penalty;
        }
        reward
    }
}
