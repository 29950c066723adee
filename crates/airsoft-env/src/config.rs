use airsoft_engine::{Arena, ArenaConfig, ArenaMap};
use serde::{Deserialize, Serialize};

use crate::{observation::ObservationLayout, reward::RewardConfig};

/// How the agent is seated and observed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
    derive_more::IsVariant,
)]
pub enum Convention {
    /// The agent always holds seat 0 and moves first. Heading observations.
    #[default]
    Simple,
    /// A coin flip at reset decides the agent's seat. Pose observations, and
    /// the iteration cap pre-empts the step with a timeout reward.
    Asymmetric,
}

impl Convention {
    #[must_use]
    pub const fn layout(self) -> ObservationLayout {
        match self {
            Self::Simple => ObservationLayout::Heading,
            Self::Asymmetric => ObservationLayout::Pose,
        }
    }
}

/// Everything needed to build a turn controller.
///
/// ```
/// use airsoft_env::config::{Convention, EnvConfig};
///
/// let config: EnvConfig =
///     serde_json::from_str(r#"{ "convention": "Asymmetric", "rewards": { "aim_bonus": 1.0 } }"#)
///         .unwrap();
/// assert_eq!(config.convention, Convention::Asymmetric);
/// assert_eq!(config.iteration_cap, 1000);
/// assert_eq!(config.rewards.aim_bonus, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    pub convention: Convention,
    /// Steps allowed before an episode times out.
    pub iteration_cap: usize,
    /// Seed of the controller's random stream (seat coin flip, random opponent).
    pub seed: u64,
    pub map: ArenaMap,
    pub arena: ArenaConfig,
    pub rewards: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            convention: Convention::default(),
            iteration_cap: 1000,
            seed: 0,
            map: ArenaMap::default(),
            arena: ArenaConfig::default(),
            rewards: RewardConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Builds a fresh arena from the configured map and physics.
    #[must_use]
    pub fn build_arena(&self) -> Arena {
        Arena::new(self.map.clone(), self.arena.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convention_parses_and_displays() {
        assert_eq!("Asymmetric".parse::<Convention>().unwrap(), Convention::Asymmetric);
        assert_eq!(Convention::Simple.to_string(), "Simple");
        assert_eq!(Convention::Simple.layout(), ObservationLayout::Heading);
        assert_eq!(Convention::Asymmetric.layout(), ObservationLayout::Pose);
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = EnvConfig {
            convention: Convention::Asymmetric,
            seed: 42,
            map: "####\n#01#\n####".parse().unwrap(),
            ..EnvConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EnvConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.build_arena().map().width(), 4);
    }
}
