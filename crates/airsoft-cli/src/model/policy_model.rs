use airsoft_env::config::Convention;
use airsoft_training::policy::LinearPolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trained policy as saved by `airsoft train`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Convention the policy was trained under; fixes its observation layout.
    pub convention: Convention,
    pub phases: u64,
    pub final_fitness: f32,
    pub policy: LinearPolicy,
}

impl PolicyModel {
    pub fn check_convention(&self, convention: Convention) -> anyhow::Result<()> {
        let expected = convention.layout().size();
        let actual = self.policy.input_size();
        anyhow::ensure!(
            actual == expected,
            "model {} expects {actual} observation values, \
             but the {convention} convention produces {expected}",
            self.name,
        );
        Ok(())
    }
}
