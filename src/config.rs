//! Solver configuration.
//!
//! Every limit the two search drivers use lives here. The defaults
//! reproduce the classic run: a 240 second A* budget and 50 restarts of
//! 100-iteration hill climbing passes.
//!
//! Configuration files are YAML (JSON is accepted as well since it is a
//! YAML subset); missing keys fall back to the defaults.

use std::path::Path;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::problem::DEFAULT_MAX_TEACHER_LOAD;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolverConfig {
    /// Wall-clock budget of the A* search, in seconds.
    pub time_limit_secs: u64,
    /// Maximum number of intervals a teacher may teach per week.
    pub max_teacher_load: u32,
    /// Number of hill climbing passes before giving up.
    pub max_restarts: usize,
    /// Iteration cap of a single hill climbing pass.
    pub max_iterations: usize,
    /// Distinct neighbors collected per perturbation call.
    pub max_neighbors: usize,
    /// Occupied slots sampled per perturbation call.
    pub max_sampled_slots: usize,
    /// Full rebuilds tried by the constructive initializer.
    pub init_attempts: usize,
    /// Consecutive failed placements before a subject is abandoned.
    pub subject_attempts: usize,
    /// Seed for reproducible local search runs.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 240,
            max_teacher_load: DEFAULT_MAX_TEACHER_LOAD,
            max_restarts: 50,
            max_iterations: 100,
            max_neighbors: 10,
            max_sampled_slots: 60,
            init_attempts: 50,
            subject_attempts: 20,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_neighbors == 0 {
            return Err(ConfigError::Invalid("maxNeighbors must be at least 1".into()));
        }
        if self.init_attempts == 0 {
            return Err(ConfigError::Invalid("initAttempts must be at least 1".into()));
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }

    /// Random source for the local search: seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
