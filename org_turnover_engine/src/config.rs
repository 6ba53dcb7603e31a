//! OrgSim v1 - Run Configuration
//!
//! Values arrive already chosen by the caller (CLI, batch driver, test).
//! `validate` only rejects values the engine cannot run with.

use serde::{Deserialize, Serialize};

use crate::domain::Strategy;
use crate::error::{OrgError, Result};

pub const WEEKS_PER_YEAR: u32 = 52;
pub const SIMULATION_YEARS: u32 = 16;
/// 52 * 16 + 1 weeks.
pub const DEFAULT_HORIZON_WEEKS: u32 = WEEKS_PER_YEAR * SIMULATION_YEARS + 1;
/// Personnel reductions run on weeks divisible by this.
pub const QUARTER_WEEKS: u32 = 13;

/// How the weekly knowledge update reads neighbour values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationMode {
    /// Live top-down update. Later employees may read values already
    /// updated this week.
    #[default]
    Sequential,
    /// All updates read start-of-week values.
    Snapshot,
    /// `Snapshot`, evaluated across employees on the rayon pool.
    ParallelSnapshot,
}

/// Parameters of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    pub branching_factor: u32,
    pub depth: u32,
    pub knowledge_usability_rate: f64,
    pub horizon_weeks: u32,
    pub seed: u64,
    pub strategy: Strategy,
    pub propagation: PropagationMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            branching_factor: 8,
            depth: 5,
            knowledge_usability_rate: 0.75,
            horizon_weeks: DEFAULT_HORIZON_WEEKS,
            seed: 0,
            strategy: Strategy::default(),
            propagation: PropagationMode::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.branching_factor == 0 {
            return Err(OrgError::InvalidConfig(
                "branching_factor must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.knowledge_usability_rate) {
            return Err(OrgError::InvalidConfig(format!(
                "knowledge_usability_rate={} outside [0, 1]",
                self.knowledge_usability_rate
            )));
        }
        if self.horizon_weeks == 0 {
            return Err(OrgError::InvalidConfig(
                "horizon_weeks must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of employees `build_tree` creates for this configuration.
    pub fn tree_size(&self) -> u64 {
        geometric_sum(self.branching_factor as u64, self.depth as u64 + 1)
    }

    /// Divisor for normalised work: `(k^depth - 1) / (k - 1)`, or `depth`
    /// when k = 1. A zero size is reported as 1.
    pub fn theoretical_full_tree_size(&self) -> f64 {
        geometric_sum(self.branching_factor as u64, self.depth as u64).max(1) as f64
    }
}

/// `1 + k + k^2 + ... + k^(terms-1)`, saturating.
fn geometric_sum(k: u64, terms: u64) -> u64 {
    let mut total: u64 = 0;
    let mut power: u64 = 1;
    for _ in 0..terms {
        total = total.saturating_add(power);
        power = power.saturating_mul(k);
    }
    total
}
