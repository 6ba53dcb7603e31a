//! Drift detection: determinism verification and run comparison.

use org_turnover_engine::{SimulationConfig, WeeklyResult};
use tracing::{error, info};

use crate::error::{Result, RuntimeError};
use crate::replay;

/// Run `config` twice and require identical result hashes.
///
/// Returns the shared hash.
pub fn verify_determinism(config: &SimulationConfig) -> Result<String> {
    let first = replay::rebuild_hash(config)?;
    let second = replay::rebuild_hash(config)?;

    if first != second {
        error!(first = %first, second = %second, "runs diverged");
        return Err(RuntimeError::Determinism { first, second });
    }
    info!(hash = %first, "determinism verified");
    Ok(first)
}

/// Structured comparison of two result sequences.
///
/// Only the common prefix of weeks is compared. Deltas are `b - a`.
pub fn compare_runs(a: &[WeeklyResult], b: &[WeeklyResult]) -> DriftReport {
    let weeks_compared = a.len().min(b.len());
    let (a, b) = (&a[..weeks_compared], &b[..weeks_compared]);

    let final_raw_work_a = a.last().map(|r| r.raw_work).unwrap_or(0.0);
    let final_raw_work_b = b.last().map(|r| r.raw_work).unwrap_or(0.0);
    let mean_normalized_work_a = mean_normalized(a);
    let mean_normalized_work_b = mean_normalized(b);

    let mut max_abs_normalized_delta: f64 = 0.0;
    let mut first_divergent_week = None;
    for (ra, rb) in a.iter().zip(b) {
        let delta = (rb.normalized_work - ra.normalized_work).abs();
        if delta > max_abs_normalized_delta {
            max_abs_normalized_delta = delta;
        }
        let same = ra.raw_work.to_bits() == rb.raw_work.to_bits()
            && ra.normalized_work.to_bits() == rb.normalized_work.to_bits();
        if first_divergent_week.is_none() && !same {
            first_divergent_week = Some(ra.week);
        }
    }

    DriftReport {
        weeks_compared,
        final_raw_work_a,
        final_raw_work_b,
        final_raw_work_delta: final_raw_work_b - final_raw_work_a,
        mean_normalized_work_a,
        mean_normalized_work_b,
        mean_normalized_work_delta: mean_normalized_work_b - mean_normalized_work_a,
        max_abs_normalized_delta,
        first_divergent_week,
    }
}

fn mean_normalized(results: &[WeeklyResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.normalized_work).sum::<f64>() / results.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    pub weeks_compared: usize,
    pub final_raw_work_a: f64,
    pub final_raw_work_b: f64,
    pub final_raw_work_delta: f64,
    pub mean_normalized_work_a: f64,
    pub mean_normalized_work_b: f64,
    pub mean_normalized_work_delta: f64,
    pub max_abs_normalized_delta: f64,
    /// First week whose results differ bit-for-bit.
    pub first_divergent_week: Option<u32>,
}

impl DriftReport {
    pub fn is_identical(&self) -> bool {
        self.first_divergent_week.is_none()
    }
}
