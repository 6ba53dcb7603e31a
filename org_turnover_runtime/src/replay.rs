//! Replay: rebuild a run from its configuration.
//!
//! A run is a pure function of its configuration, so replaying is just
//! running again on a fresh engine.

use org_turnover_engine::hashing::results_hash;
use org_turnover_engine::{SimulationConfig, SimulationEngine, WeeklyResult};
use tracing::debug;

use crate::error::Result;

/// Run `config` to completion on a fresh engine.
///
/// Returns the weekly results and their canonical hash.
pub fn rebuild_results(config: &SimulationConfig) -> Result<(Vec<WeeklyResult>, String)> {
    let mut engine = SimulationEngine::new(config.clone())?;
    engine.run()?;
    let results = engine.into_results();
    let hash = results_hash(&results);
    debug!(seed = config.seed, weeks = results.len(), hash = %hash, "run rebuilt");
    Ok((results, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(config: &SimulationConfig) -> Result<String> {
    let (_, hash) = rebuild_results(config)?;
    Ok(hash)
}
