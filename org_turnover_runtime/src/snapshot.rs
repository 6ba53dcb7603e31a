//! Snapshot layer: in-memory copies of the organization tree.
//!
//! A snapshot holds the canonical JSON of the tree and its SHA-256.
//! Nothing time-dependent goes into the content.

use serde::{Deserialize, Serialize};

use org_turnover_engine::hashing::{canonical_organization, sha256_hex};
use org_turnover_engine::invariants::validate_tree;
use org_turnover_engine::random::RandomSource;
use org_turnover_engine::{Organization, SimulationEngine, MODEL_VERSION};

use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSnapshot {
    /// Last simulated week, 0 before the first step.
    pub week: u32,
    pub model_version: u32,
    /// Canonical JSON of the tree.
    pub state_json: String,
    /// SHA-256 of `state_json`.
    pub hash: String,
}

/// Snapshot the engine's current tree.
pub fn capture<R: RandomSource>(engine: &SimulationEngine<R>) -> Result<OrgSnapshot> {
    let state_json = canonical_organization(engine.organization())?;
    let hash = sha256_hex(state_json.as_bytes());
    Ok(OrgSnapshot {
        week: engine.current_week(),
        model_version: MODEL_VERSION,
        state_json,
        hash,
    })
}

/// True if the stored hash matches the stored JSON.
pub fn verify_snapshot_hash(snap: &OrgSnapshot) -> bool {
    sha256_hex(snap.state_json.as_bytes()) == snap.hash
}

/// Rebuild the tree held by `snap`. The hash, model version and tree
/// invariants must all check out.
pub fn restore_organization(snap: &OrgSnapshot) -> Result<Organization> {
    if snap.model_version != MODEL_VERSION {
        return Err(RuntimeError::Snapshot(format!(
            "model version {} does not match {}",
            snap.model_version, MODEL_VERSION
        )));
    }
    if !verify_snapshot_hash(snap) {
        return Err(RuntimeError::Snapshot(format!(
            "hash mismatch at week {}",
            snap.week
        )));
    }

    let mut document: serde_json::Value = serde_json::from_str(&snap.state_json)
        .map_err(|e| RuntimeError::Snapshot(format!("bad snapshot JSON: {}", e)))?;
    let tree = document
        .get_mut("organization")
        .map(serde_json::Value::take)
        .ok_or_else(|| RuntimeError::Snapshot("snapshot has no organization".to_string()))?;
    let org: Organization = serde_json::from_value(tree)
        .map_err(|e| RuntimeError::Snapshot(format!("bad organization: {}", e)))?;

    validate_tree(&org)?;
    Ok(org)
}

#[cfg(test)]
mod tests {
    use super::*;
    use org_turnover_engine::SimulationConfig;

    fn engine() -> SimulationEngine {
        let config = SimulationConfig {
            branching_factor: 3,
            depth: 2,
            horizon_weeks: 26,
            seed: 4,
            ..Default::default()
        };
        SimulationEngine::new(config).unwrap()
    }

    #[test]
    fn capture_and_restore() {
        let mut engine = engine();
        engine.run().unwrap();
        let snap = capture(&engine).unwrap();
        assert_eq!(snap.week, 26);
        assert!(verify_snapshot_hash(&snap));

        let restored = restore_organization(&snap).unwrap();
        assert_eq!(&restored, engine.organization());
    }

    #[test]
    fn tampered_snapshot_is_rejected() {
        let mut snap = capture(&engine()).unwrap();
        snap.state_json = snap.state_json.replacen("0.75", "0.5", 1);
        assert!(!verify_snapshot_hash(&snap));
        assert!(matches!(
            restore_organization(&snap),
            Err(RuntimeError::Snapshot(_))
        ));
    }

    #[test]
    fn other_model_version_is_rejected() {
        let mut snap = capture(&engine()).unwrap();
        snap.model_version += 1;
        assert!(restore_organization(&snap).is_err());
    }
}
