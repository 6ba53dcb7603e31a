//! OrgSim v1 - Canonical Hashing
//!
//! Deterministic serialization + SHA-256 of result sequences and trees.
//! Two runs agree byte-for-byte exactly when their hashes agree.
//!
//! Rules:
//!   - model_version first, then the payload
//!   - results in week order, fields in fixed order
//!   - trees serialized with ordered maps (ascending identity)
//!   - compact UTF-8 JSON, shortest round-trip float text

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::WeeklyResult;
use crate::hierarchy::Organization;
use crate::MODEL_VERSION;

/// Canonical bytes of a result sequence.
pub fn canonical_results(results: &[WeeklyResult]) -> Vec<u8> {
    let rows: Vec<Value> = results
        .iter()
        .map(|r| {
            let mut row = Map::new();
            row.insert("week".to_string(), Value::from(r.week));
            row.insert("raw_work".to_string(), Value::from(r.raw_work));
            row.insert("normalized_work".to_string(), Value::from(r.normalized_work));
            Value::Object(row)
        })
        .collect();

    let mut root = Map::new();
    root.insert("model_version".to_string(), Value::from(MODEL_VERSION));
    root.insert("results".to_string(), Value::Array(rows));
    Value::Object(root).to_string().into_bytes()
}

/// SHA-256 of [`canonical_results`], lowercase hex.
pub fn results_hash(results: &[WeeklyResult]) -> String {
    sha256_hex(&canonical_results(results))
}

/// Canonical JSON of an organization tree.
pub fn canonical_organization(org: &Organization) -> crate::Result<String> {
    let mut root = Map::new();
    root.insert("model_version".to_string(), Value::from(MODEL_VERSION));
    root.insert("organization".to_string(), serde_json::to_value(org)?);
    Ok(Value::Object(root).to_string())
}

/// SHA-256 of [`canonical_organization`], lowercase hex.
pub fn organization_hash(org: &Organization) -> crate::Result<String> {
    Ok(sha256_hex(canonical_organization(org)?.as_bytes()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<WeeklyResult> {
        vec![
            WeeklyResult { week: 1, raw_work: 10.5, normalized_work: 1.5 },
            WeeklyResult { week: 2, raw_work: -3.25, normalized_work: -0.5 },
        ]
    }

    #[test]
    fn field_order_is_fixed() {
        let text = String::from_utf8(canonical_results(&results())).unwrap();
        assert_eq!(
            text,
            "{\"model_version\":1,\"results\":[\
             {\"week\":1,\"raw_work\":10.5,\"normalized_work\":1.5},\
             {\"week\":2,\"raw_work\":-3.25,\"normalized_work\":-0.5}]}"
        );
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let a = results_hash(&results());
        assert_eq!(a, results_hash(&results()));
        assert_eq!(a.len(), 64);

        let mut changed = results();
        changed[1].raw_work = -3.2500001;
        assert_ne!(a, results_hash(&changed));
    }

    #[test]
    fn empty_input_hash() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
