//! Errors raised by the runtime layer.

use org_turnover_engine::OrgError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] OrgError),

    /// Two runs of the same configuration produced different results.
    #[error("determinism failure: run 1 hashed {first}, run 2 hashed {second}")]
    Determinism { first: String, second: String },

    /// A snapshot is corrupt, from another model version, or fails to
    /// restore into a valid tree.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}
