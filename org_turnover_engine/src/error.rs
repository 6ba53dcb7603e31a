//! Error types for engine operations.

use thiserror::Error;

use crate::domain::EmployeeId;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, OrgError>;

/// Errors raised by the turnover engine.
///
/// Absent relations (the root's manager, a worker's team) are never errors;
/// they come back as `None` or an empty set.
#[derive(Debug, Error)]
pub enum OrgError {
    /// A caller passed a value outside an operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A strategy name or code that the agent factory does not know.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The tree invariants no longer hold. The run must abort.
    #[error("structural violation: {0}")]
    StructuralViolation(String),

    /// Configuration value out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl OrgError {
    pub(crate) fn missing(id: EmployeeId) -> Self {
        OrgError::StructuralViolation(format!("employee {} is not part of the organization", id))
    }
}
