//! OrgSim v1 - Core Domain Types
//!
//! Pure data. Relations between employees live in the hierarchy store,
//! never on the employee record itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrgError;

// ── Identity ───────────────────────────────────────────────────────

/// Stable employee identity. Assigned once at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub u64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── Demographics ───────────────────────────────────────────────────

/// Demographic code. Selects the self-promotion range of a new hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demographic {
    NonQuota,
    Quota,
}

/// Demographic-assignment policy applied to manager-role hires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fair coin, no quota.
    #[default]
    NoQuota,
    /// Managers always carry the non-quota code.
    NoQuotaManagers,
    /// Quota code with probability 0.5.
    HalfQuotaManagers,
    /// Quota code with probability 0.75.
    ThreeQuarterQuotaManagers,
    /// Managers always carry the quota code.
    AllQuotaManagers,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::NoQuota,
        Strategy::NoQuotaManagers,
        Strategy::HalfQuotaManagers,
        Strategy::ThreeQuarterQuotaManagers,
        Strategy::AllQuotaManagers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::NoQuota => "no_quota",
            Strategy::NoQuotaManagers => "no_quota_managers",
            Strategy::HalfQuotaManagers => "half_quota_managers",
            Strategy::ThreeQuarterQuotaManagers => "three_quarter_quota_managers",
            Strategy::AllQuotaManagers => "all_quota_managers",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = OrgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| OrgError::UnsupportedConfiguration(format!("unknown strategy {:?}", s)))
    }
}

impl TryFrom<u8> for Strategy {
    type Error = OrgError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Strategy::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| OrgError::UnsupportedConfiguration(format!("unknown strategy code {}", code)))
    }
}

// ── Employee ───────────────────────────────────────────────────────

/// A single employee. Manager status is derived from the hierarchy,
/// and is not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Employee {
    pub id: EmployeeId,
    pub hire_week: u32,
    /// Signed. Negative knowledge marks a destructive contributor.
    pub knowledge: f64,
    pub learning_rate: f64,
    pub self_promotion: f64,
    pub demographic: Demographic,
}

// ── Output ─────────────────────────────────────────────────────────

/// Aggregate output of one simulated week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklyResult {
    pub week: u32,
    /// Real work performed by the root, i.e. the whole organization.
    pub raw_work: f64,
    /// `raw_work` divided by the theoretical full-tree size.
    pub normalized_work: f64,
}
