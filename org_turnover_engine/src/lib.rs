#![forbid(unsafe_code)]

//! OrgSim v1 - Turnover Engine
//!
//! Weekly simulation of knowledge diffusion, recursive work aggregation
//! and stochastic turnover inside a fixed-branching organization tree.

/// Model version. Bound into every canonical hash and snapshot.
pub const MODEL_VERSION: u32 = 1;

pub mod error;
pub mod random;
pub mod domain;
pub mod config;
pub mod factory;
pub mod policy;
pub mod hierarchy;
pub mod behavior;
pub mod invariants;
pub mod hashing;
pub mod engine;

pub use config::{PropagationMode, SimulationConfig};
pub use domain::{Demographic, Employee, EmployeeId, Strategy, WeeklyResult};
pub use engine::{EngineState, SimulationEngine, TurnoverStats};
pub use error::{OrgError, Result};
pub use hierarchy::Organization;
