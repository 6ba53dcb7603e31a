#![forbid(unsafe_code)]

//! OrgSim v1 - Runtime
//!
//! Wraps the turnover engine with replay, drift detection, in-memory
//! snapshots and stepwise sessions.
//!
//! No model logic lives here. Every week is simulated by the engine.

pub mod error;
pub mod replay;
pub mod drift;
pub mod snapshot;
pub mod session;

pub use error::{Result, RuntimeError};
