//! Session manager: a stepwise run that snapshots at an interval.
//!
//! Concurrency: `SharedSession` serializes access with a mutex. Sessions
//! share no state with each other.

use parking_lot::Mutex;
use tracing::debug;

use org_turnover_engine::hashing::{organization_hash, results_hash};
use org_turnover_engine::{EngineState, SimulationConfig, SimulationEngine, WeeklyResult};

use crate::error::Result;
use crate::snapshot::{self, OrgSnapshot};

/// A single simulation advanced on demand.
pub struct Session {
    session_id: String,
    engine: SimulationEngine,
    snapshot_interval: u32,
    snapshots: Vec<OrgSnapshot>,
}

impl Session {
    /// `snapshot_interval` of 0 disables snapshots.
    pub fn new(config: SimulationConfig, session_id: &str, snapshot_interval: u32) -> Result<Self> {
        Ok(Self {
            session_id: session_id.to_string(),
            engine: SimulationEngine::new(config)?,
            snapshot_interval,
            snapshots: Vec::new(),
        })
    }

    /// Simulate one week, snapshotting if the interval is reached.
    /// `None` once the run is complete.
    pub fn step(&mut self) -> Result<Option<WeeklyResult>> {
        let Some(result) = self.engine.step()? else {
            return Ok(None);
        };
        if self.snapshot_interval > 0 && result.week % self.snapshot_interval == 0 {
            let snap = snapshot::capture(&self.engine)?;
            debug!(session = %self.session_id, week = snap.week, hash = %snap.hash, "snapshot taken");
            self.snapshots.push(snap);
        }
        Ok(Some(result))
    }

    /// Step up to `weeks` times. Returns the number of weeks simulated.
    pub fn advance(&mut self, weeks: u32) -> Result<u32> {
        let mut simulated = 0;
        while simulated < weeks && self.step()?.is_some() {
            simulated += 1;
        }
        Ok(simulated)
    }

    /// Step until the horizon and return the canonical results hash.
    pub fn run_to_completion(&mut self) -> Result<String> {
        while self.step()?.is_some() {}
        Ok(results_hash(self.engine.results()))
    }

    pub fn is_complete(&self) -> bool {
        self.engine.state() == EngineState::Completed
    }

    pub fn results(&self) -> &[WeeklyResult] {
        self.engine.results()
    }

    pub fn snapshots(&self) -> &[OrgSnapshot] {
        &self.snapshots
    }

    pub fn latest_snapshot(&self) -> Option<&OrgSnapshot> {
        self.snapshots.last()
    }

    /// Canonical hash of the current tree.
    pub fn current_hash(&self) -> Result<String> {
        Ok(organization_hash(self.engine.organization())?)
    }

    pub fn current_week(&self) -> u32 {
        self.engine.current_week()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn step(&self) -> Result<Option<WeeklyResult>> {
        self.inner.lock().step()
    }

    pub fn advance(&self, weeks: u32) -> Result<u32> {
        self.inner.lock().advance(weeks)
    }

    pub fn current_hash(&self) -> Result<String> {
        self.inner.lock().current_hash()
    }

    pub fn current_week(&self) -> u32 {
        self.inner.lock().current_week()
    }

    pub fn snapshot_count(&self) -> usize {
        self.inner.lock().snapshots().len()
    }

    /// Run `f` with exclusive access to the session.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        f(&mut self.inner.lock())
    }
}
