//! OrgSim v1 - Simulation Engine
//!
//! Weekly orchestrator. Owns the tree, the factory and the policy of a
//! single run and drives them through a fixed phase order:
//!
//!   1. knowledge propagation (top-down)
//!   2. resignations under bad managers
//!   3. replacement resolution (external hire or internal promotion)
//!   4. quarterly personnel reduction, resolved the same way
//!   5. result emission
//!
//! Tree mutations happen only in phases 3 and 4, never while knowledge
//! is being propagated.

use tracing::{debug, info, trace, warn};

use crate::behavior::{
    best_self_promoter, propagate_knowledge, real_work, top_performer, weakest_contributor,
    WorkLedger,
};
use crate::config::{SimulationConfig, QUARTER_WEEKS};
use crate::domain::{EmployeeId, WeeklyResult};
use crate::error::Result;
use crate::factory::EmployeeFactory;
use crate::hierarchy::Organization;
use crate::invariants::validate_tree;
use crate::policy::PromotionPolicy;
use crate::random::{RandomSource, SeededRandom};

/// Salt separating the policy stream from the factory stream of a run.
const POLICY_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Initialized,
    Running { week: u32 },
    Completed,
}

/// Cumulative turnover counters for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnoverStats {
    pub resignations: u64,
    pub reductions: u64,
    pub external_hires: u64,
    pub internal_promotions: u64,
}

/// Why an employee is leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Departure {
    Resignation,
    Reduction,
}

/// A single simulation run.
pub struct SimulationEngine<R = SeededRandom> {
    config: SimulationConfig,
    organization: Organization,
    factory: EmployeeFactory<R>,
    policy: PromotionPolicy<R>,
    state: EngineState,
    full_tree_size: f64,
    results: Vec<WeeklyResult>,
    stats: TurnoverStats,
}

impl SimulationEngine<SeededRandom> {
    /// Seeded engine. Factory and policy draw from separate streams
    /// derived from `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let factory_rng = SeededRandom::new(config.seed);
        let policy_rng = SeededRandom::new(config.seed ^ POLICY_STREAM_SALT);
        Self::with_sources(config, factory_rng, policy_rng)
    }
}

impl<R: RandomSource> SimulationEngine<R> {
    /// Engine over caller-supplied random sources.
    pub fn with_sources(config: SimulationConfig, factory_rng: R, policy_rng: R) -> Result<Self> {
        config.validate()?;
        let mut factory = EmployeeFactory::new(factory_rng, config.strategy);
        let organization = Organization::build_tree(
            config.branching_factor,
            config.depth,
            config.knowledge_usability_rate,
            &mut factory,
        )?;
        let full_tree_size = config.theoretical_full_tree_size();

        info!(
            branching_factor = config.branching_factor,
            depth = config.depth,
            employees = organization.len(),
            strategy = %config.strategy,
            seed = config.seed,
            "organization built"
        );

        Ok(Self {
            results: Vec::with_capacity(config.horizon_weeks as usize),
            config,
            organization,
            factory,
            policy: PromotionPolicy::new(policy_rng),
            state: EngineState::Initialized,
            full_tree_size,
            stats: TurnoverStats::default(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn results(&self) -> &[WeeklyResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<WeeklyResult> {
        self.results
    }

    pub fn stats(&self) -> TurnoverStats {
        self.stats
    }

    /// Last simulated week, 0 before the first step.
    pub fn current_week(&self) -> u32 {
        self.results.last().map(|r| r.week).unwrap_or(0)
    }

    /// Simulate the next week. `None` once the horizon is reached.
    pub fn step(&mut self) -> Result<Option<WeeklyResult>> {
        let week = match self.state {
            EngineState::Completed => return Ok(None),
            EngineState::Initialized => 1,
            EngineState::Running { week } => week + 1,
        };
        self.state = EngineState::Running { week };

        propagate_knowledge(&mut self.organization, week, self.config.propagation);

        let resigning = self.find_resigning_top_performers();
        self.resolve_departures(week, resigning, Departure::Resignation)?;

        if week % QUARTER_WEEKS == 0 {
            let reduced = self.select_reductions();
            self.resolve_departures(week, reduced, Departure::Reduction)?;
        }

        if cfg!(debug_assertions) {
            validate_tree(&self.organization)?;
        }

        let raw_work = real_work(&self.organization, self.organization.root());
        if !raw_work.is_finite() {
            warn!(week, raw_work, "organization output is no longer finite");
        }
        let result = WeeklyResult {
            week,
            raw_work,
            normalized_work: raw_work / self.full_tree_size,
        };
        trace!(week, raw_work, normalized_work = result.normalized_work, "week simulated");
        self.results.push(result);

        if week >= self.config.horizon_weeks {
            self.state = EngineState::Completed;
            info!(
                weeks = week,
                final_raw_work = raw_work,
                resignations = self.stats.resignations,
                reductions = self.stats.reductions,
                external_hires = self.stats.external_hires,
                internal_promotions = self.stats.internal_promotions,
                "simulation completed"
            );
        }
        Ok(Some(result))
    }

    /// Step until completion and return every weekly result.
    pub fn run(&mut self) -> Result<&[WeeklyResult]> {
        while self.step()?.is_some() {}
        Ok(&self.results)
    }

    // ── Phase 2: resignations ──────────────────────────────────────

    /// Under every manager with negative output, the most knowledgeable
    /// report may quit.
    fn find_resigning_top_performers(&mut self) -> Vec<EmployeeId> {
        let ledger = WorkLedger::for_organization(&self.organization);
        let mut resigning = Vec::new();
        for manager in self.organization.managers() {
            if ledger.real_work(manager) >= 0.0 {
                continue;
            }
            if let Some(top) = top_performer(&self.organization, manager) {
                if self.policy.top_performer_resigns() {
                    resigning.push(top);
                }
            }
        }
        resigning
    }

    // ── Phase 4: quarterly reduction ───────────────────────────────

    fn select_reductions(&mut self) -> Vec<EmployeeId> {
        let ledger = WorkLedger::for_organization(&self.organization);
        let mut reduced = Vec::new();
        for manager in self.organization.managers() {
            if !self.policy.should_reduce_personnel() {
                continue;
            }
            let target = if self.policy.should_reduce_self_promoter() {
                best_self_promoter(&self.organization, &ledger, manager)
            } else {
                weakest_contributor(&self.organization, &ledger, manager)
            };
            reduced.extend(target);
        }
        reduced
    }

    // ── Phase 3: replacement resolution ────────────────────────────

    /// Fill every vacated position. Promotion-vs-hire is decided for the
    /// whole batch first; external hires are applied before promotions.
    fn resolve_departures(
        &mut self,
        week: u32,
        departing: Vec<EmployeeId>,
        reason: Departure,
    ) -> Result<()> {
        if departing.is_empty() {
            return Ok(());
        }
        let hire_week = week - 1;

        let mut external = Vec::new();
        let mut internal = Vec::new();
        for id in departing {
            if !self.organization.contains(id) {
                continue;
            }
            match reason {
                Departure::Resignation => self.stats.resignations += 1,
                Departure::Reduction => self.stats.reductions += 1,
            }
            if self.should_promote_internally(id)? {
                internal.push(id);
            } else {
                external.push(id);
            }
        }
        debug!(
            week,
            ?reason,
            external = external.len(),
            internal = internal.len(),
            "resolving departures"
        );

        for id in external {
            self.hire_replacement(id, hire_week)?;
        }
        for id in internal {
            self.promote_replacement(id, hire_week)?;
        }
        Ok(())
    }

    /// Only managers are replaced from inside their team.
    fn should_promote_internally(&mut self, id: EmployeeId) -> Result<bool> {
        if !self.organization.is_manager(id) {
            return Ok(false);
        }
        let level = self.organization.hierarchy_level(id);
        self.policy.promote_internally(level)
    }

    fn hire_replacement(&mut self, departing: EmployeeId, hire_week: u32) -> Result<()> {
        if !self.organization.contains(departing) {
            return Ok(());
        }
        let fresh = self
            .factory
            .create_employee(hire_week, self.organization.is_manager(departing));
        debug!(departing = %departing, replacement = %fresh.id, "external hire");
        self.organization.replace(departing, fresh)?;
        self.stats.external_hires += 1;
        Ok(())
    }

    /// Promote one of the departing manager's reports into the vacated
    /// seat and backfill the report's old seat with a fresh hire.
    fn promote_replacement(&mut self, departing: EmployeeId, hire_week: u32) -> Result<()> {
        if !self.organization.contains(departing) {
            return Ok(());
        }
        let candidate = if self.policy.should_promote_top_performer() {
            top_performer(&self.organization, departing)
        } else {
            let ledger = WorkLedger::for_subtree(&self.organization, departing);
            best_self_promoter(&self.organization, &ledger, departing)
        };
        let Some(candidate) = candidate else {
            // Team vanished since the decision; fill the seat from outside.
            return self.hire_replacement(departing, hire_week);
        };

        let backfill = self
            .factory
            .create_employee(hire_week, self.organization.is_manager(candidate));
        let backfill_id = backfill.id;
        let mut promoted = self.organization.replace(candidate, backfill)?;
        promoted.knowledge *= self.policy.level_up_knowledge_applicability();
        self.organization.replace(departing, promoted)?;

        debug!(
            departing = %departing,
            promoted = %candidate,
            backfill = %backfill_id,
            "internal promotion"
        );
        self.stats.internal_promotions += 1;
        Ok(())
    }
}
