//! OrgSim v1 - Employee Behaviour Model
//!
//! Knowledge diffusion, real/virtual work and candidate selection.
//! Everything here reads the hierarchy store; only
//! [`propagate_knowledge`] writes, and only employee knowledge.
//!
//! Work rolls up multiplicatively: a manager's own usable knowledge
//! scales the summed output of the team. Aggregation walks the tree
//! bottom-up with an explicit order, never recursion.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::PropagationMode;
use crate::domain::{Employee, EmployeeId};
use crate::hierarchy::Organization;

pub const KNOWLEDGE_ACQUISITION_RATE: f64 = 0.037;
const COWORKER_BASE: f64 = 0.8;
const COWORKER_ATTITUDE_WEIGHT: f64 = 1.33;

// ---------------------------------------------------------------------------
// Knowledge diffusion
// ---------------------------------------------------------------------------

/// Learning from teammates. Self-promoting pairs exchange less, and a
/// coworker with negative knowledge contributes positively.
pub fn coworker_term(org: &Organization, employee: &Employee) -> f64 {
    org.coworkers(employee.id)
        .iter()
        .filter_map(|id| org.employee(*id))
        .map(|coworker| {
            let attitude = employee.self_promotion + coworker.self_promotion;
            COWORKER_BASE - COWORKER_ATTITUDE_WEIGHT * attitude * coworker.knowledge
        })
        .sum()
}

/// Learning from the manager, discounted by the manager's self-promotion.
pub fn manager_term(org: &Organization, employee: &Employee) -> f64 {
    org.manager(employee.id)
        .and_then(|id| org.employee(id))
        .map(|manager| (1.0 - manager.self_promotion) * manager.knowledge)
        .unwrap_or(0.0)
}

/// Knowledge of `employee` after the update for `week`.
///
/// Requires `week > employee.hire_week`; callers guard this.
pub fn next_knowledge(org: &Organization, employee: &Employee, week: u32) -> f64 {
    let tenure = (week as f64) - (employee.hire_week as f64);
    let decayed_rate = employee.learning_rate * KNOWLEDGE_ACQUISITION_RATE / tenure;
    let exchange = employee.knowledge + coworker_term(org, employee) + manager_term(org, employee);
    employee.knowledge + decayed_rate * exchange
}

/// Run the weekly knowledge update over the whole tree, top-down.
///
/// Employees hired in `week` or later are skipped.
pub fn propagate_knowledge(org: &mut Organization, week: u32, mode: PropagationMode) {
    let order = org.top_down_order();
    match mode {
        PropagationMode::Sequential => {
            for id in order {
                let updated = org
                    .employee(id)
                    .filter(|e| week > e.hire_week)
                    .map(|e| next_knowledge(org, e, week));
                if let (Some(knowledge), Some(e)) = (updated, org.employee_mut(id)) {
                    e.knowledge = knowledge;
                }
            }
        }
        PropagationMode::Snapshot => {
            let shared: &Organization = org;
            let updates: Vec<(EmployeeId, f64)> = order
                .iter()
                .filter_map(|id| snapshot_update(shared, *id, week))
                .collect();
            apply_updates(org, updates);
        }
        PropagationMode::ParallelSnapshot => {
            let shared: &Organization = org;
            let updates: Vec<(EmployeeId, f64)> = order
                .par_iter()
                .filter_map(|id| snapshot_update(shared, *id, week))
                .collect();
            apply_updates(org, updates);
        }
    }
}

fn snapshot_update(org: &Organization, id: EmployeeId, week: u32) -> Option<(EmployeeId, f64)> {
    org.employee(id)
        .filter(|e| week > e.hire_week)
        .map(|e| (id, next_knowledge(org, e, week)))
}

fn apply_updates(org: &mut Organization, updates: Vec<(EmployeeId, f64)>) {
    for (id, knowledge) in updates {
        if let Some(e) = org.employee_mut(id) {
            e.knowledge = knowledge;
        }
    }
}

// ---------------------------------------------------------------------------
// Work
// ---------------------------------------------------------------------------

/// Own contribution before team amplification.
pub fn own_work(org: &Organization, employee: &Employee) -> f64 {
    employee.knowledge * org.knowledge_usability_rate()
}

/// Real work of every employee in a subtree, computed in one bottom-up
/// pass. Valid until the next knowledge update or tree mutation.
#[derive(Debug, Clone, Default)]
pub struct WorkLedger {
    work: BTreeMap<EmployeeId, f64>,
}

impl WorkLedger {
    pub fn for_organization(org: &Organization) -> Self {
        Self::for_subtree(org, org.root())
    }

    pub fn for_subtree(org: &Organization, top: EmployeeId) -> Self {
        let mut work = BTreeMap::new();
        for id in org.subtree_order(top).into_iter().rev() {
            let Some(employee) = org.employee(id) else {
                continue;
            };
            let own = own_work(org, employee);
            let team = org.subordinates(id);
            let value = if team.is_empty() {
                own
            } else {
                let team_work: f64 = team.iter().filter_map(|s| work.get(s)).sum();
                own * team_work
            };
            work.insert(id, value);
        }
        Self { work }
    }

    /// Real work of `id`; 0 for employees outside the ledger.
    pub fn real_work(&self, id: EmployeeId) -> f64 {
        self.work.get(&id).copied().unwrap_or(0.0)
    }

    /// Mean real work of `team`. An empty team averages to 1.
    pub fn team_average<'a>(&self, team: impl IntoIterator<Item = &'a EmployeeId>) -> f64 {
        let (sum, count) = team
            .into_iter()
            .fold((0.0, 0usize), |(sum, count), id| (sum + self.real_work(*id), count + 1));
        if count == 0 {
            1.0
        } else {
            sum / count as f64
        }
    }
}

/// Real work of a single employee, fresh from the current tree.
pub fn real_work(org: &Organization, id: EmployeeId) -> f64 {
    WorkLedger::for_subtree(org, id).real_work(id)
}

/// Self-perceived contribution: self-promotion plus output relative to
/// the team average. Used only to rank candidates.
pub fn virtual_work(employee: &Employee, real_work: f64, team_average: f64) -> f64 {
    employee.self_promotion + real_work / team_average
}

// ---------------------------------------------------------------------------
// Candidate selection
// ---------------------------------------------------------------------------
//
// Ties go to the lowest identity. Scores compare with `total_cmp`, so a
// NaN never panics a selection.

/// Subordinate of `manager` with the highest knowledge.
pub fn top_performer(org: &Organization, manager: EmployeeId) -> Option<EmployeeId> {
    select(org, manager, Ordering::Greater, |e| e.knowledge)
}

/// Subordinate of `manager` with the highest virtual work.
pub fn best_self_promoter(
    org: &Organization,
    ledger: &WorkLedger,
    manager: EmployeeId,
) -> Option<EmployeeId> {
    let average = ledger.team_average(org.subordinates(manager));
    select(org, manager, Ordering::Greater, |e| {
        virtual_work(e, ledger.real_work(e.id), average)
    })
}

/// Subordinate of `manager` with the lowest virtual work.
pub fn weakest_contributor(
    org: &Organization,
    ledger: &WorkLedger,
    manager: EmployeeId,
) -> Option<EmployeeId> {
    let average = ledger.team_average(org.subordinates(manager));
    select(org, manager, Ordering::Less, |e| {
        virtual_work(e, ledger.real_work(e.id), average)
    })
}

fn select(
    org: &Organization,
    manager: EmployeeId,
    wanted: Ordering,
    score: impl Fn(&Employee) -> f64,
) -> Option<EmployeeId> {
    let mut best: Option<(EmployeeId, f64)> = None;
    for employee in org.subordinates(manager).iter().filter_map(|id| org.employee(*id)) {
        let value = score(employee);
        match best {
            Some((_, current)) if value.total_cmp(&current) != wanted => {}
            _ => best = Some((employee.id, value)),
        }
    }
    best.map(|(id, _)| id)
}
