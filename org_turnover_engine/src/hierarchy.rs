//! OrgSim v1 - Hierarchy Store
//!
//! Arena of employee records keyed by identity plus two index maps:
//! manager-of and subordinates-of. Coworkers are derived on demand.
//!
//! Structural rules kept by every mutation:
//!   - exactly one root, every other employee has one manager
//!   - subordinate sets are never empty (a worker has no entry at all)
//!   - manager-of and subordinates-of mirror each other
//!   - no relation names an employee missing from the arena

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::{Employee, EmployeeId};
use crate::error::{OrgError, Result};
use crate::factory::EmployeeFactory;
use crate::random::RandomSource;

static NO_SUBORDINATES: BTreeSet<EmployeeId> = BTreeSet::new();

/// The mutable organization tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Organization {
    root: EmployeeId,
    knowledge_usability_rate: f64,
    employees: BTreeMap<EmployeeId, Employee>,
    managers: BTreeMap<EmployeeId, EmployeeId>,
    subordinates: BTreeMap<EmployeeId, BTreeSet<EmployeeId>>,
}

impl Organization {
    /// Organization consisting of `root` alone.
    pub fn with_root(root: Employee, knowledge_usability_rate: f64) -> Self {
        let root_id = root.id;
        let mut employees = BTreeMap::new();
        employees.insert(root_id, root);
        Self {
            root: root_id,
            knowledge_usability_rate,
            employees,
            managers: BTreeMap::new(),
            subordinates: BTreeMap::new(),
        }
    }

    /// Regular tree: `branching_factor` reports per manager, `depth`
    /// levels below the root. Employees are created breadth-first.
    pub fn build_tree<R: RandomSource>(
        branching_factor: u32,
        depth: u32,
        knowledge_usability_rate: f64,
        factory: &mut EmployeeFactory<R>,
    ) -> Result<Self> {
        if branching_factor == 0 {
            return Err(OrgError::InvalidArgument(
                "branching factor must be at least 1".to_string(),
            ));
        }

        let root = factory.create_employee(0, depth > 0);
        let mut org = Self::with_root(root, knowledge_usability_rate);

        let mut queue: VecDeque<(EmployeeId, u32)> = VecDeque::new();
        queue.push_back((org.root, 0));
        while let Some((manager, level)) = queue.pop_front() {
            if level == depth {
                continue;
            }
            let child_level = level + 1;
            for _ in 0..branching_factor {
                let child = factory.create_employee(0, child_level < depth);
                let child_id = child.id;
                org.attach(child, manager)?;
                queue.push_back((child_id, child_level));
            }
        }
        Ok(org)
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn root(&self) -> EmployeeId {
        self.root
    }

    pub fn knowledge_usability_rate(&self) -> f64 {
        self.knowledge_usability_rate
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    pub fn contains(&self, id: EmployeeId) -> bool {
        self.employees.contains_key(&id)
    }

    pub fn employee(&self, id: EmployeeId) -> Option<&Employee> {
        self.employees.get(&id)
    }

    pub fn employee_mut(&mut self, id: EmployeeId) -> Option<&mut Employee> {
        self.employees.get_mut(&id)
    }

    /// All employees in ascending identity order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> {
        self.employees.values()
    }

    /// `None` only for the root (or an unknown id).
    pub fn manager(&self, id: EmployeeId) -> Option<EmployeeId> {
        self.managers.get(&id).copied()
    }

    /// Direct reports; empty for workers.
    pub fn subordinates(&self, id: EmployeeId) -> &BTreeSet<EmployeeId> {
        self.subordinates.get(&id).unwrap_or(&NO_SUBORDINATES)
    }

    /// Teammates sharing `id`'s manager; empty for the root.
    pub fn coworkers(&self, id: EmployeeId) -> BTreeSet<EmployeeId> {
        match self.manager(id) {
            Some(manager) => self
                .subordinates(manager)
                .iter()
                .copied()
                .filter(|other| *other != id)
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Derived from the tree at call time.
    pub fn is_manager(&self, id: EmployeeId) -> bool {
        !self.subordinates(id).is_empty()
    }

    /// Every employee that currently has reports, ascending identity.
    pub fn managers(&self) -> Vec<EmployeeId> {
        self.subordinates.keys().copied().collect()
    }

    /// Manager links between `id` and the root. The root is level 0.
    pub fn hierarchy_level(&self, id: EmployeeId) -> u32 {
        let mut level = 0;
        let mut current = id;
        while let Some(manager) = self.manager(current) {
            level += 1;
            current = manager;
        }
        level
    }

    /// Breadth-first order starting at the root.
    pub fn top_down_order(&self) -> Vec<EmployeeId> {
        self.subtree_order(self.root)
    }

    /// Breadth-first order of the subtree rooted at `top`.
    pub fn subtree_order(&self, top: EmployeeId) -> Vec<EmployeeId> {
        let mut order = Vec::with_capacity(self.employees.len());
        if !self.contains(top) {
            return order;
        }
        let mut queue = VecDeque::new();
        queue.push_back(top);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.subordinates(id).iter().copied());
        }
        order
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Put `new` into the exact position held by `old` and return the
    /// removed record. `new` inherits `old`'s reports and manager.
    ///
    /// Fails without touching the tree if `old` is absent or `new`'s id
    /// is already taken.
    pub fn replace(&mut self, old: EmployeeId, new: Employee) -> Result<Employee> {
        if !self.contains(old) {
            return Err(OrgError::missing(old));
        }
        if self.contains(new.id) {
            return Err(OrgError::StructuralViolation(format!(
                "replacement {} already belongs to the organization",
                new.id
            )));
        }

        let new_id = new.id;
        let team = self.subordinates.remove(&old).unwrap_or_default();
        for report in &team {
            self.managers.insert(*report, new_id);
        }
        if !team.is_empty() {
            self.subordinates.insert(new_id, team);
        }

        if let Some(manager) = self.managers.remove(&old) {
            self.managers.insert(new_id, manager);
            let siblings = self
                .subordinates
                .get_mut(&manager)
                .ok_or_else(|| OrgError::missing(manager))?;
            siblings.remove(&old);
            siblings.insert(new_id);
        }

        if self.root == old {
            self.root = new_id;
        }

        let removed = self.employees.remove(&old).ok_or_else(|| OrgError::missing(old))?;
        self.employees.insert(new_id, new);
        Ok(removed)
    }

    /// Detach a worker from its manager and drop it from the arena.
    /// Shrinks the tree; turnover always ends in [`Organization::replace`].
    pub fn remove_leaf(&mut self, id: EmployeeId) -> Result<Employee> {
        if !self.contains(id) {
            return Err(OrgError::missing(id));
        }
        if self.is_manager(id) {
            return Err(OrgError::StructuralViolation(format!(
                "{} still has reports and is not a leaf",
                id
            )));
        }
        let manager = self.managers.remove(&id).ok_or_else(|| {
            OrgError::StructuralViolation(format!("{} is the root and cannot be removed", id))
        })?;

        if let Some(team) = self.subordinates.get_mut(&manager) {
            team.remove(&id);
            if team.is_empty() {
                self.subordinates.remove(&manager);
            }
        }
        self.employees.remove(&id).ok_or_else(|| OrgError::missing(id))
    }

    /// Add `employee` as a new report of `manager`.
    pub(crate) fn attach(&mut self, employee: Employee, manager: EmployeeId) -> Result<()> {
        if !self.contains(manager) {
            return Err(OrgError::missing(manager));
        }
        let id = employee.id;
        if self.employees.insert(id, employee).is_some() {
            return Err(OrgError::StructuralViolation(format!(
                "duplicate employee identity {}",
                id
            )));
        }
        self.managers.insert(id, manager);
        self.subordinates.entry(manager).or_default().insert(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Demographic, Strategy};
    use crate::random::SeededRandom;

    fn factory() -> EmployeeFactory<SeededRandom> {
        EmployeeFactory::new(SeededRandom::new(3), Strategy::NoQuota)
    }

    fn tree(k: u32, d: u32) -> (Organization, EmployeeFactory<SeededRandom>) {
        let mut f = factory();
        let org = Organization::build_tree(k, d, 0.75, &mut f).unwrap();
        (org, f)
    }

    fn ids(raw: &[u64]) -> BTreeSet<EmployeeId> {
        raw.iter().map(|v| EmployeeId(*v)).collect()
    }

    #[test]
    fn binary_tree_of_depth_two() {
        let (org, _) = tree(2, 2);
        assert_eq!(org.len(), 7);
        let flags: Vec<bool> = org.employees().map(|e| org.is_manager(e.id)).collect();
        assert_eq!(flags, vec![true, true, true, false, false, false, false]);
        assert_eq!(org.root(), EmployeeId(1000));
        assert_eq!(org.subordinates(EmployeeId(1000)), &ids(&[1001, 1002]));
        assert_eq!(org.subordinates(EmployeeId(1002)), &ids(&[1005, 1006]));
    }

    #[test]
    fn strategy_applies_to_initial_managers_only() {
        let mut f = EmployeeFactory::new(SeededRandom::new(17), Strategy::AllQuotaManagers);
        let org = Organization::build_tree(8, 2, 0.75, &mut f).unwrap();
        let (managers, workers): (Vec<&Employee>, Vec<&Employee>) =
            org.employees().partition(|e| org.is_manager(e.id));
        assert_eq!(managers.len(), 9);
        assert!(managers.iter().all(|e| e.demographic == Demographic::Quota));
        // 64 fair coins
        assert!(workers.iter().any(|e| e.demographic == Demographic::NonQuota));
        assert!(workers.iter().any(|e| e.demographic == Demographic::Quota));
    }

    #[test]
    fn sizes_follow_the_geometric_series() {
        assert_eq!(tree(3, 3).0.len(), 40);
        assert_eq!(tree(1, 4).0.len(), 5);
        assert_eq!(tree(5, 0).0.len(), 1);
    }

    #[test]
    fn zero_branching_is_rejected() {
        let mut f = factory();
        assert!(matches!(
            Organization::build_tree(0, 2, 0.75, &mut f),
            Err(OrgError::InvalidArgument(_))
        ));
    }

    #[test]
    fn manager_and_coworker_queries() {
        let (org, _) = tree(3, 2);
        let root = org.root();
        assert_eq!(org.manager(root), None);
        assert!(org.coworkers(root).is_empty());

        let child = EmployeeId(1002);
        assert_eq!(org.manager(child), Some(root));
        assert_eq!(org.coworkers(child), ids(&[1001, 1003]));
        for c in org.coworkers(child) {
            assert!(org.coworkers(c).contains(&child));
        }

        let leaf = EmployeeId(1004);
        assert!(org.subordinates(leaf).is_empty());
        assert!(!org.is_manager(leaf));
        assert_eq!(org.hierarchy_level(leaf), 2);
        assert_eq!(org.hierarchy_level(root), 0);
    }

    #[test]
    fn top_down_order_visits_parents_first() {
        let (org, _) = tree(2, 3);
        let order = org.top_down_order();
        assert_eq!(order.len(), org.len());
        for (pos, id) in order.iter().enumerate() {
            if let Some(m) = org.manager(*id) {
                let manager_pos = order.iter().position(|x| *x == m).unwrap();
                assert!(manager_pos < pos);
            }
        }
    }

    #[test]
    fn replace_manager_transfers_position() {
        let (mut org, mut f) = tree(2, 2);
        let old = EmployeeId(1001);
        let team_before = org.subordinates(old).clone();
        let manager_before = org.manager(old);

        let fresh = f.create_employee(4, true);
        let fresh_id = fresh.id;
        let removed = org.replace(old, fresh).unwrap();

        assert_eq!(removed.id, old);
        assert!(!org.contains(old));
        assert_eq!(org.subordinates(fresh_id), &team_before);
        assert_eq!(org.manager(fresh_id), manager_before);
        for report in &team_before {
            assert_eq!(org.manager(*report), Some(fresh_id));
        }
        assert!(org.subordinates(org.root()).contains(&fresh_id));
        assert!(!org.subordinates(org.root()).contains(&old));
        assert!(org.subordinates(old).is_empty());
        assert_eq!(org.len(), 7);
    }

    #[test]
    fn replace_root_moves_the_root() {
        let (mut org, mut f) = tree(2, 1);
        let fresh = f.create_employee(1, true);
        let fresh_id = fresh.id;
        org.replace(org.root(), fresh).unwrap();
        assert_eq!(org.root(), fresh_id);
        assert_eq!(org.subordinates(fresh_id).len(), 2);
    }

    #[test]
    fn promotion_is_two_replacements() {
        let (mut org, mut f) = tree(2, 2);
        let departing = EmployeeId(1001);
        let candidate = EmployeeId(1003);

        let backfill = f.create_employee(5, false);
        let backfill_id = backfill.id;
        let promoted = org.replace(candidate, backfill).unwrap();
        org.replace(departing, promoted).unwrap();

        assert_eq!(org.manager(candidate), Some(org.root()));
        assert_eq!(org.subordinates(candidate), &ids(&[1004, backfill_id.0]));
        assert_eq!(org.manager(backfill_id), Some(candidate));
        assert!(!org.contains(departing));
        assert_eq!(org.len(), 7);
    }

    #[test]
    fn replace_rejects_bad_targets() {
        let (mut org, mut f) = tree(2, 1);
        let fresh = f.create_employee(0, false);
        assert!(matches!(
            org.replace(EmployeeId(42), fresh),
            Err(OrgError::StructuralViolation(_))
        ));

        let duplicate = org.employee(EmployeeId(1001)).unwrap().clone();
        assert!(matches!(
            org.replace(EmployeeId(1002), duplicate),
            Err(OrgError::StructuralViolation(_))
        ));
        assert_eq!(org.len(), 3);
    }

    #[test]
    fn remove_leaf_detaches_only_workers() {
        let (mut org, _) = tree(1, 2);
        assert!(org.remove_leaf(EmployeeId(1001)).is_err());
        assert!(org.remove_leaf(org.root()).is_err());

        let removed = org.remove_leaf(EmployeeId(1002)).unwrap();
        assert_eq!(removed.id, EmployeeId(1002));
        assert!(!org.is_manager(EmployeeId(1001)));
        assert_eq!(org.managers(), vec![EmployeeId(1000)]);
        assert_eq!(org.len(), 2);
    }

    #[test]
    fn fresh_employee_is_not_a_manager() {
        let mut f = factory();
        let e = f.create_employee(0, true);
        let org = Organization::with_root(e.clone(), 0.5);
        assert!(!org.is_manager(e.id));
        assert!(matches!(
            e.demographic,
            Demographic::NonQuota | Demographic::Quota
        ));
    }
}
