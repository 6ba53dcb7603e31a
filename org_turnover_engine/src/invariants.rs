//! OrgSim v1 - Tree Invariant Checks
//!
//! Any failure here means the tree is already corrupt; the run aborts.

use std::collections::BTreeSet;

use crate::error::{OrgError, Result};
use crate::hierarchy::Organization;

/// Run every structural check. Returns the first failure.
pub fn validate_tree(org: &Organization) -> Result<()> {
    check_single_root(org)?;
    check_relation_refs(org)?;
    check_no_empty_teams(org)?;
    check_relations_mirror(org)?;
    check_reachable_once(org)?;
    check_coworker_symmetry(org)?;
    Ok(())
}

fn violation(tag: &str, detail: String) -> OrgError {
    OrgError::StructuralViolation(format!("[INVARIANT:{}] {}", tag, detail))
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// The root has no manager; everyone else has exactly one.
fn check_single_root(org: &Organization) -> Result<()> {
    let root = org.root();
    if !org.contains(root) {
        return Err(violation("single_root", format!("root {} is not an employee", root)));
    }
    if let Some(manager) = org.manager(root) {
        return Err(violation(
            "single_root",
            format!("root {} reports to {}", root, manager),
        ));
    }
    for e in org.employees() {
        if e.id != root && org.manager(e.id).is_none() {
            return Err(violation(
                "single_root",
                format!("{} has no manager but is not the root", e.id),
            ));
        }
    }
    Ok(())
}

/// Managers and reports named by the relations exist.
fn check_relation_refs(org: &Organization) -> Result<()> {
    for e in org.employees() {
        if let Some(manager) = org.manager(e.id) {
            if !org.contains(manager) {
                return Err(violation(
                    "relation_refs",
                    format!("{} reports to missing {}", e.id, manager),
                ));
            }
        }
    }
    for manager in org.managers() {
        if !org.contains(manager) {
            return Err(violation(
                "relation_refs",
                format!("missing {} still has a team", manager),
            ));
        }
        for report in org.subordinates(manager) {
            if !org.contains(*report) {
                return Err(violation(
                    "relation_refs",
                    format!("{} lists missing report {}", manager, report),
                ));
            }
        }
    }
    Ok(())
}

fn check_no_empty_teams(org: &Organization) -> Result<()> {
    for manager in org.managers() {
        if org.subordinates(manager).is_empty() {
            return Err(violation("empty_team", format!("{} has an empty team", manager)));
        }
    }
    Ok(())
}

/// `manager(s) == m` exactly when `s` is in `subordinates(m)`.
fn check_relations_mirror(org: &Organization) -> Result<()> {
    for manager in org.managers() {
        for report in org.subordinates(manager) {
            if org.manager(*report) != Some(manager) {
                return Err(violation(
                    "relations_mirror",
                    format!("{} lists {} but it reports elsewhere", manager, report),
                ));
            }
        }
    }
    for e in org.employees() {
        if let Some(manager) = org.manager(e.id) {
            if !org.subordinates(manager).contains(&e.id) {
                return Err(violation(
                    "relations_mirror",
                    format!("{} reports to {} but is not in its team", e.id, manager),
                ));
            }
        }
    }
    Ok(())
}

/// Walking down from the root visits every employee exactly once, which
/// rules out cycles and detached subtrees.
fn check_reachable_once(org: &Organization) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut stack = vec![org.root()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            return Err(violation("acyclic", format!("{} reached twice", id)));
        }
        if seen.len() > org.len() {
            return Err(violation("acyclic", "walk exceeds organization size".to_string()));
        }
        stack.extend(org.subordinates(id).iter().copied());
    }
    if seen.len() != org.len() {
        return Err(violation(
            "reachable",
            format!("{} of {} employees reachable from the root", seen.len(), org.len()),
        ));
    }
    Ok(())
}

fn check_coworker_symmetry(org: &Organization) -> Result<()> {
    for e in org.employees() {
        for coworker in org.coworkers(e.id) {
            if !org.coworkers(coworker).contains(&e.id) {
                return Err(violation(
                    "coworker_symmetry",
                    format!("{} works with {} but not vice versa", e.id, coworker),
                ));
            }
        }
    }
    Ok(())
}
