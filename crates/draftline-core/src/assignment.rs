// Role feasibility: one-to-one assignment of champions to roles.
//
// Depth-first search over positions in input order. The set of used roles is
// a bitmask passed by value, so a failed branch leaves nothing to undo except
// the tentative entry pushed onto the output vector.

use serde::{Deserialize, Serialize};

use crate::role::{Role, RoleSet, ROLE_COUNT};

/// Outcome of a feasibility check. Never partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentResult {
    /// `roles[i]` is the role given to input position `i`.
    Assigned(Vec<Role>),
    /// No valid bijection exists.
    Infeasible,
}

impl AssignmentResult {
    pub fn is_feasible(&self) -> bool {
        matches!(self, AssignmentResult::Assigned(_))
    }

    pub fn roles(&self) -> Option<&[Role]> {
        match self {
            AssignmentResult::Assigned(roles) => Some(roles),
            AssignmentResult::Infeasible => None,
        }
    }
}

/// Find a role assignment, treating an empty eligibility set as "any role".
///
/// Among several valid assignments the first found wins, trying each
/// position's roles in declared order. More than five positions can never be
/// assigned.
pub fn solve(eligible: &[RoleSet]) -> AssignmentResult {
    let sets: Vec<RoleSet> = eligible.iter().map(|s| s.or_any()).collect();
    solve_exact(&sets)
}

/// Find a role assignment using the sets exactly as given: an empty set
/// makes the whole input infeasible.
pub fn solve_exact(eligible: &[RoleSet]) -> AssignmentResult {
    if eligible.len() > ROLE_COUNT {
        return AssignmentResult::Infeasible;
    }

    let mut assigned = Vec::with_capacity(eligible.len());
    if search(eligible, 0, 0, &mut assigned) {
        AssignmentResult::Assigned(assigned)
    } else {
        AssignmentResult::Infeasible
    }
}

/// Shorthand for `solve(eligible).is_feasible()`.
pub fn is_assignable(eligible: &[RoleSet]) -> bool {
    solve(eligible).is_feasible()
}

fn search(sets: &[RoleSet], pos: usize, used: u8, assigned: &mut Vec<Role>) -> bool {
    if pos == sets.len() {
        return true;
    }

    for role in sets[pos].iter() {
        let bit = 1u8 << role.index();
        if used & bit != 0 {
            continue;
        }
        assigned.push(role);
        if search(sets, pos + 1, used | bit, assigned) {
            return true;
        }
        assigned.pop();
    }

    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
