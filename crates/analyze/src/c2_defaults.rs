//! C2 -- Default arms.
//!
//! A chain without an `else` leaves some inputs unassigned. A conditional
//! arm that follows an `else` can never be selected.

use rulescribe_core::Ruleset;
use serde::Serialize;

/// Aggregated C2 result.
#[derive(Debug, Clone, Serialize)]
pub struct C2Result {
    /// 1-based positions of DEFAULT branches.
    pub default_positions: Vec<usize>,
    /// 1-based positions of conditional branches appearing after a DEFAULT.
    pub unreachable_branches: Vec<usize>,
}

impl C2Result {
    pub fn has_default(&self) -> bool {
        !self.default_positions.is_empty()
    }
}

/// C2 -- Locate DEFAULT arms and anything they shadow.
pub fn analyze_defaults(ruleset: &Ruleset) -> C2Result {
    let mut default_positions = Vec::new();
    let mut unreachable_branches = Vec::new();

    for (i, branch) in ruleset.branches.iter().enumerate() {
        if branch.condition.is_default() {
            default_positions.push(i + 1);
        } else if !default_positions.is_empty() {
            unreachable_branches.push(i + 1);
        }
    }

    C2Result {
        default_positions,
        unreachable_branches,
    }
}
