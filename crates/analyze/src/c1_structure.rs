//! C1 -- Structure.
//!
//! Counts branches and flags branches whose body produced no actions.

use rulescribe_core::Ruleset;
use serde::Serialize;

/// Aggregated C1 result.
#[derive(Debug, Clone, Serialize)]
pub struct C1Result {
    pub branch_count: usize,
    /// 1-based positions of branches with no recorded actions.
    pub empty_branches: Vec<usize>,
}

/// C1 -- Inspect the branch skeleton of a ruleset.
pub fn analyze_structure(ruleset: &Ruleset) -> C1Result {
    let empty_branches = ruleset
        .branches
        .iter()
        .enumerate()
        .filter(|(_, b)| b.actions.is_empty())
        .map(|(i, _)| i + 1)
        .collect();

    C1Result {
        branch_count: ruleset.branches.len(),
        empty_branches,
    }
}
