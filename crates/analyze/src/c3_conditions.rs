//! C3 -- Conditions.
//!
//! Flags conditional arms with no condition text and arms whose condition
//! repeats an earlier one (the later arm is shadowed).

use std::collections::BTreeMap;

use rulescribe_core::{Condition, Ruleset};
use serde::Serialize;

/// A condition that repeats an earlier branch's condition.
#[derive(Debug, Clone, Serialize)]
pub struct ShadowedCondition {
    pub branch: usize,
    pub first_seen: usize,
    pub condition: String,
}

/// Aggregated C3 result.
#[derive(Debug, Clone, Serialize)]
pub struct C3Result {
    /// 1-based positions of conditional branches with empty condition text.
    pub empty_conditions: Vec<usize>,
    pub shadowed: Vec<ShadowedCondition>,
}

/// C3 -- Inspect branch conditions.
pub fn analyze_conditions(ruleset: &Ruleset) -> C3Result {
    let mut empty_conditions = Vec::new();
    let mut shadowed = Vec::new();
    let mut first_seen: BTreeMap<&str, usize> = BTreeMap::new();

    for (i, branch) in ruleset.branches.iter().enumerate() {
        let Condition::Expr(text) = &branch.condition else {
            continue;
        };
        if text.is_empty() {
            empty_conditions.push(i + 1);
            continue;
        }
        match first_seen.get(text.as_str()) {
            Some(&first) => shadowed.push(ShadowedCondition {
                branch: i + 1,
                first_seen: first,
                condition: text.clone(),
            }),
            None => {
                first_seen.insert(text.as_str(), i + 1);
            }
        }
    }

    C3Result {
        empty_conditions,
        shadowed,
    }
}
