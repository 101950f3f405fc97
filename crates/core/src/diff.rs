//! Structural comparison of two rulesets.
//!
//! Branches are matched by condition text (first occurrence wins). A
//! branch present on both sides with different actions is reported as a
//! change with the actions added and removed.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::ruleset::{Branch, Ruleset};

/// A branch whose condition exists in both rulesets but whose actions differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchChange {
    pub condition: String,
    pub added_actions: Vec<String>,
    pub removed_actions: Vec<String>,
}

/// The result of diffing two rulesets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RulesetDiff {
    pub added_branches: Vec<String>,
    pub removed_branches: Vec<String>,
    pub changed_branches: Vec<BranchChange>,
    pub added_variables: Vec<String>,
    pub removed_variables: Vec<String>,
    pub added_outputs: Vec<String>,
    pub removed_outputs: Vec<String>,
}

impl RulesetDiff {
    /// Returns true if there are no differences.
    pub fn is_empty(&self) -> bool {
        self.added_branches.is_empty()
            && self.removed_branches.is_empty()
            && self.changed_branches.is_empty()
            && self.added_variables.is_empty()
            && self.removed_variables.is_empty()
            && self.added_outputs.is_empty()
            && self.removed_outputs.is_empty()
    }
}

/// Compare `before` to `after`.
pub fn diff_rulesets(before: &Ruleset, after: &Ruleset) -> RulesetDiff {
    let mut diff = RulesetDiff::default();
    let mut seen = BTreeSet::new();

    for branch in &after.branches {
        let cond = branch.condition.as_str();
        if !seen.insert(cond) {
            continue;
        }
        match find_branch(before, cond) {
            None => diff.added_branches.push(cond.to_string()),
            Some(old) if old.actions != branch.actions => {
                diff.changed_branches.push(BranchChange {
                    condition: cond.to_string(),
                    added_actions: missing_from(&branch.actions, &old.actions),
                    removed_actions: missing_from(&old.actions, &branch.actions),
                });
            }
            Some(_) => {}
        }
    }
    for branch in &before.branches {
        let cond = branch.condition.as_str();
        if find_branch(after, cond).is_none() {
            diff.removed_branches.push(cond.to_string());
        }
    }

    dedup_in_place(&mut diff.removed_branches);

    diff.added_variables = set_minus(&after.variables, &before.variables);
    diff.removed_variables = set_minus(&before.variables, &after.variables);
    diff.added_outputs = set_minus(&after.outputs, &before.outputs);
    diff.removed_outputs = set_minus(&before.outputs, &after.outputs);

    diff
}

fn find_branch<'a>(rs: &'a Ruleset, condition: &str) -> Option<&'a Branch> {
    rs.branches
        .iter()
        .find(|b| b.condition.as_str() == condition)
}

fn missing_from(items: &[String], other: &[String]) -> Vec<String> {
    items.iter().filter(|a| !other.contains(*a)).cloned().collect()
}

fn set_minus(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Vec<String> {
    a.difference(b).cloned().collect()
}

fn dedup_in_place(items: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

impl fmt::Display for RulesetDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No structural differences.");
        }

        for cond in &self.added_branches {
            writeln!(f, "+ branch [{}]", cond)?;
        }
        for cond in &self.removed_branches {
            writeln!(f, "- branch [{}]", cond)?;
        }
        for change in &self.changed_branches {
            writeln!(f, "~ branch [{}]", change.condition)?;
            for action in &change.added_actions {
                writeln!(f, "    + {}", action)?;
            }
            for action in &change.removed_actions {
                writeln!(f, "    - {}", action)?;
            }
        }
        write_set_line(f, "+ variables", &self.added_variables)?;
        write_set_line(f, "- variables", &self.removed_variables)?;
        write_set_line(f, "+ outputs", &self.added_outputs)?;
        write_set_line(f, "- outputs", &self.removed_outputs)
    }
}

fn write_set_line(f: &mut fmt::Formatter<'_>, label: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}: {}", label, items.join(", "))
}
