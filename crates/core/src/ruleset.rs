//! Ruleset model produced by the branch parser.
//!
//! A [`Ruleset`] is built once per parse call and never mutated afterwards.
//! Its JSON form (`{"branches", "variables", "outputs"}`) is what prompt
//! builders and trace payloads embed.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

/// Sentinel text for an unconditional `else` arm.
pub const DEFAULT_CONDITION: &str = "DEFAULT";

/// Words of the rule language that are never reported as variables.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "return", "true", "false", "null", "new", "for", "while", "switch", "case",
    "break", "continue",
];

/// Returns true if `word` is a reserved word of the rule language.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

// ──────────────────────────────────────────────
// Condition
// ──────────────────────────────────────────────

/// The guard of a branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Condition {
    /// Text between the first `(` and the last `)` of an `if` / `else if`
    /// header. Empty when the header has no parentheses.
    Expr(String),
    /// An `else` arm.
    Default,
}

impl Condition {
    pub fn as_str(&self) -> &str {
        match self {
            Condition::Expr(text) => text,
            Condition::Default => DEFAULT_CONDITION,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Condition::Default)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Branch / Ruleset
// ──────────────────────────────────────────────

/// One arm of an if / else-if / else chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Branch {
    pub condition: Condition,
    /// Assignment statements in source order, trailing `;` stripped.
    pub actions: Vec<String>,
}

impl Branch {
    /// Left-hand sides of this branch's actions, in action order.
    pub fn assigned_names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| assignment_target(a))
            .collect()
    }
}

/// Structural representation of one rule script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ruleset {
    pub branches: Vec<Branch>,
    /// Every non-keyword dotted identifier the script mentions.
    pub variables: BTreeSet<String>,
    /// Every name appearing left of the first `=` of an action.
    pub outputs: BTreeSet<String>,
}

impl Ruleset {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.variables.is_empty() && self.outputs.is_empty()
    }

    pub fn has_default(&self) -> bool {
        self.branches.iter().any(|b| b.condition.is_default())
    }

    /// Pretty JSON used for prompts and test fixtures.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Text before the first `=` of an action, trimmed. `None` only when the
/// action has no `=`; the target may be empty or not an identifier.
pub fn assignment_target(action: &str) -> Option<&str> {
    action.split_once('=').map(|(lhs, _)| lhs.trim())
}

/// Text after the first `=` of an action, trimmed.
pub fn assignment_value(action: &str) -> Option<&str> {
    action.split_once('=').map(|(_, rhs)| rhs.trim())
}
