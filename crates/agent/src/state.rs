//! Mutable state owned by a single run.

use rulescribe_core::Ruleset;
use serde::{Deserialize, Serialize};

/// Outcome of checking an explanation against its ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub ok: bool,
    /// Branches, conditions, or outputs the explanation omits or misstates.
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub rewrite_needed: bool,
}

/// One generated test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default = "empty_object")]
    pub input: serde_json::Value,
    #[serde(default = "empty_object")]
    pub expected: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Working state threaded through the step handlers of one run.
#[derive(Debug, Default)]
pub struct RunState {
    /// Parsed inputs, in parse order.
    pub rulesets: Vec<Ruleset>,
    /// Current natural-language output (explanation, diff, or test JSON).
    pub explanation: String,
    /// `None` until a verify step runs.
    pub verdict: Option<Verdict>,
    pub static_issues: Vec<String>,
    pub context: String,
}

impl RunState {
    pub fn latest_ruleset(&self) -> Option<&Ruleset> {
        self.rulesets.last()
    }
}
