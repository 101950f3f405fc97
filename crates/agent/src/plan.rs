//! Run modes, the step vocabulary, and the fixed plan for a run.

use std::fmt;
use std::str::FromStr;

use crate::collaborators::Planner;
use crate::error::AgentError;

/// What the caller wants out of a run. Seeds the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Explain,
    Verify,
    Tests,
    Diff,
    Agentic,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Explain => "explain",
            Mode::Verify => "verify",
            Mode::Tests => "tests",
            Mode::Diff => "diff",
            Mode::Agentic => "agentic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explain" => Ok(Mode::Explain),
            "verify" => Ok(Mode::Verify),
            "tests" => Ok(Mode::Tests),
            "diff" => Ok(Mode::Diff),
            "agentic" => Ok(Mode::Agentic),
            other => Err(format!(
                "unknown mode '{}' (expected explain, verify, tests, diff, or agentic)",
                other
            )),
        }
    }
}

// ──────────────────────────────────────────────
// Steps
// ──────────────────────────────────────────────

/// Identifiers of every step the executor knows how to run.
pub const STEP_VOCABULARY: &[&str] = &[
    "parse",
    "static_checks",
    "retrieve_context",
    "explain",
    "verify",
    "rewrite",
    "generate_tests",
    "diff",
];

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Parse,
    StaticChecks,
    RetrieveContext,
    Explain,
    Verify,
    Rewrite,
    GenerateTests,
    Diff,
    /// An identifier outside the vocabulary. Executed as a diagnostic no-op.
    Unknown(String),
}

impl Step {
    pub fn from_id(id: &str) -> Step {
        match id {
            "parse" => Step::Parse,
            "static_checks" => Step::StaticChecks,
            "retrieve_context" => Step::RetrieveContext,
            "explain" => Step::Explain,
            "verify" => Step::Verify,
            "rewrite" => Step::Rewrite,
            "generate_tests" => Step::GenerateTests,
            "diff" => Step::Diff,
            other => Step::Unknown(other.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Step::Parse => "parse",
            Step::StaticChecks => "static_checks",
            Step::RetrieveContext => "retrieve_context",
            Step::Explain => "explain",
            Step::Verify => "verify",
            Step::Rewrite => "rewrite",
            Step::GenerateTests => "generate_tests",
            Step::Diff => "diff",
            Step::Unknown(id) => id,
        }
    }
}

/// The ordered steps of one run. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<Step>,
}

impl Plan {
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Plan {
        Plan {
            steps: ids.iter().map(|id| Step::from_id(id.as_ref())).collect(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn ids(&self) -> Vec<&str> {
        self.steps.iter().map(Step::id).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

// ──────────────────────────────────────────────
// ModePlanner
// ──────────────────────────────────────────────

/// The fixed step sequence for each mode.
pub fn default_steps(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Explain => &["parse", "static_checks", "retrieve_context", "explain"],
        Mode::Verify | Mode::Agentic => &[
            "parse",
            "static_checks",
            "retrieve_context",
            "explain",
            "verify",
            "rewrite",
        ],
        Mode::Tests => &["parse", "static_checks", "generate_tests"],
        Mode::Diff => &["parse", "parse", "diff"],
    }
}

/// Deterministic planner: each mode maps to [`default_steps`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ModePlanner;

impl Planner for ModePlanner {
    fn plan(&self, mode: Mode) -> Result<Vec<String>, AgentError> {
        Ok(default_steps(mode).iter().map(|s| s.to_string()).collect())
    }
}
