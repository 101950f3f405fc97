//! AnalysisReport -- aggregated output from the C1-C4 checks.
//!
//! The report collects results from each check module and extracts
//! notable findings (warnings, info) for summary display and for the
//! issue list handed to explanation prompts.

use std::fmt;

use crate::c1_structure::C1Result;
use crate::c2_defaults::C2Result;
use crate::c3_conditions::C3Result;
use crate::c4_coverage::C4Result;
use serde::Serialize;

/// Severity level for an analysis finding.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    Info,
    Warning,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Info => write!(f, "info"),
            FindingSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A notable finding from analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub check: String,
    pub severity: FindingSeverity,
    pub message: String,
    /// 1-based branch position the finding is about, if any.
    pub branch: Option<usize>,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Aggregated analysis report containing all C1-C4 results and findings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub c1_structure: Option<C1Result>,
    pub c2_defaults: Option<C2Result>,
    pub c3_conditions: Option<C3Result>,
    pub c4_coverage: Option<C4Result>,
    pub checks_run: Vec<String>,
    pub findings: Vec<Finding>,
}

impl AnalysisReport {
    /// Create a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Findings rendered as `[severity] message`, in extraction order.
    pub fn issues(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.to_string()).collect()
    }

    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == FindingSeverity::Warning)
    }

    fn push(&mut self, check: &str, severity: FindingSeverity, branch: Option<usize>, message: String) {
        self.findings.push(Finding {
            check: check.to_string(),
            severity,
            message,
            branch,
        });
    }

    /// Extract findings from populated check results.
    pub fn extract_findings(&mut self) {
        self.findings.clear();

        // C1: nothing extracted, or hollow branches
        if let Some(c1) = self.c1_structure.clone() {
            if c1.branch_count == 0 {
                self.push(
                    "c1",
                    FindingSeverity::Warning,
                    None,
                    "No branches were extracted from the rule script".to_string(),
                );
            }
            for pos in c1.empty_branches {
                self.push(
                    "c1",
                    FindingSeverity::Warning,
                    Some(pos),
                    format!("Branch {} has no assignment actions", pos),
                );
            }
        }

        // C2: missing, repeated, or misplaced DEFAULT arms
        if let Some(c2) = self.c2_defaults.clone() {
            let has_branches = self
                .c1_structure
                .as_ref()
                .map_or(true, |c1| c1.branch_count > 0);
            if !c2.has_default() && has_branches {
                self.push(
                    "c2",
                    FindingSeverity::Info,
                    None,
                    "No DEFAULT branch: inputs matching no condition assign nothing".to_string(),
                );
            }
            if c2.default_positions.len() > 1 {
                let positions: Vec<String> =
                    c2.default_positions.iter().map(|p| p.to_string()).collect();
                self.push(
                    "c2",
                    FindingSeverity::Warning,
                    None,
                    format!(
                        "{} DEFAULT branches found (branches {})",
                        c2.default_positions.len(),
                        positions.join(", ")
                    ),
                );
            }
            for pos in c2.unreachable_branches {
                self.push(
                    "c2",
                    FindingSeverity::Warning,
                    Some(pos),
                    format!("Branch {} follows a DEFAULT branch and is unreachable", pos),
                );
            }
        }

        // C3: empty or repeated conditions
        if let Some(c3) = self.c3_conditions.clone() {
            for pos in c3.empty_conditions {
                self.push(
                    "c3",
                    FindingSeverity::Warning,
                    Some(pos),
                    format!("Branch {} has an empty condition", pos),
                );
            }
            for s in c3.shadowed {
                self.push(
                    "c3",
                    FindingSeverity::Warning,
                    Some(s.branch),
                    format!(
                        "Branch {} repeats the condition of branch {} ({}) and is shadowed",
                        s.branch, s.first_seen, s.condition
                    ),
                );
            }
        }

        // C4: outputs assigned by only some branches
        if let Some(c4) = self.c4_coverage.clone() {
            for (output, coverage) in c4.outputs {
                if coverage.missing_in.is_empty() {
                    continue;
                }
                let missing: Vec<String> =
                    coverage.missing_in.iter().map(|p| p.to_string()).collect();
                self.push(
                    "c4",
                    FindingSeverity::Info,
                    None,
                    format!(
                        "Output '{}' is not assigned in branch(es) {}",
                        output,
                        missing.join(", ")
                    ),
                );
            }
        }
    }
}
