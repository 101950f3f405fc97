//! Static checks over extracted rulesets -- C1-C4 suite with structured
//! output.
//!
//! Each check is a separate module producing a serializable result
//! struct. The `analyze()` function runs all checks and aggregates their
//! results into an `AnalysisReport`; `AnalysisReport::issues()` renders
//! the findings as plain strings.

pub mod c1_structure;
pub mod c2_defaults;
pub mod c3_conditions;
pub mod c4_coverage;
pub mod report;

use rulescribe_core::Ruleset;

pub use c1_structure::C1Result;
pub use c2_defaults::C2Result;
pub use c3_conditions::{C3Result, ShadowedCondition};
pub use c4_coverage::{C4Result, OutputCoverage};
pub use report::{AnalysisReport, Finding, FindingSeverity};

/// Names accepted by [`analyze_selected`].
pub const CHECK_NAMES: &[&str] = &["c1", "c2", "c3", "c4"];

/// Run the full C1-C4 suite on a ruleset.
pub fn analyze(ruleset: &Ruleset) -> AnalysisReport {
    analyze_selected(ruleset, CHECK_NAMES)
}

/// Run selected checks on a ruleset. Unknown names are ignored.
pub fn analyze_selected(ruleset: &Ruleset, checks: &[&str]) -> AnalysisReport {
    let mut report = AnalysisReport::new();

    if checks.contains(&"c1") {
        report.c1_structure = Some(c1_structure::analyze_structure(ruleset));
        report.checks_run.push("c1".to_string());
    }
    if checks.contains(&"c2") {
        report.c2_defaults = Some(c2_defaults::analyze_defaults(ruleset));
        report.checks_run.push("c2".to_string());
    }
    if checks.contains(&"c3") {
        report.c3_conditions = Some(c3_conditions::analyze_conditions(ruleset));
        report.checks_run.push("c3".to_string());
    }
    if checks.contains(&"c4") {
        report.c4_coverage = Some(c4_coverage::analyze_coverage(ruleset));
        report.checks_run.push("c4".to_string());
    }

    report.extract_findings();
    report
}
