//! Static checker backed by the C1-C4 analysis suite.

use rulescribe_core::Ruleset;
use tracing::debug;

use crate::collaborators::StaticChecker;
use crate::error::AgentError;

/// Runs `rulescribe_analyze::analyze` and reports its findings as issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerChecker;

impl StaticChecker for AnalyzerChecker {
    fn check(&self, ruleset: &Ruleset) -> Result<Vec<String>, AgentError> {
        let report = rulescribe_analyze::analyze(ruleset);
        debug!(
            checks = report.checks_run.len(),
            findings = report.findings.len(),
            "static checks complete"
        );
        Ok(report.issues())
    }
}
