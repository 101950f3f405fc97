//! Deterministic, template-driven analyst for runs without a model.
//!
//! Every role is a pure function of the ruleset, so offline runs are
//! reproducible and usable in CI.

use rulescribe_core::ruleset::{assignment_target, assignment_value};
use rulescribe_core::{diff_rulesets, Branch, Ruleset};

use crate::collaborators::{Differ, Explainer, Rewriter, TestGenerator, Verifier};
use crate::error::AgentError;
use crate::state::{TestCase, Verdict};

/// Template-backed explainer, verifier, rewriter, differ, and test generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateAnalyst;

impl Explainer for TemplateAnalyst {
    fn explain(&self, ruleset: &Ruleset, _context: &str) -> Result<String, AgentError> {
        let outputs: Vec<&str> = ruleset.outputs.iter().map(String::as_str).collect();
        let summary = if outputs.is_empty() {
            format!(
                "Summary: This rule checks {} condition(s) but assigns no outputs.",
                ruleset.branches.len()
            )
        } else {
            format!(
                "Summary: This rule sets {} based on {} branch(es).",
                outputs.join(", "),
                ruleset.branches.len()
            )
        };

        let mut text = summary;
        text.push('\n');
        for branch in &ruleset.branches {
            text.push_str(&format!("\n- {}", describe_branch(branch)));
        }
        Ok(text)
    }
}

fn describe_branch(branch: &Branch) -> String {
    let lead = if branch.condition.is_default() {
        "Otherwise".to_string()
    } else if branch.condition.as_str().is_empty() {
        "If (no condition given)".to_string()
    } else {
        format!("If {}", branch.condition)
    };
    let effect = if branch.actions.is_empty() {
        "no assignments are made.".to_string()
    } else {
        format!("{}.", branch.actions.join("; "))
    };
    format!("{}: {}", lead, effect)
}

impl Verifier for TemplateAnalyst {
    fn verify(&self, ruleset: &Ruleset, explanation: &str) -> Result<Verdict, AgentError> {
        let mut missing = Vec::new();

        for output in &ruleset.outputs {
            if !explanation.contains(output.as_str()) {
                missing.push(format!("output '{}'", output));
            }
        }
        for branch in &ruleset.branches {
            let cond = branch.condition.as_str();
            if branch.condition.is_default() || cond.is_empty() {
                continue;
            }
            let item = format!("condition '{}'", cond);
            if !explanation.contains(cond) && !missing.contains(&item) {
                missing.push(item);
            }
        }
        if ruleset.has_default() && !explanation.to_lowercase().contains("otherwise") {
            missing.push("Otherwise (DEFAULT) branch".to_string());
        }

        let ok = missing.is_empty();
        Ok(Verdict {
            ok,
            missing,
            rewrite_needed: !ok,
        })
    }
}

impl Rewriter for TemplateAnalyst {
    fn rewrite(
        &self,
        _ruleset: &Ruleset,
        explanation: &str,
        missing: &[String],
    ) -> Result<String, AgentError> {
        if missing.is_empty() {
            return Ok(explanation.to_string());
        }
        let mut text = explanation.trim_end().to_string();
        text.push_str("\n\nAlso covers:");
        for item in missing {
            text.push_str(&format!("\n- {}", item));
        }
        Ok(text)
    }
}

impl Differ for TemplateAnalyst {
    fn diff(&self, before: &Ruleset, after: &Ruleset) -> Result<String, AgentError> {
        let structural = diff_rulesets(before, after);
        Ok(format!(
            "Comparing rule A to rule B:\n\n{}",
            structural.to_string().trim_end()
        ))
    }
}

impl TestGenerator for TemplateAnalyst {
    fn generate(&self, ruleset: &Ruleset) -> Result<Vec<TestCase>, AgentError> {
        Ok(ruleset
            .branches
            .iter()
            .enumerate()
            .map(|(i, branch)| branch_case(i + 1, branch))
            .collect())
    }
}

fn branch_case(position: usize, branch: &Branch) -> TestCase {
    let mut expected = serde_json::Map::new();
    for action in &branch.actions {
        if let (Some(lhs), Some(rhs)) = (assignment_target(action), assignment_value(action)) {
            if lhs.is_empty() {
                continue;
            }
            expected.insert(lhs.to_string(), literal_value(rhs));
        }
    }

    let (name, note) = if branch.condition.is_default() {
        (
            format!("branch_{}_default", position),
            "Choose inputs that match none of the earlier conditions.".to_string(),
        )
    } else {
        (
            format!("branch_{}", position),
            "Choose inputs that satisfy this condition and none before it.".to_string(),
        )
    };

    TestCase {
        name,
        input: serde_json::json!({ "condition": branch.condition.as_str() }),
        expected: serde_json::Value::Object(expected),
        note: Some(note),
    }
}

/// JSON literal if the right-hand side parses as one, the raw text otherwise.
fn literal_value(rhs: &str) -> serde_json::Value {
    serde_json::from_str(rhs).unwrap_or_else(|_| serde_json::Value::String(rhs.to_string()))
}
