//! Linear plan interpreter.
//!
//! A run fixes its plan up front, then walks it once. Each step checks its
//! own precondition and, when it does not hold, takes a fixed fallback
//! instead of failing. Only collaborator errors abort a run.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::collaborators::Collaborators;
use crate::error::AgentError;
use crate::plan::{Mode, Plan, Step};
use crate::state::{RunState, TestCase, Verdict};

/// Explanation used when `explain` runs before any successful parse.
pub const FALLBACK_EXPLANATION: &str =
    "Could not parse any rule branches from the provided rule script.";

/// Output of a `diff` step with fewer than two parsed rules.
pub const DIFF_UNAVAILABLE: &str = "Diff requires two parsed rules, but fewer were available.";

/// Substituted when every step left the output empty.
pub const NO_OUTPUT: &str = "No output was produced. Check the plan and earlier steps.";

/// The single issue reported by `static_checks` before any parse.
pub const NO_EXTRACTION_ISSUE: &str =
    "static_checks: no extraction available (parse not run yet).";

/// The missing item of the verdict recorded when `verify` has nothing to check.
pub const VERIFY_PRECONDITION_MISSING: &str = "verify: missing extraction or explanation";

/// Run `mode` over `inputs`.
///
/// The trace always receives a `finish` event and is flushed on success. On
/// a collaborator failure an `error` event is recorded, the trace is flushed
/// as far as possible, and the error is returned.
pub fn execute(
    mode: Mode,
    inputs: &[String],
    mut collaborators: Collaborators<'_>,
) -> Result<String, AgentError> {
    let result = Run::new(inputs, &mut collaborators).execute(mode);
    let trace = &mut *collaborators.trace;

    match result {
        Ok(output) => {
            trace.finish(&output);
            if let Some(path) = trace.write()? {
                info!(path = %path.display(), "trace written");
            }
            Ok(output)
        }
        Err(err) => {
            trace.log_step("error", json!({ "message": err.to_string() }));
            if let Err(write_err) = trace.write() {
                warn!(error = %write_err, "could not write trace after failed run");
            }
            Err(err)
        }
    }
}

/// One run in progress: the collaborators, the inputs, and the state the
/// step handlers share.
struct Run<'r, 'a> {
    c: &'r mut Collaborators<'a>,
    inputs: &'r [String],
    next_input: usize,
    memory_context: String,
    state: RunState,
}

impl<'r, 'a> Run<'r, 'a> {
    fn new(inputs: &'r [String], c: &'r mut Collaborators<'a>) -> Self {
        Self {
            c,
            inputs,
            next_input: 0,
            memory_context: String::new(),
            state: RunState::default(),
        }
    }

    fn execute(mut self, mode: Mode) -> Result<String, AgentError> {
        self.c.trace.log_step(
            "start",
            json!({ "mode": mode.as_str(), "inputs": self.inputs.len() }),
        );

        let memory = self.c.memory.load()?;
        self.memory_context = self.c.formatter.format(&memory);

        let plan = Plan::from_ids(&self.c.planner.plan(mode)?);
        self.c.trace.log_step("plan", json!({ "steps": plan.ids() }));
        info!(mode = %mode, steps = plan.len(), "plan fixed");

        for step in plan.steps() {
            debug!(step = step.id(), "running step");
            self.run_step(step)?;
        }

        if self.state.explanation.is_empty() {
            self.state.explanation = NO_OUTPUT.to_string();
        }
        Ok(self.state.explanation)
    }

    fn run_step(&mut self, step: &Step) -> Result<(), AgentError> {
        match step {
            Step::Parse => self.parse(),
            Step::StaticChecks => self.static_checks()?,
            Step::RetrieveContext => self.retrieve_context()?,
            Step::Explain => self.explain()?,
            Step::Verify => self.verify()?,
            Step::Rewrite => self.rewrite()?,
            Step::GenerateTests => self.generate_tests()?,
            Step::Diff => self.diff()?,
            Step::Unknown(id) => {
                warn!(step = %id, "ignoring unknown step");
                self.c.trace.log_step("unknown_step", json!({ "step": id }));
            }
        }
        Ok(())
    }

    fn parse(&mut self) {
        let idx = self.next_input;
        let Some(text) = self.inputs.get(idx) else {
            self.c.trace.log_step(
                "parse_skipped",
                json!({ "reason": "no unconsumed input", "idx": idx }),
            );
            return;
        };

        let ruleset = rulescribe_core::parse(text);
        self.c.trace.log_step(
            "parse",
            json!({
                "index": idx,
                "branches": ruleset.branches.len(),
                "outputs": ruleset.outputs,
            }),
        );
        self.state.rulesets.push(ruleset);
        self.next_input += 1;
    }

    fn static_checks(&mut self) -> Result<(), AgentError> {
        let issues = match self.state.rulesets.last() {
            Some(ruleset) => self.c.checker.check(ruleset)?,
            None => vec![NO_EXTRACTION_ISSUE.to_string()],
        };
        self.state.static_issues = issues;
        self.c.trace.log_step(
            "static_checks",
            json!({ "issues": self.state.static_issues }),
        );
        Ok(())
    }

    fn retrieve_context(&mut self) -> Result<(), AgentError> {
        let query = self.inputs.first().map(String::as_str).unwrap_or("");
        let retrieved = self.c.retriever.retrieve(query, self.c.kb_dir)?;

        let notes = if self.state.static_issues.is_empty() {
            String::new()
        } else {
            let bullets: Vec<String> = self
                .state
                .static_issues
                .iter()
                .map(|issue| format!("- {}", issue))
                .collect();
            format!("Static check notes:\n{}", bullets.join("\n"))
        };

        let pieces: Vec<&str> = [self.memory_context.as_str(), retrieved.as_str(), notes.as_str()]
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .collect();
        self.state.context = pieces.join("\n\n").trim().to_string();
        self.c.trace.log_step(
            "retrieve_context",
            json!({ "context_chars": self.state.context.chars().count() }),
        );
        Ok(())
    }

    fn explain(&mut self) -> Result<(), AgentError> {
        match self.state.rulesets.last() {
            Some(ruleset) => {
                let text = self.c.explainer.explain(ruleset, &self.state.context)?;
                self.state.explanation = text;
                self.c.trace.log_step(
                    "explain",
                    json!({ "explanation_chars": self.state.explanation.chars().count() }),
                );
            }
            None => {
                self.state.explanation = FALLBACK_EXPLANATION.to_string();
                self.c
                    .trace
                    .log_step("explain_fallback", json!({ "reason": "no parsed rule" }));
            }
        }
        Ok(())
    }

    fn verify(&mut self) -> Result<(), AgentError> {
        let verdict = match self.state.latest_ruleset() {
            Some(ruleset) if !self.state.explanation.is_empty() => {
                self.c.verifier.verify(ruleset, &self.state.explanation)?
            }
            _ => Verdict {
                ok: false,
                missing: vec![VERIFY_PRECONDITION_MISSING.to_string()],
                rewrite_needed: true,
            },
        };
        self.c.trace.log_step("verify", serde_json::to_value(&verdict)?);
        self.state.verdict = Some(verdict);
        Ok(())
    }

    fn rewrite(&mut self) -> Result<(), AgentError> {
        let failed = self.state.verdict.as_ref().filter(|v| !v.ok);

        match (failed, self.state.rulesets.last()) {
            (Some(verdict), Some(ruleset)) if !self.state.explanation.is_empty() => {
                let text =
                    self.c
                        .rewriter
                        .rewrite(ruleset, &self.state.explanation, &verdict.missing)?;
                self.state.explanation = text;
                self.c.trace.log_step(
                    "rewrite",
                    json!({ "explanation_chars": self.state.explanation.chars().count() }),
                );
            }
            _ => {
                let ok = self.state.verdict.as_ref().map(|v| v.ok);
                self.c.trace.log_step("rewrite_skipped", json!({ "ok": ok }));
            }
        }
        Ok(())
    }

    fn generate_tests(&mut self) -> Result<(), AgentError> {
        let cases = match self.state.latest_ruleset() {
            Some(ruleset) => self.c.test_generator.generate(ruleset)?,
            None => {
                self.c.trace.log_step(
                    "generate_tests_fallback",
                    json!({ "reason": "no parsed rule" }),
                );
                vec![TestCase {
                    name: "error".to_string(),
                    input: json!({}),
                    expected: json!({}),
                    note: Some("No extraction available".to_string()),
                }]
            }
        };
        self.c
            .trace
            .log_step("generate_tests", json!({ "count": cases.len() }));
        self.state.explanation = serde_json::to_string_pretty(&cases)?;
        Ok(())
    }

    fn diff(&mut self) -> Result<(), AgentError> {
        match self.state.rulesets.as_slice() {
            [before, after, ..] => {
                let text = self.c.differ.diff(before, after)?;
                self.state.explanation = text;
                self.c.trace.log_step(
                    "diff",
                    json!({ "explanation_chars": self.state.explanation.chars().count() }),
                );
            }
            _ => {
                self.state.explanation = DIFF_UNAVAILABLE.to_string();
                self.c.trace.log_step(
                    "diff_fallback",
                    json!({
                        "reason": "fewer than two parsed rules",
                        "got": self.state.rulesets.len(),
                    }),
                );
            }
        }
        Ok(())
    }
}
