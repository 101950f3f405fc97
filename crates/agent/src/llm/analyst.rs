use rulescribe_core::Ruleset;
use tracing::{debug, warn};

use super::prompts::{self, Prompt};
use super::response::{extract_json_array, extract_json_object, truncate};
use super::TextGenerator;
use crate::collaborators::{Differ, Explainer, Planner, Rewriter, TestGenerator, Verifier};
use crate::error::AgentError;
use crate::plan::{Mode, ModePlanner};
use crate::state::{TestCase, Verdict};

/// How much of a bad reply to quote in an error.
const REPLY_EXCERPT_CHARS: usize = 200;

/// Explainer, verifier, rewriter, differ, and test generator over one
/// text-generation backend.
pub struct LlmAnalyst<'g> {
    llm: &'g dyn TextGenerator,
}

impl<'g> LlmAnalyst<'g> {
    pub fn new(llm: &'g dyn TextGenerator) -> Self {
        Self { llm }
    }

    fn ask(&self, prompt: Prompt) -> Result<String, AgentError> {
        self.llm.generate(&prompt.system, &prompt.user)
    }
}

impl Explainer for LlmAnalyst<'_> {
    fn explain(&self, ruleset: &Ruleset, context: &str) -> Result<String, AgentError> {
        let reply = self.ask(prompts::explain_prompt(ruleset, context))?;
        Ok(reply.trim().to_string())
    }
}

impl Verifier for LlmAnalyst<'_> {
    fn verify(&self, ruleset: &Ruleset, explanation: &str) -> Result<Verdict, AgentError> {
        let reply = self.ask(prompts::verify_prompt(ruleset, explanation))?;
        let json = extract_json_object(&reply).ok_or_else(|| malformed("verify", &reply))?;
        serde_json::from_str(json).map_err(|e| AgentError::MalformedResponse {
            role: "verify",
            message: format!("{} in: {}", e, truncate(json, REPLY_EXCERPT_CHARS)),
        })
    }
}

impl Rewriter for LlmAnalyst<'_> {
    fn rewrite(
        &self,
        ruleset: &Ruleset,
        explanation: &str,
        missing: &[String],
    ) -> Result<String, AgentError> {
        let reply = self.ask(prompts::rewrite_prompt(ruleset, explanation, missing))?;
        Ok(reply.trim().to_string())
    }
}

impl Differ for LlmAnalyst<'_> {
    fn diff(&self, before: &Ruleset, after: &Ruleset) -> Result<String, AgentError> {
        let reply = self.ask(prompts::diff_prompt(before, after))?;
        Ok(reply.trim().to_string())
    }
}

impl TestGenerator for LlmAnalyst<'_> {
    fn generate(&self, ruleset: &Ruleset) -> Result<Vec<TestCase>, AgentError> {
        let reply = self.ask(prompts::tests_prompt(ruleset))?;
        let json = extract_json_array(&reply).ok_or_else(|| malformed("tests", &reply))?;
        serde_json::from_str(json).map_err(|e| AgentError::MalformedResponse {
            role: "tests",
            message: format!("{} in: {}", e, truncate(json, REPLY_EXCERPT_CHARS)),
        })
    }
}

fn malformed(role: &'static str, reply: &str) -> AgentError {
    AgentError::MalformedResponse {
        role,
        message: format!(
            "no JSON found in reply: {}",
            truncate(reply.trim(), REPLY_EXCERPT_CHARS)
        ),
    }
}

/// Planner that asks the model for a step list in agentic mode.
///
/// Other modes, and agentic replies that are not a JSON array of strings,
/// get the fixed [`ModePlanner`] sequence. Identifiers are passed through
/// unfiltered; the executor turns anything unrecognized into a no-op.
pub struct LlmPlanner<'g> {
    llm: &'g dyn TextGenerator,
}

impl<'g> LlmPlanner<'g> {
    pub fn new(llm: &'g dyn TextGenerator) -> Self {
        Self { llm }
    }
}

impl Planner for LlmPlanner<'_> {
    fn plan(&self, mode: Mode) -> Result<Vec<String>, AgentError> {
        if mode != Mode::Agentic {
            return ModePlanner.plan(mode);
        }

        let prompt = prompts::plan_prompt(mode);
        let reply = self.llm.generate(&prompt.system, &prompt.user)?;
        let steps = extract_json_array(&reply)
            .and_then(|json| serde_json::from_str::<Vec<String>>(json).ok())
            .filter(|steps| !steps.is_empty());

        match steps {
            Some(steps) => {
                debug!(steps = ?steps, "model-proposed plan");
                Ok(steps)
            }
            None => {
                warn!(
                    reply = %truncate(reply.trim(), REPLY_EXCERPT_CHARS),
                    "unusable plan reply, using the fixed plan"
                );
                ModePlanner.plan(mode)
            }
        }
    }
}
