//! Prompt construction for each generation role.
//!
//! Every prompt embeds the ruleset as pretty JSON, the same shape the
//! parser serializes, so the model sees exactly the extracted structure.

use rulescribe_core::{diff_rulesets, Ruleset};

use crate::plan::{Mode, STEP_VOCABULARY};

/// A system/user prompt pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

const PLAIN_LANGUAGE_SYSTEM: &str = "You write for non-technical stakeholders. \
Describe business rules precisely, without adding logic that is not in the rule.";

const JSON_ONLY_SYSTEM: &str = "You are a meticulous business-rules reviewer. \
Return ONLY JSON. No explanation, no markdown, no code fences.";

// ── Explain / rewrite ─────────────────────────────────────────────────────────

pub fn explain_prompt(ruleset: &Ruleset, context: &str) -> Prompt {
    let mut user = String::from(
        "Convert this rule structure into clear English.\n\n\
         Rules:\n\
         - Start with a one-sentence summary\n\
         - Then list the decision logic as bullets, one per branch, in order\n\
         - Use 'Otherwise' for the DEFAULT branch\n\
         - Mention every output by name\n\n",
    );
    if !context.trim().is_empty() {
        user.push_str("Background context:\n");
        user.push_str(context.trim());
        user.push_str("\n\n");
    }
    user.push_str("Rule structure:\n");
    user.push_str(&ruleset.to_json_pretty());

    Prompt {
        system: PLAIN_LANGUAGE_SYSTEM.to_string(),
        user,
    }
}

pub fn rewrite_prompt(ruleset: &Ruleset, explanation: &str, missing: &[String]) -> Prompt {
    let mut user = String::from(
        "A reviewer found problems with this explanation of a rule. \
         Rewrite it so that it is complete and accurate. Keep the same format \
         (summary, then bullets; 'Otherwise' for DEFAULT). Return only the \
         revised explanation.\n\n",
    );
    user.push_str("Problems found:\n");
    if missing.is_empty() {
        user.push_str("- (none listed; check every branch and output)\n");
    }
    for item in missing {
        user.push_str(&format!("- {}\n", item));
    }
    user.push_str("\nCurrent explanation:\n");
    user.push_str(explanation.trim());
    user.push_str("\n\nRule structure:\n");
    user.push_str(&ruleset.to_json_pretty());

    Prompt {
        system: PLAIN_LANGUAGE_SYSTEM.to_string(),
        user,
    }
}

// ── Verify ────────────────────────────────────────────────────────────────────

pub fn verify_prompt(ruleset: &Ruleset, explanation: &str) -> Prompt {
    let user = format!(
        "Check whether the explanation below covers the rule structure completely \
         and accurately: every branch condition, the DEFAULT branch if present, \
         and every output assignment.\n\n\
         Return a JSON object:\n\
         {{\"ok\": true | false, \"missing\": [\"<each omitted or misstated item>\"], \
         \"rewrite_needed\": true | false}}\n\n\
         Rule structure:\n{}\n\nExplanation:\n{}",
        ruleset.to_json_pretty(),
        explanation.trim()
    );
    Prompt {
        system: JSON_ONLY_SYSTEM.to_string(),
        user,
    }
}

// ── Diff ──────────────────────────────────────────────────────────────────────

pub fn diff_prompt(before: &Ruleset, after: &Ruleset) -> Prompt {
    let structural = diff_rulesets(before, after);
    let user = format!(
        "Explain in plain English what changed between rule A and rule B. \
         Cover added, removed, and modified branches and outputs, and what the \
         change means for the people affected. Do not describe unchanged logic \
         in detail.\n\n\
         Rule A:\n{}\n\nRule B:\n{}\n\nStructural changes (A -> B):\n{}",
        before.to_json_pretty(),
        after.to_json_pretty(),
        structural.to_string().trim_end()
    );
    Prompt {
        system: PLAIN_LANGUAGE_SYSTEM.to_string(),
        user,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

pub fn tests_prompt(ruleset: &Ruleset) -> Prompt {
    let user = format!(
        "Design test cases for this rule. Provide at least one case per branch, \
         including the DEFAULT branch if present. Inputs must satisfy exactly the \
         branch under test.\n\n\
         Return a JSON array. Each element must be:\n\
         {{\"name\": \"<short snake_case name>\", \"input\": {{<variable>: <value>}}, \
         \"expected\": {{<output>: <value>}}}}\n\n\
         Rule structure:\n{}",
        ruleset.to_json_pretty()
    );
    Prompt {
        system: JSON_ONLY_SYSTEM.to_string(),
        user,
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

pub fn plan_prompt(mode: Mode) -> Prompt {
    let user = format!(
        "Plan a pipeline for analysing a business rule in '{}' mode.\n\
         Available steps: {}.\n\
         'parse' must come before any step that needs a parsed rule; use it once \
         per input. 'rewrite' only helps after 'verify'.\n\n\
         Return a JSON array of step names in execution order.",
        mode,
        STEP_VOCABULARY.join(", ")
    );
    Prompt {
        system: JSON_ONLY_SYSTEM.to_string(),
        user,
    }
}
