//! Executor behavior with deterministic stub collaborators.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use rulescribe_agent::checker::AnalyzerChecker;
use rulescribe_agent::collaborators::{
    ContextFormatter, ContextRetriever, Differ, Explainer, MemoryStore, Planner, Rewriter,
    StaticChecker, TestGenerator, Verifier,
};
use rulescribe_agent::memory::{FileMemoryStore, Memory, MemoryFormatter};
use rulescribe_agent::offline::TemplateAnalyst;
use rulescribe_agent::plan::ModePlanner;
use rulescribe_agent::retrieve::DirRetriever;
use rulescribe_agent::{
    execute, AgentError, Collaborators, JsonTrace, Mode, TestCase, Verdict, DIFF_UNAVAILABLE,
    FALLBACK_EXPLANATION, NO_EXTRACTION_ISSUE, NO_OUTPUT, VERIFY_PRECONDITION_MISSING,
};
use rulescribe_core::Ruleset;

const RULE: &str = "if (a > 1) {\n  x = 1;\n} else {\n  x = 2;\n}\n";

// ──────────────────────────────────────────────
// Stubs
// ──────────────────────────────────────────────

struct FixedPlan(Vec<String>);

impl FixedPlan {
    fn new(steps: &[&str]) -> Self {
        Self(steps.iter().map(|s| s.to_string()).collect())
    }
}

impl Planner for FixedPlan {
    fn plan(&self, _mode: Mode) -> Result<Vec<String>, AgentError> {
        Ok(self.0.clone())
    }
}

/// Every collaborator role, with call counters and canned answers.
struct Stub {
    verdict: Verdict,
    issues: Vec<String>,
    memory_text: String,
    retrieved: String,
    fail_explain: bool,
    explanation: String,
    explain_calls: Cell<usize>,
    verify_calls: Cell<usize>,
    rewrite_calls: Cell<usize>,
    diff_calls: Cell<usize>,
    seen_context: RefCell<Option<String>>,
    seen_query: RefCell<Option<String>>,
    seen_missing: RefCell<Vec<String>>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            verdict: Verdict {
                ok: true,
                missing: Vec::new(),
                rewrite_needed: false,
            },
            issues: Vec::new(),
            memory_text: String::new(),
            retrieved: String::new(),
            fail_explain: false,
            explanation: "stub explanation".to_string(),
            explain_calls: Cell::new(0),
            verify_calls: Cell::new(0),
            rewrite_calls: Cell::new(0),
            diff_calls: Cell::new(0),
            seen_context: RefCell::new(None),
            seen_query: RefCell::new(None),
            seen_missing: RefCell::new(Vec::new()),
        }
    }
}

impl StaticChecker for Stub {
    fn check(&self, _ruleset: &Ruleset) -> Result<Vec<String>, AgentError> {
        Ok(self.issues.clone())
    }
}

impl ContextRetriever for Stub {
    fn retrieve(&self, query: &str, _kb_dir: &Path) -> Result<String, AgentError> {
        *self.seen_query.borrow_mut() = Some(query.to_string());
        Ok(self.retrieved.clone())
    }
}

impl MemoryStore for Stub {
    fn load(&self) -> Result<Memory, AgentError> {
        Ok(Memory::default())
    }
}

impl ContextFormatter for Stub {
    fn format(&self, _memory: &Memory) -> String {
        self.memory_text.clone()
    }
}

impl Explainer for Stub {
    fn explain(&self, _ruleset: &Ruleset, context: &str) -> Result<String, AgentError> {
        self.explain_calls.set(self.explain_calls.get() + 1);
        *self.seen_context.borrow_mut() = Some(context.to_string());
        if self.fail_explain {
            return Err(AgentError::Llm("connection refused".to_string()));
        }
        Ok(self.explanation.clone())
    }
}

impl Verifier for Stub {
    fn verify(&self, _ruleset: &Ruleset, _explanation: &str) -> Result<Verdict, AgentError> {
        self.verify_calls.set(self.verify_calls.get() + 1);
        Ok(self.verdict.clone())
    }
}

impl Rewriter for Stub {
    fn rewrite(
        &self,
        _ruleset: &Ruleset,
        explanation: &str,
        missing: &[String],
    ) -> Result<String, AgentError> {
        self.rewrite_calls.set(self.rewrite_calls.get() + 1);
        *self.seen_missing.borrow_mut() = missing.to_vec();
        Ok(format!("{} (rewritten)", explanation))
    }
}

impl Differ for Stub {
    fn diff(&self, _before: &Ruleset, _after: &Ruleset) -> Result<String, AgentError> {
        self.diff_calls.set(self.diff_calls.get() + 1);
        Ok("stub diff".to_string())
    }
}

impl TestGenerator for Stub {
    fn generate(&self, _ruleset: &Ruleset) -> Result<Vec<TestCase>, AgentError> {
        Ok(Vec::new())
    }
}

fn run_stub(
    planner: &dyn Planner,
    inputs: &[&str],
    stub: &Stub,
    trace: &mut JsonTrace,
) -> Result<String, AgentError> {
    let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
    let collaborators = Collaborators {
        planner,
        checker: stub,
        retriever: stub,
        kb_dir: Path::new("kb"),
        memory: stub,
        formatter: stub,
        explainer: stub,
        verifier: stub,
        rewriter: stub,
        differ: stub,
        test_generator: stub,
        trace,
    };
    execute(Mode::Agentic, &inputs, collaborators)
}

fn payload<'t>(trace: &'t JsonTrace, step: &str) -> &'t serde_json::Value {
    &trace
        .events()
        .iter()
        .find(|e| e.step == step)
        .unwrap_or_else(|| panic!("no '{}' event in {:?}", step, trace.step_names()))
        .payload
}

// ──────────────────────────────────────────────
// Guards and fallbacks
// ──────────────────────────────────────────────

#[test]
fn explain_before_parse_uses_fallback() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let out = run_stub(&FixedPlan::new(&["explain"]), &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, FALLBACK_EXPLANATION);
    assert_eq!(stub.explain_calls.get(), 0);
    assert_eq!(
        trace.step_names(),
        vec!["start", "plan", "explain_fallback", "finish"]
    );
}

#[test]
fn diff_with_one_input_reports_unavailable() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "parse", "diff"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, DIFF_UNAVAILABLE);
    assert_eq!(stub.diff_calls.get(), 0);
    assert_eq!(payload(&trace, "parse_skipped")["idx"], 1);
    assert_eq!(payload(&trace, "diff_fallback")["got"], 1);
}

#[test]
fn diff_with_two_inputs_calls_differ() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "parse", "diff"]);
    let out = run_stub(&planner, &[RULE, "if (b) {\n  y = 1;\n}\n"], &stub, &mut trace).unwrap();

    assert_eq!(out, "stub diff");
    assert_eq!(stub.diff_calls.get(), 1);
}

#[test]
fn rewrite_without_verdict_is_skipped() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "explain", "rewrite"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, "stub explanation");
    assert_eq!(stub.rewrite_calls.get(), 0);
    assert_eq!(payload(&trace, "rewrite_skipped")["ok"], serde_json::Value::Null);
}

#[test]
fn rewrite_is_skipped_after_passing_verdict() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "explain", "verify", "rewrite"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, "stub explanation");
    assert_eq!(stub.verify_calls.get(), 1);
    assert_eq!(stub.rewrite_calls.get(), 0);
    assert_eq!(payload(&trace, "rewrite_skipped")["ok"], true);
}

#[test]
fn rewrite_fires_after_failing_verdict() {
    let stub = Stub {
        verdict: Verdict {
            ok: false,
            missing: vec!["Otherwise branch".to_string()],
            rewrite_needed: true,
        },
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "explain", "verify", "rewrite"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, "stub explanation (rewritten)");
    assert_eq!(stub.rewrite_calls.get(), 1);
    assert_eq!(*stub.seen_missing.borrow(), vec!["Otherwise branch"]);
    assert_eq!(payload(&trace, "verify")["ok"], false);
}

#[test]
fn verify_without_inputs_records_precondition_verdict() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["verify", "rewrite"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(stub.verify_calls.get(), 0);
    assert_eq!(stub.rewrite_calls.get(), 0);
    let verdict = payload(&trace, "verify");
    assert_eq!(verdict["ok"], false);
    assert_eq!(verdict["missing"][0], VERIFY_PRECONDITION_MISSING);
    assert_eq!(verdict["rewrite_needed"], true);
    assert_eq!(payload(&trace, "rewrite_skipped")["ok"], false);
    assert_eq!(out, NO_OUTPUT);
}

#[test]
fn guarded_off_plan_produces_no_output_message() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "rewrite", "retrieve_context"]);
    let out = run_stub(&planner, &[], &stub, &mut trace).unwrap();

    assert_eq!(out, NO_OUTPUT);
    assert_eq!(trace.final_output(), Some(NO_OUTPUT));
    assert_eq!(stub.seen_query.borrow().as_deref(), Some(""));
}

#[test]
fn empty_plan_produces_no_output_message() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let out = run_stub(&FixedPlan::new(&[]), &[RULE], &stub, &mut trace).unwrap();
    assert_eq!(out, NO_OUTPUT);
}

#[test]
fn unknown_step_is_traced_and_ignored() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "summarize", "explain"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, "stub explanation");
    assert_eq!(payload(&trace, "unknown_step")["step"], "summarize");
    assert_eq!(
        trace.step_names(),
        vec!["start", "plan", "parse", "unknown_step", "explain", "finish"]
    );
}

#[test]
fn static_checks_before_parse_reports_missing_extraction() {
    let stub = Stub {
        issues: vec!["never used".to_string()],
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    run_stub(&FixedPlan::new(&["static_checks"]), &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(
        payload(&trace, "static_checks")["issues"],
        serde_json::json!([NO_EXTRACTION_ISSUE])
    );
}

#[test]
fn generate_tests_before_parse_emits_error_record() {
    let stub = Stub::default();
    let mut trace = JsonTrace::disabled();
    let out = run_stub(&FixedPlan::new(&["generate_tests"]), &[RULE], &stub, &mut trace).unwrap();

    let cases: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        cases,
        serde_json::json!([{
            "name": "error",
            "input": {},
            "expected": {},
            "note": "No extraction available"
        }])
    );
}

// ──────────────────────────────────────────────
// Context assembly
// ──────────────────────────────────────────────

#[test]
fn context_joins_memory_retrieval_and_static_notes_in_order() {
    let stub = Stub {
        memory_text: "Domain glossary:\n- x: payout".to_string(),
        retrieved: "[policy.md]\nx is capped".to_string(),
        issues: vec!["[info] something".to_string()],
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "static_checks", "retrieve_context", "explain"]);
    run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(
        stub.seen_context.borrow().as_deref(),
        Some(
            "Domain glossary:\n- x: payout\n\n[policy.md]\nx is capped\n\n\
             Static check notes:\n- [info] something"
        )
    );
    assert_eq!(stub.seen_query.borrow().as_deref(), Some(RULE));
}

#[test]
fn context_skips_empty_pieces() {
    let stub = Stub {
        retrieved: "[kb.md]\nonly this".to_string(),
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "retrieve_context", "explain"]);
    run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(
        stub.seen_context.borrow().as_deref(),
        Some("[kb.md]\nonly this")
    );
    assert_eq!(payload(&trace, "retrieve_context")["context_chars"], 17);
}

// ──────────────────────────────────────────────
// Failures
// ──────────────────────────────────────────────

#[test]
fn collaborator_error_is_traced_and_returned() {
    let stub = Stub {
        fail_explain: true,
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "explain", "verify"]);
    let err = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap_err();

    assert!(matches!(err, AgentError::Llm(_)));
    assert_eq!(stub.verify_calls.get(), 0);
    assert_eq!(trace.step_names().last(), Some(&"error"));
    assert_eq!(trace.final_output(), None);
    assert!(payload(&trace, "error")["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
}

// ──────────────────────────────────────────────
// Offline end to end
// ──────────────────────────────────────────────

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

#[test]
fn offline_verify_run_over_fixtures() {
    let root = workspace_root();
    let rule = std::fs::read_to_string(root.join("fixtures/rules/credit_v1.mvel")).unwrap();
    let kb_dir = root.join("fixtures/kb");
    let memory = FileMemoryStore::new(root.join("fixtures/memory.toml"));
    let retriever = DirRetriever::default();
    let analyst = TemplateAnalyst;
    let mut trace = JsonTrace::disabled();

    let collaborators = Collaborators {
        planner: &ModePlanner,
        checker: &AnalyzerChecker,
        retriever: &retriever,
        kb_dir: &kb_dir,
        memory: &memory,
        formatter: &MemoryFormatter,
        explainer: &analyst,
        verifier: &analyst,
        rewriter: &analyst,
        differ: &analyst,
        test_generator: &analyst,
        trace: &mut trace,
    };
    let out = execute(Mode::Verify, &[rule], collaborators).unwrap();

    assert!(out.contains("decision.tier"));
    assert!(out.contains("- Otherwise: decision.tier = \"DECLINE\"; decision.limit = 0."));
    assert_eq!(
        trace.step_names(),
        vec![
            "start",
            "plan",
            "parse",
            "static_checks",
            "retrieve_context",
            "explain",
            "verify",
            "rewrite_skipped",
            "finish"
        ]
    );
    assert_eq!(payload(&trace, "verify")["ok"], true);
    assert!(payload(&trace, "retrieve_context")["context_chars"].as_u64().unwrap() > 0);
}

#[test]
fn whitespace_explanation_is_returned_as_is() {
    let stub = Stub {
        explanation: "   ".to_string(),
        ..Stub::default()
    };
    let mut trace = JsonTrace::disabled();
    let planner = FixedPlan::new(&["parse", "explain"]);
    let out = run_stub(&planner, &[RULE], &stub, &mut trace).unwrap();

    assert_eq!(out, "   ");
}
