//! Narrow interfaces the executor drives.
//!
//! The executor owns no generation, retrieval, or persistence logic of its
//! own; every such effect goes through one of these traits so a run can be
//! driven by deterministic stubs in tests and by the LLM-backed or
//! template-backed implementations in production.

use std::path::Path;

use rulescribe_core::Ruleset;

use crate::error::AgentError;
use crate::memory::Memory;
use crate::plan::Mode;
use crate::state::{TestCase, Verdict};
use crate::trace::TraceRecorder;

/// Produces the ordered step identifiers for a run.
pub trait Planner {
    fn plan(&self, mode: Mode) -> Result<Vec<String>, AgentError>;
}

/// Static checks over one ruleset.
pub trait StaticChecker {
    fn check(&self, ruleset: &Ruleset) -> Result<Vec<String>, AgentError>;
}

/// Context lookup keyed by query text in a knowledge-base location.
pub trait ContextRetriever {
    fn retrieve(&self, query: &str, kb_dir: &Path) -> Result<String, AgentError>;
}

/// Long-lived user preferences and domain vocabulary.
pub trait MemoryStore {
    fn load(&self) -> Result<Memory, AgentError>;
}

/// Renders a memory object as prompt context.
pub trait ContextFormatter {
    fn format(&self, memory: &Memory) -> String;
}

pub trait Explainer {
    fn explain(&self, ruleset: &Ruleset, context: &str) -> Result<String, AgentError>;
}

pub trait Verifier {
    fn verify(&self, ruleset: &Ruleset, explanation: &str) -> Result<Verdict, AgentError>;
}

pub trait Rewriter {
    fn rewrite(
        &self,
        ruleset: &Ruleset,
        explanation: &str,
        missing: &[String],
    ) -> Result<String, AgentError>;
}

pub trait Differ {
    fn diff(&self, before: &Ruleset, after: &Ruleset) -> Result<String, AgentError>;
}

pub trait TestGenerator {
    fn generate(&self, ruleset: &Ruleset) -> Result<Vec<TestCase>, AgentError>;
}

/// Everything one run needs besides its mode and inputs.
pub struct Collaborators<'a> {
    pub planner: &'a dyn Planner,
    pub checker: &'a dyn StaticChecker,
    pub retriever: &'a dyn ContextRetriever,
    pub kb_dir: &'a Path,
    pub memory: &'a dyn MemoryStore,
    pub formatter: &'a dyn ContextFormatter,
    pub explainer: &'a dyn Explainer,
    pub verifier: &'a dyn Verifier,
    pub rewriter: &'a dyn Rewriter,
    pub differ: &'a dyn Differ,
    pub test_generator: &'a dyn TestGenerator,
    pub trace: &'a mut dyn TraceRecorder,
}
