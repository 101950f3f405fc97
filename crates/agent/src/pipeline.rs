//! Production wiring: builds the collaborators a [`Config`] describes and
//! runs the executor with them.

use tracing::info;

use crate::checker::AnalyzerChecker;
use crate::collaborators::{
    Collaborators, Differ, Explainer, Planner, Rewriter, TestGenerator, Verifier,
};
use crate::config::Config;
use crate::error::AgentError;
use crate::executor::execute;
use crate::memory::{FileMemoryStore, MemoryFormatter};
use crate::offline::TemplateAnalyst;
use crate::plan::{Mode, ModePlanner};
use crate::retrieve::DirRetriever;
use crate::trace::JsonTrace;

/// Which implementation backs the generation roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Deterministic templates, no network.
    Offline,
    /// An Ollama server per `[llm]`.
    #[cfg(feature = "ollama")]
    Ollama,
}

/// The planner and the five generation roles for one backend.
struct Roles<'r> {
    planner: &'r dyn Planner,
    explainer: &'r dyn Explainer,
    verifier: &'r dyn Verifier,
    rewriter: &'r dyn Rewriter,
    differ: &'r dyn Differ,
    test_generator: &'r dyn TestGenerator,
}

/// Run `mode` over `inputs` with collaborators built from `config`.
pub fn run(
    mode: Mode,
    inputs: &[String],
    config: &Config,
    backend: Backend,
) -> Result<String, AgentError> {
    info!(mode = %mode, inputs = inputs.len(), backend = ?backend, "starting run");

    match backend {
        Backend::Offline => {
            let analyst = TemplateAnalyst;
            let roles = Roles {
                planner: &ModePlanner,
                explainer: &analyst,
                verifier: &analyst,
                rewriter: &analyst,
                differ: &analyst,
                test_generator: &analyst,
            };
            run_with(mode, inputs, config, roles)
        }
        #[cfg(feature = "ollama")]
        Backend::Ollama => {
            use crate::llm::{LlmAnalyst, LlmPlanner, OllamaClient};

            let client = OllamaClient::from_config(&config.llm);
            let planner = LlmPlanner::new(&client);
            let analyst = LlmAnalyst::new(&client);
            let roles = Roles {
                planner: &planner,
                explainer: &analyst,
                verifier: &analyst,
                rewriter: &analyst,
                differ: &analyst,
                test_generator: &analyst,
            };
            run_with(mode, inputs, config, roles)
        }
    }
}

fn run_with(
    mode: Mode,
    inputs: &[String],
    config: &Config,
    roles: Roles<'_>,
) -> Result<String, AgentError> {
    let mut trace = JsonTrace::new(config.trace.enabled, &config.trace.dir, inputs);
    let retriever = DirRetriever::new(config.retrieval.top_k, config.retrieval.max_chars);
    let memory = FileMemoryStore::new(&config.memory.path);

    let collaborators = Collaborators {
        planner: roles.planner,
        checker: &AnalyzerChecker,
        retriever: &retriever,
        kb_dir: &config.retrieval.kb_dir,
        memory: &memory,
        formatter: &MemoryFormatter,
        explainer: roles.explainer,
        verifier: roles.verifier,
        rewriter: roles.rewriter,
        differ: roles.differ,
        test_generator: roles.test_generator,
        trace: &mut trace,
    };
    execute(mode, inputs, collaborators)
}
