//! Plan-driven orchestration over parsed rule scripts.
//!
//! A run takes a [`Mode`] and one or two rule-script texts, asks a
//! [`collaborators::Planner`] for a fixed step list, and interprets it with
//! [`execute`]. Generation, retrieval, memory, and tracing are all reached
//! through the traits in [`collaborators`]; [`pipeline::run`] wires the
//! production implementations from a [`Config`].

pub mod checker;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod memory;
pub mod offline;
pub mod pipeline;
pub mod plan;
pub mod retrieve;
pub mod state;
pub mod trace;

pub use collaborators::Collaborators;
pub use config::Config;
pub use error::AgentError;
pub use executor::{
    execute, DIFF_UNAVAILABLE, FALLBACK_EXPLANATION, NO_EXTRACTION_ISSUE, NO_OUTPUT,
    VERIFY_PRECONDITION_MISSING,
};
pub use pipeline::{run, Backend};
pub use plan::{Mode, Plan, Step};
pub use state::{RunState, TestCase, Verdict};
pub use trace::{JsonTrace, TraceRecorder};
