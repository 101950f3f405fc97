//! Text-generation backed collaborators.
//!
//! Everything here talks to a [`TextGenerator`], so the prompt and
//! response-recovery logic is testable with a canned generator; only
//! `ollama` touches the network.

pub mod analyst;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod prompts;
pub mod response;

pub use analyst::{LlmAnalyst, LlmPlanner};
#[cfg(feature = "ollama")]
pub use ollama::OllamaClient;

use crate::error::AgentError;

/// A blocking text-generation capability.
pub trait TextGenerator {
    /// Generate a reply to `user` under the `system` instruction.
    fn generate(&self, system: &str, user: &str) -> Result<String, AgentError>;
}
