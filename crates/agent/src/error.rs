use std::path::PathBuf;

/// All errors a run can surface. Missing preconditions (no ruleset yet,
/// too few rulesets for a diff) are never errors; they take the executor's
/// fallback paths instead.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Reading or writing a file (input, memory, knowledge base, trace) failed.
    #[error("could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration or memory file exists but cannot be parsed.
    #[error("could not parse '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// The text-generation backend could not be reached or rejected the call.
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The text-generation backend answered, but not in the expected shape.
    #[error("malformed {role} response: {message}")]
    MalformedResponse { role: &'static str, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AgentError::Io {
            path: path.into(),
            source,
        }
    }
}
