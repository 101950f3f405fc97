//! Run configuration, read from TOML.
//!
//! # Example
//!
//! ```toml
//! [llm]
//! base_url = "http://127.0.0.1:11434"
//! model = "llama3.1"
//! temperature = 0.0
//! timeout_secs = 120
//!
//! [trace]
//! enabled = true
//! dir = "runs"
//!
//! [retrieval]
//! kb_dir = "kb"
//! top_k = 3
//! max_chars = 1200
//!
//! [memory]
//! path = "memory.toml"
//! ```
//!
//! Every section and field is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rulescribe.toml";

/// Environment variable overriding `llm.base_url`.
pub const OLLAMA_URL_ENV: &str = "RULESCRIBE_OLLAMA_URL";

// ── Types ─────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub trace: TraceConfig,
    pub retrieval: RetrievalConfig,
    pub memory: MemoryConfig,
}

/// `[llm]` section: the text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Whole-request timeout for one generation call.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.0,
            timeout_secs: 120,
        }
    }
}

/// `[trace]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Persist the run trace as JSON. Events are recorded either way.
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("runs"),
        }
    }
}

/// `[retrieval]` section: the knowledge-base directory searched for context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub kb_dir: PathBuf,
    pub top_k: usize,
    /// Per-document character cap in the assembled context.
    pub max_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            kb_dir: PathBuf::from("kb"),
            top_k: 3,
            max_chars: 1200,
        }
    }
}

/// `[memory]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub path: PathBuf,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("memory.toml"),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl Config {
    /// Parse a config from TOML text. `origin` is only used in errors.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, AgentError> {
        toml::from_str(content).map_err(|e| AgentError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, AgentError> {
        let content = std::fs::read_to_string(path).map_err(|e| AgentError::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    /// Resolve the effective config: `explicit` must exist; otherwise
    /// `./rulescribe.toml` is used if present; otherwise defaults. The
    /// environment override is applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, AgentError> {
        let mut config = match explicit {
            Some(path) => Self::read(path)?,
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::read(local)?
                } else {
                    debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injected for tests).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(OLLAMA_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.llm.base_url = url.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml_str("", Path::new("empty.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.retrieval.top_k, 3);
        assert!(!config.trace.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let toml = "[llm]\nmodel = \"qwen3:8b\"\n\n[trace]\nenabled = true\n";
        let config = Config::from_toml_str(toml, Path::new("partial.toml")).unwrap();
        assert_eq!(config.llm.model, "qwen3:8b");
        assert_eq!(config.llm.base_url, "http://127.0.0.1:11434");
        assert!(config.trace.enabled);
        assert_eq!(config.trace.dir, PathBuf::from("runs"));
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let err = Config::from_toml_str("[llm\nmodel=", Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| {
            (key == OLLAMA_URL_ENV).then(|| "http://gpu-box:11434".to_string())
        });
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");

        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.llm.base_url, "http://gpu-box:11434");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, AgentError::Io { .. }));
    }
}
