//! User preferences and domain glossary, loaded once per run and
//! rendered into the retrieval context.
//!
//! # Example
//!
//! ```toml
//! [preferences]
//! audience = "loan officers"
//!
//! [glossary]
//! PRIME = "lowest-risk product tier"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::collaborators::{ContextFormatter, MemoryStore};
use crate::error::AgentError;

/// Long-lived memory: free-form preferences and term definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Memory {
    pub preferences: BTreeMap<String, String>,
    pub glossary: BTreeMap<String, String>,
}

impl Memory {
    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && self.glossary.is_empty()
    }
}

/// Memory backed by a TOML file. A missing file is an empty memory.
#[derive(Debug, Clone)]
pub struct FileMemoryStore {
    path: PathBuf,
}

impl FileMemoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryStore for FileMemoryStore {
    fn load(&self) -> Result<Memory, AgentError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no memory file, starting empty");
            return Ok(Memory::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| AgentError::io(&self.path, e))?;
        toml::from_str(&content).map_err(|e| AgentError::Config {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// Renders memory as bullet blocks. Empty memory renders as empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryFormatter;

impl ContextFormatter for MemoryFormatter {
    fn format(&self, memory: &Memory) -> String {
        let mut blocks = Vec::new();

        if !memory.preferences.is_empty() {
            let mut block = String::from("User preferences:");
            for (key, value) in &memory.preferences {
                block.push_str(&format!("\n- {}: {}", key, value));
            }
            blocks.push(block);
        }
        if !memory.glossary.is_empty() {
            let mut block = String::from("Domain glossary:");
            for (term, meaning) in &memory.glossary {
                block.push_str(&format!("\n- {}: {}", term, meaning));
            }
            blocks.push(block);
        }

        blocks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_memory() {
        let store = FileMemoryStore::new("/no/such/memory.toml");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn file_memory_round_trips_through_formatter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.toml");
        std::fs::write(
            &path,
            "[preferences]\naudience = \"analysts\"\n\n[glossary]\nAPR = \"annual percentage rate\"\n",
        )
        .unwrap();

        let memory = FileMemoryStore::new(&path).load().unwrap();
        assert_eq!(memory.preferences["audience"], "analysts");
        assert_eq!(
            MemoryFormatter.format(&memory),
            "User preferences:\n- audience: analysts\n\nDomain glossary:\n- APR: annual percentage rate"
        );
    }

    #[test]
    fn malformed_memory_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.toml");
        std::fs::write(&path, "[preferences\n").unwrap();
        let err = FileMemoryStore::new(&path).load().unwrap_err();
        assert!(matches!(err, AgentError::Config { .. }));
    }

    #[test]
    fn empty_memory_formats_to_nothing() {
        assert_eq!(MemoryFormatter.format(&Memory::default()), "");
    }
}
