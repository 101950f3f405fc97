//! Run trace: an ordered log of step events plus the final output.
//!
//! Events are always recorded; `enabled` only decides whether `write()`
//! persists them to `{dir}/run-<id>.json`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::AgentError;

/// Receives step events from the executor.
pub trait TraceRecorder {
    fn log_step(&mut self, name: &str, payload: serde_json::Value);
    fn finish(&mut self, output: &str);
    /// Flush the trace. Returns the written path when something was persisted.
    fn write(&mut self) -> Result<Option<PathBuf>, AgentError>;
}

/// One recorded step event.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub step: String,
    /// Milliseconds since the trace was created.
    pub elapsed_ms: u64,
    pub payload: serde_json::Value,
}

/// On-disk shape of a persisted trace.
#[derive(Serialize)]
struct TraceFile<'a> {
    run_id: &'a str,
    started_at: &'a str,
    events: &'a [TraceEvent],
    final_output: Option<&'a str>,
}

/// JSON-file trace recorder.
#[derive(Debug)]
pub struct JsonTrace {
    enabled: bool,
    dir: PathBuf,
    run_id: String,
    started_at: String,
    started: Instant,
    events: Vec<TraceEvent>,
    final_output: Option<String>,
}

impl JsonTrace {
    /// `inputs` only contribute to the run id, so identical inputs started
    /// in the same second share an id prefix and suffix.
    pub fn new(enabled: bool, dir: &Path, inputs: &[String]) -> Self {
        let now = OffsetDateTime::now_utc();
        let stamp = now
            .format(format_description!(
                "[year][month][day]T[hour][minute][second]"
            ))
            .unwrap_or_else(|_| "00000000T000000".to_string());
        let started_at = now.format(&Rfc3339).unwrap_or_default();

        Self {
            enabled,
            dir: dir.to_path_buf(),
            run_id: format!("{}-{}", stamp, input_digest(inputs)),
            started_at,
            started: Instant::now(),
            events: Vec::new(),
            final_output: None,
        }
    }

    /// A trace that records events in memory and never persists.
    pub fn disabled() -> Self {
        Self::new(false, Path::new("."), &[])
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Step names in recording order.
    pub fn step_names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.step.as_str()).collect()
    }

    pub fn final_output(&self) -> Option<&str> {
        self.final_output.as_deref()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("run-{}.json", self.run_id))
    }
}

impl TraceRecorder for JsonTrace {
    fn log_step(&mut self, name: &str, payload: serde_json::Value) {
        debug!(step = name, payload = %payload, "trace event");
        self.events.push(TraceEvent {
            step: name.to_string(),
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            payload,
        });
    }

    fn finish(&mut self, output: &str) {
        self.log_step(
            "finish",
            serde_json::json!({ "output_chars": output.chars().count() }),
        );
        self.final_output = Some(output.to_string());
    }

    fn write(&mut self) -> Result<Option<PathBuf>, AgentError> {
        if !self.enabled {
            return Ok(None);
        }

        std::fs::create_dir_all(&self.dir).map_err(|e| AgentError::io(&self.dir, e))?;
        let file = TraceFile {
            run_id: &self.run_id,
            started_at: &self.started_at,
            events: &self.events,
            final_output: self.final_output.as_deref(),
        };
        let path = self.path();
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&path, json).map_err(|e| AgentError::io(&path, e))?;
        debug!(path = %path.display(), "trace written");
        Ok(Some(path))
    }
}

/// First 8 hex digits of the SHA-256 of all inputs.
fn input_digest(inputs: &[String]) -> String {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .take(4)
        .map(|b| format!("{:02x}", b))
        .collect()
}
