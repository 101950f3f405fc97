//! Ollama chat client -- calls `POST {base_url}/api/chat` with streaming
//! disabled and returns the assistant message content.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextGenerator;
use crate::config::LlmConfig;
use crate::error::AgentError;

/// Blocking client for a local or remote Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        let defaults = LlmConfig::default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: defaults.temperature,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

// ── Request / Response types ─────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl TextGenerator for OllamaClient {
    fn generate(&self, system: &str, user: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        let url = self.chat_url();
        debug!(model = %self.model, url = %url, prompt_chars = user.len(), "calling Ollama");

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();
        let response = agent
            .post(&url)
            .send_json(&request)
            .map_err(|e| AgentError::Llm(format!("POST {} failed: {}", url, e)))?;

        let reply: ChatResponse = response.into_body().read_json().map_err(|e| {
            AgentError::MalformedResponse {
                role: "ollama",
                message: format!("could not decode chat response: {}", e),
            }
        })?;

        let content = reply
            .message
            .map(|m| m.content)
            .ok_or_else(|| AgentError::MalformedResponse {
                role: "ollama",
                message: "chat response contained no message".to_string(),
            })?;
        debug!(reply_chars = content.len(), "Ollama replied");
        Ok(content.trim().to_string())
    }
}
