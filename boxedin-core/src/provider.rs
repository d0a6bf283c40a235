//! The PlanGenerator protocol — external LLM transport.
//!
//! Deliberately narrow: any text-in/text-out provider satisfies
//! this trait. `boxedin-provider-http` ships one reference
//! implementation; nothing in `boxedin-agent` depends on which one is
//! plugged in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single message in the flattened transcript handed to the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMessage {
    /// `"user"`, `"assistant"`, or `"system"`.
    pub role: String,
    /// The message text.
    pub content: String,
}

impl PlanMessage {
    /// Construct a message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// A request for one text completion.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// The system prompt.
    pub system_prompt: String,
    /// The flattened message transcript.
    pub messages: Vec<PlanMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// An optional `Available tools:` block, pre-rendered by
    /// `ToolStore::ToPrompt`.
    pub tools_description: Option<String>,
}

/// Errors from the planner transport.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PlanGeneratorError {
    /// The transport call itself failed (network, auth, etc).
    #[error("plan generator request failed: {0}")]
    RequestFailed(String),
    /// The provider returned no usable text.
    #[error("plan generator returned an empty response")]
    Empty,

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Protocol — text completion with a system prompt, message list, and
/// temperature. Any provider (Anthropic, OpenAI, Ollama, a local model,
/// a scripted test double) implements this the same way.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Produce one text completion for `request`.
    async fn complete(&self, request: PlanRequest) -> Result<String, PlanGeneratorError>;
}
