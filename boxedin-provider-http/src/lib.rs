//! A generic JSON chat-completion [`PlanGenerator`] for boxedin — spec.md
//! §4.4.
//!
//! `PlanGenerator` is explicitly out of scope as a product surface
//! (spec.md §1): "any text-in/text-out provider satisfies it". This
//! crate supplies one reference implementation — a single `POST` to a
//! configurable chat-completions-shaped endpoint — so the workspace has
//! something real to run `AgentLoop` against. Nothing in `boxedin-agent`
//! depends on this crate; any other `PlanGenerator` plugs in unchanged.

use async_trait::async_trait;
use boxedin_core::provider::{PlanGenerator, PlanGeneratorError, PlanRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default context window, in tokens, used to trim the assembled prompt
/// (spec.md §4.4) when the caller doesn't override it.
pub const DEFAULT_CONTEXT_WINDOW: usize = 8192;

/// A `PlanGenerator` backed by one HTTP POST to a chat-completions-style
/// endpoint (OpenAI-, Ollama-, and most self-hosted gateways' wire
/// shape: `{model, messages, temperature}` in, `choices[0].message.content`
/// out by default).
///
/// Per spec.md §4.4, assembly of the final prompt (system prompt +
/// `Available tools:` block + flattened transcript, tail-truncated to
/// `context_window * CHARS_PER_TOKEN` characters) happens here, inside
/// the transport — `boxedin-agent` only ever hands over the structured
/// [`PlanRequest`].
pub struct HttpPlanGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    response_path: Vec<ResponsePathSegment>,
    context_window: usize,
}

/// One segment of the path used to pull the completion text out of the
/// provider's JSON response — either an object field or an array index.
/// Lets [`HttpPlanGenerator::with_response_path`] target providers whose
/// response shape differs from the OpenAI-style default
/// (`choices.0.message.content`).
#[derive(Debug, Clone)]
pub enum ResponsePathSegment {
    /// `obj[field]`.
    Field(String),
    /// `arr[index]`.
    Index(usize),
}

fn default_response_path() -> Vec<ResponsePathSegment> {
    vec![
        ResponsePathSegment::Field("choices".into()),
        ResponsePathSegment::Index(0),
        ResponsePathSegment::Field("message".into()),
        ResponsePathSegment::Field("content".into()),
    ]
}

impl HttpPlanGenerator {
    /// Create a provider posting to `base_url` with `model`, using the
    /// default OpenAI-compatible response shape.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            response_path: default_response_path(),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override where the completion text lives in the JSON response.
    pub fn with_response_path(mut self, path: Vec<ResponsePathSegment>) -> Self {
        self.response_path = path;
        self
    }

    /// Override the token budget used to trim the assembled prompt.
    pub fn with_context_window(mut self, tokens: usize) -> Self {
        self.context_window = tokens;
        self
    }

    fn build_request(&self, request: &PlanRequest) -> ChatCompletionRequest {
        let prompt = boxedin_planner::assemble(request, self.context_window);
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: request.temperature,
        }
    }

    fn extract_text(&self, body: &Value) -> Option<String> {
        let mut cursor = body;
        for segment in &self.response_path {
            cursor = match segment {
                ResponsePathSegment::Field(name) => cursor.get(name)?,
                ResponsePathSegment::Index(i) => cursor.get(i)?,
            };
        }
        cursor.as_str().map(|s| s.to_string())
    }
}

#[async_trait]
impl PlanGenerator for HttpPlanGenerator {
    async fn complete(&self, request: PlanRequest) -> Result<String, PlanGeneratorError> {
        let body = self.build_request(&request);
        let mut req = self.client.post(&self.base_url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| PlanGeneratorError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "plan generator returned a non-success status");
            return Err(PlanGeneratorError::RequestFailed(format!(
                "http {status}: {body}"
            )));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| PlanGeneratorError::RequestFailed(e.to_string()))?;

        self.extract_text(&parsed)
            .filter(|text| !text.is_empty())
            .ok_or(PlanGeneratorError::Empty)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxedin_core::provider::PlanMessage;

    fn request(system: &str, user: &str) -> PlanRequest {
        PlanRequest {
            system_prompt: system.to_string(),
            messages: vec![PlanMessage::new("user", user)],
            temperature: 0.2,
            tools_description: None,
        }
    }

    #[test]
    fn build_request_assembles_one_flattened_prompt() {
        let provider = HttpPlanGenerator::new("http://localhost/v1/chat", "test-model");
        let body = provider.build_request(&request("you are an agent", "do the thing"));
        assert_eq!(body.model, "test-model");
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert!(body.messages[0].content.starts_with("you are an agent"));
        assert!(body.messages[0].content.contains("USER: do the thing"));
    }

    #[test]
    fn build_request_inlines_tools_description() {
        let provider = HttpPlanGenerator::new("http://localhost/v1/chat", "test-model");
        let mut req = request("sys", "hi");
        req.tools_description = Some("- echo: echoes input".to_string());
        let body = provider.build_request(&req);
        assert!(body.messages[0].content.contains("Available tools:"));
        assert!(body.messages[0].content.contains("echoes input"));
    }

    #[test]
    fn build_request_honors_context_window_truncation() {
        let provider = HttpPlanGenerator::new("http://localhost/v1/chat", "test-model")
            .with_context_window(5);
        let long = PlanMessage::new("user", "a".repeat(200));
        let req = PlanRequest {
            system_prompt: "sys".to_string(),
            messages: vec![long],
            temperature: 0.2,
            tools_description: None,
        };
        let body = provider.build_request(&req);
        assert!(body.messages[0].content.len() <= 20);
    }

    #[test]
    fn extract_text_follows_default_openai_shaped_path() {
        let provider = HttpPlanGenerator::new("http://localhost", "m");
        let body = serde_json::json!({
            "choices": [{"message": {"content": "hello from the model"}}]
        });
        assert_eq!(
            provider.extract_text(&body),
            Some("hello from the model".to_string())
        );
    }

    #[test]
    fn extract_text_follows_a_custom_path() {
        let provider = HttpPlanGenerator::new("http://localhost", "m").with_response_path(vec![
            ResponsePathSegment::Field("response".into()),
        ]);
        let body = serde_json::json!({"response": "custom shape"});
        assert_eq!(provider.extract_text(&body), Some("custom shape".to_string()));
    }

    #[test]
    fn extract_text_returns_none_on_missing_path() {
        let provider = HttpPlanGenerator::new("http://localhost", "m");
        let body = serde_json::json!({"unexpected": "shape"});
        assert_eq!(provider.extract_text(&body), None);
    }
}
