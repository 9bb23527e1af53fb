//! OpenAI-compatible chat-completions wire format.

use serde::{Deserialize, Serialize};
use tecnobot_shared::{ChatbotError, Completion, CompletionRequest, Message, Result};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(req: &'a CompletionRequest) -> Self {
        Self {
            model: req.model.as_str(),
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stream: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
}

/// Error envelope: `{"error": {"message": "...", "type": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ChatCompletionResponse {
    /// Take the first choice's content, falling back to `requested_model` for the model id.
    pub(crate) fn into_completion(self, requested_model: &str) -> Result<Completion> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ChatbotError::Response("completion has no choices".into()))?;

        Ok(Completion {
            text,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            prompt_tokens: self.usage.as_ref().and_then(|u| u.prompt_tokens),
            completion_tokens: self.usage.as_ref().and_then(|u| u.completion_tokens),
        })
    }
}

/// Best-effort extraction of the provider's error message from a response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty error body".to_string(),
        Err(_) => body.chars().take(200).collect(),
    }
}
