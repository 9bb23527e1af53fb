//! Contract between the conversation layer and a hosted completion provider.

use std::future::Future;

use crate::error::Result;
use crate::types::{Message, ModelSelection};

/// Sampling temperature sent with every request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Output token cap sent with every request.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Fixed sampling parameters for a completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A fully assembled request: model, ordered messages, sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: ModelSelection,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(model: ModelSelection, messages: Vec<Message>, sampling: SamplingParams) -> Self {
        Self {
            model,
            messages,
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
        }
    }
}

/// A single completion returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Model id reported by the provider (may differ in suffix from the request).
    pub model: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

impl Completion {
    /// A completion with no usage information.
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }
}

/// Something that can turn a [`CompletionRequest`] into a [`Completion`].
///
/// Implementations make exactly one attempt per call.
pub trait CompletionProvider: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<Completion>> + Send;
}
