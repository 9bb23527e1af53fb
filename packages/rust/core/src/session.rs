//! Per-session conversation state.
//!
//! A [`Session`] owns its transcript and selected model and moves between two
//! states: awaiting input and awaiting a model response. Turn handling is
//! split into [`Session::begin_turn`] and [`Session::finish_turn`] so any
//! interface (CLI loop, TUI, tests) can drive it around a provider call.

use tecnobot_shared::{
    ChatbotError, Completion, CompletionRequest, Message, ModelSelection, Result, SamplingParams,
    SessionId, Transcript,
};

use crate::assembler::{HISTORY_WINDOW, assemble};
use crate::knowledge::KnowledgeBase;
use crate::persona::Persona;
use crate::retriever::{FALLBACK_KEY, Retrieval, retrieve_detailed};

/// Where a session is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingInput,
    AwaitingResponse,
}

/// Prompt-building settings shared by every turn.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub persona: Persona,
    pub fallback_key: String,
    pub history_window: usize,
    pub sampling: SamplingParams,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            fallback_key: FALLBACK_KEY.to_string(),
            history_window: HISTORY_WINDOW,
            sampling: SamplingParams::default(),
        }
    }
}

/// Output of [`Session::begin_turn`]: what to send and how the context was found.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub request: CompletionRequest,
    pub retrieval: Retrieval,
}

/// One user's conversation.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    model: ModelSelection,
    transcript: Transcript,
    state: TurnState,
}

impl Session {
    /// Start a session whose transcript opens with `greeting` from the assistant.
    pub fn new(model: ModelSelection, greeting: &str) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(greeting));
        Self {
            id: SessionId::new(),
            model,
            transcript,
            state: TurnState::AwaitingInput,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn model(&self) -> ModelSelection {
        self.model
    }

    /// Change the model used for subsequent turns.
    pub fn set_model(&mut self, model: ModelSelection) {
        self.model = model;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.state == TurnState::AwaitingInput
    }

    /// Record the user's message and build the request for it.
    ///
    /// Rejects blank input and submissions while a response is pending; in
    /// both cases the transcript is left unchanged.
    pub fn begin_turn(
        &mut self,
        text: &str,
        kb: &KnowledgeBase,
        settings: &PromptSettings,
    ) -> Result<PreparedTurn> {
        if self.state != TurnState::AwaitingInput {
            return Err(ChatbotError::validation(
                "a response is still pending for the previous message",
            ));
        }
        if text.trim().is_empty() {
            return Err(ChatbotError::validation("message is empty"));
        }

        self.transcript.push(Message::user(text));

        let retrieval = retrieve_detailed(text, kb, &settings.fallback_key);
        let messages = assemble(
            &settings.persona,
            &self.transcript,
            &retrieval.context,
            settings.history_window,
        );
        let request = CompletionRequest::new(self.model, messages, settings.sampling);

        self.state = TurnState::AwaitingResponse;
        Ok(PreparedTurn { request, retrieval })
    }

    /// Apply the provider's result and return to awaiting input.
    ///
    /// On success the reply is appended as an assistant message. On failure
    /// (including an empty reply) nothing is appended, so the user message
    /// stays without an answer, and the error is handed back.
    pub fn finish_turn(&mut self, result: Result<Completion>) -> Result<Completion> {
        if self.state != TurnState::AwaitingResponse {
            return Err(ChatbotError::validation("no turn is pending"));
        }
        self.state = TurnState::AwaitingInput;

        let completion = result?;
        if completion.text.is_empty() {
            return Err(ChatbotError::Response("model returned an empty reply".into()));
        }

        self.transcript.push(Message::assistant(completion.text.clone()));
        Ok(completion)
    }
}
