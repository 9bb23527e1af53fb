//! Turn dispatcher: retrieval, assembly, one provider call, transcript update.

use tracing::{debug, info, instrument, warn};

use tecnobot_shared::{Completion, CompletionProvider, ModelSelection, Result};

use crate::knowledge::KnowledgeBase;
use crate::retriever::{Retrieval, retrieve_detailed};
use crate::session::{PromptSettings, Session};

/// Everything needed to answer questions: knowledge, prompt settings, provider.
///
/// Immutable once built and shared by all sessions of the process.
#[derive(Debug)]
pub struct Assistant<P> {
    kb: KnowledgeBase,
    settings: PromptSettings,
    provider: P,
}

impl<P: CompletionProvider> Assistant<P> {
    pub fn new(kb: KnowledgeBase, settings: PromptSettings, provider: P) -> Self {
        Self {
            kb,
            settings,
            provider,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn settings(&self) -> &PromptSettings {
        &self.settings
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// A fresh session opening with the persona's greeting.
    pub fn new_session(&self, model: ModelSelection) -> Session {
        Session::new(model, &self.settings.persona.greeting)
    }

    /// Context that would be retrieved for `query`, without touching any session.
    pub fn lookup(&self, query: &str) -> Retrieval {
        retrieve_detailed(query, &self.kb, &self.settings.fallback_key)
    }

    /// Handle one user submission end to end.
    ///
    /// Makes exactly one provider call. On failure the error is returned, the
    /// session keeps the user message without a reply and accepts the next
    /// submission.
    #[instrument(skip_all, fields(session = %session.id(), model = %session.model()))]
    pub async fn dispatch(&self, session: &mut Session, text: &str) -> Result<Completion> {
        let turn = session.begin_turn(text, &self.kb, &self.settings)?;
        debug!(
            matched = ?turn.retrieval.matched,
            fallback = turn.retrieval.used_fallback,
            payload = turn.request.messages.len(),
            "prompt assembled"
        );

        let result = self.provider.complete(&turn.request).await;
        if let Err(e) = &result {
            warn!(error = %e, "dispatch failed");
        }

        let completion = session.finish_turn(result)?;
        info!(transcript = session.transcript().len(), "turn complete");
        Ok(completion)
    }
}
