//! Startup wiring: config + overrides + secrets → a ready [`Assistant`].
//!
//! Every failure here is fatal: the caller reports it and exits before
//! accepting any input.

use std::path::PathBuf;

use tracing::info;

use tecnobot_groq::{GroqClient, GroqOptions};
use tecnobot_shared::{AppConfig, ModelSelection, Result, SamplingParams, SecretSource, resolve_api_key};

use crate::dispatch::Assistant;
use crate::knowledge::KnowledgeBase;
use crate::persona::Persona;
use crate::session::PromptSettings;

/// Values given on the command line, taking precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct StartupOverrides {
    pub knowledge_path: Option<PathBuf>,
    pub model: Option<ModelSelection>,
}

/// Resolved startup state.
#[derive(Debug)]
pub struct Startup {
    pub assistant: Assistant<GroqClient>,
    /// Model new sessions start with.
    pub model: ModelSelection,
}

/// Knowledge file path after applying overrides.
pub fn knowledge_path(config: &AppConfig, overrides: &StartupOverrides) -> PathBuf {
    overrides
        .knowledge_path
        .clone()
        .unwrap_or_else(|| config.defaults.knowledge_path.clone())
}

/// Model new sessions start with, after applying overrides.
pub fn initial_model(config: &AppConfig, overrides: &StartupOverrides) -> ModelSelection {
    overrides.model.unwrap_or(config.defaults.model)
}

/// Prompt settings derived from the config.
pub fn prompt_settings(config: &AppConfig) -> PromptSettings {
    PromptSettings {
        persona: Persona::default(),
        fallback_key: config.defaults.fallback_key.clone(),
        history_window: config.defaults.history_window,
        sampling: SamplingParams::default(),
    }
}

/// Load only the knowledge base (no credential needed).
pub fn load_knowledge(config: &AppConfig, overrides: &StartupOverrides) -> Result<KnowledgeBase> {
    KnowledgeBase::load(&knowledge_path(config, overrides))
}

/// Load the knowledge base, resolve the API key, and build the assistant.
pub fn bootstrap(
    config: &AppConfig,
    overrides: &StartupOverrides,
    secrets: &dyn SecretSource,
) -> Result<Startup> {
    let kb = load_knowledge(config, overrides)?;
    let api_key = resolve_api_key(config, secrets)?;
    let client = GroqClient::new(api_key, &GroqOptions::from(&config.groq))?;

    let model = initial_model(config, overrides);
    info!(
        endpoint = client.endpoint(),
        %model,
        knowledge_entries = kb.len(),
        "assistant ready"
    );

    Ok(Startup {
        assistant: Assistant::new(kb, prompt_settings(config), client),
        model,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tecnobot_shared::ChatbotError;

    fn fixture_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/knowledge/conocimiento.json")
    }

    fn secrets() -> HashMap<String, String> {
        HashMap::from([("GROQ_API_KEY".to_string(), "gsk_test".to_string())])
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = AppConfig::default();
        config.defaults.model = ModelSelection::Llama3_8b;
        let overrides = StartupOverrides {
            knowledge_path: Some("/tmp/otro.json".into()),
            model: Some(ModelSelection::Mixtral8x7b),
        };
        assert_eq!(knowledge_path(&config, &overrides), PathBuf::from("/tmp/otro.json"));
        assert_eq!(initial_model(&config, &overrides), ModelSelection::Mixtral8x7b);

        let none = StartupOverrides::default();
        assert_eq!(knowledge_path(&config, &none), PathBuf::from("conocimiento.json"));
        assert_eq!(initial_model(&config, &none), ModelSelection::Llama3_8b);
    }

    #[test]
    fn bootstrap_succeeds_with_key_and_knowledge() {
        let overrides = StartupOverrides {
            knowledge_path: Some(fixture_path()),
            model: None,
        };
        let startup = bootstrap(&AppConfig::default(), &overrides, &secrets()).unwrap();
        assert_eq!(startup.model, ModelSelection::Llama3_70b);
        assert!(!startup.assistant.knowledge().is_empty());
        assert_eq!(startup.assistant.settings().history_window, 10);
    }

    #[test]
    fn missing_key_halts_startup() {
        let overrides = StartupOverrides {
            knowledge_path: Some(fixture_path()),
            model: None,
        };
        let err = bootstrap(&AppConfig::default(), &overrides, &HashMap::new()).unwrap_err();
        assert!(matches!(err, ChatbotError::Config { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_knowledge_halts_startup() {
        let overrides = StartupOverrides {
            knowledge_path: Some(std::env::temp_dir().join(format!(
                "tecnobot_absent_{}.json",
                uuid::Uuid::now_v7()
            ))),
            model: None,
        };
        let err = bootstrap(&AppConfig::default(), &overrides, &secrets()).unwrap_err();
        assert!(matches!(err, ChatbotError::KnowledgeNotFound { .. }));
    }
}
