//! Application configuration for TecnoBot.
//!
//! User config lives at `~/.tecnobot/tecnobot.toml`.
//! CLI flags override config file values, which override defaults.
//! The API key is never stored in the file, only the name of the variable
//! it is read from.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ChatbotError, Result};
use crate::types::ModelSelection;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tecnobot.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tecnobot";

// ---------------------------------------------------------------------------
// Config structs (matching tecnobot.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Groq endpoint settings.
    #[serde(default)]
    pub groq: GroqConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path to the keyword → text knowledge file.
    #[serde(default = "default_knowledge_path")]
    pub knowledge_path: PathBuf,

    /// Model selected when a session starts.
    #[serde(default)]
    pub model: ModelSelection,

    /// How many user/assistant turns are sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Knowledge key used when no keyword matches.
    #[serde(default = "default_fallback_key")]
    pub fallback_key: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            knowledge_path: default_knowledge_path(),
            model: ModelSelection::default(),
            history_window: default_history_window(),
            fallback_key: default_fallback_key(),
        }
    }
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("conocimiento.json")
}
fn default_history_window() -> usize {
    10
}
fn default_fallback_key() -> String {
    "instituto".into()
}

/// `[groq]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_base_url() -> Url {
    Url::parse("https://api.groq.com/openai/v1").expect("static URL is valid")
}
fn default_timeout_secs() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

/// Where secret values come from. Resolved once at startup.
pub trait SecretSource {
    /// Look up a secret by name. Empty values count as absent.
    fn secret(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.trim().is_empty()).cloned()
    }
}

/// An API credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Resolve the Groq API key named by the config from `secrets`.
pub fn resolve_api_key(config: &AppConfig, secrets: &dyn SecretSource) -> Result<ApiKey> {
    let var_name = &config.groq.api_key_env;
    match secrets.secret(var_name) {
        Some(key) => Ok(ApiKey::new(key.trim())),
        None => Err(ChatbotError::config(format!(
            "Groq API key not found. Set the {var_name} environment variable \
             (or add it to a .env file).\nGet a key at https://console.groq.com/keys"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tecnobot/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ChatbotError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tecnobot/tecnobot.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ChatbotError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ChatbotError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.defaults.history_window == 0 {
        return Err(ChatbotError::config(format!(
            "{}: history_window must be at least 1",
            path.display()
        )));
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ChatbotError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ChatbotError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ChatbotError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("knowledge_path"));
        assert!(toml_str.contains("GROQ_API_KEY"));
        assert!(toml_str.contains("llama3-70b-8192"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.history_window, 10);
        assert_eq!(parsed.defaults.fallback_key, "instituto");
        assert_eq!(parsed.groq.api_key_env, "GROQ_API_KEY");
        assert_eq!(parsed.groq.base_url.as_str(), "https://api.groq.com/openai/v1");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
model = "mixtral-8x7b-32768"
knowledge_path = "/srv/bot/conocimiento.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.model, ModelSelection::Mixtral8x7b);
        assert_eq!(
            config.defaults.knowledge_path,
            PathBuf::from("/srv/bot/conocimiento.json")
        );
        assert_eq!(config.defaults.history_window, 10);
        assert_eq!(config.groq.timeout_secs, 60);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let toml_str = r#"
[defaults]
model = "gpt-4"
"#;
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn load_config_from_rejects_zero_window() {
        let path = std::env::temp_dir().join(format!("tecnobot_cfg_{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, "[defaults]\nhistory_window = 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("history_window"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn api_key_resolution() {
        let config = AppConfig::default();

        let empty: HashMap<String, String> = HashMap::new();
        let err = resolve_api_key(&config, &empty).unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("GROQ_API_KEY"));

        let blank = HashMap::from([("GROQ_API_KEY".to_string(), "   ".to_string())]);
        assert!(resolve_api_key(&config, &blank).is_err());

        let set = HashMap::from([("GROQ_API_KEY".to_string(), "gsk_test\n".to_string())]);
        let key = resolve_api_key(&config, &set).unwrap();
        assert_eq!(key.expose(), "gsk_test");
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
    }

    #[test]
    fn env_secrets_ignores_missing_var() {
        assert!(EnvSecrets.secret("TECNOBOT_TEST_NONEXISTENT_KEY_12345").is_none());
    }
}
