//! Shared types, error model, and configuration for TecnoBot.
//!
//! This crate is the foundation depended on by all other TecnoBot crates.
//! It provides:
//! - [`ChatbotError`]: the unified error type
//! - Domain types ([`Message`], [`Role`], [`Transcript`], [`ModelSelection`], [`SessionId`])
//! - The completion contract ([`CompletionProvider`], [`CompletionRequest`], [`Completion`])
//! - Configuration ([`AppConfig`], [`SecretSource`], config loading)

pub mod completion;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use completion::{Completion, CompletionProvider, CompletionRequest, SamplingParams};
pub use config::{
    ApiKey, AppConfig, DefaultsConfig, EnvSecrets, GroqConfig, SecretSource, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{ChatbotError, Result};
pub use types::{Message, ModelSelection, Role, SessionId, Transcript};
