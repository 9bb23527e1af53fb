//! Error types for TecnoBot.
//!
//! Library crates use [`ChatbotError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all TecnoBot operations.
#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    /// Configuration loading or validation error (including a missing API key).
    #[error("config error: {message}")]
    Config { message: String },

    /// The knowledge file does not exist.
    #[error("knowledge file not found: {path:?}")]
    KnowledgeNotFound { path: PathBuf },

    /// The knowledge file exists but is not a JSON object of strings.
    #[error("knowledge file {path:?} is not valid: {message}")]
    KnowledgeMalformed { path: PathBuf, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Transport failure talking to the completion endpoint (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The completion endpoint answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The completion endpoint answered 2xx but the body was unusable.
    #[error("response error: {0}")]
    Response(String),

    /// Invalid input or state (empty message, unknown model, turn already pending).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ChatbotError>;

impl ChatbotError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a malformed-knowledge error for `path`.
    pub fn malformed(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::KnowledgeMalformed {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Startup errors: the session must stop before accepting input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::KnowledgeNotFound { .. }
                | Self::KnowledgeMalformed { .. }
                | Self::Io { .. }
        )
    }

    /// Per-turn failures: reported to the user, session stays usable.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api { .. } | Self::Response(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ChatbotError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ChatbotError::Api {
            status: 401,
            message: "Invalid API Key".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 401): Invalid API Key");
    }

    #[test]
    fn classification() {
        assert!(ChatbotError::config("x").is_fatal());
        assert!(
            ChatbotError::KnowledgeNotFound {
                path: "conocimiento.json".into()
            }
            .is_fatal()
        );
        assert!(ChatbotError::malformed("k.json", "expected object").is_fatal());

        let net = ChatbotError::Network("timed out".into());
        assert!(net.is_dispatch());
        assert!(!net.is_fatal());

        let empty = ChatbotError::validation("empty message");
        assert!(!empty.is_fatal());
        assert!(!empty.is_dispatch());
    }
}
