//! Conversation pipeline for TecnoBot.
//!
//! Ties together knowledge loading, keyword retrieval, prompt assembly and
//! the per-session turn state machine into a single dispatch call.

pub mod assembler;
pub mod bootstrap;
pub mod dispatch;
pub mod knowledge;
pub mod persona;
pub mod retriever;
pub mod session;

pub use bootstrap::{Startup, StartupOverrides, bootstrap};
pub use dispatch::Assistant;
pub use knowledge::KnowledgeBase;
pub use persona::Persona;
pub use retriever::{Retrieval, retrieve};
pub use session::{PromptSettings, Session, TurnState};
