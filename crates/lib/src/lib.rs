//! # voxtutor
//!
//! Core library for the AI Voice Tutor backend. It provides:
//!
//! - `providers::ai`: a pluggable `AiProvider` trait with Gemini and
//!   OpenAI-compatible implementations.
//! - `providers::db`: the local SQLite storage provider (Turso).
//! - `tutor`: the generative-answer orchestrator (prompt assembly plus
//!   spoken-delivery post-processing).
//! - `quiz`: the quiz orchestrator (prompt, parser, placeholder padding).
//! - `voice`: the voice synthesis orchestrator with its fallback behavior.
//! - `store`: typed persistence for uploaded documents and conversations.
//!
//! The HTTP surface lives in the `voxtutor-server` crate; user identity and
//! credentials live in `voxtutor-access`.

pub mod errors;
pub mod pdf_text;
pub mod prompts;
pub mod providers;
pub mod quiz;
pub mod store;
pub mod subject;
pub mod tutor;
pub mod voice;

pub use errors::{AiError, StorageError, VoiceError};
pub use providers::ai::AiProvider;
