//! LLM client for pmos
//!
//! Talks to an OpenAI-compatible chat-completions gateway. Structured output
//! goes through forced tool calls; plain JSON answers fall back to fenced-block
//! extraction.

mod ai_types;
mod chat;
mod client;
mod documents;
mod error;
mod impact;
mod stories;

#[cfg(test)]
mod tests;

pub use chat::{ChatRole, ChatTurn};
pub use client::{DEFAULT_MODEL, LlmClient, REQUEST_TIMEOUT_SECS, truncate};
pub use documents::PrdBrief;
pub use error::LlmError;
pub use impact::{ChangeSet, ReportDraft};
