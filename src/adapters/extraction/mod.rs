//! Extraction adapter
//!
//! Converts recognized text into the canonical bill record plus reviewable
//! field drafts with evidence. Two implementations: a live chat-completions
//! provider ([`OpenAiExtractionProvider`]) and a deterministic stub
//! ([`StubExtractionProvider`]).

pub mod client;
mod mapping;
pub mod openai;
pub mod provider;
pub mod stub;

pub use client::ExtractionClient;
pub use openai::OpenAiExtractionProvider;
pub use provider::{ExtractionOutcome, ExtractionProvider, FieldDraft};
pub use stub::StubExtractionProvider;
