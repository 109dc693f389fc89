//! Recognition adapter
//!
//! Converts a document's raw bytes into per-page text plus
//! language/confidence metadata. Two implementations: a live
//! network-backed provider with retry/backoff ([`MistralOcrProvider`]) and
//! a deterministic stub ([`StubRecognitionProvider`]).

pub mod client;
pub mod mistral;
pub mod provider;
pub mod stub;

pub use client::RecognitionClient;
pub use mistral::MistralOcrProvider;
pub use provider::{RecognitionOutcome, RecognitionProvider, RecognizedPage};
pub use stub::StubRecognitionProvider;
