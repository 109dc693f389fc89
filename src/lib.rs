//! # Meterbox - Energy-Bill Document Processing Engine
//!
//! Meterbox drives scanned energy bills through a two-stage pipeline (text
//! recognition, then structured-field extraction), merges per-document
//! results into a project-level canonical aggregate with unit normalization
//! to MWh, and runs an ordered battery of validation rules whose
//! severity-graded flags gate export.
//!
//! ## Architecture
//!
//! Meterbox follows a layered architecture:
//!
//! - [`core`] - Business logic (pipeline, aggregation, validation, review)
//! - [`adapters`] - External integrations (recognition, extraction, storage)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meterbox::adapters::store::{DocumentStore, MemoryStore};
//! use meterbox::config::MeterboxConfig;
//! use meterbox::core::ProcessingEngine;
//! use meterbox::domain::{Document, DocumentId, ProjectId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Without API keys configured, deterministic stub providers run.
//!     let config = MeterboxConfig::default();
//!     let store = Arc::new(MemoryStore::new());
//!     let engine = ProcessingEngine::new(&config, store.clone(), store.clone())?;
//!
//!     let document = Document::new(
//!         DocumentId::generate(),
//!         ProjectId::new("project-1")?,
//!         "stored.pdf",
//!         "january-bill.pdf",
//!         None,
//!     );
//!     let document_id = document.id.clone();
//!     store.insert_document(document, std::fs::read("january-bill.pdf")?).await?;
//!
//!     let processed = engine.process_document(&document_id).await?;
//!     println!("status: {:?}", processed.status);
//!
//!     let (flags, can_export) = engine.validate_project(&processed.project_id).await?;
//!     println!("{} flags, can_export = {can_export}", flags.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Isolation
//!
//! Stage failures never surface as `Err` from the pipeline: they are
//! recorded on the document (`RecognitionFailed` / `ExtractionFailed` with
//! the verbatim provider message) and the caller inspects the returned
//! [`domain::Document`]. Only invariant violations (missing document,
//! storage failure) propagate as [`domain::MeterboxError`].
//!
//! Data-quality problems likewise never fail validation: they surface as
//! [`domain::ValidationFlag`]s, and only blocking flags that are neither
//! resolved nor acknowledged gate export.
//!
//! ## Logging
//!
//! Meterbox uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(document_id = "doc-1", "Processing document");
//! warn!(attempt = 2, delay_ms = 2000, "Transient recognition failure, retrying");
//! ```

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

pub use config::MeterboxConfig;
pub use core::ProcessingEngine;
pub use domain::{MeterboxError, Result};
