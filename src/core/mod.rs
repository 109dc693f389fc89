//! Core processing logic
//!
//! Unit normalization, the two-stage document pipeline, the canonical
//! aggregator, the validation engine, the field-edit recalculator and the
//! [`ProcessingEngine`] facade that wires them together.

pub mod aggregate;
pub mod engine;
pub mod pipeline;
pub mod review;
pub mod units;
pub mod validation;

pub use aggregate::Aggregator;
pub use engine::ProcessingEngine;
pub use pipeline::DocumentPipeline;
pub use review::{FieldEdit, FieldReviewer};
pub use validation::{can_export, ValidationEngine};
