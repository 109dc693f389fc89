//! External system adapters
//!
//! Each adapter isolates one outside concern behind a trait: text
//! recognition providers, structured-extraction providers, and persistence.

pub mod extraction;
pub mod recognition;
pub mod store;
