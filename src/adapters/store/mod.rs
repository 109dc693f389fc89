//! Storage adapter
//!
//! Defines the persistence ports ([`DocumentStore`],
//! [`ProjectConfigProvider`]) and the in-memory reference implementation
//! ([`MemoryStore`]).

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::{DocumentStore, ProjectConfigProvider};
