//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for the identifiers flowing through
//! the pipeline. Each type ensures type safety (a `FieldId` can never be
//! passed where a `DocumentId` is expected) and validates basic format
//! compliance.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from a string
            ///
            /// Returns `Err` if the string is empty or whitespace-only.
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id))
            }

            /// Generates a fresh random (UUID v4) identifier
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Project identifier newtype wrapper
    ///
    /// A project owns a set of documents and the canonical aggregate derived
    /// from them.
    ///
    /// # Examples
    ///
    /// ```
    /// use meterbox::domain::ids::ProjectId;
    /// use std::str::FromStr;
    ///
    /// let project_id = ProjectId::from_str("7d44b88c-4199-4bad-97dc-d78268e01398").unwrap();
    /// assert_eq!(project_id.as_str(), "7d44b88c-4199-4bad-97dc-d78268e01398");
    /// ```
    ProjectId,
    "Project ID"
);

string_id!(
    /// Document identifier newtype wrapper
    ///
    /// Identifies one uploaded source file (energy bill) undergoing processing.
    DocumentId,
    "Document ID"
);

string_id!(
    /// Extraction identifier newtype wrapper
    ///
    /// Identifies one versioned extraction attempt for a document.
    ExtractionId,
    "Extraction ID"
);

string_id!(
    /// Extracted-field identifier newtype wrapper
    FieldId,
    "Field ID"
);

string_id!(
    /// Validation-flag identifier newtype wrapper
    FlagId,
    "Flag ID"
);
