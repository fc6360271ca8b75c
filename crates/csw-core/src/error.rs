//! # Error Types
//!
//! Errors raised while constructing the primitive types of this crate.
//! Higher crates wrap these in their own `thiserror` enums; nothing here
//! knows about stores, validation runs, or override decisions.

use thiserror::Error;

/// Top-level error type for primitive construction and parsing.
#[derive(Error, Debug)]
pub enum CswError {
    /// An identifier was empty or otherwise malformed.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// The identifier namespace (e.g. "holder", "substance").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A country code was not an ISO 3166-1 alpha-2 code.
    #[error("invalid country code {0:?}: expected two ASCII letters")]
    InvalidCountryCode(String),

    /// A string did not name any variant of a closed enum.
    #[error("unknown {kind}: {value:?}")]
    UnknownVariant {
        /// The enum being parsed (e.g. "transaction type").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CswError {
    /// Shorthand for [`CswError::UnknownVariant`].
    pub fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}
