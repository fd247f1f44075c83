//! Error types for iXBRL extraction.
//!
//! Only [`ExtractError::MalformedDocument`] and [`ExtractError::Io`] ever
//! escape the extraction pipeline. Unit and number problems are raised for a
//! single fact, logged, and absorbed by skipping that fact.

use thiserror::Error;

/// Errors that can occur while extracting financial facts.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Structural prerequisites of the document (context or unit registry) are missing.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A fact carries a unit the extractor cannot use for its concept.
    #[error("Unsupported unit {unit} on fact {fact}")]
    UnsupportedUnit { fact: String, unit: String },

    /// The raw text of a numeric fact could not be read as a number.
    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),

    /// Reading the document from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }
}

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::malformed("no context registry");
        assert_eq!(err.to_string(), "Malformed document: no context registry");

        let err = ExtractError::UnsupportedUnit {
            fact: "core:TurnoverRevenue".to_string(),
            unit: "iso4217:USD".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported unit iso4217:USD on fact core:TurnoverRevenue"
        );
    }
}
