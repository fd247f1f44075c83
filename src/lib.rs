pub mod core;
pub mod error;
pub mod ixbrl;

// Re-exports
pub use core::config::ExtractorConfig;
pub use error::{ExtractError, Result};
pub use ixbrl::{
    extract_file, extract_financials, extract_from_document, ExtractionResult, FieldValue,
    FilingMetadata, Status,
};
