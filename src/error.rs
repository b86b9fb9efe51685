// In: src/error.rs

//! This module defines the single, unified error type for the n-gram stage.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Schema incompatibilities are *not* errors: they are collected as
//! `ValidationFailure`s during configuration. Only `ValidationFailed` wraps them,
//! and only when a caller explicitly asks for a hard stop via `get_or_throw`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NGramError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to the stage's logic)
    // =========================================================================
    /// A configuration value is present but semantically invalid (e.g. `ngramSize <= 0`).
    #[error("Invalid configuration for '{property}': {reason}")]
    InvalidConfiguration { property: String, reason: String },

    /// A required property is missing or cannot be parsed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A deferred (macro) value reached a point where a concrete value is required.
    #[error("Property '{property}' is still the unresolved macro '${{{key}}}'")]
    UnresolvedMacro { property: String, key: String },

    #[error("Unsupported data type for this operation: {0}")]
    UnsupportedType(String),

    #[error("Stage validation failed with {count} failure(s): {summary}")]
    ValidationFailed { count: usize, summary: String },

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the Serde JSON library, typically while reading plugin properties.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error from the I/O subsystem, e.g. when opening a log file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NGramError {
    /// Returns `true` for errors that mean the pipeline was wired incorrectly
    /// and must not start processing records.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            NGramError::InvalidConfiguration { .. }
                | NGramError::Configuration(_)
                | NGramError::UnresolvedMacro { .. }
                | NGramError::ValidationFailed { .. }
        )
    }
}
