//! This file is the root of the `ngram_transform` Rust crate.
//!
//! The crate is a single pipeline stage: it turns a field holding a sequence of
//! string tokens into a field holding that sequence's sliding-window n-grams.
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules (`config`, `schema`, `kernels`, `stage`).
//! 2.  Re-exporting the two entry points the host pipeline uses: configuration
//!     (`NGramTransform::configure`) and execution (`BatchTransform::transform`).

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
pub mod observability; // Make macros available throughout the crate

pub mod config;
pub mod error;
pub mod kernels;
pub mod schema;
pub mod stage;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use config::{NGramConfig, NGramSize};
pub use error::NGramError;
pub use kernels::ngram::extract;
pub use observability::enable_verbose_logging;
pub use schema::{Field, LogicalType, MaybeNullable, RecordSchema, Schema, SchemaType};
pub use stage::{
    derive_output_schema, validate, BatchTransform, FailureCollector, NGramTransform,
    StageConfiguration, ValidationFailure,
};
