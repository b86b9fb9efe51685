//! This module defines the declared-schema model the stage validates input
//! against and derives its output from.
//!
//! It currently includes the tagged `MaybeNullable` wrapper, the `Schema` /
//! `RecordSchema` node types, and the Arrow bridge used to read upstream schemas
//! and emit the output schema.

pub mod arrow_impl;
pub mod nullable;
pub mod types;

// Re-export the main types for easier access.
pub use arrow_impl::{record_schema_from_arrow, record_schema_to_arrow};
pub use nullable::MaybeNullable;
pub use types::{Field, LogicalType, RecordSchema, Schema, SchemaType};
