//! Derives the stage's output schema from its configuration.

use arrow_schema::SchemaRef;
use std::sync::Arc;

use crate::config::NGramConfig;
use crate::schema::{record_schema_to_arrow, Field, RecordSchema, Schema};

pub const OUTPUT_SCHEMA_NAME: &str = "outputSchema";

/// `{ outputField: array<string> }`, with neither the field nor its items nullable.
pub fn derive_output_schema(config: &NGramConfig) -> RecordSchema {
    RecordSchema::record_of(
        OUTPUT_SCHEMA_NAME,
        vec![Field::of(
            config.output_field(),
            Schema::array_of(Schema::string().required()).required(),
        )],
    )
}

/// The Arrow form of `derive_output_schema`, used to build output batches.
pub fn derive_arrow_output_schema(config: &NGramConfig) -> SchemaRef {
    Arc::new(record_schema_to_arrow(&derive_output_schema(config)))
}
