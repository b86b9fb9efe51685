// In: src/stage/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Stage Layer
// ====================================================================================
//
// The `stage` is the only surface the host pipeline talks to. It has exactly two
// entry points, one per phase:
//
//   1. [Configuration (NGramTransform::configure)]  -> runs once per deployment
//         |
//         `-> a. `validator` checks the upstream schema, collecting failures
//         |
//         `-> b. `output_schema` derives `{ outputField: array<string> }`
//
//   2. [Execution (BatchTransform::transform)]       -> runs once per batch
//         |
//         `-> a. reads the token lists of `fieldToBeTransformed`
//         |
//         `-> b. calls the pure `kernels::ngram` kernel per record
//         |
//         `-> c. emits one output record per input record that produced n-grams
//
// Batches are independent; the host may run `transform` on any partitioning of
// records from any number of threads.
// ====================================================================================

use arrow::record_batch::RecordBatch;
use arrow_schema::{Schema as ArrowSchema, SchemaRef};
use serde::Serialize;

use crate::config::{PLUGIN_NAME, PLUGIN_TYPE};
use crate::error::NGramError;
use crate::schema::{record_schema_to_arrow, RecordSchema};

pub mod output_schema;
pub mod transform;
pub mod validator;

pub use output_schema::derive_output_schema;
pub use transform::NGramTransform;
pub use validator::{validate, FailureCollector, ValidationFailure};

/// **CONTRACT:** What the host's batch record processor calls at execution time.
pub trait BatchTransform: Send + Sync {
    /// The schema every batch returned by `transform` carries.
    fn output_schema(&self) -> SchemaRef;

    fn transform(&self, batch: &RecordBatch) -> Result<RecordBatch, NGramError>;
}

/// **CONTRACT:** The outcome of the configuration phase.
///
/// `output_schema` is declared only when `failures` is empty. The host is
/// expected to abort deployment on any failure.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfiguration {
    pub output_schema: Option<RecordSchema>,
    pub failures: Vec<ValidationFailure>,
}

/// JSON form of a `StageConfiguration`, as handed back to the host.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StageDeclaration<'a> {
    plugin_name: &'static str,
    plugin_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_schema: Option<ArrowSchema>,
    failures: &'a [ValidationFailure],
}

impl StageConfiguration {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Converts failures into `NGramError::ValidationFailed` for hosts that
    /// want a hard stop instead of a report.
    pub fn into_result(self) -> Result<RecordSchema, NGramError> {
        let mut collector = FailureCollector::new(PLUGIN_NAME);
        collector.extend(self.failures);
        collector.get_or_throw()?;
        self.output_schema.ok_or_else(|| {
            NGramError::InternalError("valid stage configuration without an output schema".into())
        })
    }

    /// Serializes the declaration, with the output schema in Arrow's JSON form.
    pub fn to_json(&self) -> Result<String, NGramError> {
        let declaration = StageDeclaration {
            plugin_name: PLUGIN_NAME,
            plugin_type: PLUGIN_TYPE,
            output_schema: self.output_schema.as_ref().map(record_schema_to_arrow),
            failures: &self.failures,
        };
        Ok(serde_json::to_string(&declaration)?)
    }
}
