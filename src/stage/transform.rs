// In: src/stage/transform.rs

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, GenericListArray, ListBuilder, OffsetSizeTrait, RecordBatch,
    RecordBatchReader, StringBuilder,
};
use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};

use super::output_schema::{derive_arrow_output_schema, derive_output_schema};
use super::validator::{validate_into, FailureCollector};
use super::{BatchTransform, StageConfiguration};
use crate::config::{NGramConfig, PLUGIN_NAME};
use crate::error::NGramError;
use crate::kernels::ngram::{for_each_ngram, ngram_count};
use crate::schema::{record_schema_from_arrow, RecordSchema};

/// Name given to upstream Arrow schemas once converted for validation.
const INPUT_SCHEMA_NAME: &str = "inputSchema";

/// The n-gram pipeline stage.
///
/// Holds the immutable configuration and the output schema derived from it
/// once at construction. Shares no mutable state between batches, so one
/// instance can serve every worker thread of the host.
#[derive(Debug, Clone)]
pub struct NGramTransform {
    config: NGramConfig,
    output_schema: SchemaRef,
}

impl NGramTransform {
    pub fn new(config: NGramConfig) -> Self {
        let output_schema = derive_arrow_output_schema(&config);
        Self {
            config,
            output_schema,
        }
    }

    pub fn config(&self) -> &NGramConfig {
        &self.config
    }

    //==============================================================================
    // Configuration Phase
    //==============================================================================

    /// Validates the stage against the upstream schema and declares its output.
    ///
    /// Schema problems come back as failures in the returned `StageConfiguration`
    /// (with no declared output schema). A resolved `ngramSize <= 0` is fatal and
    /// returned as an error; a macro is accepted and checked at execution.
    pub fn configure(
        &self,
        input_schema: Option<&RecordSchema>,
    ) -> Result<StageConfiguration, NGramError> {
        self.config.check_required_properties()?;
        if !self.config.ngram_size().is_macro() {
            self.config.ngram_size().resolve()?;
        }

        let mut collector = FailureCollector::new(PLUGIN_NAME);
        validate_into(&self.config, input_schema, &mut collector);
        let failures = collector.into_failures();

        let output_schema = if failures.is_empty() {
            log::info!(
                "[{}] '{}' -> '{}' with n = {}",
                PLUGIN_NAME,
                self.config.field_to_be_transformed(),
                self.config.output_field(),
                self.config.ngram_size()
            );
            Some(derive_output_schema(&self.config))
        } else {
            for failure in &failures {
                log::warn!("[{}] validation failure: {}", PLUGIN_NAME, failure.message);
            }
            None
        };

        Ok(StageConfiguration {
            output_schema,
            failures,
        })
    }

    /// `configure` for hosts that describe upstream data with an Arrow schema.
    pub fn configure_arrow(
        &self,
        input_schema: Option<&ArrowSchema>,
    ) -> Result<StageConfiguration, NGramError> {
        let converted = input_schema
            .map(|schema| record_schema_from_arrow(INPUT_SCHEMA_NAME, schema))
            .transpose()?;
        self.configure(converted.as_ref())
    }

    //==============================================================================
    // Execution Phase
    //==============================================================================

    /// Transforms one batch of records into a batch of n-gram records.
    ///
    /// Each input row yields at most one output row. Rows with a null token list,
    /// an empty one, or fewer tokens than `n` produce no n-grams and are dropped.
    /// A null token inside a list keeps its position and renders as `null`.
    ///
    /// # Errors
    /// `UnresolvedMacro` if `ngramSize` was never resolved, an Arrow schema error
    /// if the batch lacks the source column, `UnsupportedType` if that column is
    /// not a list of strings.
    pub fn run(&self, batch: &RecordBatch) -> Result<RecordBatch, NGramError> {
        let n = self.config.ngram_size().resolve()?;
        let field_name = self.config.field_to_be_transformed();
        let column = batch.column(batch.schema().index_of(field_name)?);

        let mut builder = ListBuilder::new(StringBuilder::new()).with_field(Arc::new(
            ArrowField::new("item", DataType::Utf8, false),
        ));

        let dropped = match column.data_type() {
            DataType::List(_) => append_rows(list_of::<i32>(column, field_name)?, n, &mut builder)?,
            DataType::LargeList(_) => {
                append_rows(list_of::<i64>(column, field_name)?, n, &mut builder)?
            }
            other => {
                return Err(NGramError::UnsupportedType(format!(
                    "Column '{}' must be a list of strings, got {:?}",
                    field_name, other
                )))
            }
        };

        let ngrams: ArrayRef = Arc::new(builder.finish());
        let kept = ngrams.len();
        log_metric!(
            "event" = "transform_batch",
            "rows_in" = batch.num_rows(),
            "rows_out" = kept,
            "rows_dropped" = dropped
        );
        log::debug!(
            "[{}] batch of {} rows -> {} rows ({} without n-grams dropped)",
            PLUGIN_NAME,
            batch.num_rows(),
            kept,
            dropped
        );

        Ok(RecordBatch::try_new(Arc::clone(&self.output_schema), vec![ngrams])?)
    }

    /// Drains `reader`, producing one output batch per input batch.
    pub fn transform_reader(
        &self,
        reader: &mut dyn RecordBatchReader,
    ) -> Result<Vec<RecordBatch>, NGramError> {
        let mut output = Vec::new();
        for batch_result in reader {
            let batch = batch_result?;
            output.push(self.run(&batch)?);
        }
        Ok(output)
    }
}

impl BatchTransform for NGramTransform {
    fn output_schema(&self) -> SchemaRef {
        Arc::clone(&self.output_schema)
    }

    fn transform(&self, batch: &RecordBatch) -> Result<RecordBatch, NGramError> {
        self.run(batch)
    }
}

//==================================================================================
// Helpers
//==================================================================================

fn list_of<'a, O: OffsetSizeTrait>(
    column: &'a ArrayRef,
    field_name: &str,
) -> Result<&'a GenericListArray<O>, NGramError> {
    column.as_list_opt::<O>().ok_or_else(|| {
        NGramError::InternalError(format!(
            "Column '{}' reported a list type but could not be downcast",
            field_name
        ))
    })
}

/// Appends one list per row that yields n-grams; returns how many rows were dropped.
fn append_rows<O: OffsetSizeTrait>(
    lists: &GenericListArray<O>,
    n: usize,
    builder: &mut ListBuilder<StringBuilder>,
) -> Result<usize, NGramError> {
    let mut dropped = 0;
    for row in 0..lists.len() {
        if lists.is_null(row) {
            dropped += 1;
            continue;
        }
        let values = lists.value(row);
        let tokens = tokens_of(values.as_ref())?;
        if ngram_count(tokens.len(), n) == 0 {
            dropped += 1;
            continue;
        }
        for_each_ngram(tokens.as_slice(), n, |ngram| builder.values().append_value(ngram))?;
        builder.append(true);
    }
    Ok(dropped)
}

/// Rendering of a null token inside a window.
const NULL_TOKEN: &str = "null";

/// Reads one row's list values; a null token keeps its position as `NULL_TOKEN`.
fn tokens_of(values: &dyn Array) -> Result<Vec<&str>, NGramError> {
    match values.data_type() {
        DataType::Utf8 => values.as_string_opt::<i32>().map(|strings| {
            strings
                .iter()
                .map(|token| token.unwrap_or(NULL_TOKEN))
                .collect::<Vec<&str>>()
        }),
        DataType::LargeUtf8 => values.as_string_opt::<i64>().map(|strings| {
            strings
                .iter()
                .map(|token| token.unwrap_or(NULL_TOKEN))
                .collect::<Vec<&str>>()
        }),
        _ => None,
    }
    .ok_or_else(|| {
        NGramError::UnsupportedType(format!(
            "Token lists must hold strings, got {:?}",
            values.data_type()
        ))
    })
}
