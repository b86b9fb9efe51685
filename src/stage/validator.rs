// In: src/stage/validator.rs

//! Configuration-time validation of the upstream schema against the stage config.
//!
//! Schema incompatibilities never raise: they become `ValidationFailure`s that the
//! host collects and uses to abort deployment.

use serde::{Deserialize, Serialize};

use crate::config::{NGramConfig, PROPERTY_TRANSFORMED_FIELD};
use crate::error::NGramError;
use crate::schema::{RecordSchema, SchemaType};

pub const SCHEMA_REQUIRED_MESSAGE: &str = "Input schema must be specified.";
pub const SUPPORTED_TYPE_HINT: &str = "Supported type is 'array of strings'.";

//==================================================================================
// 1. Failure Model
//==================================================================================

/// A structured, non-fatal report of an incompatibility found before execution.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrective_hint: Option<String>,
    /// The stage property the failure is attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_property: Option<String>,
    /// The input schema field the failure is attributed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field: Option<String>,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>, corrective_hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            corrective_hint,
            config_property: None,
            input_field: None,
        }
    }

    pub fn with_config_property(&mut self, property: impl Into<String>) -> &mut Self {
        self.config_property = Some(property.into());
        self
    }

    pub fn with_input_schema_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.input_field = Some(field.into());
        self
    }
}

//==================================================================================
// 2. Failure Sink
//==================================================================================

/// Accumulates validation failures for one stage during configuration.
#[derive(Debug, Default, Clone)]
pub struct FailureCollector {
    stage_name: String,
    failures: Vec<ValidationFailure>,
}

impl FailureCollector {
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            failures: Vec::new(),
        }
    }

    /// Records a failure and returns it for attribution.
    pub fn add_failure(
        &mut self,
        message: impl Into<String>,
        corrective_hint: Option<&str>,
    ) -> &mut ValidationFailure {
        self.failures.push(ValidationFailure::new(
            message,
            corrective_hint.map(str::to_string),
        ));
        let last = self.failures.len() - 1;
        &mut self.failures[last]
    }

    /// Adds failures reported elsewhere, e.g. by an earlier configuration pass.
    pub fn extend(&mut self, failures: impl IntoIterator<Item = ValidationFailure>) {
        self.failures.extend(failures);
    }

    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<ValidationFailure> {
        self.failures
    }

    /// Converts a non-empty collection into `NGramError::ValidationFailed`.
    pub fn get_or_throw(&self) -> Result<(), NGramError> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let summary = self
            .failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Err(NGramError::ValidationFailed {
            count: self.failures.len(),
            summary: format!("[{}] {}", self.stage_name, summary),
        })
    }
}

//==================================================================================
// 3. Schema Validation
//==================================================================================

/// Checks that `input_schema` can feed the stage configured by `config`.
///
/// At most one failure is reported: an absent schema, a missing source field
/// and a wrongly-typed source field are mutually exclusive outcomes. An empty
/// vector means the schema is compatible.
pub fn validate(config: &NGramConfig, input_schema: Option<&RecordSchema>) -> Vec<ValidationFailure> {
    let mut collector = FailureCollector::new(crate::config::PLUGIN_NAME);
    validate_into(config, input_schema, &mut collector);
    collector.into_failures()
}

/// Same as `validate`, reporting into a caller-owned collector.
pub fn validate_into(
    config: &NGramConfig,
    input_schema: Option<&RecordSchema>,
    collector: &mut FailureCollector,
) {
    let input_schema = match input_schema {
        Some(schema) => schema,
        None => {
            collector.add_failure(SCHEMA_REQUIRED_MESSAGE, None);
            return;
        }
    };

    let field_name = config.field_to_be_transformed();
    let field = match input_schema.field(field_name) {
        Some(field) => field,
        None => {
            collector
                .add_failure(
                    format!("Field '{}' is not present in input schema.", field_name),
                    None,
                )
                .with_config_property(PROPERTY_TRANSFORMED_FIELD)
                .with_input_schema_field(field_name);
            return;
        }
    };

    let field_schema = field.schema().non_nullable();
    let is_array_of_strings = field_schema.logical_type().is_none()
        && field_schema
            .component()
            .map(|component| matches!(component.non_nullable().kind(), SchemaType::String))
            .unwrap_or(false);

    if !is_array_of_strings {
        collector
            .add_failure(
                format!(
                    "Field '{}' is of unexpected type '{}'.",
                    field.name(),
                    field_schema.display_name()
                ),
                Some(SUPPORTED_TYPE_HINT),
            )
            .with_config_property(PROPERTY_TRANSFORMED_FIELD)
            .with_input_schema_field(field_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NGramSize;
    use crate::schema::{Field, LogicalType, Schema};

    const INPUT_FIELD: &str = "inputField";
    const OUTPUT_FIELD: &str = "ngrams";

    fn config_for(field: &str) -> NGramConfig {
        NGramConfig::new(field, NGramSize::Resolved(2), OUTPUT_FIELD)
    }

    fn schema_with(field_type: crate::schema::MaybeNullable<Schema>) -> RecordSchema {
        RecordSchema::record_of("inputSchema", vec![Field::of(INPUT_FIELD, field_type)])
    }

    fn valid_schema() -> RecordSchema {
        schema_with(Schema::array_of(Schema::string().required()).required())
    }

    /// Asserts exactly one failure attributed to the transformed-field property.
    fn assert_single_field_failure(failures: &[ValidationFailure]) -> &ValidationFailure {
        assert_eq!(failures.len(), 1, "failures: {:?}", failures);
        let failure = &failures[0];
        assert_eq!(
            failure.config_property.as_deref(),
            Some(PROPERTY_TRANSFORMED_FIELD)
        );
        assert!(failure.input_field.is_some());
        failure
    }

    #[test]
    fn test_valid_config() {
        let failures = validate(&config_for(INPUT_FIELD), Some(&valid_schema()));
        assert!(failures.is_empty());
    }

    #[test]
    fn test_nullable_field_and_components_are_accepted() {
        let schema = schema_with(Schema::array_of(Schema::string().nullable()).nullable());
        assert!(validate(&config_for(INPUT_FIELD), Some(&schema)).is_empty());
    }

    #[test]
    fn test_absent_schema() {
        let failures = validate(&config_for(INPUT_FIELD), None);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, SCHEMA_REQUIRED_MESSAGE);
        assert!(failures[0].config_property.is_none());
        assert!(failures[0].input_field.is_none());
    }

    #[test]
    fn test_input_field_does_not_exist() {
        let failures = validate(&config_for("nonExisting"), Some(&valid_schema()));

        let failure = assert_single_field_failure(&failures);
        assert_eq!(failure.input_field.as_deref(), Some("nonExisting"));
        assert!(failure.message.contains("nonExisting"));
        assert!(failure.corrective_hint.is_none());
    }

    #[test]
    fn test_input_field_not_array() {
        let schema = schema_with(Schema::string().required());
        let failures = validate(&config_for(INPUT_FIELD), Some(&schema));

        let failure = assert_single_field_failure(&failures);
        assert_eq!(failure.corrective_hint.as_deref(), Some(SUPPORTED_TYPE_HINT));
        assert!(failure.message.contains("'string'"));
    }

    #[test]
    fn test_input_field_array_of_non_strings() {
        let schema = schema_with(Schema::array_of(Schema::of(SchemaType::Int).required()).required());
        let failures = validate(&config_for(INPUT_FIELD), Some(&schema));

        let failure = assert_single_field_failure(&failures);
        assert!(failure.message.contains("'array'"));
    }

    #[test]
    fn test_logical_type_is_rejected() {
        let schema = schema_with(Schema::of_logical(LogicalType::DateTime).nullable());
        let failures = validate(&config_for(INPUT_FIELD), Some(&schema));

        let failure = assert_single_field_failure(&failures);
        assert!(failure.message.contains("'datetime'"));
    }

    #[test]
    fn test_array_of_logical_strings_is_accepted() {
        // Only the component's kind is checked; datetime is carried as a string.
        let schema =
            schema_with(Schema::array_of(Schema::of_logical(LogicalType::DateTime).required()).required());
        let failures = validate(&config_for(INPUT_FIELD), Some(&schema));
        assert!(failures.is_empty(), "failures: {:?}", failures);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let config = config_for(INPUT_FIELD);
        let schema = schema_with(Schema::of(SchemaType::Long).required());

        assert_eq!(validate(&config, Some(&schema)), validate(&config, Some(&schema)));
        assert_eq!(validate(&config, None), validate(&config, None));
    }

    #[test]
    fn test_collector_get_or_throw() {
        let mut collector = FailureCollector::new("ngram");
        assert!(collector.get_or_throw().is_ok());

        validate_into(&config_for(INPUT_FIELD), None, &mut collector);
        let err = collector.get_or_throw().unwrap_err();

        assert!(matches!(err, NGramError::ValidationFailed { count: 1, .. }));
        assert!(err.to_string().contains(SCHEMA_REQUIRED_MESSAGE));
    }

    #[test]
    fn test_failure_serializes_with_camel_case_keys() {
        let failures = validate(&config_for("nonExisting"), Some(&valid_schema()));
        let json = serde_json::to_value(&failures[0]).unwrap();

        assert_eq!(json["configProperty"], PROPERTY_TRANSFORMED_FIELD);
        assert_eq!(json["inputField"], "nonExisting");
        assert!(json.get("correctiveHint").is_none());
    }
}
