// In: src/config.rs

//! The single source of truth for the n-gram stage configuration.
//!
//! `NGramConfig` is created once at the pipeline boundary (from the host's plugin
//! property map or its JSON form) and is immutable afterwards. The only value
//! that may arrive late is `ngramSize`, which the host can supply as a macro
//! (`${key}`) resolved from runtime arguments just before execution.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NGramError;

//==================================================================================
// 0. Plugin Identity & Property Names
//==================================================================================

pub const PLUGIN_NAME: &str = "NGramTransform";
pub const PLUGIN_TYPE: &str = "sparkcompute";
pub const PLUGIN_DESCRIPTION: &str = "Used to transform input features into n-grams.";

/// Field to be used to transform input features into n-grams.
pub const PROPERTY_TRANSFORMED_FIELD: &str = "fieldToBeTransformed";
/// N-gram size. Accepts macros.
pub const PROPERTY_NGRAM_SIZE: &str = "ngramSize";
/// Transformed field for the sequence of n-grams.
pub const PROPERTY_OUTPUT_FIELD: &str = "outputField";

//==================================================================================
// I. The Late-Bound N-Gram Size
//==================================================================================

/// The configured n-gram size: either a concrete integer or a macro that the
/// host resolves from runtime arguments before execution.
///
/// A resolved value is kept as written (possibly `<= 0`) so the error can be
/// reported with the user's value; `resolve` enforces positivity.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "RawNGramSize", into = "RawNGramSize")]
pub enum NGramSize {
    Resolved(i64),
    /// Holds the macro key, i.e. `size` for `${size}`.
    Deferred(String),
}

impl NGramSize {
    /// Parses the textual form used in property maps: an integer or `${key}`.
    pub fn parse(text: &str) -> Result<Self, NGramError> {
        let trimmed = text.trim();
        if let Some(inner) = trimmed
            .strip_prefix("${")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            if inner.trim().is_empty() {
                return Err(NGramError::Configuration(format!(
                    "Property '{}' contains an empty macro",
                    PROPERTY_NGRAM_SIZE
                )));
            }
            return Ok(NGramSize::Deferred(inner.trim().to_string()));
        }
        trimmed
            .parse::<i64>()
            .map(NGramSize::Resolved)
            .map_err(|_| {
                NGramError::Configuration(format!(
                    "Property '{}' must be an integer, got '{}'",
                    PROPERTY_NGRAM_SIZE, text
                ))
            })
    }

    /// Returns `true` while the value is still a macro.
    pub fn is_macro(&self) -> bool {
        matches!(self, NGramSize::Deferred(_))
    }

    /// Produces the concrete, positive window width.
    ///
    /// # Errors
    /// `UnresolvedMacro` for a deferred value, `InvalidConfiguration` for `n <= 0`.
    pub fn resolve(&self) -> Result<usize, NGramError> {
        match self {
            NGramSize::Deferred(key) => Err(NGramError::UnresolvedMacro {
                property: PROPERTY_NGRAM_SIZE.to_string(),
                key: key.clone(),
            }),
            NGramSize::Resolved(n) if *n <= 0 => Err(invalid_size(*n)),
            NGramSize::Resolved(n) => usize::try_from(*n).map_err(|_| invalid_size(*n)),
        }
    }
}

fn invalid_size(n: i64) -> NGramError {
    NGramError::InvalidConfiguration {
        property: PROPERTY_NGRAM_SIZE.to_string(),
        reason: format!("n-gram size must be a positive integer, got {}", n),
    }
}

impl From<i64> for NGramSize {
    fn from(n: i64) -> Self {
        NGramSize::Resolved(n)
    }
}

impl fmt::Display for NGramSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NGramSize::Resolved(n) => write!(f, "{}", n),
            NGramSize::Deferred(key) => write!(f, "${{{}}}", key),
        }
    }
}

/// Wire form of `ngramSize`: hosts send either a JSON number or a string.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawNGramSize {
    Number(i64),
    Text(String),
}

impl TryFrom<RawNGramSize> for NGramSize {
    type Error = String;

    fn try_from(raw: RawNGramSize) -> Result<Self, Self::Error> {
        match raw {
            RawNGramSize::Number(n) => Ok(NGramSize::Resolved(n)),
            RawNGramSize::Text(text) => NGramSize::parse(&text).map_err(|e| e.to_string()),
        }
    }
}

impl From<NGramSize> for RawNGramSize {
    fn from(size: NGramSize) -> Self {
        match size {
            NGramSize::Resolved(n) => RawNGramSize::Number(n),
            deferred @ NGramSize::Deferred(_) => RawNGramSize::Text(deferred.to_string()),
        }
    }
}

//==================================================================================
// II. The Stage Configuration
//==================================================================================

/// The immutable configuration triple of the n-gram stage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NGramConfig {
    field_to_be_transformed: String,
    ngram_size: NGramSize,
    output_field: String,
}

impl NGramConfig {
    pub fn new(
        field_to_be_transformed: impl Into<String>,
        ngram_size: NGramSize,
        output_field: impl Into<String>,
    ) -> Self {
        Self {
            field_to_be_transformed: field_to_be_transformed.into(),
            ngram_size,
            output_field: output_field.into(),
        }
    }

    /// Parses the JSON form of the plugin properties.
    pub fn from_json(json: &str) -> Result<Self, NGramError> {
        let config: NGramConfig = serde_json::from_str(json).map_err(|e| {
            NGramError::Configuration(format!("Invalid {} properties: {}", PLUGIN_NAME, e))
        })?;
        config.check_required_properties()?;
        Ok(config)
    }

    /// Builds a config from the string-to-string property map hosts hand to plugins.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self, NGramError> {
        let required = |name: &str| {
            properties.get(name).ok_or_else(|| {
                NGramError::Configuration(format!("Required property '{}' is missing", name))
            })
        };

        let config = Self {
            field_to_be_transformed: required(PROPERTY_TRANSFORMED_FIELD)?.clone(),
            ngram_size: NGramSize::parse(required(PROPERTY_NGRAM_SIZE)?)?,
            output_field: required(PROPERTY_OUTPUT_FIELD)?.clone(),
        };
        config.check_required_properties()?;
        Ok(config)
    }

    /// Rejects blank field names. Runs on every parse path.
    pub fn check_required_properties(&self) -> Result<(), NGramError> {
        for (property, value) in [
            (PROPERTY_TRANSFORMED_FIELD, &self.field_to_be_transformed),
            (PROPERTY_OUTPUT_FIELD, &self.output_field),
        ] {
            if value.trim().is_empty() {
                return Err(NGramError::Configuration(format!(
                    "Required property '{}' must not be empty",
                    property
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy with `ngramSize` substituted from runtime `arguments`.
    ///
    /// A macro whose key is absent stays deferred; the execution phase rejects it.
    pub fn resolve_macros(&self, arguments: &HashMap<String, String>) -> Result<Self, NGramError> {
        let ngram_size = match &self.ngram_size {
            NGramSize::Deferred(key) => match arguments.get(key) {
                Some(value) => match NGramSize::parse(value)? {
                    NGramSize::Deferred(_) => {
                        return Err(NGramError::Configuration(format!(
                            "Runtime argument '{}' for '{}' is itself a macro",
                            key, PROPERTY_NGRAM_SIZE
                        )))
                    }
                    resolved => resolved,
                },
                None => {
                    log::warn!(
                        "No runtime argument '{}' found; '{}' stays deferred",
                        key,
                        PROPERTY_NGRAM_SIZE
                    );
                    self.ngram_size.clone()
                }
            },
            resolved => resolved.clone(),
        };
        Ok(Self {
            ngram_size,
            ..self.clone()
        })
    }

    pub fn field_to_be_transformed(&self) -> &str {
        &self.field_to_be_transformed
    }

    pub fn ngram_size(&self) -> &NGramSize {
        &self.ngram_size
    }

    pub fn output_field(&self) -> &str {
        &self.output_field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_json_accepts_number_and_string_sizes() {
        let numeric = NGramConfig::from_json(
            r#"{"fieldToBeTransformed": "tokens", "ngramSize": 2, "outputField": "ngrams"}"#,
        )
        .unwrap();
        let textual = NGramConfig::from_json(
            r#"{"fieldToBeTransformed": "tokens", "ngramSize": "2", "outputField": "ngrams"}"#,
        )
        .unwrap();

        assert_eq!(numeric, textual);
        assert_eq!(numeric.ngram_size(), &NGramSize::Resolved(2));
        assert_eq!(numeric.field_to_be_transformed(), "tokens");
        assert_eq!(numeric.output_field(), "ngrams");
    }

    #[test]
    fn test_from_json_reads_macro() {
        let config = NGramConfig::from_json(
            r#"{"fieldToBeTransformed": "tokens", "ngramSize": "${size}", "outputField": "ngrams"}"#,
        )
        .unwrap();
        assert_eq!(config.ngram_size(), &NGramSize::Deferred("size".to_string()));
        assert!(config.ngram_size().is_macro());
    }

    #[test]
    fn test_missing_ngram_size_is_configuration_error() {
        let result = NGramConfig::from_json(r#"{"fieldToBeTransformed": "tokens", "outputField": "ngrams"}"#);
        assert!(matches!(result, Err(NGramError::Configuration(_))));

        let result = NGramConfig::from_properties(&props(&[
            (PROPERTY_TRANSFORMED_FIELD, "tokens"),
            (PROPERTY_OUTPUT_FIELD, "ngrams"),
        ]));
        assert!(matches!(result, Err(NGramError::Configuration(_))));
    }

    #[test]
    fn test_from_properties_rejects_blank_field_name() {
        let result = NGramConfig::from_properties(&props(&[
            (PROPERTY_TRANSFORMED_FIELD, "  "),
            (PROPERTY_NGRAM_SIZE, "2"),
            (PROPERTY_OUTPUT_FIELD, "ngrams"),
        ]));
        assert!(result.unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_resolve_rejects_non_positive_sizes() {
        assert_eq!(NGramSize::Resolved(3).resolve().unwrap(), 3);
        assert!(matches!(
            NGramSize::Resolved(0).resolve(),
            Err(NGramError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            NGramSize::Resolved(-2).resolve(),
            Err(NGramError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            NGramSize::Deferred("n".into()).resolve(),
            Err(NGramError::UnresolvedMacro { .. })
        ));
    }

    #[test]
    fn test_resolve_macros_substitutes_runtime_argument() {
        let config = NGramConfig::new("tokens", NGramSize::Deferred("size".into()), "ngrams");

        let resolved = config.resolve_macros(&props(&[("size", "3")])).unwrap();
        assert_eq!(resolved.ngram_size(), &NGramSize::Resolved(3));
        assert_eq!(resolved.field_to_be_transformed(), "tokens");

        let still_deferred = config.resolve_macros(&HashMap::new()).unwrap();
        assert!(still_deferred.ngram_size().is_macro());

        let bad = config.resolve_macros(&props(&[("size", "three")]));
        assert!(matches!(bad, Err(NGramError::Configuration(_))));
    }

    #[test]
    fn test_serialize_keeps_host_property_names() {
        let config = NGramConfig::new("tokens", NGramSize::Deferred("size".into()), "ngrams");
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(json[PROPERTY_TRANSFORMED_FIELD], "tokens");
        assert_eq!(json[PROPERTY_NGRAM_SIZE], "${size}");
        assert_eq!(json[PROPERTY_OUTPUT_FIELD], "ngrams");
    }
}
