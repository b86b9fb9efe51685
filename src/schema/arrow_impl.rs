// In: src/schema/arrow_impl.rs

//! Marshals schemas between the Arrow world and the declared-schema model.
//!
//! Upstream stages hand us Arrow schemas; validation runs on `RecordSchema`.
//! The derived output schema goes the other way so output batches can be built.

use std::sync::Arc;

use arrow_schema::{
    DataType as ArrowDataType, Field as ArrowField, Fields, Schema as ArrowSchema, TimeUnit,
};

use super::nullable::MaybeNullable;
use super::types::{Field, LogicalType, RecordSchema, Schema, SchemaType};
use crate::error::NGramError;

/// Name the Arrow convention gives to list items.
const LIST_ITEM_NAME: &str = "item";

//==================================================================================
// 1. Arrow -> RecordSchema
//==================================================================================

/// Converts an Arrow schema into a `RecordSchema` named `name`.
pub fn record_schema_from_arrow(
    name: &str,
    arrow_schema: &ArrowSchema,
) -> Result<RecordSchema, NGramError> {
    record_from_fields(name, arrow_schema.fields())
}

fn record_from_fields(name: &str, fields: &Fields) -> Result<RecordSchema, NGramError> {
    let converted = fields
        .iter()
        .map(|f| field_from_arrow(f))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RecordSchema::record_of(name, converted))
}

fn field_from_arrow(field: &ArrowField) -> Result<Field, NGramError> {
    Ok(Field::of(field.name().clone(), wrap_from_arrow(field)?))
}

/// Converts an Arrow field's type, tagging it by the field's nullability.
fn wrap_from_arrow(field: &ArrowField) -> Result<MaybeNullable<Schema>, NGramError> {
    let schema = schema_from_arrow_type(field.name(), field.data_type())?;
    Ok(if field.is_nullable() {
        MaybeNullable::Nullable(schema)
    } else {
        MaybeNullable::Required(schema)
    })
}

/// Converts a single Arrow `DataType` into a schema node.
pub fn schema_from_arrow_type(
    name: &str,
    arrow_type: &ArrowDataType,
) -> Result<Schema, NGramError> {
    let schema = match arrow_type {
        ArrowDataType::Null => Schema::of(SchemaType::Null),
        ArrowDataType::Boolean => Schema::of(SchemaType::Boolean),
        ArrowDataType::Int8
        | ArrowDataType::Int16
        | ArrowDataType::Int32
        | ArrowDataType::UInt8
        | ArrowDataType::UInt16 => Schema::of(SchemaType::Int),
        ArrowDataType::Int64 | ArrowDataType::UInt32 => Schema::of(SchemaType::Long),
        ArrowDataType::Float16 | ArrowDataType::Float32 => Schema::of(SchemaType::Float),
        ArrowDataType::Float64 => Schema::of(SchemaType::Double),
        ArrowDataType::Utf8 | ArrowDataType::LargeUtf8 => Schema::string(),
        ArrowDataType::Binary | ArrowDataType::LargeBinary | ArrowDataType::FixedSizeBinary(_) => {
            Schema::of(SchemaType::Bytes)
        }
        ArrowDataType::Date32 | ArrowDataType::Date64 => Schema::of_logical(LogicalType::Date),
        ArrowDataType::Timestamp(TimeUnit::Second | TimeUnit::Millisecond, _) => {
            Schema::of_logical(LogicalType::TimestampMillis)
        }
        ArrowDataType::Timestamp(TimeUnit::Microsecond | TimeUnit::Nanosecond, _) => {
            Schema::of_logical(LogicalType::TimestampMicros)
        }
        ArrowDataType::Time32(_) => Schema::of_logical(LogicalType::TimeMillis),
        ArrowDataType::Time64(_) => Schema::of_logical(LogicalType::TimeMicros),
        ArrowDataType::Decimal128(precision, scale) => Schema::of_logical(LogicalType::Decimal {
            precision: *precision,
            scale: *scale,
        }),
        ArrowDataType::Dictionary(_, value_type) => schema_from_arrow_type(name, value_type)?,
        ArrowDataType::List(item)
        | ArrowDataType::LargeList(item)
        | ArrowDataType::FixedSizeList(item, _) => Schema::array_of(wrap_from_arrow(item)?),
        ArrowDataType::Map(entries, _) => map_from_arrow(name, entries)?,
        ArrowDataType::Struct(fields) => Schema::of(SchemaType::Record(record_from_fields(name, fields)?)),
        dt => {
            return Err(NGramError::UnsupportedType(format!(
                "Field '{}' has Arrow type {:?} with no schema counterpart",
                name, dt
            )))
        }
    };
    Ok(schema)
}

/// An Arrow map is a list of `{key, value}` structs.
fn map_from_arrow(name: &str, entries: &ArrowField) -> Result<Schema, NGramError> {
    match entries.data_type() {
        ArrowDataType::Struct(kv) if kv.len() == 2 => Ok(Schema::map_of(
            wrap_from_arrow(&kv[0])?,
            wrap_from_arrow(&kv[1])?,
        )),
        other => Err(NGramError::UnsupportedType(format!(
            "Field '{}' is a map with malformed entries type {:?}",
            name, other
        ))),
    }
}

//==================================================================================
// 2. RecordSchema -> Arrow
//==================================================================================

/// Converts a `RecordSchema` into an Arrow schema.
pub fn record_schema_to_arrow(record: &RecordSchema) -> ArrowSchema {
    ArrowSchema::new(fields_to_arrow(record))
}

fn fields_to_arrow(record: &RecordSchema) -> Vec<ArrowField> {
    record
        .fields()
        .iter()
        .map(|f| wrapped_to_arrow(f.name(), f.schema()))
        .collect()
}

fn wrapped_to_arrow(name: &str, wrapped: &MaybeNullable<Schema>) -> ArrowField {
    ArrowField::new(
        name,
        schema_to_arrow_type(wrapped.non_nullable()),
        wrapped.is_nullable(),
    )
}

/// Converts a schema node into the Arrow `DataType` the stage emits for it.
pub fn schema_to_arrow_type(schema: &Schema) -> ArrowDataType {
    if let Some(logical_type) = schema.logical_type() {
        return match logical_type {
            LogicalType::Date => ArrowDataType::Date32,
            LogicalType::TimestampMillis => ArrowDataType::Timestamp(TimeUnit::Millisecond, None),
            LogicalType::TimestampMicros => ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
            LogicalType::TimeMillis => ArrowDataType::Time32(TimeUnit::Millisecond),
            LogicalType::TimeMicros => ArrowDataType::Time64(TimeUnit::Microsecond),
            LogicalType::Decimal { precision, scale } => ArrowDataType::Decimal128(precision, scale),
            LogicalType::DateTime => ArrowDataType::Utf8,
        };
    }

    match schema.kind() {
        SchemaType::Null => ArrowDataType::Null,
        SchemaType::Boolean => ArrowDataType::Boolean,
        SchemaType::Int => ArrowDataType::Int32,
        SchemaType::Long => ArrowDataType::Int64,
        SchemaType::Float => ArrowDataType::Float32,
        SchemaType::Double => ArrowDataType::Float64,
        SchemaType::Bytes => ArrowDataType::Binary,
        SchemaType::String | SchemaType::Enum(_) => ArrowDataType::Utf8,
        SchemaType::Array(component) => {
            ArrowDataType::List(Arc::new(wrapped_to_arrow(LIST_ITEM_NAME, component)))
        }
        SchemaType::Map { keys, values } => {
            let entries = ArrowDataType::Struct(Fields::from(vec![
                wrapped_to_arrow("keys", keys),
                wrapped_to_arrow("values", values),
            ]));
            ArrowDataType::Map(Arc::new(ArrowField::new("entries", entries, false)), false)
        }
        SchemaType::Record(record) => ArrowDataType::Struct(Fields::from(fields_to_arrow(record))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_of_utf8_becomes_array_of_string() {
        let arrow_schema = ArrowSchema::new(vec![ArrowField::new(
            "tokens",
            ArrowDataType::List(Arc::new(ArrowField::new("item", ArrowDataType::Utf8, true))),
            true,
        )]);

        let record = record_schema_from_arrow("input", &arrow_schema).unwrap();
        let field = record.field("tokens").unwrap();

        assert!(field.schema().is_nullable());
        let outer = field.schema().non_nullable();
        assert_eq!(outer.kind().name(), "array");
        let component = outer.component().unwrap();
        assert!(component.is_nullable());
        assert_eq!(component.non_nullable(), &Schema::string());
    }

    #[test]
    fn test_temporal_types_carry_logical_annotation() {
        let ts = schema_from_arrow_type(
            "ts",
            &ArrowDataType::Timestamp(TimeUnit::Microsecond, None),
        )
        .unwrap();
        assert_eq!(ts.logical_type(), Some(LogicalType::TimestampMicros));
        assert_eq!(ts.kind(), &SchemaType::Long);

        let day = schema_from_arrow_type("day", &ArrowDataType::Date32).unwrap();
        assert_eq!(day.display_name(), "date");
    }

    #[test]
    fn test_duration_has_no_schema_counterpart() {
        let result = schema_from_arrow_type("elapsed", &ArrowDataType::Duration(TimeUnit::Second));
        assert!(matches!(result, Err(NGramError::UnsupportedType(_))));
    }

    #[test]
    fn test_malformed_map_is_rejected() {
        let entries = Arc::new(ArrowField::new("entries", ArrowDataType::Int32, false));
        let result = schema_from_arrow_type("lookup", &ArrowDataType::Map(entries, false));
        assert!(matches!(result, Err(NGramError::UnsupportedType(_))));
    }

    #[test]
    fn test_array_of_string_to_arrow() {
        let record = RecordSchema::record_of(
            "outputSchema",
            vec![Field::of(
                "ngrams",
                Schema::array_of(Schema::string().required()).required(),
            )],
        );

        let arrow_schema = record_schema_to_arrow(&record);
        let field = arrow_schema.field_with_name("ngrams").unwrap();

        assert!(!field.is_nullable());
        assert_eq!(
            field.data_type(),
            &ArrowDataType::List(Arc::new(ArrowField::new("item", ArrowDataType::Utf8, false)))
        );
    }
}
