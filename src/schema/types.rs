//! This module defines the declared-schema model the stage validates against.
//!
//! A `RecordSchema` is an ordered list of named `Field`s. Each field carries a
//! `MaybeNullable<Schema>`; a `Schema` is a `SchemaType` plus an optional
//! `LogicalType` annotation (a semantic type such as `date` layered over a
//! primitive).

use std::fmt;

use hashbrown::HashMap;

use super::nullable::MaybeNullable;

//==================================================================================
// 1. Logical Types
//==================================================================================

/// Semantic annotations the host layers on top of primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// Days since the epoch, stored as an `int`.
    Date,
    TimestampMillis,
    TimestampMicros,
    TimeMillis,
    TimeMicros,
    /// Fixed-point decimal, stored as `bytes`.
    Decimal { precision: u8, scale: i8 },
    /// ISO-8601 local date-time, stored as a `string`.
    DateTime,
}

impl LogicalType {
    /// The primitive kind this annotation is layered over.
    pub fn physical_type(&self) -> SchemaType {
        match self {
            LogicalType::Date | LogicalType::TimeMillis => SchemaType::Int,
            LogicalType::TimestampMillis
            | LogicalType::TimestampMicros
            | LogicalType::TimeMicros => SchemaType::Long,
            LogicalType::Decimal { .. } => SchemaType::Bytes,
            LogicalType::DateTime => SchemaType::String,
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalType::Date => write!(f, "date"),
            LogicalType::TimestampMillis => write!(f, "timestamp in milliseconds"),
            LogicalType::TimestampMicros => write!(f, "timestamp in microseconds"),
            LogicalType::TimeMillis => write!(f, "time in milliseconds"),
            LogicalType::TimeMicros => write!(f, "time in microseconds"),
            LogicalType::Decimal { precision, scale } => {
                write!(f, "decimal with precision {} and scale {}", precision, scale)
            }
            LogicalType::DateTime => write!(f, "datetime"),
        }
    }
}

//==================================================================================
// 2. Schema Kinds
//==================================================================================

/// The structural kind of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Enum(Vec<String>),
    Array(Box<MaybeNullable<Schema>>),
    Map {
        keys: Box<MaybeNullable<Schema>>,
        values: Box<MaybeNullable<Schema>>,
    },
    Record(RecordSchema),
}

impl SchemaType {
    /// Lower-case kind name used in user-facing messages.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Int => "int",
            SchemaType::Long => "long",
            SchemaType::Float => "float",
            SchemaType::Double => "double",
            SchemaType::Bytes => "bytes",
            SchemaType::String => "string",
            SchemaType::Enum(_) => "enum",
            SchemaType::Array(_) => "array",
            SchemaType::Map { .. } => "map",
            SchemaType::Record(_) => "record",
        }
    }
}

//==================================================================================
// 3. Schema Nodes
//==================================================================================

/// A single schema node: a kind plus an optional logical-type annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaType,
    logical_type: Option<LogicalType>,
}

impl Schema {
    pub fn of(kind: SchemaType) -> Self {
        Self {
            kind,
            logical_type: None,
        }
    }

    /// A node annotated with `logical_type` over its physical kind.
    pub fn of_logical(logical_type: LogicalType) -> Self {
        Self {
            kind: logical_type.physical_type(),
            logical_type: Some(logical_type),
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    /// An array whose components are `component`.
    pub fn array_of(component: MaybeNullable<Schema>) -> Self {
        Self::of(SchemaType::Array(Box::new(component)))
    }

    pub fn map_of(keys: MaybeNullable<Schema>, values: MaybeNullable<Schema>) -> Self {
        Self::of(SchemaType::Map {
            keys: Box::new(keys),
            values: Box::new(values),
        })
    }

    pub fn kind(&self) -> &SchemaType {
        &self.kind
    }

    pub fn logical_type(&self) -> Option<LogicalType> {
        self.logical_type
    }

    /// The component schema, if this node is an array.
    pub fn component(&self) -> Option<&MaybeNullable<Schema>> {
        match &self.kind {
            SchemaType::Array(component) => Some(component),
            _ => None,
        }
    }

    /// The name shown to users: the logical type when annotated, otherwise the kind.
    pub fn display_name(&self) -> String {
        match self.logical_type {
            Some(logical_type) => logical_type.to_string(),
            None => self.kind.name().to_string(),
        }
    }

    /// Wraps this node as a non-nullable field type.
    pub fn required(self) -> MaybeNullable<Schema> {
        MaybeNullable::Required(self)
    }

    /// Wraps this node as a nullable field type.
    pub fn nullable(self) -> MaybeNullable<Schema> {
        MaybeNullable::Nullable(self)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

//==================================================================================
// 4. Records
//==================================================================================

/// A named field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    schema: MaybeNullable<Schema>,
}

impl Field {
    pub fn of(name: impl Into<String>, schema: MaybeNullable<Schema>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &MaybeNullable<Schema> {
        &self.schema
    }
}

/// An ordered, name-indexed collection of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl RecordSchema {
    /// Builds a record schema. On duplicate names the first field wins lookups,
    /// matching how the host resolves them.
    pub fn record_of(name: impl Into<String>, fields: Vec<Field>) -> Self {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            index.entry(field.name.clone()).or_insert(i);
        }
        Self {
            name: name.into(),
            fields,
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }
}
