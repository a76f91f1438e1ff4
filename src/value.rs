use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::BigDecimal;
use uuid::Uuid;

/// A dynamically-typed database value.
///
/// Used both for parameter values bound into a [`Statement`](crate::Statement)
/// and for column values in a [`MappedRow`](crate::MappedRow).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL, and the contents of a slot that has not been bound
    #[default]
    Null,
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    /// Arbitrary precision NUMERIC
    Decimal(BigDecimal),
    String(String),
    /// Binary data, and the wire bytes of column types with no variant of their own
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Timestamp without time zone
    Timestamp(NaiveDateTime),
    /// Timestamp with time zone, normalized to UTC
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
}

/// The dynamic type of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
    Bytes,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
}

impl ValueKind {
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int16 => "int16",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::Decimal => "decimal",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Uuid => "uuid",
            ValueKind::Date => "date",
            ValueKind::Time => "time",
            ValueKind::Timestamp => "timestamp",
            ValueKind::TimestampTz => "timestamptz",
            ValueKind::Json => "json",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Uuid(_) => ValueKind::Uuid,
            Value::Date(_) => ValueKind::Date,
            Value::Time(_) => ValueKind::Time,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::TimestampTz(_) => ValueKind::TimestampTz,
            Value::Json(_) => ValueKind::Json,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for NULL and for the zero value of each kind: `false`, `0`,
    /// `0.0`, a zero decimal, `""`, empty bytes, the nil UUID and JSON
    /// `null`. Dates, times and timestamps have no zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(v) => v.is_zero(),
            Value::Int16(v) => v.is_zero(),
            Value::Int32(v) => v.is_zero(),
            Value::Int64(v) => v.is_zero(),
            Value::Float32(v) => v.is_zero(),
            Value::Float64(v) => v.is_zero(),
            Value::Decimal(v) => v.is_zero(),
            Value::String(v) => v.is_zero(),
            Value::Bytes(v) => v.is_zero(),
            Value::Uuid(v) => v.is_zero(),
            Value::Date(v) => v.is_zero(),
            Value::Time(v) => v.is_zero(),
            Value::Timestamp(v) => v.is_zero(),
            Value::TimestampTz(v) => v.is_zero(),
            Value::Json(v) => v.is_zero(),
        }
    }
}

/// Checked downcast from a [`Value`] to a concrete Rust type.
///
/// `KIND` is the only variant `from_value` accepts; column binders use it to
/// report the expected type when narrowing fails.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    /// Returns `None` unless `value` is of kind `KIND`.
    fn from_value(value: &Value) -> Option<Self>;

    /// Whether this is the zero value of the type.
    fn is_zero(&self) -> bool;
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $zero:expr;)*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }

        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn is_zero(&self) -> bool {
                let zero: fn(&$ty) -> bool = $zero;
                zero(self)
            }
        }
    )*};
}

value_conversions! {
    bool => Bool, |v| !*v;
    i16 => Int16, |v| *v == 0;
    i32 => Int32, |v| *v == 0;
    i64 => Int64, |v| *v == 0;
    f32 => Float32, |v| *v == 0.0;
    f64 => Float64, |v| *v == 0.0;
    BigDecimal => Decimal, |v| *v == BigDecimal::from(0i64);
    String => String, |v| v.is_empty();
    Vec<u8> => Bytes, |v| v.is_empty();
    Uuid => Uuid, |v| v.is_nil();
    NaiveDate => Date, |_| false;
    NaiveTime => Time, |_| false;
    NaiveDateTime => Timestamp, |_| false;
    DateTime<Utc> => TimestampTz, |_| false;
    serde_json::Value => Json, |v| v.is_null();
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
