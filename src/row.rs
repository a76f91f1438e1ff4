use std::borrow::Borrow;
use std::fmt;

use indexmap::IndexMap;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgRow, PgValueRef, Postgres};
use sqlx::types::{BigDecimal, Json};
use sqlx::{Decode, Row, TypeInfo, ValueRef};

use crate::error::{Error, Result};
use crate::value::Value;

/// A database column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column(String);

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Column {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// An ordered list of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(Vec<Column>);

impl Columns {
    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.0.iter().any(|c| c.as_str() == column)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.0.iter()
    }
}

impl FromIterator<Column> for Columns {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One fetched row as column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedRow(IndexMap<Column, Value>);

impl MappedRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the value of `column`.
    pub fn insert(&mut self, column: impl Into<Column>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, column: impl Into<Column>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> Columns {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Value)> {
        self.0.iter()
    }
}

impl<C: Into<Column>, V: Into<Value>> FromIterator<(C, V)> for MappedRow {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        )
    }
}

/// Rows in fetch order.
pub type MappedRows = Vec<MappedRow>;

/// Reads column values of unknown type out of a fetched row.
pub trait ScanRow {
    /// Column names in result order.
    fn column_names(&self) -> Vec<String>;

    /// Reads one column into an owned [`Value`].
    fn scan_column(&self, column: &str) -> Result<Value>;
}

/// Maps the requested `columns` of a single row.
///
/// # Errors
///
/// Whatever [`ScanRow::scan_column`] reports, typically a missing column.
pub fn map_row<R: ScanRow>(row: &R, columns: &[&str]) -> Result<MappedRow> {
    let mut mapped = MappedRow::new();
    for &column in columns {
        let value = row.scan_column(column)?;
        mapped.insert(column, value);
    }
    Ok(mapped)
}

/// Maps every column of every row, preserving fetch order.
///
/// Values are owned, so byte arrays are never shared between rows.
pub fn map_rows<R: ScanRow>(rows: &[R]) -> Result<MappedRows> {
    let mut mapped = MappedRows::with_capacity(rows.len());
    for row in rows {
        let names = row.column_names();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        mapped.push(map_row(row, &names)?);
    }
    Ok(mapped)
}

impl ScanRow for PgRow {
    fn column_names(&self) -> Vec<String> {
        use sqlx::Column as _;

        self.columns()
            .iter()
            .map(|column| column.name().to_owned())
            .collect()
    }

    fn scan_column(&self, column: &str) -> Result<Value> {
        let raw = self.try_get_raw(column)?;
        decode_pg_value(column, raw)
    }
}

/// How a PostgreSQL column is turned into a [`Value`], chosen by type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgDecoder {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Bytea,
    Uuid,
    Date,
    Time,
    Timestamp,
    Timestamptz,
    Json,
    /// Anything else keeps its wire bytes.
    Raw,
}

fn decoder_for(type_name: &str) -> PgDecoder {
    match type_name {
        "BOOL" => PgDecoder::Bool,
        "INT2" => PgDecoder::Int2,
        "INT4" => PgDecoder::Int4,
        "INT8" => PgDecoder::Int8,
        "OID" => PgDecoder::Oid,
        "FLOAT4" => PgDecoder::Float4,
        "FLOAT8" => PgDecoder::Float8,
        "NUMERIC" => PgDecoder::Numeric,
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => PgDecoder::Text,
        "BYTEA" => PgDecoder::Bytea,
        "UUID" => PgDecoder::Uuid,
        "DATE" => PgDecoder::Date,
        "TIME" => PgDecoder::Time,
        "TIMESTAMP" => PgDecoder::Timestamp,
        "TIMESTAMPTZ" => PgDecoder::Timestamptz,
        "JSON" | "JSONB" => PgDecoder::Json,
        _ => PgDecoder::Raw,
    }
}

fn decode_pg_value(column: &str, raw: PgValueRef<'_>) -> Result<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let decoder = decoder_for(raw.type_info().name());
    let decoded = match decoder {
        PgDecoder::Bool => decode::<bool>(raw).map(Value::Bool),
        PgDecoder::Int2 => decode::<i16>(raw).map(Value::Int16),
        PgDecoder::Int4 => decode::<i32>(raw).map(Value::Int32),
        PgDecoder::Int8 => decode::<i64>(raw).map(Value::Int64),
        PgDecoder::Oid => decode::<Oid>(raw).map(|oid| Value::Int64(i64::from(oid.0))),
        PgDecoder::Float4 => decode::<f32>(raw).map(Value::Float32),
        PgDecoder::Float8 => decode::<f64>(raw).map(Value::Float64),
        PgDecoder::Numeric => decode::<BigDecimal>(raw).map(Value::Decimal),
        PgDecoder::Text => decode::<String>(raw).map(Value::String),
        PgDecoder::Bytea => decode::<Vec<u8>>(raw).map(Value::Bytes),
        PgDecoder::Uuid => decode::<uuid::Uuid>(raw).map(Value::Uuid),
        PgDecoder::Date => decode::<chrono::NaiveDate>(raw).map(Value::Date),
        PgDecoder::Time => decode::<chrono::NaiveTime>(raw).map(Value::Time),
        PgDecoder::Timestamp => decode::<chrono::NaiveDateTime>(raw).map(Value::Timestamp),
        PgDecoder::Timestamptz => {
            decode::<chrono::DateTime<chrono::Utc>>(raw).map(Value::TimestampTz)
        }
        PgDecoder::Json => decode::<Json<serde_json::Value>>(raw).map(|json| Value::Json(json.0)),
        PgDecoder::Raw => raw.as_bytes().map(|bytes| Value::Bytes(bytes.to_vec())),
    };

    decoded.map_err(|source| Error::Decode {
        column: column.into(),
        source,
    })
}

fn decode<'r, T: Decode<'r, Postgres>>(
    raw: PgValueRef<'r>,
) -> std::result::Result<T, sqlx::error::BoxDynError> {
    T::decode(raw)
}
