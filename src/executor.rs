use std::future::Future;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{
    PgArgumentBuffer, PgArguments, PgConnection, PgPool, PgQueryResult, PgRow, PgStatement,
    PgTypeInfo,
};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Encode, Postgres, Type};

use crate::error::Result;
use crate::row::ScanRow;
use crate::value::Value;

/// Type alias for SQLx Query with PostgreSQL arguments
pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// The database operations the execution wrappers need.
///
/// `prepare` turns rewritten SQL into a handle; the other methods run that
/// handle with values in slot order. Errors from the database come back
/// unchanged inside [`Error::Database`](crate::Error::Database).
pub trait PreparerExecutor {
    type Prepared: Send + Sync;
    type Row: ScanRow + Send;
    /// What a non-query execution reports back.
    type Outcome: Send;

    fn prepare(&mut self, sql: &str) -> impl Future<Output = Result<Self::Prepared>> + Send;

    fn execute(
        &mut self,
        prepared: &Self::Prepared,
        values: &[Value],
    ) -> impl Future<Output = Result<Self::Outcome>> + Send;

    fn query(
        &mut self,
        prepared: &Self::Prepared,
        values: &[Value],
    ) -> impl Future<Output = Result<Vec<Self::Row>>> + Send;

    /// Fails with `sqlx::Error::RowNotFound` when the query returns no row.
    fn query_one(
        &mut self,
        prepared: &Self::Prepared,
        values: &[Value],
    ) -> impl Future<Output = Result<Self::Row>> + Send;
}

/// A NULL parameter declared with OID 0, so the server infers its type from
/// the statement on whichever connection parses it.
#[derive(Debug, Clone, Copy)]
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(
        &self,
        _buf: &mut PgArgumentBuffer,
    ) -> std::result::Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

/// Binds `values` onto `query` in order.
pub fn bind_values<'q>(mut query: PgQuery<'q>, values: &[Value]) -> PgQuery<'q> {
    for value in values {
        query = bind_value(query, value.clone());
    }
    query
}

fn bind_value(query: PgQuery<'_>, value: Value) -> PgQuery<'_> {
    match value {
        Value::Null => query.bind(UntypedNull),
        Value::Bool(v) => query.bind(v),
        Value::Int16(v) => query.bind(v),
        Value::Int32(v) => query.bind(v),
        Value::Int64(v) => query.bind(v),
        Value::Float32(v) => query.bind(v),
        Value::Float64(v) => query.bind(v),
        Value::Decimal(v) => query.bind(v),
        Value::String(v) => query.bind(v),
        Value::Bytes(v) => query.bind(v),
        Value::Uuid(v) => query.bind(v),
        Value::Date(v) => query.bind(v),
        Value::Time(v) => query.bind(v),
        Value::Timestamp(v) => query.bind(v),
        Value::TimestampTz(v) => query.bind(v),
        Value::Json(v) => query.bind(Json(v)),
    }
}

impl PreparerExecutor for PgPool {
    type Prepared = PgStatement<'static>;
    type Row = PgRow;
    type Outcome = PgQueryResult;

    async fn prepare(&mut self, sql: &str) -> Result<Self::Prepared> {
        let statement = sqlx::Executor::prepare(&*self, sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn execute(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<PgQueryResult> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.execute(&*self).await?)
    }

    async fn query(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<Vec<PgRow>> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.fetch_all(&*self).await?)
    }

    async fn query_one(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<PgRow> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.fetch_one(&*self).await?)
    }
}

/// Also covers transactions through `&mut *tx`.
impl PreparerExecutor for PgConnection {
    type Prepared = PgStatement<'static>;
    type Row = PgRow;
    type Outcome = PgQueryResult;

    async fn prepare(&mut self, sql: &str) -> Result<Self::Prepared> {
        let statement = sqlx::Executor::prepare(&mut *self, sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn execute(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<PgQueryResult> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.execute(&mut *self).await?)
    }

    async fn query(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<Vec<PgRow>> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.fetch_all(&mut *self).await?)
    }

    async fn query_one(&mut self, prepared: &Self::Prepared, values: &[Value]) -> Result<PgRow> {
        let query = bind_values(sqlx::Statement::query(prepared), values);
        Ok(query.fetch_one(&mut *self).await?)
    }
}
