use std::ops::{Deref, DerefMut};

use crate::error::Result;
use crate::executor::PreparerExecutor;
use crate::row::{map_row, map_rows, MappedRow, MappedRows};
use crate::statement::{BindParameterValueFns, Statement};

/// Resets the statement's bound values when dropped, which covers early
/// returns, errors and a cancelled future alike.
struct ResetOnDrop<'s> {
    statement: &'s mut Statement,
}

impl<'s> ResetOnDrop<'s> {
    fn new(statement: &'s mut Statement) -> Self {
        Self { statement }
    }
}

impl Deref for ResetOnDrop<'_> {
    type Target = Statement;

    fn deref(&self) -> &Statement {
        self.statement
    }
}

impl DerefMut for ResetOnDrop<'_> {
    fn deref_mut(&mut self) -> &mut Statement {
        self.statement
    }
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.statement.reset_bound_values();
    }
}

/// Prepares the rewritten SQL, then applies `binders`.
async fn prepare_and_bind<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<E::Prepared>
where
    E: PreparerExecutor,
{
    let prepared = executor.prepare(statement.revised()).await?;
    if !binders.is_empty() {
        statement.bind_values(binders)?;
    }
    Ok(prepared)
}

/// Executes a statement that returns no rows.
///
/// Values already bound on `statement` are kept and `binders` are applied on
/// top. The bound values are reset afterwards whatever the outcome.
///
/// # Errors
///
/// Binder errors, and database errors from prepare or execute unchanged.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_named_params::{exec, BindParameterValueFns, Statement};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pool = PgPool::connect("postgres://localhost/test").await?;
/// let mut stmt = Statement::prepare("DELETE FROM users WHERE id = @id")?;
///
/// let result = exec(&mut pool, &mut stmt, &BindParameterValueFns::new().with("id", 42i64)).await?;
/// println!("Deleted {} rows", result.rows_affected());
/// # Ok(())
/// # }
/// ```
pub async fn exec<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<E::Outcome>
where
    E: PreparerExecutor,
{
    let mut statement = ResetOnDrop::new(statement);
    tracing::debug!(sql = statement.revised(), slots = statement.slot_count(), "exec");

    let prepared = prepare_and_bind(executor, &mut statement, binders).await?;
    executor.execute(&prepared, statement.slot_values()).await
}

/// Executes a statement and returns every row.
pub async fn query<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<Vec<E::Row>>
where
    E: PreparerExecutor,
{
    let mut statement = ResetOnDrop::new(statement);
    tracing::debug!(sql = statement.revised(), slots = statement.slot_count(), "query");

    let prepared = prepare_and_bind(executor, &mut statement, binders).await?;
    executor.query(&prepared, statement.slot_values()).await
}

/// Executes a statement and returns its first row.
///
/// # Errors
///
/// `sqlx::Error::RowNotFound` (as [`Error::Database`](crate::Error::Database))
/// if the query returns nothing.
pub async fn query_row<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<E::Row>
where
    E: PreparerExecutor,
{
    let mut statement = ResetOnDrop::new(statement);
    tracing::debug!(sql = statement.revised(), slots = statement.slot_count(), "query_row");

    let prepared = prepare_and_bind(executor, &mut statement, binders).await?;
    executor.query_one(&prepared, statement.slot_values()).await
}

/// [`query`], with every row run through [`map_rows`].
pub async fn query_mapped<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<MappedRows>
where
    E: PreparerExecutor,
{
    let rows = query(executor, statement, binders).await?;
    map_rows(&rows)
}

/// [`query_row`], with the requested `columns` run through [`map_row`].
pub async fn query_row_mapped<E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
    columns: &[&str],
) -> Result<MappedRow>
where
    E: PreparerExecutor,
{
    let row = query_row(executor, statement, binders).await?;
    map_row(&row, columns)
}

impl Statement {
    /// See [`exec`].
    pub async fn exec<E>(&mut self, executor: &mut E, binders: &BindParameterValueFns) -> Result<E::Outcome>
    where
        E: PreparerExecutor,
    {
        exec(executor, self, binders).await
    }

    /// See [`query`].
    pub async fn query<E>(&mut self, executor: &mut E, binders: &BindParameterValueFns) -> Result<Vec<E::Row>>
    where
        E: PreparerExecutor,
    {
        query(executor, self, binders).await
    }

    /// See [`query_row`].
    pub async fn query_row<E>(&mut self, executor: &mut E, binders: &BindParameterValueFns) -> Result<E::Row>
    where
        E: PreparerExecutor,
    {
        query_row(executor, self, binders).await
    }
}
