use crate::column::ColumnBinders;
use crate::error::Result;
use crate::executor::PreparerExecutor;
use crate::query::{query_mapped, query_row};
use crate::row::{map_row, MappedRow, ScanRow};
use crate::statement::{BindParameterValueFns, Statement};

/// A destination record that can be populated from a [`MappedRow`].
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{bind_column_to_field, ColumnBinders, MappedRow, RowBinder};
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl RowBinder for User {
///     fn column_binders(&mut self) -> ColumnBinders<'_> {
///         let User { id, name } = self;
///         ColumnBinders::new()
///             .bind("id", bind_column_to_field(move |v: i64| {
///                 *id = v;
///                 Ok(())
///             }))
///             .bind("name", bind_column_to_field(move |v: String| {
///                 *name = v;
///                 Ok(())
///             }))
///     }
/// }
///
/// let mut user = User::default();
/// user.bind_mapped_row(&MappedRow::new().with("id", 7i64).with("name", "bob"))?;
/// assert_eq!((user.id, user.name.as_str()), (7, "bob"));
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub trait RowBinder {
    /// One binding per column; each binding writes its own field.
    fn column_binders(&mut self) -> ColumnBinders<'_>;

    fn bind_mapped_row(&mut self, row: &MappedRow) -> Result<()> {
        self.column_binders().bind_mapped_row(row)
    }
}

/// Binds each row into a fresh `T`, in row order.
pub fn bind_mapped_rows<T>(rows: &[MappedRow]) -> Result<Vec<T>>
where
    T: RowBinder + Default,
{
    rows.iter()
        .map(|row| -> Result<T> {
            let mut record = T::default();
            record.bind_mapped_row(row)?;
            Ok(record)
        })
        .collect()
}

/// Executes the statement and returns every row as a `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_named_params::{bind_column_to_field, query_as, BindParameterValueFns, ColumnBinders, RowBinder, Statement};
///
/// #[derive(Default)]
/// struct User {
///     name: String,
/// }
///
/// impl RowBinder for User {
///     fn column_binders(&mut self) -> ColumnBinders<'_> {
///         let User { name } = self;
///         ColumnBinders::new().bind("name", bind_column_to_field(move |v: String| {
///             *name = v;
///             Ok(())
///         }))
///     }
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pool = PgPool::connect("postgres://localhost/test").await?;
/// let mut stmt = Statement::prepare("SELECT name FROM users WHERE age >= @min_age")?;
///
/// let users: Vec<User> =
///     query_as(&mut pool, &mut stmt, &BindParameterValueFns::new().with("min_age", 18i32)).await?;
/// println!("Found {} users", users.len());
/// # Ok(())
/// # }
/// ```
pub async fn query_as<T, E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<Vec<T>>
where
    T: RowBinder + Default,
    E: PreparerExecutor,
{
    let rows = query_mapped(executor, statement, binders).await?;
    bind_mapped_rows(&rows)
}

/// Executes the statement and returns its first row as a `T`.
///
/// Every column of the row is mapped, so required bindings see the full row.
pub async fn query_row_as<T, E>(
    executor: &mut E,
    statement: &mut Statement,
    binders: &BindParameterValueFns,
) -> Result<T>
where
    T: RowBinder + Default,
    E: PreparerExecutor,
{
    let row = query_row(executor, statement, binders).await?;
    let names = row.column_names();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let mapped = map_row(&row, &names)?;

    let mut record = T::default();
    record.bind_mapped_row(&mapped)?;
    Ok(record)
}
