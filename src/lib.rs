//! # sqlx-named-params
//!
//! Named parameters, positional binding and type-checked row mapping on top of SQLx for PostgreSQL.
//!
//! ## Features
//!
//! - **Named Placeholders**: Write `@param_name` (or `:param_name`) and get `$1`, `$2`, ... back
//! - **Quote Aware**: Placeholders inside `'...'` literals are left alone
//! - **Repeated Names**: Every occurrence gets its own slot; binding a name fills all of them
//! - **Superset Binding**: Binding a name the statement does not use is a no-op
//! - **Reusable Statements**: Bound values are reset after every execution, success or failure
//! - **Typed Row Binding**: Column binders narrow each value to the field's type and report mismatches
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["postgres", "runtime-tokio"] }
//! sqlx-named-params = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Rewriting and Binding
//!
//! ```rust
//! use sqlx_named_params::{Statement, Value};
//!
//! let mut stmt = Statement::prepare("SELECT * FROM t WHERE a = @x AND b = @y AND c = @x")?;
//! assert_eq!(stmt.revised(), "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $3");
//! assert_eq!(stmt.positions().unwrap().positions_of("x"), Some(&[0, 2][..]));
//!
//! stmt.bind_value("x", 5i64)?;
//! stmt.bind_value("y", "s")?;
//! assert_eq!(
//!     stmt.bound_values(),
//!     Some(&[Value::Int64(5), Value::from("s"), Value::Int64(5)][..])
//! );
//! # Ok::<(), sqlx_named_params::Error>(())
//! ```
//!
//! ### Basic Query Execution
//!
//! ```rust,no_run
//! use sqlx::PgPool;
//! use sqlx_named_params::{BindParameterValueFns, Statement};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut pool = PgPool::connect("postgres://localhost/test").await?;
//!
//! let mut insert = Statement::prepare("INSERT INTO users (id, name) VALUES (@id, @name)")?;
//! let result = insert
//!     .exec(&mut pool, &BindParameterValueFns::new().with("id", 42i64).with("name", "John Doe"))
//!     .await?;
//! println!("Inserted {} rows", result.rows_affected());
//! # Ok(())
//! # }
//! ```
//!
//! ### Typed Query Results
//!
//! ```rust,no_run
//! use sqlx::PgPool;
//! use sqlx_named_params::{
//!     bind_column_to_field, query_as, BindParameterValueFns, ColumnBinders, RowBinder, Statement,
//! };
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     email: String,
//! }
//!
//! impl RowBinder for User {
//!     fn column_binders(&mut self) -> ColumnBinders<'_> {
//!         let User { id, email } = self;
//!         ColumnBinders::new()
//!             .bind("id", bind_column_to_field(move |v: i64| {
//!                 *id = v;
//!                 Ok(())
//!             }))
//!             .bind("email", bind_column_to_field(move |v: String| {
//!                 *email = v;
//!                 Ok(())
//!             }))
//!     }
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut pool = PgPool::connect("postgres://localhost/test").await?;
//! let mut stmt = Statement::prepare("SELECT id, email FROM users WHERE age >= @min_age")?;
//! let users: Vec<User> =
//!     query_as(&mut pool, &mut stmt, &BindParameterValueFns::new().with("min_age", 18i32)).await?;
//! for user in users {
//!     println!("{}: {}", user.id, user.email);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Using with Transactions
//!
//! ```rust,no_run
//! use sqlx::PgPool;
//! use sqlx_named_params::{BindParameterValueFns, Statement};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = PgPool::connect("postgres://localhost/test").await?;
//! let mut tx = pool.begin().await?;
//! let mut move_funds =
//!     Statement::prepare("UPDATE accounts SET balance = balance + @delta WHERE id = @id")?;
//!
//! move_funds
//!     .exec(&mut *tx, &BindParameterValueFns::new().with("delta", -100i32).with("id", 1i64))
//!     .await?;
//! move_funds
//!     .exec(&mut *tx, &BindParameterValueFns::new().with("delta", 100i32).with("id", 2i64))
//!     .await?;
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Rewrite**: A single pass over the template swaps each named parameter for the next
//!    positional placeholder and records which slots each name owns
//! 2. **Bind**: Values are written into every slot of their name; unknown names are ignored
//! 3. **Execute**: The rewritten SQL is prepared, run with the values in slot order, and the
//!    values are reset on every exit path
//! 4. **Map**: Rows become ordered column/value maps that column binders copy into your records
//!
//! ## Limitations
//!
//! - Only PostgreSQL `$n` placeholders are executed, though the characters are configurable
//! - Parameter names are letters, digits and `_`
//! - Quoted literals cannot contain an escaped quote character
//! - A doubled prefix (`::`, `@@`) is copied as text, so Postgres casts and operators work with either dialect
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod builder;
pub mod column;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod positions;
pub mod query;
pub mod query_as;
pub mod row;
pub mod statement;
pub mod value;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use column::{
    bind_column_to_field, map_column, ColumnBinderFn, ColumnBinders, ColumnBinding,
    ColumnBindingRules, ColumnMapper, ColumnMapperFn,
};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use executor::PreparerExecutor;
pub use positions::PositionIndex;
pub use query::{exec, query, query_mapped, query_row, query_row_mapped};
pub use query_as::{bind_mapped_rows, query_as, query_row_as, RowBinder};
pub use row::{map_row, map_rows, Column, Columns, MappedRow, MappedRows, ScanRow};
pub use statement::{bind_parameter_value, BindParameterValueFn, BindParameterValueFns, Statement};
pub use value::{FromValue, Value, ValueKind};

/// Convenience re-exports for common use cases
///
/// [`Result`] is left out so a glob import does not shadow `std::result::Result`.
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::{
        bind_column_to_field, BindParameterValueFns, ColumnBinders, MappedRow, RowBinder,
        Statement, Value,
    };
}
