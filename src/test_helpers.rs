//! In-memory stand-ins for the database used by unit tests.

use crate::error::{Error, Result};
use crate::executor::PreparerExecutor;
use crate::row::ScanRow;
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockRow(Vec<(String, Value)>);

impl MockRow {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.push((column.to_owned(), value.into()));
        self
    }
}

impl ScanRow for MockRow {
    fn column_names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    fn scan_column(&self, column: &str) -> Result<Value> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| sqlx::Error::ColumnNotFound(column.to_owned()).into())
    }
}

/// Records what it was asked to prepare and run, and answers with canned rows.
#[derive(Debug, Default)]
pub(crate) struct RecordingExecutor {
    pub(crate) prepared: Vec<String>,
    pub(crate) executed: Vec<Vec<Value>>,
    pub(crate) rows: Vec<MockRow>,
    pub(crate) fail_prepare: bool,
    pub(crate) fail_execute: bool,
}

impl RecordingExecutor {
    pub(crate) fn with_rows(rows: Vec<MockRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn run(&mut self, values: &[Value]) -> Result<()> {
        self.executed.push(values.to_vec());
        if self.fail_execute {
            return Err(Error::Database(sqlx::Error::Protocol(
                "execution failed".to_owned(),
            )));
        }
        Ok(())
    }
}

impl PreparerExecutor for RecordingExecutor {
    type Prepared = String;
    type Row = MockRow;
    type Outcome = u64;

    async fn prepare(&mut self, sql: &str) -> Result<String> {
        if self.fail_prepare {
            return Err(Error::Database(sqlx::Error::Protocol(
                "prepare failed".to_owned(),
            )));
        }
        self.prepared.push(sql.to_owned());
        Ok(sql.to_owned())
    }

    async fn execute(&mut self, _prepared: &String, values: &[Value]) -> Result<u64> {
        self.run(values)?;
        Ok(1)
    }

    async fn query(&mut self, _prepared: &String, values: &[Value]) -> Result<Vec<MockRow>> {
        self.run(values)?;
        Ok(self.rows.clone())
    }

    async fn query_one(&mut self, _prepared: &String, values: &[Value]) -> Result<MockRow> {
        self.run(values)?;
        self.rows
            .first()
            .cloned()
            .ok_or(Error::Database(sqlx::Error::RowNotFound))
    }
}
