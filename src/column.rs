use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::row::{Column, Columns, MappedRow};
use crate::value::{FromValue, Value};

/// Rules applied before a column value reaches its binder.
///
/// Columns are required unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnBindingRules {
    required: bool,
}

impl ColumnBindingRules {
    pub const fn required() -> Self {
        Self { required: true }
    }

    /// A missing column is skipped instead of failing the bind.
    pub const fn optional() -> Self {
        Self { required: false }
    }

    pub const fn required_column(&self) -> bool {
        self.required
    }
}

impl Default for ColumnBindingRules {
    fn default() -> Self {
        Self::required()
    }
}

/// Binds one column of a [`MappedRow`] into a destination field.
pub type ColumnBinderFn<'a> =
    Box<dyn FnMut(&MappedRow, &Column, &ColumnBindingRules) -> Result<()> + 'a>;

/// Creates a binder that narrows the column value to `T` and hands it to `bind`.
///
/// - Column missing: error if required, otherwise nothing happens.
/// - Value NULL or zero: nothing happens, the field keeps its current value.
/// - Value of another kind: [`Error::TypeMismatch`].
/// - Otherwise `bind` is called and its error, if any, is returned.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{bind_column_to_field, ColumnBinding, MappedRow};
///
/// let mut id = 0i64;
/// let row = MappedRow::new().with("id", 7i64);
///
/// let mut binding = ColumnBinding::new("id", bind_column_to_field(|value: i64| {
///     id = value;
///     Ok(())
/// }));
/// binding.bind_column(&row)?;
/// drop(binding);
///
/// assert_eq!(id, 7);
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn bind_column_to_field<'a, T, F>(mut bind: F) -> ColumnBinderFn<'a>
where
    T: FromValue,
    F: FnMut(T) -> Result<()> + 'a,
{
    Box::new(move |row, column, rules| {
        let Some(value) = row.get(column.as_str()) else {
            if rules.required_column() {
                return Err(Error::MissingRequiredColumn(column.clone()));
            }
            return Ok(());
        };

        match narrow::<T>(column, value)? {
            Some(typed) => bind(typed),
            None => Ok(()),
        }
    })
}

/// `Ok(None)` for NULL and zero values.
fn narrow<T: FromValue>(column: &Column, value: &Value) -> Result<Option<T>> {
    if value.is_zero() {
        return Ok(None);
    }

    let typed = T::from_value(value).ok_or_else(|| Error::TypeMismatch {
        column: column.clone(),
        actual: value.kind(),
        expected: T::KIND,
    })?;

    if typed.is_zero() {
        return Ok(None);
    }
    Ok(Some(typed))
}

/// A column name, its binding rules and the binder that writes it.
pub struct ColumnBinding<'a> {
    column: Column,
    rules: ColumnBindingRules,
    binder: ColumnBinderFn<'a>,
}

impl<'a> ColumnBinding<'a> {
    /// A required column.
    pub fn new(column: impl Into<Column>, binder: ColumnBinderFn<'a>) -> Self {
        Self::with_rules(column, ColumnBindingRules::default(), binder)
    }

    pub fn with_rules(
        column: impl Into<Column>,
        rules: ColumnBindingRules,
        binder: ColumnBinderFn<'a>,
    ) -> Self {
        Self {
            column: column.into(),
            rules,
            binder,
        }
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn rules(&self) -> ColumnBindingRules {
        self.rules
    }

    pub fn bind_column(&mut self, row: &MappedRow) -> Result<()> {
        (self.binder)(row, &self.column, &self.rules)
    }
}

impl fmt::Debug for ColumnBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("column", &self.column)
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

/// The column bindings of one destination record, one per column, applied
/// in insertion order.
#[derive(Debug, Default)]
pub struct ColumnBinders<'a>(Vec<ColumnBinding<'a>>);

impl<'a> ColumnBinders<'a> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds `binding`, replacing an existing binding for the same column in place.
    pub fn push(&mut self, binding: ColumnBinding<'a>) {
        match self.0.iter_mut().find(|b| b.column == binding.column) {
            Some(existing) => *existing = binding,
            None => self.0.push(binding),
        }
    }

    /// Adds a required column.
    pub fn bind(mut self, column: impl Into<Column>, binder: ColumnBinderFn<'a>) -> Self {
        self.push(ColumnBinding::new(column, binder));
        self
    }

    /// Adds a column that may be absent from the row.
    pub fn bind_optional(mut self, column: impl Into<Column>, binder: ColumnBinderFn<'a>) -> Self {
        self.push(ColumnBinding::with_rules(
            column,
            ColumnBindingRules::optional(),
            binder,
        ));
        self
    }

    /// Keeps only the bindings for which `predicate` returns true.
    pub fn filter<P>(mut self, mut predicate: P) -> Self
    where
        P: FnMut(&ColumnBinding<'a>) -> bool,
    {
        self.0.retain(|binding| predicate(binding));
        self
    }

    pub fn columns(&self) -> Columns {
        self.0.iter().map(|b| b.column.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Runs every binding against `row`, stopping at the first error.
    pub fn bind_mapped_row(&mut self, row: &MappedRow) -> Result<()> {
        for binding in &mut self.0 {
            binding.bind_column(row)?;
        }
        Ok(())
    }
}

impl<'a> FromIterator<ColumnBinding<'a>> for ColumnBinders<'a> {
    fn from_iter<I: IntoIterator<Item = ColumnBinding<'a>>>(iter: I) -> Self {
        let mut binders = Self::new();
        for binding in iter {
            binders.push(binding);
        }
        binders
    }
}

/// Maps one column of a [`MappedRow`] into a destination field. Absent
/// columns are always skipped.
pub type ColumnMapperFn<'a> = Box<dyn FnMut(&Column, &MappedRow) -> Result<()> + 'a>;

/// Like [`bind_column_to_field`] but never requires the column.
pub fn map_column<'a, T, F>(mut map: F) -> ColumnMapperFn<'a>
where
    T: FromValue,
    F: FnMut(T) -> Result<()> + 'a,
{
    Box::new(move |column, row| {
        let Some(value) = row.get(column.as_str()) else {
            return Ok(());
        };
        match narrow::<T>(column, value)? {
            Some(typed) => map(typed),
            None => Ok(()),
        }
    })
}

/// A registry of column mappers keyed by column name.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{map_column, ColumnMapper, MappedRow};
///
/// let mut name = String::new();
/// let mut mapper = ColumnMapper::new().map("name", map_column(|v: String| {
///     name = v;
///     Ok(())
/// }));
/// assert!(mapper.columns().has_column("name"));
///
/// mapper.map_row(&MappedRow::new().with("name", "bob"))?;
/// drop(mapper);
/// assert_eq!(name, "bob");
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Default)]
pub struct ColumnMapper<'a>(IndexMap<Column, ColumnMapperFn<'a>>);

impl<'a> ColumnMapper<'a> {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Registers `mapper` for `column`, replacing any earlier one.
    pub fn map(mut self, column: impl Into<Column>, mapper: ColumnMapperFn<'a>) -> Self {
        self.0.insert(column.into(), mapper);
        self
    }

    /// Columns in registration order.
    pub fn columns(&self) -> Columns {
        self.0.keys().cloned().collect()
    }

    pub fn map_row(&mut self, row: &MappedRow) -> Result<()> {
        for (column, mapper) in &mut self.0 {
            mapper(column, row)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ColumnMapper<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMapper")
            .field("columns", &self.columns())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    #[derive(Debug, Default)]
    struct Person {
        id: i64,
        name: String,
        nickname: Option<String>,
        born: Option<NaiveDateTime>,
    }

    impl Person {
        fn column_binders(&mut self) -> ColumnBinders<'_> {
            let Person {
                id,
                name,
                nickname,
                born,
            } = self;
            ColumnBinders::new()
                .bind(
                    "id",
                    bind_column_to_field(move |v: i64| {
                        *id = v;
                        Ok(())
                    }),
                )
                .bind(
                    "name",
                    bind_column_to_field(move |v: String| {
                        *name = v;
                        Ok(())
                    }),
                )
                .bind_optional(
                    "nickname",
                    bind_column_to_field(move |v: String| {
                        *nickname = Some(v);
                        Ok(())
                    }),
                )
                .bind_optional(
                    "born",
                    bind_column_to_field(move |v: NaiveDateTime| {
                        *born = Some(v);
                        Ok(())
                    }),
                )
        }
    }

    #[test]
    fn test_binds_present_and_typed_columns() {
        let row = MappedRow::new().with("id", 7i64).with("name", "bob");
        let mut person = Person::default();
        person.column_binders().bind_mapped_row(&row).unwrap();

        assert_eq!(person.id, 7);
        assert_eq!(person.name, "bob");
        assert_eq!(person.nickname, None);
    }

    #[test]
    fn test_missing_required_column() {
        let row = MappedRow::new().with("name", "bob");
        let mut person = Person::default();
        let err = person.column_binders().bind_mapped_row(&row).unwrap_err();

        assert!(matches!(err, Error::MissingRequiredColumn(ref c) if c.as_str() == "id"));
        assert_eq!(err.to_string(), "required column id not found");
    }

    #[test]
    fn test_type_mismatch_reports_both_types() {
        let row = MappedRow::new().with("id", "7");
        let mut person = Person::default();
        let err = person.column_binders().bind_mapped_row(&row).unwrap_err();

        match &err {
            Error::TypeMismatch {
                column,
                actual,
                expected,
            } => {
                assert_eq!(column.as_str(), "id");
                assert_eq!(actual.to_string(), "string");
                assert_eq!(expected.to_string(), "int64");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "column id has a type of string and does not match asserted type: int64"
        );
    }

    #[test]
    fn test_null_and_zero_values_leave_field_untouched() {
        let row = MappedRow::new()
            .with("id", Value::Null)
            .with("name", "")
            .with("nickname", Value::Null);
        let mut person = Person {
            id: 42,
            name: "keep".into(),
            ..Person::default()
        };
        person.column_binders().bind_mapped_row(&row).unwrap();

        assert_eq!(person.id, 42);
        assert_eq!(person.name, "keep");
        assert_eq!(person.nickname, None);
    }

    #[test]
    fn test_zero_value_of_wrong_kind_is_not_a_mismatch() {
        let row = MappedRow::new().with("id", 0i32).with("name", "x");
        let mut person = Person::default();
        person.column_binders().bind_mapped_row(&row).unwrap();
        assert_eq!(person.id, 0);
    }

    #[test]
    fn test_optional_column_binds_when_present() {
        let born = NaiveDate::from_ymd_opt(1990, 5, 17)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let row = MappedRow::new()
            .with("id", 1i64)
            .with("name", "ann")
            .with("nickname", "annie")
            .with("born", born);
        let mut person = Person::default();
        person.column_binders().bind_mapped_row(&row).unwrap();

        assert_eq!(person.nickname.as_deref(), Some("annie"));
        assert_eq!(person.born, Some(born));
    }

    #[test]
    fn test_binder_error_is_propagated() {
        let row = MappedRow::new().with("age", 200i32);
        let mut binders = ColumnBinders::new().bind(
            "age",
            bind_column_to_field(|v: i32| {
                if v > 150 {
                    return Err(Error::Bind(format!("age {v} out of range")));
                }
                Ok(())
            }),
        );
        let err = binders.bind_mapped_row(&row).unwrap_err();
        assert_eq!(err.to_string(), "Binding failed: age 200 out of range");
    }

    #[test]
    fn test_errors_follow_insertion_order() {
        let row = MappedRow::new().with("a", "x").with("b", "y");
        let mut binders = ColumnBinders::new()
            .bind("b", bind_column_to_field(|_: i64| Ok(())))
            .bind("a", bind_column_to_field(|_: i64| Ok(())));
        let err = binders.bind_mapped_row(&row).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref column, .. } if column.as_str() == "b"));
    }

    #[test]
    fn test_duplicate_column_replaces_binding() {
        let binders = ColumnBinders::new()
            .bind("id", bind_column_to_field(|_: i64| Ok(())))
            .bind("name", bind_column_to_field(|_: String| Ok(())))
            .bind_optional("id", bind_column_to_field(|_: i32| Ok(())));

        assert_eq!(binders.len(), 2);
        let columns: Vec<_> = binders.columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(columns, vec!["id", "name"]);
    }

    #[test]
    fn test_filter_keeps_matching_bindings() {
        let mut person = Person::default();
        let binders = person
            .column_binders()
            .filter(|binding| binding.rules().required_column());

        assert_eq!(binders.len(), 2);
        assert!(binders.columns().has_column("id"));
        assert!(!binders.columns().has_column("nickname"));
    }

    #[test]
    fn test_column_mapper_skips_missing_and_checks_types() {
        let mut id = 0i64;
        let mut name = String::new();
        {
            let mut mapper = ColumnMapper::new()
                .map(
                    "id",
                    map_column(|v: i64| {
                        id = v;
                        Ok(())
                    }),
                )
                .map(
                    "name",
                    map_column(|v: String| {
                        name = v;
                        Ok(())
                    }),
                );
            mapper.map_row(&MappedRow::new().with("id", 3i64)).unwrap();

            let err = mapper
                .map_row(&MappedRow::new().with("name", 5i64))
                .unwrap_err();
            assert_eq!(
                err.to_string(),
                "column name has a type of int64 and does not match asserted type: string"
            );
        }
        assert_eq!(id, 3);
        assert!(name.is_empty());
    }

    #[test]
    fn test_column_mapper_columns_in_registration_order() {
        let mapper = ColumnMapper::new()
            .map("z", map_column(|_: bool| Ok(())))
            .map("a", map_column(|_: bool| Ok(())))
            .map("m", map_column(|_: bool| Ok(())));
        let columns: Vec<_> = mapper.columns().iter().map(|c| c.to_string()).collect();
        assert_eq!(columns, vec!["z", "a", "m"]);
    }
}
