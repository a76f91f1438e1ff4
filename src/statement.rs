use std::fmt;

use crate::builder::rewrite;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::positions::PositionIndex;
use crate::value::Value;

/// A SQL template rewritten to positional placeholders, plus the values bound to it.
///
/// The rewritten text and the position index never change after
/// [`prepare`](Self::prepare). The bound values are reset after every
/// execution, so a statement can be reused, but not shared between tasks
/// that bind concurrently: prepare one statement per task instead.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{Statement, Value};
///
/// let mut stmt = Statement::prepare("SELECT * FROM t WHERE a = @x AND b = @y AND c = @x")?;
/// assert_eq!(stmt.revised(), "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $3");
///
/// stmt.bind_value("x", 5i64)?;
/// stmt.bind_value("y", "s")?;
/// stmt.bind_value("not_in_query", true)?;
///
/// assert_eq!(
///     stmt.bound_values(),
///     Some(&[Value::Int64(5), Value::from("s"), Value::Int64(5)][..])
/// );
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Statement {
    original: String,
    revised: String,
    positions: PositionIndex,
    bound: Vec<Value>,
    bound_since_reset: bool,
}

impl Statement {
    /// Rewrites `template` with the default `@name` dialect.
    ///
    /// # Errors
    ///
    /// See [`rewrite`](crate::builder::rewrite).
    pub fn prepare<T>(template: T) -> Result<Self>
    where
        T: Into<String>,
    {
        Self::prepare_with(template, &Dialect::default())
    }

    /// Rewrites `template` with an explicit dialect.
    pub fn prepare_with<T>(template: T, dialect: &Dialect) -> Result<Self>
    where
        T: Into<String>,
    {
        let original = template.into();
        let rewritten = rewrite(&original, dialect)?;
        let slots = rewritten.positions.total_positions();
        Ok(Self {
            original,
            revised: rewritten.sql,
            positions: rewritten.positions,
            bound: vec![Value::Null; slots],
            bound_since_reset: false,
        })
    }

    /// The template as given, before rewriting.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// The SQL with positional placeholders.
    pub fn revised(&self) -> &str {
        &self.revised
    }

    /// `None` when the template has no named parameters.
    pub fn positions(&self) -> Option<&PositionIndex> {
        if self.positions.is_empty() {
            None
        } else {
            Some(&self.positions)
        }
    }

    pub fn slot_count(&self) -> usize {
        self.positions.total_positions()
    }

    /// Values in slot order, or `None` if there are no slots or nothing has
    /// been bound since the last reset.
    pub fn bound_values(&self) -> Option<&[Value]> {
        if self.bound.is_empty() || !self.bound_since_reset {
            None
        } else {
            Some(&self.bound)
        }
    }

    /// Every slot, unbound ones as NULL. This is what gets executed.
    pub(crate) fn slot_values(&self) -> &[Value] {
        &self.bound
    }

    /// Writes `value` into every slot of `name`.
    ///
    /// Names that do not appear in the template are ignored, so callers can
    /// pass a superset of parameters to a templated query.
    pub fn bind_value(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let Some(slots) = self.positions.positions_of(name) else {
            return Ok(());
        };

        let value = value.into();
        for &slot in slots {
            self.bound[slot] = value.clone();
        }
        self.bound_since_reset = true;
        Ok(())
    }

    /// Applies each binder in order, skipping absent entries and stopping at
    /// the first error.
    pub fn bind_values(&mut self, binders: &BindParameterValueFns) -> Result<()> {
        for binder in binders.iter().flatten() {
            binder(self)?;
        }
        Ok(())
    }

    /// Replaces every bound value with a fresh NULL.
    pub fn reset_bound_values(&mut self) {
        self.bound = vec![Value::Null; self.slot_count()];
        self.bound_since_reset = false;
        tracing::trace!(slots = self.bound.len(), "reset bound values");
    }
}

/// Binds one or more values into a [`Statement`].
pub type BindParameterValueFn = Box<dyn Fn(&mut Statement) -> Result<()> + Send + Sync>;

/// Creates a binder that sets `name` to `value`.
pub fn bind_parameter_value(name: impl Into<String>, value: impl Into<Value>) -> BindParameterValueFn {
    let name = name.into();
    let value = value.into();
    Box::new(move |statement| statement.bind_value(&name, value.clone()))
}

/// An ordered list of binders. Entries may be absent and are then skipped.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{BindParameterValueFns, Statement};
///
/// let optional_filter: Option<&str> = None;
/// let binders = BindParameterValueFns::new()
///     .with("id", 42i64)
///     .with_optional("name", optional_filter);
///
/// let mut stmt = Statement::prepare("SELECT * FROM users WHERE id = @id")?;
/// stmt.bind_values(&binders)?;
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
#[derive(Default)]
pub struct BindParameterValueFns(Vec<Option<BindParameterValueFn>>);

impl BindParameterValueFns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, binder: BindParameterValueFn) {
        self.0.push(Some(binder));
    }

    pub fn push_optional(&mut self, binder: Option<BindParameterValueFn>) {
        self.0.push(binder);
    }

    /// Adds a binder for `name`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(bind_parameter_value(name, value));
        self
    }

    /// Adds a binder for `name` only when `value` is present.
    pub fn with_optional<V: Into<Value>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.push_optional(value.map(|value| bind_parameter_value(name, value)));
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Option<BindParameterValueFn>> {
        self.0.iter()
    }
}

impl fmt::Debug for BindParameterValueFns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindParameterValueFns")
            .field("len", &self.0.len())
            .finish()
    }
}

impl FromIterator<BindParameterValueFn> for BindParameterValueFns {
    fn from_iter<I: IntoIterator<Item = BindParameterValueFn>>(iter: I) -> Self {
        Self(iter.into_iter().map(Some).collect())
    }
}

impl FromIterator<Option<BindParameterValueFn>> for BindParameterValueFns {
    fn from_iter<I: IntoIterator<Item = Option<BindParameterValueFn>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_prepare_keeps_original_and_revised() {
        let stmt = Statement::prepare("SELECT * FROM users WHERE id = @id").unwrap();
        assert_eq!(stmt.original(), "SELECT * FROM users WHERE id = @id");
        assert_eq!(stmt.revised(), "SELECT * FROM users WHERE id = $1");
        assert_eq!(stmt.slot_count(), 1);
    }

    #[test]
    fn test_no_params_has_no_positions_or_values() {
        let mut stmt = Statement::prepare("SELECT * FROM t WHERE a = '@literal'").unwrap();
        assert_eq!(stmt.revised(), stmt.original());
        assert!(stmt.positions().is_none());
        assert!(stmt.bound_values().is_none());

        stmt.bind_value("literal", 1i64).unwrap();
        assert!(stmt.bound_values().is_none());
    }

    #[test]
    fn test_bind_value_fills_every_slot_of_a_name() {
        let mut stmt =
            Statement::prepare("SELECT * FROM t WHERE a = @x AND b = @y AND c = @x").unwrap();
        stmt.bind_value("x", 5i64).unwrap();
        stmt.bind_value("y", "s").unwrap();

        assert_eq!(
            stmt.bound_values().unwrap(),
            &[Value::Int64(5), Value::from("s"), Value::Int64(5)]
        );
    }

    #[test]
    fn test_unknown_name_is_ignored() {
        let mut stmt = Statement::prepare("SELECT * FROM t WHERE a = @a").unwrap();
        stmt.bind_value("b", 1i64).unwrap();
        assert!(stmt.bound_values().is_none());
        assert_eq!(stmt.slot_values(), &[Value::Null]);
    }

    #[test]
    fn test_ordered_parameters() {
        let mut stmt = Statement::prepare_with(
            "SELECT * FROM table WHERE col1 = :foo AND col2 = :bar AND col3 = :foo AND col4 = :foo AND col5 = :bar",
            &Dialect::colon(),
        )
        .unwrap();
        let binders = BindParameterValueFns::new()
            .with("foo", "something")
            .with("bar", "else");
        stmt.bind_values(&binders).unwrap();

        let expected: Vec<Value> = ["something", "else", "something", "something", "else"]
            .into_iter()
            .map(Value::from)
            .collect();
        assert_eq!(stmt.bound_values().unwrap(), expected.as_slice());
    }

    #[test]
    fn test_bind_values_skips_absent_and_stops_at_first_error() {
        let mut stmt = Statement::prepare("INSERT INTO t VALUES (@a, @b, @c)").unwrap();

        let mut binders = BindParameterValueFns::new().with("a", 1i64);
        binders.push_optional(None);
        binders.push(Box::new(|_| Err(Error::Bind("rejected".into()))));
        binders.push(bind_parameter_value("c", 3i64));

        let err = stmt.bind_values(&binders).unwrap_err();
        assert!(matches!(err, Error::Bind(ref msg) if msg == "rejected"));
        assert_eq!(stmt.slot_values(), &[Value::Int64(1), Value::Null, Value::Null]);
    }

    #[test]
    fn test_reset_clears_values_and_keeps_length() {
        let mut stmt = Statement::prepare("SELECT @a, @b, @a").unwrap();
        stmt.bind_value("a", 1i64).unwrap();
        stmt.bind_value("b", 2i64).unwrap();

        stmt.reset_bound_values();

        assert!(stmt.bound_values().is_none());
        assert_eq!(stmt.slot_values(), &[Value::Null, Value::Null, Value::Null]);
    }

    #[test]
    fn test_binders_are_reusable() {
        let binders: BindParameterValueFns = vec![bind_parameter_value("id", 9i64)]
            .into_iter()
            .collect();
        let mut first = Statement::prepare("SELECT @id").unwrap();
        let mut second = Statement::prepare("SELECT @id, @id").unwrap();

        first.bind_values(&binders).unwrap();
        second.bind_values(&binders).unwrap();

        assert_eq!(first.bound_values().unwrap(), &[Value::Int64(9)]);
        assert_eq!(second.bound_values().unwrap(), &[Value::Int64(9), Value::Int64(9)]);
    }
}
