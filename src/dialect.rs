/// The characters that drive the named-parameter rewrite.
///
/// A dialect is passed explicitly to [`Statement::prepare_with`](crate::Statement::prepare_with);
/// there is no process-wide default that can be mutated.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::Dialect;
///
/// let dialect = Dialect::colon();
/// assert_eq!(dialect.parameter_prefix(), ':');
/// assert_eq!(dialect.placeholder_prefix(), '$');
///
/// let custom = Dialect::default().with_parameter_prefix('#');
/// assert_eq!(custom.parameter_prefix(), '#');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    parameter_prefix: char,
    quote: char,
    placeholder_prefix: char,
}

impl Dialect {
    /// `@name` parameters, `'` literals, `$n` placeholders.
    pub const fn at() -> Self {
        Self {
            parameter_prefix: '@',
            quote: '\'',
            placeholder_prefix: '$',
        }
    }

    /// `:name` parameters, `'` literals, `$n` placeholders.
    pub const fn colon() -> Self {
        Self {
            parameter_prefix: ':',
            quote: '\'',
            placeholder_prefix: '$',
        }
    }

    pub const fn with_parameter_prefix(mut self, prefix: char) -> Self {
        self.parameter_prefix = prefix;
        self
    }

    pub const fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub const fn with_placeholder_prefix(mut self, prefix: char) -> Self {
        self.placeholder_prefix = prefix;
        self
    }

    /// Character that introduces a named parameter.
    pub const fn parameter_prefix(&self) -> char {
        self.parameter_prefix
    }

    /// Character that opens and closes a literal span.
    pub const fn quote(&self) -> char {
        self.quote
    }

    /// Character emitted before each 1-based slot number.
    pub const fn placeholder_prefix(&self) -> char {
        self.placeholder_prefix
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::at()
    }
}
