use std::iter::Peekable;
use std::str::CharIndices;

use crate::dialect::Dialect;
use crate::error::Error;
use crate::positions::PositionIndex;

/// A template after named parameters have been replaced by positional placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenQuery {
    /// SQL text with `$1`, `$2`, ... in place of the named parameters.
    pub sql: String,
    /// Where each name landed.
    pub positions: PositionIndex,
}

/// Converts named placeholders (`@name`) to positional placeholders (`$n`) for PostgreSQL.
///
/// Uses [`Dialect::default`]; see [`rewrite`] for the position index and other dialects.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::builder::build_query;
///
/// let sql = build_query("SELECT * FROM users WHERE id = @id AND name = @name")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = $1 AND name = $2");
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<String> {
    rewrite(template, &Dialect::default()).map(|rewritten| rewritten.sql)
}

/// Rewrites `template` in a single pass over its characters.
///
/// Each occurrence of a named parameter takes the next slot, numbered from
/// zero, and is emitted as the placeholder prefix followed by the slot number
/// plus one. Text between a pair of quote characters is copied untouched.
///
/// # Errors
///
/// - [`Error::UnterminatedQuote`] if a quoted literal runs to the end of the template.
/// - [`Error::EmptyParameterName`] if the parameter prefix is not followed by a name.
///   A doubled prefix is not a parameter and is copied as is.
///
/// # Examples
///
/// ```
/// use sqlx_named_params::{builder::rewrite, Dialect};
///
/// let rewritten = rewrite("UPDATE t SET a = :v WHERE b = ':v' OR c = :v", &Dialect::colon())?;
/// assert_eq!(rewritten.sql, "UPDATE t SET a = $1 WHERE b = ':v' OR c = $2");
/// assert_eq!(rewritten.positions.positions_of("v"), Some(&[0, 1][..]));
/// # Ok::<(), sqlx_named_params::Error>(())
/// ```
pub fn rewrite(template: &str, dialect: &Dialect) -> crate::Result<RewrittenQuery> {
    let mut sql = String::with_capacity(template.len());
    let mut positions = PositionIndex::default();
    let mut chars = template.char_indices().peekable();

    while let Some((offset, character)) = chars.next() {
        if character == dialect.quote() {
            sql.push(character);
            if !copy_literal(&mut chars, &mut sql, dialect.quote()) {
                return Err(Error::UnterminatedQuote { offset });
            }
            continue;
        }

        if character != dialect.parameter_prefix() {
            sql.push(character);
            continue;
        }

        // A doubled prefix is literal text, e.g. the `::` cast or the `@@` operator
        if chars
            .next_if(|&(_, next)| next == dialect.parameter_prefix())
            .is_some()
        {
            sql.push(character);
            sql.push(character);
            continue;
        }

        let name = collect_name(&mut chars);
        if name.is_empty() {
            return Err(Error::EmptyParameterName { offset });
        }

        let slot = positions.total_positions();
        positions.insert(name, slot);
        sql.push(dialect.placeholder_prefix());
        sql.push_str(&(slot + 1).to_string());
    }

    tracing::trace!(
        slots = positions.total_positions(),
        names = positions.len(),
        "rewrote named parameters"
    );

    Ok(RewrittenQuery { sql, positions })
}

/// Name characters are letters, digits and `_`; anything else ends the name
/// and is left for the main loop.
fn is_name_content(character: char) -> bool {
    character == '_' || character.is_alphanumeric()
}

fn collect_name(chars: &mut Peekable<CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some(&(_, next)) = chars.peek() {
        if !is_name_content(next) {
            break;
        }
        name.push(next);
        chars.next();
    }
    name
}

/// Copies through the closing quote. Returns false if the input ends first.
fn copy_literal(chars: &mut Peekable<CharIndices<'_>>, sql: &mut String, quote: char) -> bool {
    for (_, character) in chars.by_ref() {
        sql.push(character);
        if character == quote {
            return true;
        }
    }
    false
}
