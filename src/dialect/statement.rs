//! Parameterised SQL statements produced by the dialect translator.
//!
//! Every statement sent to the database is a [`Statement`]: SQL text with
//! `$n` placeholders plus an ordered list of typed parameters. Values never
//! reach the SQL text; only the extension schema identifier does, and it is
//! quoted with [`quote_ident`].

use std::fmt;

/// A typed value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// A non-null `text` value.
    Text(String),
    /// A nullable `text` value.
    NullableText(Option<String>),
    /// A `boolean` value.
    Bool(bool),
    /// An `integer` value.
    Int(i32),
    /// A nullable `integer` value.
    NullableInt(Option<i32>),
    /// A `bigint` value.
    BigInt(i64),
    /// A `text[]` value.
    TextArray(Vec<String>),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::BigInt(value)
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        Self::NullableText(value)
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(value: Option<i32>) -> Self {
        Self::NullableInt(value)
    }
}

impl From<Vec<String>> for SqlParam {
    fn from(value: Vec<String>) -> Self {
        Self::TextArray(value)
    }
}

/// A rendered SQL statement with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlParam>,
}

impl Statement {
    /// Creates a statement without parameters.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Starts building a statement from an initial SQL fragment.
    #[must_use]
    pub fn builder(sql: &str) -> StatementBuilder {
        StatementBuilder::new(sql)
    }

    /// Returns the SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Splits the statement into its SQL text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlParam>) {
        (self.sql, self.params)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Incremental builder that numbers placeholders as values are bound.
#[derive(Debug, Clone, Default)]
pub struct StatementBuilder {
    sql: String,
    params: Vec<SqlParam>,
}

impl StatementBuilder {
    /// Creates a builder seeded with an SQL fragment.
    #[must_use]
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_owned(),
            params: Vec::new(),
        }
    }

    /// Appends a literal SQL fragment.
    pub fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    /// Appends the next `$n` placeholder and binds `value` to it.
    pub fn bind(&mut self, value: impl Into<SqlParam>) -> &mut Self {
        self.params.push(value.into());
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
        self
    }

    /// Appends `fragment`, then binds `value`.
    pub fn push_bind(&mut self, fragment: &str, value: impl Into<SqlParam>) -> &mut Self {
        self.push(fragment).bind(value)
    }

    /// Finishes the statement.
    #[must_use]
    pub fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Quotes an SQL identifier, doubling any embedded double quote.
#[must_use]
pub fn quote_ident(identifier: &str) -> String {
    let mut quoted = String::with_capacity(identifier.len() + 2);
    quoted.push('"');
    for ch in identifier.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Quotes an SQL string literal, doubling any embedded single quote.
///
/// Only used for values embedded in generated SQL text handed back to the
/// operator, never for statements this crate executes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push('\'');
        }
        quoted.push(ch);
    }
    quoted.push('\'');
    quoted
}
