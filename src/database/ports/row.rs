//! Result rows and typed column access.

use super::{ExecutorError, ExecutorResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// One value of a result row, with the column it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    column: String,
    value: Value,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the raw JSON value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Whether the value is SQL `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    fn required(&self) -> ExecutorResult<&Value> {
        if self.value.is_null() {
            return Err(ExecutorError::decode(&self.column, "unexpected NULL"));
        }
        Ok(&self.value)
    }

    /// Decodes a text value. Numbers and booleans are rendered as text.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for `NULL` or structured values.
    pub fn text(&self) -> ExecutorResult<String> {
        match self.required()? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(ExecutorError::decode(
                &self.column,
                format!("expected text, found {other}"),
            )),
        }
    }

    /// Decodes a nullable text value.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for structured values.
    pub fn opt_text(&self) -> ExecutorResult<Option<String>> {
        if self.is_null() {
            return Ok(None);
        }
        self.text().map(Some)
    }

    /// Decodes an integer. Integral `numeric` values and numeric strings are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for `NULL` or non-integral values.
    pub fn int(&self) -> ExecutorResult<i64> {
        let value = self.required()?;
        let decoded = match value {
            Value::Number(number) => number.as_i64().or_else(|| {
                let rendered = number.to_string();
                rendered
                    .strip_suffix(".0")
                    .and_then(|integral| integral.parse().ok())
            }),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        };
        decoded.ok_or_else(|| {
            ExecutorError::decode(&self.column, format!("expected an integer, found {value}"))
        })
    }

    /// Decodes a nullable integer.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for non-integral values.
    pub fn opt_int(&self) -> ExecutorResult<Option<i64>> {
        if self.is_null() {
            return Ok(None);
        }
        self.int().map(Some)
    }

    /// Decodes a boolean. `1`/`0` and `t`/`f` encodings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for `NULL` or other values.
    pub fn flag(&self) -> ExecutorResult<bool> {
        let value = self.required()?;
        let decoded = match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(number) => number.as_i64().map(|int| int != 0),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "1" => Some(true),
                "f" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        decoded.ok_or_else(|| {
            ExecutorError::decode(&self.column, format!("expected a boolean, found {value}"))
        })
    }

    /// Decodes a timestamp. Values without an offset are read as UTC.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for `NULL` or unparseable values.
    pub fn timestamp(&self) -> ExecutorResult<DateTime<Utc>> {
        let text = self.text()?;
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(&text) {
            return Ok(with_offset.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(&text, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| {
                ExecutorError::decode(&self.column, format!("expected a timestamp, found {text}"))
            })
    }

    /// Decodes a nullable timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for unparseable values.
    pub fn opt_timestamp(&self) -> ExecutorResult<Option<DateTime<Utc>>> {
        if self.is_null() {
            return Ok(None);
        }
        self.timestamp().map(Some)
    }

    /// Decodes a text array. A comma-separated string is split.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] for `NULL` or non-text elements.
    pub fn text_list(&self) -> ExecutorResult<Vec<String>> {
        match self.required()? {
            Value::Array(items) => items
                .iter()
                .map(|item| Self::new(self.column.clone(), item.clone()).text())
                .collect(),
            Value::String(joined) => Ok(joined
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect()),
            other => Err(ExecutorError::decode(
                &self.column,
                format!("expected a text array, found {other}"),
            )),
        }
    }
}

/// A result row keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a row from a JSON object, as produced by `row_to_json`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::Decode`] when `json` is not an object.
    pub fn from_json(json: &str) -> ExecutorResult<Self> {
        serde_json::from_str::<Map<String, Value>>(json)
            .map(Self)
            .map_err(|err| ExecutorError::decode("row_to_json", err.to_string()))
    }

    /// Returns the row with `column` set to `value`.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Returns the raw value of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Returns `column` as a [`Field`].
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingColumn`] when the row has no such
    /// column.
    pub fn field(&self, column: &str) -> ExecutorResult<Field> {
        self.0
            .get(column)
            .map(|value| Field::new(column, value.clone()))
            .ok_or_else(|| ExecutorError::MissingColumn(column.to_owned()))
    }

    /// Consumes the row, returning `column` as a [`Field`].
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::MissingColumn`] when the row has no such
    /// column.
    pub fn into_field(mut self, column: &str) -> ExecutorResult<Field> {
        self.0
            .remove(column)
            .map(|value| Field::new(column, value))
            .ok_or_else(|| ExecutorError::MissingColumn(column.to_owned()))
    }

    /// Decodes `column` as text.
    ///
    /// # Errors
    ///
    /// See [`Field::text`] and [`Row::field`].
    pub fn text(&self, column: &str) -> ExecutorResult<String> {
        self.field(column)?.text()
    }

    /// Decodes `column` as nullable text.
    ///
    /// # Errors
    ///
    /// See [`Field::opt_text`] and [`Row::field`].
    pub fn opt_text(&self, column: &str) -> ExecutorResult<Option<String>> {
        self.field(column)?.opt_text()
    }

    /// Decodes `column` as an integer.
    ///
    /// # Errors
    ///
    /// See [`Field::int`] and [`Row::field`].
    pub fn int(&self, column: &str) -> ExecutorResult<i64> {
        self.field(column)?.int()
    }

    /// Decodes `column` as a nullable integer.
    ///
    /// # Errors
    ///
    /// See [`Field::opt_int`] and [`Row::field`].
    pub fn opt_int(&self, column: &str) -> ExecutorResult<Option<i64>> {
        self.field(column)?.opt_int()
    }

    /// Decodes `column` as a boolean.
    ///
    /// # Errors
    ///
    /// See [`Field::flag`] and [`Row::field`].
    pub fn flag(&self, column: &str) -> ExecutorResult<bool> {
        self.field(column)?.flag()
    }

    /// Decodes `column` as a timestamp.
    ///
    /// # Errors
    ///
    /// See [`Field::timestamp`] and [`Row::field`].
    pub fn timestamp(&self, column: &str) -> ExecutorResult<DateTime<Utc>> {
        self.field(column)?.timestamp()
    }

    /// Decodes `column` as a nullable timestamp.
    ///
    /// # Errors
    ///
    /// See [`Field::opt_timestamp`] and [`Row::field`].
    pub fn opt_timestamp(&self, column: &str) -> ExecutorResult<Option<DateTime<Utc>>> {
        self.field(column)?.opt_timestamp()
    }

    /// Decodes `column` as a text array.
    ///
    /// # Errors
    ///
    /// See [`Field::text_list`] and [`Row::field`].
    pub fn text_list(&self, column: &str) -> ExecutorResult<Vec<String>> {
        self.field(column)?.text_list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn row_to_json_output_decodes() {
        let row = Row::from_json(
            r#"{"group_name":"g1","nb":"42","flag":true,"created":"2024-05-01T12:00:00.5+02:00"}"#,
        )
        .expect("valid row");

        assert_eq!(row.text("group_name").expect("text"), "g1");
        assert_eq!(row.int("nb").expect("int"), 42);
        assert!(row.flag("flag").expect("flag"));
        assert_eq!(
            row.timestamp("created").expect("timestamp"),
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
                + chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn null_fields_are_reported_and_rejected_by_required_accessors() {
        let field = Field::new("mark_comment", Value::Null);

        assert!(field.is_null());
        assert_eq!(field.opt_text().expect("nullable text"), None);
        assert!(field.text().is_err());
        assert!(!Field::new("mark_comment", json!("eod")).is_null());
    }

    #[rstest]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("t"), true)]
    #[case(json!("f"), false)]
    fn flags_accept_legacy_encodings(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(Field::new("c", value).flag().expect("flag"), expected);
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let field = Field::new("c", json!("2024-01-02T03:04:05.123456"));
        assert_eq!(
            field.timestamp().expect("timestamp").to_rfc3339(),
            "2024-01-02T03:04:05.123456+00:00"
        );
    }

    #[test]
    fn null_is_rejected_by_required_accessors() {
        let row = Row::new().with("c", Value::Null);
        assert!(matches!(row.int("c"), Err(ExecutorError::Decode { .. })));
        assert_eq!(row.opt_int("c").expect("nullable"), None);
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let row = Row::new();
        assert!(matches!(
            row.text("absent"),
            Err(ExecutorError::MissingColumn(column)) if column == "absent"
        ));
    }

    #[test]
    fn text_lists_accept_arrays_and_joined_strings() {
        let row = Row::new()
            .with("array", json!(["a", "b"]))
            .with("joined", json!("a, b"));
        assert_eq!(row.text_list("array").expect("list"), vec!["a", "b"]);
        assert_eq!(row.text_list("joined").expect("list"), vec!["a", "b"]);
    }

    #[test]
    fn integral_numeric_values_decode_as_integers() {
        assert_eq!(Field::new("c", json!(15.0)).int().expect("int"), 15);
        assert!(Field::new("c", json!(1.5)).int().is_err());
    }
}
