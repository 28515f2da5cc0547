//! Row identity and cell value coercion.
//!
//! Rows are opaque records that the table never mutates. Every row must
//! expose a stable identifier: keys derived from render position go stale as
//! soon as rows are reordered or windowed, so there is no index fallback.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A single cell value. Cells are plain JSON values so hosts can feed rows
/// straight from an API response.
pub type CellValue = Value;

/// Stable identifier of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub String);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RowId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// Implemented by anything that can be shown as a table row.
///
/// ```rust
/// use bubbletea_datatable::row::{CellValue, RowId, TableRow};
/// use serde_json::json;
///
/// struct Order { id: u64, amount: f64 }
///
/// impl TableRow for Order {
///     fn id(&self) -> RowId { self.id.into() }
///     fn cell(&self, key: &str) -> CellValue {
///         match key {
///             "amount" => json!(self.amount),
///             _ => CellValue::Null,
///         }
///     }
/// }
/// ```
pub trait TableRow {
    /// Stable identifier used as the row key.
    fn id(&self) -> RowId;

    /// Value of the cell under `key`. Unknown keys yield `Null`.
    fn cell(&self, key: &str) -> CellValue;
}

/// Field names tried, in order, when taking a row id out of a JSON object.
pub const ID_FIELDS: [&str; 4] = ["id", "key", "_id", "rowId"];

/// A row backed by a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRow {
    id: RowId,
    fields: Map<String, Value>,
}

impl JsonRow {
    /// Builds a row from a JSON object, taking its id from the first of
    /// [`ID_FIELDS`] that is present and not null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnObject`] for non-object values and
    /// [`Error::MissingRowId`] when no id field exists.
    pub fn try_from_value(value: Value) -> Result<Self> {
        let fields = match value {
            Value::Object(map) => map,
            other => return Err(Error::NotAnObject(type_name(&other).to_string())),
        };
        let id = ID_FIELDS
            .iter()
            .filter_map(|name| fields.get(*name))
            .find(|v| !v.is_null())
            .map(|v| RowId(cell_to_string(v)))
            .ok_or(Error::MissingRowId)?;
        Ok(Self { id, fields })
    }

    /// Builds rows from a list of JSON objects, failing on the first bad one.
    ///
    /// # Errors
    ///
    /// See [`JsonRow::try_from_value`].
    pub fn try_from_values(values: Vec<Value>) -> Result<Vec<Self>> {
        values.into_iter().map(Self::try_from_value).collect()
    }

    /// The underlying fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TableRow for JsonRow {
    fn id(&self) -> RowId {
        self.id.clone()
    }

    fn cell(&self, key: &str) -> CellValue {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Display form of a cell used for searching and plain rendering.
///
/// `Null` becomes the empty string, strings pass through, numbers and booleans
/// use their canonical text, and arrays/objects are serialized as JSON.
pub fn cell_to_string(value: &CellValue) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    // Whole floats print without a fraction, the way a script runtime would.
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Numeric form of a cell used for aggregation and numeric sorting.
///
/// Finite numbers pass through; strings have thousands separators removed and
/// are parsed, falling back to a leading number so `"12px"` counts as 12;
/// booleans count as 0/1; everything else is 0.
pub fn cell_to_number(value: &CellValue) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_numeric(s).or_else(|| leading_number(s)).unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

/// Parses a numeric string, ignoring commas and surrounding whitespace.
/// Returns `None` for empty or non-numeric text.
pub fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parses the number at the start of `s`, ignoring commas and leading
/// whitespace: `"3 kg"` is 3, `"-1,200.5 EUR"` is -1200.5. Returns `None`
/// when `s` does not start with a digit, sign or decimal point followed by
/// digits.
pub fn leading_number(s: &str) -> Option<f64> {
    let cleaned: String = s.trim_start().chars().filter(|c| *c != ',').collect();
    let bytes = cleaned.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_end = digits_from(end);
    let mut has_digits = int_end > end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 || has_digits {
            has_digits |= frac_end > end + 1;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign);
        if exp_end > end + 1 + sign {
            end = exp_end;
        }
    }
    cleaned[..end].parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Returns the number a cell holds when it genuinely is numeric
/// (a number, or a string that parses as one).
pub fn cell_as_number(value: &CellValue) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_to_string_coercions() {
        assert_eq!(cell_to_string(&Value::Null), "");
        assert_eq!(cell_to_string(&json!("abc")), "abc");
        assert_eq!(cell_to_string(&json!(42)), "42");
        assert_eq!(cell_to_string(&json!(1.5)), "1.5");
        assert_eq!(cell_to_string(&json!(3.0)), "3");
        assert_eq!(cell_to_string(&json!(true)), "true");
        assert_eq!(cell_to_string(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(cell_to_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_cell_to_number_coercions() {
        assert_eq!(cell_to_number(&json!(12.5)), 12.5);
        assert_eq!(cell_to_number(&json!("1,234.5")), 1234.5);
        assert_eq!(cell_to_number(&json!("abc")), 0.0);
        assert_eq!(cell_to_number(&json!("")), 0.0);
        assert_eq!(cell_to_number(&json!(true)), 1.0);
        assert_eq!(cell_to_number(&Value::Null), 0.0);
        assert_eq!(cell_to_number(&json!({"x": 1})), 0.0);
    }

    #[test]
    fn test_cell_to_number_reads_leading_number() {
        assert_eq!(cell_to_number(&json!("12px")), 12.0);
        assert_eq!(cell_to_number(&json!(" 3 kg")), 3.0);
        assert_eq!(cell_to_number(&json!("-1,200.5 EUR")), -1200.5);
        assert_eq!(cell_to_number(&json!("2e3 units")), 2000.0);
        assert_eq!(cell_to_number(&json!("7e")), 7.0);
        assert_eq!(cell_to_number(&json!("kg 3")), 0.0);
        assert_eq!(cell_to_number(&json!("-.")), 0.0);
        // sorting and filters still treat these as text
        assert_eq!(cell_as_number(&json!("12px")), None);
        assert_eq!(parse_numeric("3 kg"), None);
    }

    #[test]
    fn test_json_row_id_lookup_order() {
        let row = JsonRow::try_from_value(json!({"key": "k1", "_id": "x", "name": "a"})).unwrap();
        assert_eq!(row.id(), RowId::from("k1"));

        let row = JsonRow::try_from_value(json!({"rowId": 7, "name": "a"})).unwrap();
        assert_eq!(row.id(), RowId::from("7"));

        let row = JsonRow::try_from_value(json!({"id": null, "_id": "abc"})).unwrap();
        assert_eq!(row.id(), RowId::from("abc"));
    }

    #[test]
    fn test_json_row_without_id_is_rejected() {
        let err = JsonRow::try_from_value(json!({"name": "a"})).unwrap_err();
        assert_eq!(err, Error::MissingRowId);

        let err = JsonRow::try_from_value(json!([1, 2])).unwrap_err();
        assert_eq!(err, Error::NotAnObject("array".to_string()));
    }

    #[test]
    fn test_json_row_cells() {
        let row = JsonRow::try_from_value(json!({"id": 1, "name": "Ada"})).unwrap();
        assert_eq!(row.cell("name"), json!("Ada"));
        assert_eq!(row.cell("missing"), Value::Null);
    }
}
