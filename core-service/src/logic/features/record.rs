//! Student Record - one raw input row
//!
//! Rows arrive with arbitrary column names and loosely typed scalar values
//! (numbers, numeric strings, "95%", booleans, yes/no). `StudentRecord`
//! keeps the raw mapping; `NormalizedRecord` is the lookup view used by the
//! reconstructor, keyed by normalized column name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalize a column name: lowercase, runs of non-alphanumerics become `_`
pub fn normalize_column(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(c);
        } else {
            pending_separator = true;
        }
    }
    normalized
}

/// Parse a loosely typed scalar into a number.
///
/// Null, empty strings and non-finite numbers are treated as missing.
/// Percent strings keep their 0-100 magnitude; scaling is the caller's job.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => parse_text_number(s),
        _ => None,
    }
}

fn parse_text_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" => return Some(1.0),
        "no" | "n" | "false" | "f" => return Some(0.0),
        "nan" | "null" | "none" | "n/a" | "na" => return None,
        _ => {}
    }

    let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    numeric
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Render a scalar as text (identity columns)
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// STUDENT RECORD
// ============================================================================

/// One input row: raw column name -> scalar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord {
    columns: BTreeMap<String, Value>,
}

impl StudentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            columns: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    /// Lookup view keyed by normalized column name.
    ///
    /// When two raw columns normalize to the same key, the lexicographically
    /// first raw name wins, so input column order never matters.
    pub fn normalized(&self) -> NormalizedRecord<'_> {
        let mut columns = BTreeMap::new();
        for (raw, value) in &self.columns {
            columns.entry(normalize_column(raw)).or_insert(value);
        }
        NormalizedRecord { columns }
    }
}

impl From<serde_json::Map<String, Value>> for StudentRecord {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self {
            columns: map.into_iter().collect(),
        }
    }
}

/// Normalized-name view over a `StudentRecord`
#[derive(Debug)]
pub struct NormalizedRecord<'a> {
    columns: BTreeMap<String, &'a Value>,
}

impl<'a> NormalizedRecord<'a> {
    pub fn raw(&self, normalized: &str) -> Option<&'a Value> {
        self.columns.get(normalized).copied()
    }

    pub fn number(&self, normalized: &str) -> Option<f64> {
        self.raw(normalized).and_then(as_number)
    }

    pub fn text(&self, normalized: &str) -> Option<String> {
        self.raw(normalized).and_then(as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_column() {
        assert_eq!(normalize_column("Current GPA"), "current_gpa");
        assert_eq!(normalize_column("  attendance-rate (%) "), "attendance_rate");
        assert_eq!(normalize_column("Student.ID"), "student_id");
        assert_eq!(normalize_column("First  --  Name"), "first_name");
        assert_eq!(normalize_column("%%"), "");
    }

    #[test]
    fn test_as_number_forms() {
        assert_eq!(as_number(&json!(3.2)), Some(3.2));
        assert_eq!(as_number(&json!("3.2")), Some(3.2));
        assert_eq!(as_number(&json!("95%")), Some(95.0));
        assert_eq!(as_number(&json!("Yes")), Some(1.0));
        assert_eq!(as_number(&json!(false)), Some(0.0));
        assert_eq!(as_number(&json!("1,200")), Some(1200.0));
        assert_eq!(as_number(&json!(null)), None);
        assert_eq!(as_number(&json!("")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!("abc")), None);
    }

    #[test]
    fn test_normalized_collision_is_order_independent() {
        let a = StudentRecord::from_pairs([("GPA", json!(3.0)), ("gpa", json!(2.0))]);
        let b = StudentRecord::from_pairs([("gpa", json!(2.0)), ("GPA", json!(3.0))]);
        assert_eq!(a.normalized().number("gpa"), b.normalized().number("gpa"));
        // "GPA" < "gpa" in byte order
        assert_eq!(a.normalized().number("gpa"), Some(3.0));
    }

    #[test]
    fn test_record_json_is_flat_object() {
        let record: StudentRecord =
            serde_json::from_str(r#"{"name": "Ada", "gpa": 3.5}"#).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.normalized().text("name"), Some("Ada".to_string()));
    }
}
