//! Dynamic values carried through argument sets, bound parameters and rows.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered column → value map used for argument sets and record data.
pub type ValueMap = IndexMap<String, Value>;

/// Storage format for date columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for datetime columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A dynamically typed SQL value.
///
/// `Array` and `Raw` are *composite* values. They are treated as pre-formed by the
/// column pipeline: no casting, no type constraint check and no deflation. A `Raw`
/// value is a SQL expression that the query builder writes into the statement
/// verbatim instead of binding it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// Double precision float.
    Double(f64),
    /// Text.
    Text(String),
    /// Binary blob.
    Bytes(Vec<u8>),
    /// Calendar date without a time zone.
    Date(NaiveDate),
    /// Date and time without a time zone.
    DateTime(NaiveDateTime),
    /// A list of values.
    Array(Vec<Value>),
    /// A raw SQL expression, e.g. `CURRENT_TIMESTAMP`.
    Raw(String),
}

impl Value {
    /// Build a raw SQL expression value.
    pub fn raw(expr: impl Into<String>) -> Self {
        Value::Raw(expr.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Composite values bypass casting, constraint checks and deflation.
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Raw(_))
    }

    /// Empty input as far as `required` columns are concerned: NULL or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Loose truthiness.
    ///
    /// NULL, `false`, zero, the empty string, the string `"0"` and empty lists are falsy.
    /// Everything else is truthy. Default injection and valid-value checks depend on it.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(f) => *f != 0.0,
            Value::Text(s) => !(s.is_empty() || s == "0"),
            Value::Bytes(b) => !b.is_empty(),
            Value::Date(_) | Value::DateTime(_) => true,
            Value::Array(items) => !items.is_empty(),
            Value::Raw(_) => true,
        }
    }

    /// Loose equality: numbers compare across representations and numeric text
    /// compares equal to the number it spells, so `"5"` equals `5`.
    pub fn loosely_eq(&self, other: &Value) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Value::Null, v) | (v, Value::Null) => !v.is_truthy(),
            (Value::Bool(b), v) | (v, Value::Bool(b)) => *b == v.is_truthy(),
            (Value::Int(a), Value::Double(b)) | (Value::Double(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Text(s), n @ (Value::Int(_) | Value::Double(_)))
            | (n @ (Value::Int(_) | Value::Double(_)), Value::Text(s)) => {
                match (s.trim().parse::<f64>(), n.as_f64()) {
                    (Ok(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (Value::Text(_), Value::Date(_) | Value::DateTime(_))
            | (Value::Date(_) | Value::DateTime(_), Value::Text(_)) => {
                self.to_string() == other.to_string()
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Raw(_) => "raw",
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(s) | Value::Raw(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Build a [`ValueMap`] from `key => value` pairs.
///
/// ```
/// use lazyrecord_core::{Value, value_map};
///
/// let args = value_map! { "title" => "Dune", "author_id" => 7 };
/// assert_eq!(args["author_id"], Value::Int(7));
/// ```
#[macro_export]
macro_rules! value_map {
    () => { $crate::ValueMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $( map.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Text(String::new()).is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::raw("NOW()").is_truthy());
    }

    #[test]
    fn test_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::from("").is_blank());
        assert!(!Value::from("0").is_blank());
        assert!(!Value::Int(0).is_blank());
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::from("5").loosely_eq(&Value::Int(5)));
        assert!(Value::Int(5).loosely_eq(&Value::Double(5.0)));
        assert!(Value::Bool(true).loosely_eq(&Value::from("yes")));
        assert!(!Value::from("five").loosely_eq(&Value::Int(5)));
        assert!(!Value::from("a").loosely_eq(&Value::from("A")));
    }

    #[test]
    fn test_composite() {
        assert!(Value::raw("CURRENT_TIMESTAMP").is_composite());
        assert!(Value::Array(vec![Value::Int(1)]).is_composite());
        assert!(!Value::from("x").is_composite());
    }

    #[test]
    fn test_display() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-01-02 03:04:05");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_value_map_macro_preserves_order() {
        let map = value_map! { "b" => 1, "a" => "x", "c" => Option::<i64>::None };
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(map["c"], Value::Null);
    }

    #[test]
    fn test_serialize_untagged() {
        let map = value_map! { "id" => 1, "title" => "Dune", "missing" => Value::Null };
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"id":1,"title":"Dune","missing":null}"#);
    }
}
