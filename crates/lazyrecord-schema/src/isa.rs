//! Logical column types and their value conversions.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazyrecord_core::Value;
use lazyrecord_core::value::{DATE_FORMAT, DATETIME_FORMAT};
use serde::{Deserialize, Serialize};

/// The logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Isa {
    #[default]
    Str,
    Int,
    Bool,
    Float,
    Date,
    DateTime,
}

const DATETIME_INPUT_FORMATS: &[&str] = &[
    DATETIME_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" | "" => Some(false),
        _ => None,
    }
}

impl Isa {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Isa::Str => "str",
            Isa::Int => "int",
            Isa::Bool => "bool",
            Isa::Float => "float",
            Isa::Date => "date",
            Isa::DateTime => "datetime",
        }
    }

    /// Parse a type tag such as `"int"` or `"DateTime"`.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "str" | "string" | "text" => Some(Isa::Str),
            "int" | "integer" => Some(Isa::Int),
            "bool" | "boolean" => Some(Isa::Bool),
            "float" | "double" | "decimal" => Some(Isa::Float),
            "date" => Some(Isa::Date),
            "datetime" | "timestamp" => Some(Isa::DateTime),
            _ => None,
        }
    }

    /// Whether `value` already has this logical type. NULL is always accepted.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Isa::Str, Value::Text(_))
                | (Isa::Int, Value::Int(_))
                | (Isa::Float, Value::Double(_) | Value::Int(_))
                | (Isa::Bool, Value::Bool(_))
                | (Isa::Date, Value::Date(_))
                | (Isa::DateTime, Value::DateTime(_))
        )
    }

    /// Best-effort coercion to this logical type. Values that cannot be coerced are
    /// returned unchanged.
    pub fn cast(&self, value: Value) -> Value {
        match (self, value) {
            (Isa::Str, Value::Int(i)) => Value::Text(i.to_string()),
            (Isa::Str, Value::Double(f)) => Value::Text(f.to_string()),
            (Isa::Str, Value::Bool(b)) => Value::Text((if b { "1" } else { "0" }).to_string()),
            (Isa::Str, v @ (Value::Date(_) | Value::DateTime(_))) => Value::Text(v.to_string()),

            (Isa::Int, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Value::Int(i),
                Err(_) => match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() => Value::Int(f.trunc() as i64),
                    _ => Value::Text(s),
                },
            },
            (Isa::Int, Value::Double(f)) if f.is_finite() => Value::Int(f.trunc() as i64),
            (Isa::Int, Value::Bool(b)) => Value::Int(i64::from(b)),

            (Isa::Float, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Double(f),
                Err(_) => Value::Text(s),
            },
            (Isa::Float, Value::Int(i)) => Value::Double(i as f64),

            (Isa::Bool, Value::Text(s)) => match parse_bool(&s) {
                Some(b) => Value::Bool(b),
                None => Value::Text(s),
            },
            (Isa::Bool, Value::Int(i)) => Value::Bool(i != 0),
            (Isa::Bool, Value::Double(f)) => Value::Bool(f != 0.0),

            (Isa::Date, Value::Text(s)) => match parse_date(&s) {
                Some(d) => Value::Date(d),
                None => Value::Text(s),
            },
            (Isa::Date, Value::DateTime(dt)) => Value::Date(dt.date()),

            (Isa::DateTime, Value::Text(s)) => match parse_datetime(&s) {
                Some(dt) => Value::DateTime(dt),
                None => Value::Text(s),
            },
            (Isa::DateTime, Value::Date(d)) => Value::DateTime(d.and_time(chrono::NaiveTime::MIN)),

            (_, v) => v,
        }
    }

    /// Convert a structured value to its storage representation.
    pub fn deflate(&self, value: Value) -> Value {
        match (self, value) {
            (_, Value::DateTime(dt)) => Value::Text(dt.format(DATETIME_FORMAT).to_string()),
            (_, Value::Date(d)) => Value::Text(d.format(DATE_FORMAT).to_string()),
            (Isa::Bool, v @ (Value::Text(_) | Value::Int(_))) => self.cast(v),
            (Isa::Int, v @ Value::Text(_)) => self.cast(v),
            (_, v) => v,
        }
    }

    /// Convert a stored value to its structured form.
    pub fn inflate(&self, value: Value) -> Value {
        match (self, value) {
            (Isa::DateTime | Isa::Date | Isa::Bool | Isa::Int | Isa::Float, v @ Value::Text(_)) => {
                self.cast(v)
            }
            (Isa::Bool | Isa::Float, v @ Value::Int(_)) => self.cast(v),
            (_, v) => v,
        }
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
