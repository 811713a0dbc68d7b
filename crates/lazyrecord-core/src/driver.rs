//! SQL dialects and the query driver descriptor.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::value::{DATE_FORMAT, DATETIME_FORMAT, Value};

/// SQL dialect for generating database-specific SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL ($1, $2, ... placeholders)
    #[default]
    Postgres,
    /// SQLite (?1, ?2, ... placeholders)
    Sqlite,
    /// MySQL (? placeholders)
    Mysql,
}

impl Dialect {
    /// Generate a placeholder for the given parameter index (1-based).
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => format!("?{index}"),
            Dialect::Mysql => "?".to_string(),
        }
    }

    /// Quote an identifier for this dialect.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Mysql => format!("`{}`", name.replace('`', "``")),
            Dialect::Postgres | Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// Render a value as a SQL literal.
    ///
    /// Raw values are written verbatim.
    pub fn quote_literal(self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => match self {
                Dialect::Postgres => (if *b { "TRUE" } else { "FALSE" }).to_string(),
                Dialect::Sqlite | Dialect::Mysql => (if *b { "1" } else { "0" }).to_string(),
            },
            Value::Int(i) => i.to_string(),
            Value::Double(f) => f.to_string(),
            Value::Text(s) => quote_string(s),
            Value::Bytes(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
                match self {
                    Dialect::Postgres => format!("'\\x{hex}'"),
                    Dialect::Sqlite | Dialect::Mysql => format!("X'{hex}'"),
                }
            }
            Value::Date(d) => quote_string(&d.format(DATE_FORMAT).to_string()),
            Value::DateTime(dt) => quote_string(&dt.format(DATETIME_FORMAT).to_string()),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.quote_literal(v)).collect();
                format!("({})", parts.join(", "))
            }
            Value::Raw(expr) => expr.clone(),
        }
    }

    /// Whether INSERT statements can hand the new key back through `RETURNING`.
    pub const fn supports_returning(self) -> bool {
        matches!(self, Dialect::Postgres)
    }

    /// Resolve a dialect from a driver type name such as `"pgsql"` or `"sqlite"`.
    pub fn from_driver_type(driver: &str) -> Option<Self> {
        match driver.to_ascii_lowercase().as_str() {
            "pgsql" | "postgres" | "postgresql" => Some(Dialect::Postgres),
            "sqlite" | "sqlite3" => Some(Dialect::Sqlite),
            "mysql" | "mariadb" => Some(Dialect::Mysql),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::Mysql => "mysql",
        }
    }
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Describes how SQL should be rendered for one data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryDriver {
    pub dialect: Dialect,
    /// Quote table and column identifiers in generated DML.
    #[serde(default)]
    pub quote_identifiers: bool,
}

impl QueryDriver {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            quote_identifiers: false,
        }
    }

    pub const fn quote_identifiers(mut self, value: bool) -> Self {
        self.quote_identifiers = value;
        self
    }

    /// Render an identifier, quoting it when the driver asks for it.
    ///
    /// Qualified names (`m.author_id`) are quoted per segment; `*` is left alone.
    pub fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if !self.quote_identifiers {
            return Cow::Borrowed(name);
        }
        let parts: Vec<String> = name
            .split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.dialect.quote_identifier(part)
                }
            })
            .collect();
        Cow::Owned(parts.join("."))
    }

    pub fn placeholder(&self, index: usize) -> String {
        self.dialect.placeholder(index)
    }

    pub fn quote_literal(&self, value: &Value) -> String {
        self.dialect.quote_literal(value)
    }

    pub const fn supports_returning(&self) -> bool {
        self.dialect.supports_returning()
    }
}

impl From<Dialect> for QueryDriver {
    fn from(dialect: Dialect) -> Self {
        Self::new(dialect)
    }
}
