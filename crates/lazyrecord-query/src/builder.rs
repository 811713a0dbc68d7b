//! Fluent builder for SELECT, INSERT, UPDATE and DELETE statements.
//!
//! This module provides one builder for all four statement kinds with support for:
//! - table aliases and joins (used by many-to-many collections)
//! - RETURNING a single column (PostgreSQL inserts)
//! - raw SQL values, written verbatim instead of bound

use lazyrecord_core::{QueryDriver, Value, ValueMap};

use crate::clause::{Condition, Where, bind};

/// Statement kind with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    Select { columns: Vec<String> },
    Insert { values: ValueMap },
    Update { values: ValueMap },
    Delete,
}

/// An inner join against another table.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    table: String,
    alias: Option<String>,
    on: Option<Condition>,
}

impl Join {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            alias: None,
            on: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn on(mut self, condition: Condition) -> Self {
        self.on = Some(condition);
        self
    }

    fn render(&self, driver: &QueryDriver, params: &mut Vec<Value>) -> String {
        let mut sql = format!(" JOIN {}", driver.identifier(&self.table));
        if let Some(alias) = &self.alias {
            sql.push(' ');
            sql.push_str(&driver.identifier(alias));
        }
        if let Some(on) = &self.on {
            sql.push_str(" ON (");
            sql.push_str(&on.render(driver, params));
            sql.push(')');
        }
        sql
    }
}

/// A statement against one table.
///
/// # Example
///
/// ```
/// use lazyrecord_core::{Dialect, QueryDriver, value_map};
/// use lazyrecord_query::Query;
///
/// let (sql, vars) = Query::insert("books", value_map! { "title" => "Dune" })
///     .returning("id")
///     .build(&QueryDriver::new(Dialect::Postgres));
///
/// assert_eq!(sql, "INSERT INTO books (title) VALUES ($1) RETURNING id");
/// assert_eq!(vars.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    alias: Option<String>,
    kind: QueryKind,
    joins: Vec<Join>,
    where_clause: Where,
    limit: Option<u64>,
    returning: Option<String>,
}

impl Query {
    fn new(table: impl Into<String>, kind: QueryKind) -> Self {
        Self {
            table: table.into(),
            alias: None,
            kind,
            joins: Vec::new(),
            where_clause: Where::default(),
            limit: None,
            returning: None,
        }
    }

    /// `SELECT * FROM table`.
    pub fn select(table: impl Into<String>) -> Self {
        Self::new(
            table,
            QueryKind::Select {
                columns: Vec::new(),
            },
        )
    }

    pub fn insert(table: impl Into<String>, values: ValueMap) -> Self {
        Self::new(table, QueryKind::Insert { values })
    }

    pub fn update(table: impl Into<String>, values: ValueMap) -> Self {
        Self::new(table, QueryKind::Update { values })
    }

    pub fn delete(table: impl Into<String>) -> Self {
        Self::new(table, QueryKind::Delete)
    }

    /// Alias the main table (SELECT only).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Select specific columns instead of `*`.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        if let QueryKind::Select { columns: selected } = &mut self.kind {
            *selected = columns.iter().map(|c| (*c).to_string()).collect();
        }
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a WHERE condition, AND-ed with existing ones.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.where_clause.push(condition);
        self
    }

    /// Add an equality condition for every entry of `args`.
    pub fn where_from_args(mut self, args: &ValueMap) -> Self {
        for condition in Where::from_args(args).conditions() {
            self.where_clause.push(condition.clone());
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Ask the statement to hand back one column of the affected row.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn where_clause(&self) -> &Where {
        &self.where_clause
    }

    /// Build the SQL and its bound parameters.
    ///
    /// An UPDATE with nothing to set builds to an empty string.
    pub fn build(&self, driver: &QueryDriver) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let table = driver.identifier(&self.table);

        let mut sql = match &self.kind {
            QueryKind::Select { columns } => {
                let columns = if columns.is_empty() {
                    "*".to_string()
                } else {
                    columns
                        .iter()
                        .map(|c| driver.identifier(c).into_owned())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                let mut sql = format!("SELECT {columns} FROM {table}");
                if let Some(alias) = &self.alias {
                    sql.push(' ');
                    sql.push_str(&driver.identifier(alias));
                }
                for join in &self.joins {
                    sql.push_str(&join.render(driver, &mut params));
                }
                sql
            }
            QueryKind::Insert { values } => {
                if values.is_empty() {
                    format!("INSERT INTO {table} DEFAULT VALUES")
                } else {
                    let columns: Vec<String> = values
                        .keys()
                        .map(|c| driver.identifier(c).into_owned())
                        .collect();
                    let placeholders: Vec<String> = values
                        .values()
                        .map(|v| bind(driver, v, &mut params))
                        .collect();
                    format!(
                        "INSERT INTO {table} ({}) VALUES ({})",
                        columns.join(", "),
                        placeholders.join(", ")
                    )
                }
            }
            QueryKind::Update { values } => {
                if values.is_empty() {
                    return (String::new(), Vec::new());
                }
                let sets: Vec<String> = values
                    .iter()
                    .map(|(c, v)| {
                        format!(
                            "{} = {}",
                            driver.identifier(c),
                            bind(driver, v, &mut params)
                        )
                    })
                    .collect();
                format!("UPDATE {table} SET {}", sets.join(", "))
            }
            QueryKind::Delete => format!("DELETE FROM {table}"),
        };

        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.render(driver, &mut params));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(column) = &self.returning {
            sql.push_str(" RETURNING ");
            sql.push_str(&driver.identifier(column));
        }

        tracing::trace!(sql = %sql, params = params.len(), "Built query");
        (sql, params)
    }
}
