//! WHERE clause conditions.

use lazyrecord_core::{QueryDriver, Value, ValueMap};

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A value, bound as a parameter (raw values are inlined).
    Value(Value),
    /// Another column, e.g. `m.id` in a join condition.
    Column(String),
}

/// A boolean condition over columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = operand`. Comparing with NULL renders `IS NULL`; comparing with a list
    /// renders `IN (...)`.
    Equal { column: String, operand: Operand },
    IsNull(String),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// A SQL fragment written verbatim.
    Raw(String),
}

impl Condition {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Condition::Equal {
            column: column.into(),
            operand: Operand::Value(value.into()),
        }
    }

    /// Compare two columns.
    pub fn eq_column(column: impl Into<String>, other: impl Into<String>) -> Self {
        Condition::Equal {
            column: column.into(),
            operand: Operand::Column(other.into()),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::IsNull(column.into())
    }

    /// Combine with AND, flattening nested conjunctions.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut items) => {
                items.push(other);
                Condition::And(items)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    /// Combine with OR, flattening nested disjunctions.
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut items) => {
                items.push(other);
                Condition::Or(items)
            }
            first => Condition::Or(vec![first, other]),
        }
    }

    pub(crate) fn render(&self, driver: &QueryDriver, params: &mut Vec<Value>) -> String {
        match self {
            Condition::Equal { column, operand } => {
                let column = driver.identifier(column);
                match operand {
                    Operand::Column(other) => format!("{column} = {}", driver.identifier(other)),
                    Operand::Value(Value::Null) => format!("{column} IS NULL"),
                    Operand::Value(Value::Array(items)) => {
                        let rendered: Vec<String> =
                            items.iter().map(|v| bind(driver, v, params)).collect();
                        format!("{column} IN ({})", rendered.join(", "))
                    }
                    Operand::Value(value) => format!("{column} = {}", bind(driver, value, params)),
                }
            }
            Condition::IsNull(column) => format!("{} IS NULL", driver.identifier(column)),
            Condition::And(items) => render_group(items, " AND ", driver, params),
            Condition::Or(items) => render_group(items, " OR ", driver, params),
            Condition::Raw(sql) => sql.clone(),
        }
    }
}

fn render_group(
    items: &[Condition],
    separator: &str,
    driver: &QueryDriver,
    params: &mut Vec<Value>,
) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|c| match c {
            Condition::And(_) | Condition::Or(_) => format!("({})", c.render(driver, params)),
            _ => c.render(driver, params),
        })
        .collect();
    parts.join(separator)
}

/// Bind a value as the next placeholder, or inline it when it is raw SQL.
pub(crate) fn bind(driver: &QueryDriver, value: &Value, params: &mut Vec<Value>) -> String {
    if let Value::Raw(expr) = value {
        return expr.clone();
    }
    params.push(value.clone());
    driver.placeholder(params.len())
}

/// A WHERE clause: a conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    conditions: Vec<Condition>,
}

impl Where {
    pub fn new(condition: Condition) -> Self {
        Self {
            conditions: vec![condition],
        }
    }

    /// Equality predicates for every entry of an argument map, joined with AND.
    pub fn from_args(args: &ValueMap) -> Self {
        Self {
            conditions: args
                .iter()
                .map(|(column, value)| Condition::eq(column.clone(), value.clone()))
                .collect(),
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Build the clause body (without the `WHERE` keyword). Placeholders are numbered
    /// after the `offset` parameters already bound by the enclosing statement.
    pub fn build(&self, driver: &QueryDriver, offset: usize) -> (String, Vec<Value>) {
        let mut params = vec![Value::Null; offset];
        let sql = self.render(driver, &mut params);
        (sql, params.split_off(offset))
    }

    pub(crate) fn render(&self, driver: &QueryDriver, params: &mut Vec<Value>) -> String {
        render_group(&self.conditions, " AND ", driver, params)
    }
}

impl From<Condition> for Where {
    fn from(condition: Condition) -> Self {
        Where::new(condition)
    }
}
