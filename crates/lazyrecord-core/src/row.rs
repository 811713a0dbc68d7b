//! A fetched database row.

use crate::value::{Value, ValueMap};

/// A single row returned by a statement, with its column names in select order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from parallel column and value lists.
    ///
    /// Extra entries on either side are dropped.
    pub fn new(mut columns: Vec<String>, mut values: Vec<Value>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    /// Create a row from `(column, value)` pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Get a value by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Consume the row into an ordered column → value map.
    pub fn into_map(self) -> ValueMap {
        self.columns.into_iter().zip(self.values).collect()
    }
}

impl From<ValueMap> for Row {
    fn from(map: ValueMap) -> Self {
        let (columns, values) = map.into_iter().unzip();
        Self { columns, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup() {
        let row = Row::from_pairs([("id", Value::Int(1)), ("title", Value::from("Dune"))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("title"), Some(&Value::from("Dune")));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_index(0), Some(&Value::Int(1)));
    }

    #[test]
    fn test_into_map_keeps_order() {
        let row = Row::new(
            vec!["z".into(), "a".into(), "extra".into()],
            vec![Value::Int(1), Value::Int(2)],
        );
        let map = row.into_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
