//! Table schemas.

use indexmap::IndexMap;
use lazyrecord_core::{Error, Result, Value, ValueMap};

use crate::column::ColumnDef;
use crate::relation::{RelationDef, RelationId};

/// Data source used when a schema does not name one.
pub const DEFAULT_SOURCE_ID: &str = "default";

/// Read access to a record's current data, handed to defaults, transforms and
/// validators.
pub trait RecordView {
    fn data(&self) -> &ValueMap;

    fn get_value(&self, column: &str) -> Option<&Value> {
        self.data().get(column)
    }
}

impl RecordView for ValueMap {
    fn data(&self) -> &ValueMap {
        self
    }
}

/// An immutable description of one table.
#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    table: String,
    label: Option<String>,
    primary_key: Option<String>,
    columns: IndexMap<String, ColumnDef>,
    relations: IndexMap<RelationId, RelationDef>,
    read_source_id: String,
    write_source_id: String,
}

impl Schema {
    /// Start building a schema registered as `name`. The table defaults to the name.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    pub fn primary_column(&self) -> Option<&ColumnDef> {
        self.primary_key.as_deref().and_then(|pk| self.get_column(pk))
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Columns in declared order, optionally including virtual ones.
    pub fn get_columns(&self, include_virtual: bool) -> Vec<&ColumnDef> {
        self.columns
            .values()
            .filter(|c| include_virtual || !c.is_virtual)
            .collect()
    }

    pub fn column_names(&self, include_virtual: bool) -> Vec<&str> {
        self.get_columns(include_virtual)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn get_relation(&self, id: &str) -> Option<&RelationDef> {
        self.relations.get(id)
    }

    /// Relations in declared order.
    pub fn relations(&self) -> impl Iterator<Item = (&RelationId, &RelationDef)> {
        self.relations.iter()
    }

    pub fn read_source_id(&self) -> &str {
        &self.read_source_id
    }

    pub fn write_source_id(&self) -> &str {
        &self.write_source_id
    }

    /// Keep only the entries of `args` that name persisted columns.
    pub fn filter_args(&self, args: &ValueMap) -> ValueMap {
        args.iter()
            .filter(|(k, _)| self.get_column(k).is_some_and(|c| !c.is_virtual))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    table: Option<String>,
    label: Option<String>,
    primary_key: Option<String>,
    columns: Vec<ColumnDef>,
    relations: Vec<(RelationId, RelationDef)>,
    read_source_id: Option<String>,
    write_source_id: Option<String>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            label: None,
            primary_key: None,
            columns: Vec::new(),
            relations: Vec::new(),
            read_source_id: None,
            write_source_id: None,
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name the primary key explicitly. Otherwise the column flagged `primary` is used.
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn relation(mut self, id: impl Into<RelationId>, relation: RelationDef) -> Self {
        self.relations.push((id.into(), relation));
        self
    }

    pub fn read_source(mut self, id: impl Into<String>) -> Self {
        self.read_source_id = Some(id.into());
        self
    }

    pub fn write_source(mut self, id: impl Into<String>) -> Self {
        self.write_source_id = Some(id.into());
        self
    }

    /// Route both reads and writes to one data source.
    pub fn source(self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.read_source(id.clone()).write_source(id)
    }

    pub fn build(self) -> Result<Schema> {
        let name = self.name;
        let invalid = |message: String| Error::invalid_schema(name.clone(), message);

        let mut columns: IndexMap<String, ColumnDef> = IndexMap::new();
        for column in self.columns {
            if columns.contains_key(&column.name) {
                return Err(invalid(format!("duplicate column {}", column.name)));
            }
            columns.insert(column.name.clone(), column);
        }

        let flagged: Vec<&str> = columns
            .values()
            .filter(|c| c.primary)
            .map(|c| c.name.as_str())
            .collect();
        if flagged.len() > 1 {
            return Err(invalid(format!(
                "more than one primary key column: {}",
                flagged.join(", ")
            )));
        }

        let primary_key = match (self.primary_key, flagged.first()) {
            (Some(pk), Some(flag)) if pk != *flag => {
                return Err(invalid(format!(
                    "primary key {pk} conflicts with primary column {flag}"
                )));
            }
            (Some(pk), _) => Some(pk),
            (None, Some(flag)) => Some((*flag).to_string()),
            (None, None) => None,
        };

        if let Some(pk) = &primary_key {
            match columns.get_mut(pk) {
                Some(column) => column.primary = true,
                None => return Err(invalid(format!("primary key {pk} is not a column"))),
            }
        }

        let mut relations: IndexMap<RelationId, RelationDef> = IndexMap::new();
        for (id, relation) in self.relations {
            if relations.contains_key(&id) {
                return Err(invalid(format!("duplicate relation {id}")));
            }
            relations.insert(id, relation);
        }

        Ok(Schema {
            table: self.table.unwrap_or_else(|| name.clone()),
            label: self.label,
            primary_key,
            columns,
            relations,
            read_source_id: self
                .read_source_id
                .unwrap_or_else(|| DEFAULT_SOURCE_ID.to_string()),
            write_source_id: self
                .write_source_id
                .unwrap_or_else(|| DEFAULT_SOURCE_ID.to_string()),
            name,
        })
    }
}
