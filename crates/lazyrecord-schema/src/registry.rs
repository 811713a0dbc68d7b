//! The schema registry.
//!
//! Schemas refer to one another by name (relations name a foreign schema), so they
//! are collected in a [`SchemaRegistry`] and resolved through it. The registry is
//! built once and shared read-only afterwards.

use std::sync::Arc;

use indexmap::IndexMap;
use lazyrecord_core::{Error, Result};

use crate::relation::{RelationDef, RelationId};
use crate::schema::Schema;

/// A source of schema definitions.
pub trait SchemaLoader {
    fn load(&self) -> Result<Vec<Schema>>;
}

impl<F> SchemaLoader for F
where
    F: Fn() -> Result<Vec<Schema>>,
{
    fn load(&self) -> Result<Vec<Schema>> {
        self()
    }
}

/// Schemas by registered name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> Result<Self> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Add a schema. Names are unique.
    pub fn register(&mut self, schema: Schema) -> Result<Arc<Schema>> {
        if self.schemas.contains_key(schema.name()) {
            return Err(Error::invalid_schema(
                schema.name(),
                "a schema with this name is already registered",
            ));
        }
        tracing::debug!(
            schema = schema.name(),
            table = schema.table(),
            columns = schema.get_columns(true).len(),
            "Registering schema"
        );
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Register every schema a loader yields.
    pub fn load_from(&mut self, loader: &dyn SchemaLoader) -> Result<usize> {
        let schemas = loader.load()?;
        let count = schemas.len();
        for schema in schemas {
            self.register(schema)?;
        }
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Like [`get`](Self::get), failing with [`Error::SchemaNotFound`].
    pub fn require(&self, name: &str) -> Result<Arc<Schema>> {
        self.get(name)
            .ok_or_else(|| Error::SchemaNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Check that every relation points at a registered schema and existing columns,
    /// and that many-to-many hops are declared where they are expected.
    pub fn check_relations(&self) -> Result<()> {
        for schema in self.schemas.values() {
            for (id, relation) in schema.relations() {
                self.check_relation(schema, id, relation)?;
            }
        }
        Ok(())
    }

    fn check_relation(&self, schema: &Schema, id: &RelationId, relation: &RelationDef) -> Result<()> {
        let fail = |message: String| Error::relationship(id.as_str(), message);
        match relation {
            RelationDef::HasOne(fk) | RelationDef::HasMany(fk) | RelationDef::BelongsTo(fk) => {
                if !schema.has_column(&fk.self_column) {
                    return Err(fail(format!(
                        "column {} is not defined on {}",
                        fk.self_column,
                        schema.name()
                    )));
                }
                let foreign = self
                    .get(&fk.foreign_schema)
                    .ok_or_else(|| fail(format!("schema {} is not registered", fk.foreign_schema)))?;
                if !foreign.has_column(&fk.foreign_column) {
                    return Err(fail(format!(
                        "column {} is not defined on {}",
                        fk.foreign_column, fk.foreign_schema
                    )));
                }
            }
            RelationDef::ManyToMany { junction, target } => {
                let junction_def = schema
                    .get_relation(junction.as_str())
                    .ok_or_else(|| fail(format!("junction relation {junction} is not defined")))?;
                let fk = junction_def.foreign_key().ok_or_else(|| {
                    fail(format!("junction relation {junction} must be a foreign key relation"))
                })?;
                let junction_schema = self
                    .get(&fk.foreign_schema)
                    .ok_or_else(|| fail(format!("schema {} is not registered", fk.foreign_schema)))?;
                let target_def = junction_schema
                    .get_relation(target.as_str())
                    .ok_or_else(|| {
                        fail(format!(
                            "relation {target} is not defined on {}",
                            junction_schema.name()
                        ))
                    })?;
                if target_def.foreign_key().is_none() {
                    return Err(fail(format!(
                        "relation {target} must be a foreign key relation"
                    )));
                }
            }
        }
        Ok(())
    }
}
