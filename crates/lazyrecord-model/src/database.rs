//! The shared context every record is created from.
//!
//! A [`Database`] bundles the schema registry, the connection provider, the validator
//! registry, per-schema hooks and record defaults. It is cheap to clone and is passed
//! explicitly rather than reached through globals.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazyrecord_core::{ConnectionProvider, RecordConfig, Result};
use lazyrecord_schema::{Schema, SchemaRegistry, ValidatorRegistry, ddl_builder_for};

use crate::collection::Collection;
use crate::hooks::{CurrentUser, DefaultHooks, ModelHooks};
use crate::record::{LoadArgs, Record};

/// Registry, connections and record defaults shared by all records.
#[derive(Clone)]
pub struct Database {
    registry: Arc<SchemaRegistry>,
    provider: Arc<dyn ConnectionProvider>,
    validators: Arc<ValidatorRegistry>,
    hooks: Arc<HashMap<String, Arc<dyn ModelHooks>>>,
    default_hooks: Arc<dyn ModelHooks>,
    config: RecordConfig,
    current_user: Option<CurrentUser>,
}

impl Database {
    /// A context with default hooks, the stock validators and default configuration.
    pub fn new(registry: SchemaRegistry, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self::builder(registry, provider).build()
    }

    pub fn builder(
        registry: SchemaRegistry,
        provider: Arc<dyn ConnectionProvider>,
    ) -> DatabaseBuilder {
        DatabaseBuilder {
            registry,
            provider,
            validators: ValidatorRegistry::default(),
            hooks: HashMap::new(),
            config: RecordConfig::default(),
            current_user: None,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn provider(&self) -> &Arc<dyn ConnectionProvider> {
        &self.provider
    }

    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    pub fn config(&self) -> RecordConfig {
        self.config
    }

    /// The user permission checks run against when a record has none of its own.
    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    /// Hooks registered for `schema`, or [`DefaultHooks`].
    pub fn hooks_for(&self, schema: &str) -> Arc<dyn ModelHooks> {
        self.hooks
            .get(schema)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default_hooks))
    }

    pub fn schema(&self, name: &str) -> Result<Arc<Schema>> {
        self.registry.require(name)
    }

    /// A new, empty record of schema `name`.
    pub fn record(&self, name: &str) -> Result<Record> {
        Ok(Record::new(self.clone(), self.schema(name)?))
    }

    /// Construct a record of schema `name` and load it.
    ///
    /// A load that matches nothing still yields the (empty) record; its result
    /// history says why.
    pub fn find(&self, name: &str, key: impl Into<LoadArgs>) -> Result<Record> {
        let mut record = self.record(name)?;
        record.load(key);
        Ok(record)
    }

    /// An unfiltered lazy collection over schema `name`.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        Ok(Collection::new(self.clone(), self.schema(name)?))
    }

    /// `CREATE TABLE` statements for schema `name` in the dialect of its write source.
    pub fn ddl(&self, name: &str, rebuild: bool) -> Result<Vec<String>> {
        let schema = self.schema(name)?;
        let driver = self.provider.query_driver(schema.write_source_id())?;
        ddl_builder_for(driver.dialect, &self.registry).build(&schema, rebuild)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooked: Vec<&String> = self.hooks.keys().collect();
        hooked.sort();
        f.debug_struct("Database")
            .field("schemas", &self.registry.names().collect::<Vec<_>>())
            .field("hooks", &hooked)
            .field("config", &self.config)
            .field("current_user", &self.current_user.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Database`].
pub struct DatabaseBuilder {
    registry: SchemaRegistry,
    provider: Arc<dyn ConnectionProvider>,
    validators: ValidatorRegistry,
    hooks: HashMap<String, Arc<dyn ModelHooks>>,
    config: RecordConfig,
    current_user: Option<CurrentUser>,
}

impl DatabaseBuilder {
    /// Register hooks for the schema named `schema`.
    pub fn hooks(mut self, schema: impl Into<String>, hooks: impl ModelHooks + 'static) -> Self {
        self.hooks.insert(schema.into(), Arc::new(hooks));
        self
    }

    pub fn validators(mut self, validators: ValidatorRegistry) -> Self {
        self.validators = validators;
        self
    }

    pub fn config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    pub fn current_user(mut self, user: CurrentUser) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn build(self) -> Database {
        tracing::debug!(
            schemas = self.registry.len(),
            hooks = self.hooks.len(),
            auto_reload = self.config.auto_reload,
            save_results = self.config.save_results,
            "Building database context"
        );
        Database {
            registry: Arc::new(self.registry),
            provider: self.provider,
            validators: Arc::new(self.validators),
            hooks: Arc::new(self.hooks),
            default_hooks: Arc::new(DefaultHooks),
            config: self.config,
            current_user: self.current_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyrecord_core::testing::{MockConnection, MockProvider};
    use lazyrecord_core::{Dialect, Error, QueryDriver, Right, ValueMap};
    use lazyrecord_schema::{ColumnDef, Isa};

    struct ReadOnly;

    impl ModelHooks for ReadOnly {
        fn current_user_can(&self, _: Option<&CurrentUser>, right: Right, _: &ValueMap) -> bool {
            right == Right::Load
        }
    }

    fn registry() -> SchemaRegistry {
        let book = Schema::builder("book")
            .table("books")
            .column(ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true))
            .column(ColumnDef::new("title").required(true))
            .build()
            .unwrap();
        SchemaRegistry::from_schemas([book]).unwrap()
    }

    #[test]
    fn test_hooks_lookup_falls_back_to_default() {
        let provider = Arc::new(MockProvider::sqlite(Arc::new(MockConnection::new())));
        let db = Database::builder(registry(), provider)
            .hooks("book", ReadOnly)
            .build();
        let empty = ValueMap::new();
        assert!(!db.hooks_for("book").current_user_can(None, Right::Create, &empty));
        assert!(db.hooks_for("author").current_user_can(None, Right::Create, &empty));
    }

    #[test]
    fn test_record_requires_registered_schema() {
        let provider = Arc::new(MockProvider::sqlite(Arc::new(MockConnection::new())));
        let db = Database::new(registry(), provider);
        assert!(db.record("book").is_ok());
        assert!(matches!(db.record("author"), Err(Error::SchemaNotFound(_))));
    }

    #[test]
    fn test_ddl_uses_source_dialect() {
        let provider = Arc::new(MockProvider::new(
            Arc::new(MockConnection::new()),
            QueryDriver::new(Dialect::Postgres),
        ));
        let db = Database::new(registry(), provider);
        let ddl = db.ddl("book", false).unwrap();
        assert_eq!(
            ddl,
            vec!["CREATE TABLE \"books\" (\n  \"id\" serial PRIMARY KEY,\n  \"title\" text NOT NULL\n)"]
        );
    }
}
