//! Records and their lifecycle operations.
//!
//! A [`Record`] is one row of one schema: its current data, the schema it follows and
//! a memo cache of resolved relations. Lifecycle operations never return `Err` and
//! never panic; every fault is folded into an [`OperationResult`].
//!
//! Each operation checks permission through the schema's hooks before any SQL is built,
//! runs exactly one statement (plus an optional reload) and records its result in the
//! record's history when `save_results` is on.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazyrecord_core::{
    Connection, Error, OperationResult, QueryDriver, RecordConfig, Result, ResultExtra, Right,
    Row, Value, ValueMap,
};
use lazyrecord_query::{Condition, Query};
use lazyrecord_schema::{RecordView, RelationId, Schema};

use crate::database::Database;
use crate::hooks::{CurrentUser, ModelHooks};
use crate::pipeline::{self, Mode, Prepared};
use crate::relation::{self, Relation};

// ============================================================================
// Operation plumbing
// ============================================================================

/// A fault together with the diagnostics gathered before it happened.
#[derive(Debug)]
pub(crate) struct Failure {
    pub error: Error,
    pub extra: ResultExtra,
}

impl Failure {
    pub(crate) fn new(error: Error, extra: ResultExtra) -> Self {
        Self { error, extra }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self::new(error, ResultExtra::new())
    }
}

type Outcome = std::result::Result<(&'static str, ResultExtra), Failure>;

/// What [`Record::load`] looks a row up by.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadArgs {
    /// A primary key value, deflated through the primary key column.
    Key(Value),
    /// Column equality conditions.
    Conditions(ValueMap),
}

impl From<Value> for LoadArgs {
    fn from(key: Value) -> Self {
        LoadArgs::Key(key)
    }
}

impl From<ValueMap> for LoadArgs {
    fn from(conditions: ValueMap) -> Self {
        LoadArgs::Conditions(conditions)
    }
}

impl From<i64> for LoadArgs {
    fn from(key: i64) -> Self {
        LoadArgs::Key(Value::Int(key))
    }
}

impl From<i32> for LoadArgs {
    fn from(key: i32) -> Self {
        LoadArgs::Key(Value::from(key))
    }
}

impl From<&str> for LoadArgs {
    fn from(key: &str) -> Self {
        LoadArgs::Key(Value::from(key))
    }
}

impl From<String> for LoadArgs {
    fn from(key: String) -> Self {
        LoadArgs::Key(Value::Text(key))
    }
}

/// Options for [`Record::create_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Reload the created row even when `auto_reload` is off.
    pub reload: bool,
}

/// Options for [`Record::update_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Reload the row after the update instead of merging the written values.
    pub reload: bool,
}

// ============================================================================
// Record
// ============================================================================

/// One row of a schema.
pub struct Record {
    db: Database,
    schema: Arc<Schema>,
    hooks: Arc<dyn ModelHooks>,
    data: ValueMap,
    cache: HashMap<RelationId, Relation>,
    results: Vec<OperationResult>,
    using_source: Option<String>,
    current_user: Option<CurrentUser>,
    config: RecordConfig,
}

impl Record {
    pub(crate) fn new(db: Database, schema: Arc<Schema>) -> Self {
        let hooks = db.hooks_for(schema.name());
        let config = db.config();
        Self {
            db,
            schema,
            hooks,
            data: ValueMap::new(),
            cache: HashMap::new(),
            results: Vec::new(),
            using_source: None,
            current_user: None,
            config,
        }
    }

    /// A record of schema `name` holding `data`, without touching storage.
    pub fn from_data(db: &Database, name: &str, data: ValueMap) -> Result<Self> {
        let mut record = db.record(name)?;
        record.data = data;
        Ok(record)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> RecordConfig {
        self.config
    }

    /// Override the database-wide record configuration for this record.
    pub fn with_config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Insert a new row built from `args`.
    pub fn create(&mut self, args: ValueMap) -> OperationResult {
        self.create_with(args, CreateOptions::default())
    }

    #[tracing::instrument(level = "debug", skip(self, args), fields(schema = %self.schema.name()))]
    pub fn create_with(&mut self, args: ValueMap, options: CreateOptions) -> OperationResult {
        let outcome = self.run_create(args, options);
        self.report(Right::Create, outcome)
    }

    fn run_create(&mut self, args: ValueMap, options: CreateOptions) -> Outcome {
        if args.is_empty() {
            return Err(Error::EmptyInput.into());
        }

        let args = self.hooks.before_create(args);
        let orig_args = args.clone();
        let args = self.schema.filter_args(&args);
        self.check_permission(Right::Create, &args)?;

        self.data.clear();
        let Prepared { args, validations } = pipeline::run(
            &self.schema,
            Mode::Create,
            args,
            &*self,
            self.db.validators(),
        )?;

        let pk = self.schema.primary_key().map(str::to_string);
        let (driver, conn) = self.connect(self.write_source_id())?;
        let returning = pk.is_some() && driver.supports_returning();

        let mut query = Query::insert(self.schema.table(), args.clone());
        if let (true, Some(pk)) = (returning, &pk) {
            query = query.returning(pk.as_str());
        }
        let (sql, vars) = query.build(&driver);
        tracing::debug!(sql = %sql, vars = vars.len(), "Inserting record");

        let context = || {
            ResultExtra::new()
                .sql(sql.clone())
                .args(args.clone())
                .vars(vars.clone())
                .validations(validations.clone())
        };

        let row = execute(&*conn, &sql, &vars, returning).map_err(|e| Failure::new(e, context()))?;
        let generated = if returning {
            row.zip(pk.as_deref())
                .and_then(|(row, pk)| row.get(pk).cloned())
        } else {
            conn.last_insert_id()
                .map_err(|e| Failure::new(e, context()))?
        };
        let explicit = pk
            .as_deref()
            .and_then(|pk| args.get(pk))
            .filter(|v| !v.is_null())
            .cloned();
        let id = explicit.or(generated).filter(|v| !v.is_null());

        let mut data = args.clone();
        if let (Some(pk), Some(id)) = (&pk, &id) {
            data.insert(pk.clone(), id.clone());

            if self.config.auto_reload || options.reload {
                match self.fetch(&single(pk, id.clone())) {
                    Ok(Some(row)) => data = row,
                    Ok(None) => tracing::warn!(table = self.schema.table(), "Created row not found on reload"),
                    Err(err) => tracing::warn!(table = self.schema.table(), error = %err, "Reload after create failed"),
                }
            }
        }
        self.data = data;

        self.hooks.after_create(&orig_args);

        let mut extra = context();
        if let Some(id) = id {
            extra = extra.id(id);
        }
        Ok(("Created", extra))
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// Load one row by primary key or by column conditions.
    ///
    /// When nothing matches, the record's data is left as it was.
    #[tracing::instrument(level = "debug", skip(self, args), fields(schema = %self.schema.name()))]
    pub fn load(&mut self, args: impl Into<LoadArgs>) -> OperationResult {
        let outcome = self.run_load(args.into());
        self.report(Right::Load, outcome)
    }

    /// Alias of [`load`](Self::load).
    pub fn find(&mut self, args: impl Into<LoadArgs>) -> OperationResult {
        self.load(args)
    }

    fn run_load(&mut self, args: LoadArgs) -> Outcome {
        let conditions = match args {
            LoadArgs::Conditions(conditions) => conditions,
            LoadArgs::Key(key) => {
                let column = self.schema.primary_column().ok_or_else(|| {
                    Error::invalid_schema(self.schema.name(), "no primary key to load by")
                })?;
                single(&column.name, column.deflate(key))
            }
        };
        self.check_permission(Right::Load, &conditions)?;

        let (driver, conn) = self.connect(self.read_source_id())?;
        let (sql, vars) = Query::select(self.schema.table())
            .where_from_args(&conditions)
            .limit(1)
            .build(&driver);
        tracing::debug!(sql = %sql, vars = vars.len(), "Loading record");

        let context = || ResultExtra::new().sql(sql.clone()).vars(vars.clone());
        let row = execute(&*conn, &sql, &vars, true).map_err(|e| Failure::new(e, context()))?;
        let Some(row) = row else {
            return Err(Failure::new(Error::LoadFailed, context()));
        };

        self.data = row.into_map();
        let mut extra = context();
        if let Some(id) = self.primary_value() {
            extra = extra.id(id.clone());
        }
        Ok(("Data loaded", extra))
    }

    /// Load the row again by the current primary key value.
    pub fn reload(&mut self) -> OperationResult {
        let key = self
            .schema
            .primary_key()
            .zip(self.primary_value().filter(|v| v.is_truthy()))
            .map(|(pk, value)| single(pk, value.clone()));
        match key {
            Some(conditions) => self.load(conditions),
            None => {
                let outcome = Err(Error::NotLoaded {
                    detail: "Can not reload record.",
                }
                .into());
                self.report(Right::Load, outcome)
            }
        }
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Write `args` to the loaded row. A primary key value in `args` takes precedence
    /// over the loaded one.
    pub fn update(&mut self, args: ValueMap) -> OperationResult {
        self.update_with(args, UpdateOptions::default())
    }

    #[tracing::instrument(level = "debug", skip(self, args), fields(schema = %self.schema.name()))]
    pub fn update_with(&mut self, args: ValueMap, options: UpdateOptions) -> OperationResult {
        let outcome = self.run_update(args, options);
        self.report(Right::Update, outcome)
    }

    fn run_update(&mut self, args: ValueMap, options: UpdateOptions) -> Outcome {
        let Some(pk) = self.schema.primary_key().map(str::to_string) else {
            return Err(Error::PrimaryKeyUndefined.into());
        };
        let is_set = |map: &ValueMap| map.get(&pk).is_some_and(|v| !v.is_null());
        if !is_set(&args) && !is_set(&self.data) {
            return Err(Error::NotLoaded {
                detail: "Can not update record.",
            }
            .into());
        }

        self.check_permission(Right::Update, &args)?;

        let key = args
            .get(&pk)
            .filter(|v| !v.is_null())
            .or_else(|| self.data.get(&pk))
            .cloned()
            .unwrap_or_default();
        if !key.is_truthy() {
            return Err(Failure::new(
                Error::PrimaryKeyUndefined,
                ResultExtra::new().args(args),
            ));
        }

        let args = self.hooks.before_update(args);
        let orig_args = args.clone();
        let args = self.schema.filter_args(&args);
        let Prepared { args, validations } = pipeline::run(
            &self.schema,
            Mode::Update,
            args,
            &*self,
            self.db.validators(),
        )?;

        if args.is_empty() {
            return Err(Failure::new(
                Error::EmptyInput,
                ResultExtra::new().validations(validations).id(key),
            ));
        }

        let (driver, conn) = self.connect(self.write_source_id())?;
        let (sql, vars) = Query::update(self.schema.table(), args.clone())
            .filter(Condition::eq(pk.as_str(), key.clone()))
            .build(&driver);
        tracing::debug!(sql = %sql, vars = vars.len(), "Updating record");

        let context = || {
            ResultExtra::new()
                .sql(sql.clone())
                .args(args.clone())
                .vars(vars.clone())
                .validations(validations.clone())
                .id(key.clone())
        };
        execute(&*conn, &sql, &vars, false).map_err(|e| Failure::new(e, context()))?;

        let reloaded = if options.reload {
            let current = args.get(&pk).filter(|v| v.is_truthy()).unwrap_or(&key);
            match self.fetch(&single(&pk, current.clone())) {
                Ok(row) => row,
                Err(err) => {
                    tracing::warn!(table = self.schema.table(), error = %err, "Reload after update failed");
                    None
                }
            }
        } else {
            None
        };
        match reloaded {
            Some(row) => self.data = row,
            None => self.data.extend(args.clone()),
        }

        self.hooks.after_update(&orig_args);
        Ok(("Updated", context()))
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Delete the loaded row and clear the record's data.
    #[tracing::instrument(level = "debug", skip(self), fields(schema = %self.schema.name()))]
    pub fn delete(&mut self) -> OperationResult {
        let outcome = self.run_delete();
        self.report(Right::Delete, outcome)
    }

    fn run_delete(&mut self) -> Outcome {
        let Some(pk) = self.schema.primary_key().map(str::to_string) else {
            return Err(Error::PrimaryKeyUndefined.into());
        };
        let Some(key) = self.data.get(&pk).filter(|v| !v.is_null()).cloned() else {
            return Err(Error::NotLoaded {
                detail: "Record delete failed.",
            }
            .into());
        };

        let data = self.data.clone();
        self.check_permission(Right::Delete, &data)?;
        self.hooks.before_delete(&data);

        let (driver, conn) = self.connect(self.write_source_id())?;
        let (sql, vars) = Query::delete(self.schema.table())
            .filter(Condition::eq(pk.as_str(), key.clone()))
            .build(&driver);
        tracing::debug!(sql = %sql, vars = vars.len(), "Deleting record");

        let context = || {
            ResultExtra::new()
                .sql(sql.clone())
                .vars(vars.clone())
                .id(key.clone())
        };
        execute(&*conn, &sql, &vars, false).map_err(|e| Failure::new(e, context()))?;

        self.hooks.after_delete(&data);
        self.clear();
        Ok(("Deleted", context()))
    }

    // ========================================================================
    // Composite operations
    // ========================================================================

    /// Update the row `args` identify, or create it.
    ///
    /// The row is looked up by the primary key in `args`, or else by the `by_keys`
    /// columns present in `args`.
    pub fn create_or_update(&mut self, args: ValueMap, by_keys: &[&str]) -> OperationResult {
        let found = self.lookup(&args, by_keys);
        if found.as_ref().is_some_and(OperationResult::is_success) || self.is_loaded() {
            self.update(args)
        } else {
            self.create(args)
        }
    }

    /// Load the row `args` identify, or create it.
    pub fn load_or_create(&mut self, args: ValueMap, by_keys: &[&str]) -> OperationResult {
        match self.lookup(&args, by_keys) {
            Some(found) if found.is_success() => found,
            _ if self.is_loaded() => {
                let mut extra = ResultExtra::new();
                if let Some(id) = self.primary_value() {
                    extra = extra.id(id.clone());
                }
                self.report(Right::Load, Ok(("Data loaded", extra)))
            }
            _ => self.create(args),
        }
    }

    /// Create when the primary key is unset, else write the current data back.
    pub fn save(&mut self) -> OperationResult {
        let data = self.data.clone();
        if self.is_loaded() {
            self.update(data)
        } else {
            self.create(data)
        }
    }

    fn lookup(&mut self, args: &ValueMap, by_keys: &[&str]) -> Option<OperationResult> {
        let by_pk = self
            .schema
            .primary_key()
            .and_then(|pk| args.get(pk).filter(|v| !v.is_null()).map(|v| single(pk, v.clone())));
        let conditions = by_pk.unwrap_or_else(|| {
            by_keys
                .iter()
                .filter_map(|k| {
                    args.get(*k)
                        .filter(|v| !v.is_null())
                        .map(|v| ((*k).to_string(), v.clone()))
                })
                .collect()
        });
        if conditions.is_empty() {
            return None;
        }
        Some(self.load(conditions))
    }

    // ========================================================================
    // Data access
    // ========================================================================

    /// The inflated value of `name`, or NULL.
    pub fn get(&self, name: &str) -> Value {
        let value = self.data.get(name).cloned().unwrap_or_default();
        match self.schema.get_column(name) {
            Some(column) if !value.is_null() => column.inflate(value),
            _ => value,
        }
    }

    /// The stored value of `name`, without inflation.
    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Set a value in the record's data. Nothing is written to storage.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(name.into(), value.into());
    }

    /// Whether `name` holds a non-NULL value.
    pub fn has_value(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn data(&self) -> &ValueMap {
        &self.data
    }

    pub fn set_data(&mut self, data: ValueMap) {
        self.data = data;
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Whether the record holds a truthy primary key value.
    pub fn is_loaded(&self) -> bool {
        self.primary_value().is_some_and(Value::is_truthy)
    }

    fn primary_value(&self) -> Option<&Value> {
        self.schema
            .primary_key()
            .and_then(|pk| self.data.get(pk))
            .filter(|v| !v.is_null())
    }

    /// Every value in the record's data, inflated through its column.
    pub fn to_inflated_map(&self) -> ValueMap {
        self.data.keys().map(|k| (k.clone(), self.get(k))).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_inflated_map())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Display text for a column, a plain data entry or a to-one relation.
    ///
    /// Columns with labeled valid values display the label. A to-one relation
    /// displays the related record's [`data_label`](Self::data_label).
    pub fn display(&mut self, name: &str) -> Result<String> {
        let schema = Arc::clone(&self.schema);
        if let Some(column) = schema.get_column(name) {
            if column.is_virtual {
                return Ok(self.get(name).to_string());
            }
            let value = self.data.get(name).cloned().unwrap_or_default();
            return Ok(column.display(&value, &*self));
        }
        if let Some(value) = self.data.get(name) {
            return Ok(value.to_string());
        }
        if schema.get_relation(name).is_some() {
            if let Relation::One(record) = self.relation(name)? {
                return Ok(record.data_label().to_string());
            }
        }
        Ok(String::new())
    }

    /// Label for pickers: the primary key value.
    pub fn data_label(&self) -> Value {
        self.data_key_value()
    }

    /// The primary key value, inflated.
    pub fn data_key_value(&self) -> Value {
        self.schema
            .primary_key()
            .map(|pk| self.get(pk))
            .unwrap_or_default()
    }

    // ========================================================================
    // Data sources and users
    // ========================================================================

    /// Route reads and writes of this record to `source_id`.
    pub fn using(&mut self, source_id: impl Into<String>) -> &mut Self {
        self.using_source = Some(source_id.into());
        self
    }

    /// The source set with [`using`](Self::using), if any.
    pub fn source_override(&self) -> Option<&str> {
        self.using_source.as_deref()
    }

    pub fn read_source_id(&self) -> &str {
        self.using_source
            .as_deref()
            .unwrap_or_else(|| self.schema.read_source_id())
    }

    pub fn write_source_id(&self) -> &str {
        self.using_source
            .as_deref()
            .unwrap_or_else(|| self.schema.write_source_id())
    }

    pub fn set_current_user(&mut self, user: CurrentUser) {
        self.current_user = Some(user);
    }

    /// The user set on this record, or the database-wide one.
    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref().or_else(|| self.db.current_user())
    }

    // ========================================================================
    // Result history
    // ========================================================================

    pub fn results(&self) -> &[OperationResult] {
        &self.results
    }

    pub fn last_result(&self) -> Option<&OperationResult> {
        self.results.last()
    }

    pub fn pop_result(&mut self) -> Option<OperationResult> {
        self.results.pop()
    }

    pub fn push_result(&mut self, result: OperationResult) {
        self.results.push(result);
    }

    pub fn flush_results(&mut self) -> Vec<OperationResult> {
        std::mem::take(&mut self.results)
    }

    // ========================================================================
    // Relations
    // ========================================================================

    /// Resolve the relation `id`, memoized until [`flush_cache`](Self::flush_cache).
    ///
    /// A misconfigured relation is an error; a to-one relation without a related row
    /// resolves to [`Relation::None`].
    pub fn relation(&mut self, id: &str) -> Result<&Relation> {
        self.relation_mut(id).map(|relation| &*relation)
    }

    /// Like [`relation`](Self::relation), for creating records through a collection.
    pub fn relation_mut(&mut self, id: &str) -> Result<&mut Relation> {
        if !self.cache.contains_key(id) {
            let resolved = relation::resolve(self, id)?;
            self.cache.insert(RelationId::from(id), resolved);
        }
        self.cache
            .get_mut(id)
            .ok_or_else(|| Error::relationship(id, "relation cache entry missing"))
    }

    /// Forget every resolved relation.
    pub fn flush_cache(&mut self) {
        self.cache.clear();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_permission(&self, right: Right, args: &ValueMap) -> std::result::Result<(), Failure> {
        if self.hooks.current_user_can(self.current_user(), right, args) {
            Ok(())
        } else {
            Err(Failure::new(
                Error::PermissionDenied { right },
                ResultExtra::new().args(args.clone()),
            ))
        }
    }

    fn connect(&self, source_id: &str) -> Result<(QueryDriver, Arc<dyn Connection>)> {
        let provider = self.db.provider();
        Ok((
            provider.query_driver(source_id)?,
            provider.connection(source_id)?,
        ))
    }

    /// Select one row by `conditions` from the read source.
    fn fetch(&self, conditions: &ValueMap) -> Result<Option<ValueMap>> {
        let (driver, conn) = self.connect(self.read_source_id())?;
        let (sql, vars) = Query::select(self.schema.table())
            .where_from_args(conditions)
            .limit(1)
            .build(&driver);
        tracing::debug!(sql = %sql, "Reloading record");
        Ok(execute(&*conn, &sql, &vars, true)?.map(Row::into_map))
    }

    fn report(&mut self, right: Right, outcome: Outcome) -> OperationResult {
        let result = match outcome {
            Ok((message, extra)) => {
                tracing::info!(
                    operation = right.as_str(),
                    table = self.schema.table(),
                    id = ?extra.id,
                    "{message}"
                );
                OperationResult::success(message, extra)
            }
            Err(Failure { error, extra }) => {
                match &error {
                    Error::PermissionDenied { .. } | Error::ValidationFailed { .. } => {
                        tracing::warn!(
                            operation = right.as_str(),
                            table = self.schema.table(),
                            "{error}"
                        );
                    }
                    Error::Storage { .. } => {
                        tracing::error!(
                            operation = right.as_str(),
                            table = self.schema.table(),
                            error = %error,
                            "Storage fault"
                        );
                    }
                    _ => {
                        tracing::debug!(
                            operation = right.as_str(),
                            table = self.schema.table(),
                            "{error}"
                        );
                    }
                }
                OperationResult::from_error(error, extra)
            }
        };
        if self.config.save_results {
            self.results.push(result.clone());
        }
        result
    }
}

pub(crate) fn single(column: &str, value: Value) -> ValueMap {
    let mut map = ValueMap::new();
    map.insert(column.to_string(), value);
    map
}

/// Prepare and execute one statement, fetching its first row when asked.
fn execute(conn: &dyn Connection, sql: &str, vars: &[Value], fetch: bool) -> Result<Option<Row>> {
    let mut stmt = conn.prepare(sql)?;
    stmt.execute(vars)?;
    if fetch { stmt.fetch_row() } else { Ok(None) }
}

impl RecordView for Record {
    fn data(&self) -> &ValueMap {
        &self.data
    }
}

/// Clones share the database context but start with an empty relation cache.
impl Clone for Record {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            schema: Arc::clone(&self.schema),
            hooks: Arc::clone(&self.hooks),
            data: self.data.clone(),
            cache: HashMap::new(),
            results: self.results.clone(),
            using_source: self.using_source.clone(),
            current_user: self.current_user.clone(),
            config: self.config,
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("schema", &self.schema.name())
            .field("data", &self.data)
            .field("cached_relations", &self.cache.len())
            .field("results", &self.results.len())
            .field("using_source", &self.using_source)
            .finish_non_exhaustive()
    }
}
