//! Lazy record collections.
//!
//! A [`Collection`] describes a SELECT over one schema's table (aliased `m`) and runs
//! it on first access. Collections produced by to-many relations also carry preset
//! values, merged into every record created through them, and many-to-many
//! collections write the junction row after such a create.

use std::cell::OnceCell;
use std::sync::Arc;

use lazyrecord_core::{Error, OperationResult, Result, Value, ValueMap};
use lazyrecord_query::{Condition, Join, Query};
use lazyrecord_schema::{RelationId, Schema};

use crate::database::Database;
use crate::hooks::CurrentUser;
use crate::record::Record;

/// How a many-to-many collection links a newly created target record to its owner.
#[derive(Debug, Clone)]
pub(crate) struct JunctionLink {
    /// The junction relation on the owning schema.
    pub relation: RelationId,
    pub junction_schema: Arc<Schema>,
    /// Junction column that points at the target record.
    pub link_column: String,
    /// Target column the junction row points at.
    pub target_column: String,
    /// Junction column that points at the owner.
    pub owner_column: String,
    pub owner_value: Value,
}

impl JunctionLink {
    /// Insert the junction row for `created` through `junction`, a fresh record of the
    /// junction schema. The two computed keys win over `attrs`.
    fn insert(&self, mut junction: Record, created: &Record, attrs: ValueMap) -> Result<()> {
        let fail = |message: String| Error::JunctionCreate {
            relation: self.relation.to_string(),
            message,
        };
        let target = created
            .get_value(&self.target_column)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| fail(format!("created record has no {}", self.target_column)))?;

        let mut args = attrs;
        args.insert(self.link_column.clone(), target);
        args.insert(self.owner_column.clone(), self.owner_value.clone());

        let result = junction.create(args);
        if result.is_error() {
            tracing::warn!(
                relation = %self.relation,
                table = self.junction_schema.table(),
                message = result.message(),
                "Junction row create failed"
            );
            return Err(fail(result.message().to_string()));
        }
        Ok(())
    }
}

/// A lazily fetched set of records.
#[derive(Debug)]
pub struct Collection {
    db: Database,
    schema: Arc<Schema>,
    joins: Vec<Join>,
    conditions: Vec<Condition>,
    preset: ValueMap,
    link: Option<JunctionLink>,
    source: Option<String>,
    current_user: Option<CurrentUser>,
    items: OnceCell<Vec<Record>>,
}

impl Collection {
    pub(crate) fn new(db: Database, schema: Arc<Schema>) -> Self {
        Self {
            db,
            schema,
            joins: Vec::new(),
            conditions: Vec::new(),
            preset: ValueMap::new(),
            link: None,
            source: None,
            current_user: None,
            items: OnceCell::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Narrow the collection. Fetched items are discarded.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self.items = OnceCell::new();
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self.items = OnceCell::new();
        self
    }

    pub(crate) fn preset(mut self, vars: ValueMap) -> Self {
        self.preset.extend(vars);
        self
    }

    pub(crate) fn link(mut self, link: JunctionLink) -> Self {
        self.link = Some(link);
        self
    }

    /// Route reads and writes to `source` instead of the schema's sources.
    pub(crate) fn source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Run permission checks of records read or created here as `user`.
    pub(crate) fn user(mut self, user: Option<CurrentUser>) -> Self {
        self.current_user = user;
        self
    }

    /// The data source reads go to.
    pub fn read_source_id(&self) -> &str {
        self.source
            .as_deref()
            .unwrap_or_else(|| self.schema.read_source_id())
    }

    /// A new record of `schema` carrying the collection's source and user.
    fn new_record(&self, schema: &Arc<Schema>) -> Record {
        let mut record = Record::new(self.db.clone(), Arc::clone(schema));
        if let Some(source) = &self.source {
            record.using(source.clone());
        }
        if let Some(user) = &self.current_user {
            record.set_current_user(Arc::clone(user));
        }
        record
    }

    /// Values every record created through this collection receives.
    pub fn preset_vars(&self) -> &ValueMap {
        &self.preset
    }

    /// The SELECT this collection runs.
    pub fn query(&self) -> Query {
        let mut query = Query::select(self.schema.table())
            .alias("m")
            .columns(&["m.*"]);
        for join in &self.joins {
            query = query.join(join.clone());
        }
        for condition in &self.conditions {
            query = query.filter(condition.clone());
        }
        query
    }

    /// The records, fetched on first access.
    pub fn items(&self) -> Result<&[Record]> {
        if let Some(items) = self.items.get() {
            return Ok(items);
        }
        let fetched = self.fetch()?;
        Ok(self.items.get_or_init(|| fetched))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.items.get().is_some()
    }

    /// Drop fetched items; the next access queries again.
    pub fn reset(&mut self) {
        self.items.take();
    }

    fn fetch(&self) -> Result<Vec<Record>> {
        let source = self.read_source_id();
        let provider = self.db.provider();
        let driver = provider.query_driver(source)?;
        let conn = provider.connection(source)?;

        let (sql, vars) = self.query().build(&driver);
        tracing::debug!(table = self.schema.table(), sql = %sql, "Fetching collection");

        let mut stmt = conn.prepare(&sql)?;
        stmt.execute(&vars)?;
        let mut records = Vec::new();
        while let Some(row) = stmt.fetch_row()? {
            let mut record = self.new_record(&self.schema);
            record.set_data(row.into_map());
            records.push(record);
        }
        tracing::debug!(table = self.schema.table(), count = records.len(), "Fetched collection");
        Ok(records)
    }

    /// Create a record through the collection. Preset values override `args`.
    ///
    /// Storage and validation failures come back in the [`OperationResult`]. For a
    /// many-to-many collection a failed junction insert is an
    /// [`Error::JunctionCreate`].
    pub fn create(&mut self, args: ValueMap) -> Result<(Record, OperationResult)> {
        self.create_linked(args, ValueMap::new())
    }

    /// Like [`create`](Self::create), with extra attributes for the junction row.
    pub fn create_linked(
        &mut self,
        mut args: ValueMap,
        link_attrs: ValueMap,
    ) -> Result<(Record, OperationResult)> {
        args.extend(self.preset.clone());

        let mut record = self.new_record(&self.schema);
        let result = record.create(args);
        if result.is_success() {
            if let Some(link) = &self.link {
                let junction = self.new_record(&link.junction_schema);
                link.insert(junction, &record, link_attrs)?;
            }
            self.reset();
        }
        Ok((record, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyrecord_core::testing::{MockConnection, MockProvider};
    use lazyrecord_core::{RecordConfig, Row, value_map};
    use lazyrecord_schema::{ColumnDef, Isa, RelationDef, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        let pk = || ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true);
        let book = Schema::builder("book")
            .table("books")
            .column(pk())
            .column(ColumnDef::new("title").required(true))
            .relation("book_tags", RelationDef::has_many("id", "book_tag", "book_id"))
            .relation("tags", RelationDef::many_to_many("book_tags", "tag"))
            .build()
            .unwrap();
        let book_tag = Schema::builder("book_tag")
            .table("book_tags")
            .column(pk())
            .column(ColumnDef::new("book_id").isa(Isa::Int))
            .column(ColumnDef::new("tag_id").isa(Isa::Int))
            .column(ColumnDef::new("weight").isa(Isa::Int))
            .relation("tag", RelationDef::belongs_to("tag_id", "tag", "id"))
            .build()
            .unwrap();
        let tag = Schema::builder("tag")
            .table("tags")
            .column(pk())
            .column(ColumnDef::new("name").required(true))
            .build()
            .unwrap();
        SchemaRegistry::from_schemas([book, book_tag, tag]).unwrap()
    }

    fn setup() -> (Database, Arc<MockConnection>) {
        let conn = Arc::new(MockConnection::new());
        let provider = Arc::new(MockProvider::sqlite(Arc::clone(&conn)));
        let db = Database::builder(registry(), provider)
            .config(RecordConfig::default().auto_reload(false))
            .build();
        (db, conn)
    }

    #[test]
    fn test_items_fetched_once() {
        let (db, conn) = setup();
        conn.push_rows(vec![
            Row::from_pairs([("id", Value::Int(1)), ("title", Value::from("Dune"))]),
            Row::from_pairs([("id", Value::Int(2)), ("title", Value::from("Emma"))]),
        ]);
        let books = db.collection("book").unwrap();
        assert!(!books.is_loaded());
        assert_eq!(books.count().unwrap(), 2);
        assert_eq!(books.items().unwrap()[1].get("title"), Value::from("Emma"));
        assert_eq!(conn.statements(), vec!["SELECT m.* FROM books m"]);
    }

    #[test]
    fn test_create_through_many_to_many_inserts_junction() {
        let (db, conn) = setup();
        conn.set_next_id(10);
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        let tags = book.relation_mut("tags").unwrap().as_collection_mut().unwrap();
        let (tag, result) = tags
            .create_linked(value_map! { "name" => "classic" }, value_map! { "weight" => 5, "book_id" => 99 })
            .unwrap();
        assert!(result.is_success());
        assert_eq!(tag.get("id"), Value::Int(10));

        let executed = conn.executed();
        assert_eq!(executed[0].sql, "INSERT INTO tags (name) VALUES (?1)");
        assert_eq!(
            executed[1].sql,
            "INSERT INTO book_tags (weight, book_id, tag_id) VALUES (?1, ?2, ?3)"
        );
        assert_eq!(
            executed[1].params,
            vec![Value::Int(5), Value::Int(3), Value::Int(10)]
        );
    }

    #[test]
    fn test_owner_source_and_user_carry_over() {
        let conn = Arc::new(MockConnection::new());
        let provider = Arc::new(MockProvider::sqlite(Arc::clone(&conn)));
        let db = Database::builder(registry(), provider.clone())
            .config(RecordConfig::default().auto_reload(false))
            .build();
        let user: CurrentUser = Arc::new(42_i64);
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        book.using("archive");
        book.set_current_user(Arc::clone(&user));

        let tags = book.relation_mut("tags").unwrap().as_collection_mut().unwrap();
        assert_eq!(tags.read_source_id(), "archive");
        let (tag, result) = tags.create(value_map! { "name" => "classic" }).unwrap();
        assert!(result.is_success());
        assert_eq!(tag.write_source_id(), "archive");
        assert!(tag.current_user().is_some_and(|u| Arc::ptr_eq(u, &user)));

        assert_eq!(conn.execute_count(), 2);
        assert!(provider.requested_sources().iter().all(|s| s == "archive"));
    }

    #[test]
    fn test_junction_failure_is_fatal() {
        let (db, conn) = setup();
        conn.fail_matching("book_tags", "constraint failed");
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        let tags = book.relation_mut("tags").unwrap().as_collection_mut().unwrap();
        let err = tags.create(value_map! { "name" => "classic" }).unwrap_err();
        assert_eq!(err.to_string(), "book_tags create failed.");
    }

    #[test]
    fn test_failed_create_skips_junction() {
        let (db, conn) = setup();
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        let tags = book.relation_mut("tags").unwrap().as_collection_mut().unwrap();
        let (_, result) = tags.create(value_map! { "name" => "" }).unwrap();
        assert_eq!(result.message(), "Validation failed.");
        assert_eq!(conn.execute_count(), 0);
    }
}
