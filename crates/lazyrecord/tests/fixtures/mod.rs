//! Shared schemas and a scripted database for the lazyrecord integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazyrecord::prelude::*;
use lazyrecord_core::testing::{MockConnection, MockProvider};

fn int_pk() -> ColumnDef {
    ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true)
}

pub fn author() -> Schema {
    Schema::builder("author")
        .table("authors")
        .column(int_pk())
        .column(ColumnDef::new("name").required(true).label("Name"))
        .relation("books", RelationDef::has_many("id", "book", "author_id"))
        .build()
        .unwrap()
}

pub fn book() -> Schema {
    Schema::builder("book")
        .table("books")
        .column(int_pk())
        .column(ColumnDef::new("author_id").isa(Isa::Int))
        .column(ColumnDef::new("title").required(true).label("Title"))
        .column(ColumnDef::new("published_at").isa(Isa::DateTime))
        .relation("author", RelationDef::belongs_to("author_id", "author", "id"))
        .relation("book_tags", RelationDef::has_many("id", "book_tag", "book_id"))
        .relation("tags", RelationDef::many_to_many("book_tags", "tag"))
        .relation("labels", RelationDef::many_to_many("book_labels", "tag"))
        .build()
        .unwrap()
}

pub fn book_tag() -> Schema {
    Schema::builder("book_tag")
        .table("book_tags")
        .column(int_pk())
        .column(ColumnDef::new("book_id").isa(Isa::Int))
        .column(ColumnDef::new("tag_id").isa(Isa::Int))
        .relation("tag", RelationDef::belongs_to("tag_id", "tag", "id"))
        .build()
        .unwrap()
}

pub fn tag() -> Schema {
    Schema::builder("tag")
        .table("tags")
        .column(int_pk())
        .column(ColumnDef::new("name").required(true))
        .build()
        .unwrap()
}

pub fn library() -> SchemaRegistry {
    SchemaRegistry::from_schemas([author(), book(), book_tag(), tag()]).unwrap()
}

/// A database over [`library`] backed by a scripted SQLite-dialect connection.
pub fn database(config: RecordConfig) -> (Database, Arc<MockConnection>) {
    let conn = Arc::new(MockConnection::new());
    let provider = Arc::new(MockProvider::sqlite(Arc::clone(&conn)));
    let db = Database::builder(library(), provider).config(config).build();
    (db, conn)
}

pub fn book_row(id: i64, author_id: i64, title: &str) -> Row {
    Row::from_pairs([
        ("id", Value::Int(id)),
        ("author_id", Value::Int(author_id)),
        ("title", Value::from(title)),
    ])
}

/// Grants every right and counts how often it was asked.
#[derive(Debug, Default, Clone)]
pub struct CountingHooks {
    pub checks: Arc<AtomicUsize>,
}

impl CountingHooks {
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl ModelHooks for CountingHooks {
    fn current_user_can(
        &self,
        _user: Option<&lazyrecord::CurrentUser>,
        _right: Right,
        _args: &ValueMap,
    ) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        true
    }
}
