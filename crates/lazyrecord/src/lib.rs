//! LazyRecord Rust: schema-driven active records.
//!
//! `lazyrecord` is the **facade crate**. It re-exports the public surface of the
//! workspace so applications depend on one crate and import one prelude.
//!
//! # Role In The Architecture
//!
//! - **Foundation** (`lazyrecord-core`): values, rows, errors, operation results and
//!   the connection boundary.
//! - **SQL** (`lazyrecord-query`): dialect-aware SELECT/INSERT/UPDATE/DELETE builders.
//! - **Metadata** (`lazyrecord-schema`): columns, relations, the schema registry,
//!   validators and DDL builders.
//! - **Behavior** (`lazyrecord-model`): the record lifecycle engine, the column
//!   pipeline and the relationship resolver.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use lazyrecord::prelude::*;
//! use lazyrecord_core::testing::{MockConnection, MockProvider};
//!
//! let author = Schema::builder("author")
//!     .table("authors")
//!     .column(ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true))
//!     .column(ColumnDef::new("name").required(true))
//!     .relation("books", RelationDef::has_many("id", "book", "author_id"))
//!     .build()
//!     .unwrap();
//! let book = Schema::builder("book")
//!     .table("books")
//!     .column(ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true))
//!     .column(ColumnDef::new("author_id").isa(Isa::Int))
//!     .column(ColumnDef::new("title").required(true))
//!     .build()
//!     .unwrap();
//! let registry = SchemaRegistry::from_schemas([author, book]).unwrap();
//!
//! let conn = Arc::new(MockConnection::new());
//! let db = Database::builder(registry, Arc::new(MockProvider::sqlite(conn)))
//!     .config(RecordConfig::default().auto_reload(false))
//!     .build();
//!
//! let mut author = db.record("author").unwrap();
//! assert!(author.create(value_map! { "name" => "Le Guin" }).is_success());
//!
//! let books = author.relation_mut("books").unwrap().as_collection_mut().unwrap();
//! let (book, result) = books.create(value_map! { "title" => "The Dispossessed" }).unwrap();
//! assert!(result.is_success());
//! assert_eq!(book.get("author_id"), author.get("id"));
//! ```

pub use lazyrecord_core::{
    Connection, ConnectionManager, ConnectionProvider, Connector, DataSourceConfig, Dialect,
    Error, OperationResult, QueryDriver, RecordConfig, Result, ResultExtra, Right, Row,
    Statement, ValidationOutcome, Validations, Value, ValueMap, value_map,
};
pub use lazyrecord_model::{
    Collection, CreateOptions, CurrentUser, Database, DatabaseBuilder, DefaultHooks, LoadArgs,
    ModelHooks, Record, Relation, UpdateOptions,
};
pub use lazyrecord_query::{Condition, Join, Operand, Query, QueryKind, Where};
pub use lazyrecord_schema::{
    ColumnDef, ColumnDefault, DdlBuilder, ForeignKeyRelation, Isa, RecordView, RelationDef,
    RelationId, RelationKind, Schema, SchemaBuilder, SchemaLoader, SchemaRegistry, ValidValues,
    Validator, ValidatorRegistry, ddl_builder_for,
};

/// Scripted in-memory connections for tests.
#[cfg(feature = "testing")]
pub use lazyrecord_core::testing;

/// The types most applications need.
pub mod prelude {
    pub use crate::{
        Collection, ColumnDef, Condition, ConnectionManager, ConnectionProvider, CreateOptions,
        Database, Dialect, Error, Isa, LoadArgs, ModelHooks, OperationResult, QueryDriver, Record,
        RecordConfig, Relation, RelationDef, Result, Right, Row, Schema, SchemaRegistry,
        UpdateOptions, Value, ValueMap, value_map,
    };
}
