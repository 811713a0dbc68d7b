//! Record lifecycle engine for LazyRecord Rust.
//!
//! `lazyrecord-model` is the **behavior layer**. It turns schema metadata into records
//! that create, load, update and delete themselves, and resolves the relations between
//! them.
//!
//! # Role In The Architecture
//!
//! - **Context**: `Database` bundles the schema registry, the connection provider,
//!   validators, per-schema hooks and record defaults. Nothing is global.
//! - **Lifecycle**: `Record` runs the column pipeline, checks permissions through
//!   `ModelHooks`, issues one statement per operation and reports an
//!   `OperationResult`.
//! - **Relationships**: `Record::relation` resolves to-one relations into records and
//!   to-many relations into lazy `Collection`s, memoized per record.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lazyrecord_core::testing::{MockConnection, MockProvider};
//! use lazyrecord_core::value_map;
//! use lazyrecord_model::Database;
//! use lazyrecord_schema::{ColumnDef, Isa, Schema, SchemaRegistry};
//!
//! let book = Schema::builder("book")
//!     .table("books")
//!     .column(ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true))
//!     .column(ColumnDef::new("title").required(true))
//!     .build()
//!     .unwrap();
//! let registry = SchemaRegistry::from_schemas([book]).unwrap();
//! let conn = Arc::new(MockConnection::new());
//! let db = Database::new(registry, Arc::new(MockProvider::sqlite(conn)));
//!
//! let mut record = db.record("book").unwrap();
//! assert_eq!(record.create(value_map! {}).message(), "Empty arguments");
//! assert!(record.create(value_map! { "title" => "Dune" }).is_success());
//! ```

pub mod collection;
pub mod database;
pub mod hooks;
mod pipeline;
pub mod record;
pub mod relation;

pub use collection::Collection;
pub use database::{Database, DatabaseBuilder};
pub use hooks::{CurrentUser, DefaultHooks, ModelHooks};
pub use record::{CreateOptions, LoadArgs, Record, UpdateOptions};
pub use relation::Relation;
