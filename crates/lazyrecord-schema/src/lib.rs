//! Schema metadata for LazyRecord Rust.
//!
//! `lazyrecord-schema` is the **declaration layer**. It describes tables and their
//! columns, owns the per-column value rules and turns schemas into DDL.
//!
//! # Role In The Architecture
//!
//! - **Schema registry**: `Schema` values are built once, registered by name in a
//!   `SchemaRegistry` and shared read-only through `Arc`.
//! - **Column rules**: `ColumnDef` carries defaults, type casting, canonicalizers,
//!   deflate/inflate and validation. The record layer strings them together.
//! - **Relationships**: `RelationDef` names the columns joining two schemas.
//! - **DDL**: `DdlBuilder` implementations render `CREATE TABLE` per dialect.
//!
//! # Example
//!
//! ```
//! use lazyrecord_core::Dialect;
//! use lazyrecord_schema::{ColumnDef, Isa, Schema, SchemaRegistry, ddl_builder_for};
//!
//! let schema = Schema::builder("book")
//!     .table("books")
//!     .column(ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true))
//!     .column(ColumnDef::new("title").required(true))
//!     .build()
//!     .unwrap();
//! let registry = SchemaRegistry::from_schemas([schema]).unwrap();
//! let book = registry.require("book").unwrap();
//!
//! let ddl = ddl_builder_for(Dialect::Sqlite, &registry).build(&book, false).unwrap();
//! assert!(ddl[0].starts_with("CREATE TABLE \"books\""));
//! ```

pub mod column;
pub mod ddl;
pub mod isa;
pub mod registry;
pub mod relation;
pub mod schema;
pub mod validator;

pub use column::{ColumnDef, ColumnDefault, Transform, ValidValues};
pub use ddl::{DdlBuilder, MysqlDdlBuilder, PostgresDdlBuilder, SqliteDdlBuilder, ddl_builder_for};
pub use isa::Isa;
pub use registry::{SchemaLoader, SchemaRegistry};
pub use relation::{ForeignKeyRelation, RelationDef, RelationId, RelationKind};
pub use schema::{DEFAULT_SOURCE_ID, RecordView, Schema, SchemaBuilder};
pub use validator::{
    ColumnValidator, DEFAULT_VALIDATION_MESSAGE, MessageValidator, PredicateValidator,
    StructuredValidatorAdapter, ValidationContext, Validator, ValidatorRegistry,
};
