//! Core types and traits for LazyRecord Rust.
//!
//! `lazyrecord-core` is the **foundation layer** shared by every other crate in the
//! workspace. It owns no SQL generation and no record logic; it defines the values that
//! flow between those layers and the boundary traits external collaborators implement.
//!
//! # Role In The Architecture
//!
//! - **Data model**: `Value`, `ValueMap` and `Row` carry argument sets, bound parameters
//!   and fetched rows.
//! - **Outcomes**: `Error`, `OperationResult` and `ValidationOutcome` describe what a
//!   lifecycle operation did.
//! - **Boundary contracts**: `Connection`, `Statement` and `ConnectionProvider` are
//!   implemented by drivers; `QueryDriver` describes a dialect.
//! - **Connection routing**: `ConnectionManager` is the stock provider, keyed by data
//!   source id.
//!
//! # Who Uses This Crate
//!
//! - `lazyrecord-query` renders `Value`s into SQL for a `QueryDriver`.
//! - `lazyrecord-schema` transforms `Value`s per column and validates them.
//! - `lazyrecord-model` drives `Connection`s and produces `OperationResult`s.

pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod result;
pub mod row;
pub mod validate;
pub mod value;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::RecordConfig;
pub use connection::{
    Connection, ConnectionManager, ConnectionProvider, Connector, DataSourceConfig, Statement,
};
pub use driver::{Dialect, QueryDriver};
pub use error::{Error, Result, Right};
pub use result::{OperationResult, ResultExtra, ValidationOutcome, Validations};
pub use row::Row;
pub use validate::{EmailValidator, PatternValidator, StructuredValidator, matches_pattern};
pub use value::{Value, ValueMap};
