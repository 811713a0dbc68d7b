//! Dynamic SQL query builder for LazyRecord Rust.
//!
//! Tables and columns are plain strings here: schemas are resolved at runtime, so the
//! builder works on names rather than model types. A [`Query`] renders to
//! `(sql, vars)` for a [`QueryDriver`](lazyrecord_core::QueryDriver); values are bound
//! positionally, except raw SQL values which are inlined.
//!
//! ```
//! use lazyrecord_core::{Dialect, QueryDriver, Value};
//! use lazyrecord_query::{Condition, Query};
//!
//! let (sql, vars) = Query::select("books")
//!     .filter(Condition::eq("author_id", 7))
//!     .limit(1)
//!     .build(&QueryDriver::new(Dialect::Sqlite));
//!
//! assert_eq!(sql, "SELECT * FROM books WHERE author_id = ?1 LIMIT 1");
//! assert_eq!(vars, vec![Value::Int(7)]);
//! ```

pub mod builder;
pub mod clause;

pub use builder::{Join, Query, QueryKind};
pub use clause::{Condition, Operand, Where};
