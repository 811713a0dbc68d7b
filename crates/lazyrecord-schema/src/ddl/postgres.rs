//! PostgreSQL DDL builder.
//!
//! Auto-increment columns become `serial` (or `bigserial` for an explicit `bigint`)
//! instead of carrying a keyword.

use lazyrecord_core::Dialect;

use super::DdlBuilder;
use crate::column::ColumnDef;
use crate::isa::Isa;
use crate::registry::SchemaRegistry;

/// DDL builder for PostgreSQL.
#[derive(Debug, Clone, Copy)]
pub struct PostgresDdlBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> PostgresDdlBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }
}

impl DdlBuilder for PostgresDdlBuilder<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    fn column_type(&self, column: &ColumnDef) -> String {
        if column.auto_increment && column.isa == Isa::Int {
            return "serial".to_string();
        }
        match column.isa {
            Isa::Str => "text",
            Isa::Int => "integer",
            Isa::Bool => "boolean",
            Isa::Float => "double precision",
            Isa::Date => "date",
            Isa::DateTime => "timestamp",
        }
        .to_string()
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        None
    }

    fn resolve_type(&self, column: &ColumnDef) -> String {
        match column.sql_type.as_deref() {
            Some(t) if column.auto_increment && t.eq_ignore_ascii_case("bigint") => {
                "bigserial".to_string()
            }
            Some(t) => t.to_string(),
            None => self.column_type(column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_serial_primary_key() {
        let registry = SchemaRegistry::new();
        let schema = make_schema(
            "hero",
            "heroes",
            vec![
                make_column("id", Isa::Int).primary(true).auto_increment(true),
                make_column("score", Isa::Float),
            ],
        );
        let stmts = PostgresDdlBuilder::new(&registry).build(&schema, false).unwrap();
        assert_eq!(
            stmts[0],
            "CREATE TABLE \"heroes\" (\n  \"id\" serial PRIMARY KEY,\n  \"score\" double precision\n)"
        );
    }

    #[test]
    fn test_bigserial() {
        let registry = SchemaRegistry::new();
        let builder = PostgresDdlBuilder::new(&registry);
        let schema = make_schema("t", "t", vec![]);
        let column = make_column("id", Isa::Int)
            .sql_type("bigint")
            .primary(true)
            .auto_increment(true);
        assert_eq!(
            builder.column_sql(&schema, &column).unwrap(),
            "\"id\" bigserial PRIMARY KEY"
        );
    }

    #[test]
    fn test_boolean_default_literal() {
        let registry = SchemaRegistry::new();
        let builder = PostgresDdlBuilder::new(&registry);
        let schema = make_schema("t", "t", vec![]);
        let column = make_column("active", Isa::Bool).default(false);
        assert_eq!(
            builder.column_sql(&schema, &column).unwrap(),
            "\"active\" boolean DEFAULT FALSE"
        );
    }
}
