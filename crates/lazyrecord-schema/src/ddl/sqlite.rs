//! SQLite DDL builder.

use lazyrecord_core::Dialect;

use super::DdlBuilder;
use crate::column::ColumnDef;
use crate::isa::Isa;
use crate::registry::SchemaRegistry;

/// DDL builder for SQLite.
#[derive(Debug, Clone, Copy)]
pub struct SqliteDdlBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SqliteDdlBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }
}

impl DdlBuilder for SqliteDdlBuilder<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    fn column_type(&self, column: &ColumnDef) -> String {
        match column.isa {
            Isa::Str => "text",
            Isa::Int => "integer",
            Isa::Bool => "boolean",
            Isa::Float => "double",
            Isa::Date => "date",
            Isa::DateTime => "timestamp",
        }
        .to_string()
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        Some("AUTOINCREMENT")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_create_table() {
        let registry = SchemaRegistry::new();
        let schema = make_schema(
            "hero",
            "heroes",
            vec![
                make_column("id", Isa::Int).primary(true).auto_increment(true),
                make_column("name", Isa::Str).required(true),
            ],
        );
        let stmts = SqliteDdlBuilder::new(&registry).build(&schema, false).unwrap();

        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0],
            "CREATE TABLE \"heroes\" (\n  \"id\" integer PRIMARY KEY AUTOINCREMENT,\n  \"name\" text NOT NULL\n)"
        );
    }

    #[test]
    fn test_rebuild_drops_first() {
        let registry = SchemaRegistry::new();
        let schema = make_schema("hero", "heroes", vec![make_column("id", Isa::Int)]);
        let stmts = SqliteDdlBuilder::new(&registry).build(&schema, true).unwrap();

        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0], "DROP TABLE IF EXISTS \"heroes\"");
        assert!(stmts[1].starts_with("CREATE TABLE \"heroes\""));
    }

    #[test]
    fn test_explicit_type_wins() {
        let registry = SchemaRegistry::new();
        let builder = SqliteDdlBuilder::new(&registry);
        let schema = make_schema("t", "t", vec![]);
        let column = make_column("code", Isa::Str).sql_type("varchar(12)");
        assert_eq!(
            builder.column_sql(&schema, &column).unwrap(),
            "\"code\" varchar(12)"
        );
    }

    #[test]
    fn test_type_mapping() {
        let registry = SchemaRegistry::new();
        let builder = SqliteDdlBuilder::new(&registry);
        assert_eq!(builder.column_type(&make_column("a", Isa::Str)), "text");
        assert_eq!(builder.column_type(&make_column("a", Isa::Bool)), "boolean");
        assert_eq!(builder.column_type(&make_column("a", Isa::DateTime)), "timestamp");
    }

    #[test]
    fn test_defaults() {
        let registry = SchemaRegistry::new();
        let builder = SqliteDdlBuilder::new(&registry);
        let schema = make_schema("t", "t", vec![]);

        let status = make_column("status", Isa::Str).default("it's new");
        assert_eq!(
            builder.column_sql(&schema, &status).unwrap(),
            "\"status\" text DEFAULT 'it''s new'"
        );

        let created = make_column("created_on", Isa::DateTime).default_raw("CURRENT_TIMESTAMP");
        assert_eq!(
            builder.column_sql(&schema, &created).unwrap(),
            "\"created_on\" timestamp DEFAULT CURRENT_TIMESTAMP"
        );

        let flag = make_column("active", Isa::Bool).default(true);
        assert_eq!(
            builder.column_sql(&schema, &flag).unwrap(),
            "\"active\" boolean DEFAULT 1"
        );

        let computed = make_column("slug", Isa::Str)
            .default_builder(|_, _| Some(lazyrecord_core::Value::from("x")));
        assert_eq!(builder.column_sql(&schema, &computed).unwrap(), "\"slug\" text");
    }

    #[test]
    fn test_null_and_unique() {
        let registry = SchemaRegistry::new();
        let builder = SqliteDdlBuilder::new(&registry);
        let schema = make_schema("t", "t", vec![]);

        let column = make_column("email", Isa::Str).null(true).unique(true);
        assert_eq!(
            builder.column_sql(&schema, &column).unwrap(),
            "\"email\" text NULL UNIQUE"
        );

        let column = make_column("email", Isa::Str).not_null(true).null(true);
        assert_eq!(
            builder.column_sql(&schema, &column).unwrap(),
            "\"email\" text NOT NULL"
        );
    }

    #[test]
    fn test_has_one_references_foreign_table() {
        let registry = library();
        let author = registry.require("author").unwrap();
        let stmts = SqliteDdlBuilder::new(&registry).build(&author, false).unwrap();
        assert!(stmts[0].contains("\"profile_id\" integer REFERENCES \"profiles\""));
    }

    #[test]
    fn test_belongs_to_emits_no_reference() {
        let registry = library();
        let book = registry.require("book").unwrap();
        let stmts = SqliteDdlBuilder::new(&registry).build(&book, false).unwrap();
        assert!(stmts[0].contains("\"author_id\" integer\n"));
        assert!(!stmts[0].contains("REFERENCES"));
    }
}
