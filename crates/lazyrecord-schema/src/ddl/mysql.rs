//! MySQL DDL builder.

use lazyrecord_core::Dialect;

use super::DdlBuilder;
use crate::column::ColumnDef;
use crate::isa::Isa;
use crate::registry::SchemaRegistry;

/// DDL builder for MySQL and MariaDB.
#[derive(Debug, Clone, Copy)]
pub struct MysqlDdlBuilder<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> MysqlDdlBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }
}

impl DdlBuilder for MysqlDdlBuilder<'_> {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn registry(&self) -> &SchemaRegistry {
        self.registry
    }

    fn column_type(&self, column: &ColumnDef) -> String {
        match column.isa {
            Isa::Str => "text",
            Isa::Int => "int",
            Isa::Bool => "tinyint(1)",
            Isa::Float => "double",
            Isa::Date => "date",
            Isa::DateTime => "datetime",
        }
        .to_string()
    }

    fn auto_increment_clause(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_create_table_uses_backticks() {
        let registry = SchemaRegistry::new();
        let schema = make_schema(
            "hero",
            "heroes",
            vec![
                make_column("id", Isa::Int).primary(true).auto_increment(true),
                make_column("active", Isa::Bool).default(true),
            ],
        );
        let stmts = MysqlDdlBuilder::new(&registry).build(&schema, true).unwrap();
        assert_eq!(stmts[0], "DROP TABLE IF EXISTS `heroes`");
        assert_eq!(
            stmts[1],
            "CREATE TABLE `heroes` (\n  `id` int PRIMARY KEY AUTO_INCREMENT,\n  `active` tinyint(1) DEFAULT 1\n)"
        );
    }

    #[test]
    fn test_has_one_reference_quoting() {
        let registry = library();
        let author = registry.require("author").unwrap();
        let stmts = MysqlDdlBuilder::new(&registry).build(&author, false).unwrap();
        assert!(stmts[0].contains("`profile_id` int REFERENCES `profiles`"));
    }
}
