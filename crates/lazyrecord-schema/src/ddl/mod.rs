//! DDL generation.
//!
//! A [`DdlBuilder`] turns a [`Schema`] into the statements that create its table.
//! Every dialect shares the column-fragment layout implemented by the provided
//! methods and supplies its own type mapping and auto-increment syntax:
//!
//! ```text
//! <name> <type> [NOT NULL|NULL] [DEFAULT <literal>] [PRIMARY KEY] [<auto increment>] [UNIQUE] [REFERENCES <table>]
//! ```

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MysqlDdlBuilder;
pub use postgres::PostgresDdlBuilder;
pub use sqlite::SqliteDdlBuilder;

use lazyrecord_core::{Dialect, Error, Result};

use crate::column::{ColumnDef, ColumnDefault};
use crate::registry::SchemaRegistry;
use crate::relation::RelationDef;
use crate::schema::Schema;

/// Builds `CREATE TABLE` statements for one SQL dialect.
pub trait DdlBuilder {
    fn dialect(&self) -> Dialect;

    /// Registry used to resolve the tables that relations point at.
    fn registry(&self) -> &SchemaRegistry;

    /// SQL type for a column without an explicit type.
    fn column_type(&self, column: &ColumnDef) -> String;

    /// Keyword appended to auto-increment primary keys, if the dialect has one.
    fn auto_increment_clause(&self) -> Option<&'static str>;

    fn quote_identifier(&self, name: &str) -> String {
        self.dialect().quote_identifier(name)
    }

    /// The type written into the column definition. An explicit type wins.
    fn resolve_type(&self, column: &ColumnDef) -> String {
        column
            .sql_type
            .clone()
            .unwrap_or_else(|| self.column_type(column))
    }

    /// Render the definition of one column.
    fn column_sql(&self, schema: &Schema, column: &ColumnDef) -> Result<String> {
        let mut sql = self.quote_identifier(&column.name);
        sql.push(' ');
        sql.push_str(&self.resolve_type(column));

        if column.required || column.not_null {
            sql.push_str(" NOT NULL");
        } else if column.null {
            sql.push_str(" NULL");
        }

        if let Some(ColumnDefault::Value(value)) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&self.dialect().quote_literal(value));
        }

        if column.primary {
            sql.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            if let Some(keyword) = self.auto_increment_clause() {
                sql.push(' ');
                sql.push_str(keyword);
            }
        }
        if column.unique {
            sql.push_str(" UNIQUE");
        }

        for (id, relation) in schema.relations() {
            match relation {
                RelationDef::HasOne(fk) if fk.self_column == column.name => {
                    let foreign = self.registry().get(&fk.foreign_schema).ok_or_else(|| {
                        Error::relationship(
                            id.as_str(),
                            format!("schema {} is not registered", fk.foreign_schema),
                        )
                    })?;
                    sql.push_str(" REFERENCES ");
                    sql.push_str(&self.quote_identifier(foreign.table()));
                }
                // Resolved but no clause is emitted for belongs_to.
                RelationDef::BelongsTo(fk) if fk.self_column == column.name => {
                    if !self.registry().contains(&fk.foreign_schema) {
                        return Err(Error::relationship(
                            id.as_str(),
                            format!("schema {} is not registered", fk.foreign_schema),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(sql)
    }

    /// Statements creating the schema's table, preceded by a drop when `rebuild`.
    fn build(&self, schema: &Schema, rebuild: bool) -> Result<Vec<String>> {
        tracing::debug!(
            dialect = self.dialect().as_str(),
            schema = schema.name(),
            table = schema.table(),
            rebuild,
            "Generating DDL"
        );

        let table = self.quote_identifier(schema.table());
        let mut statements = Vec::with_capacity(2);
        if rebuild {
            statements.push(format!("DROP TABLE IF EXISTS {table}"));
        }

        let columns = schema
            .get_columns(false)
            .into_iter()
            .map(|column| self.column_sql(schema, column).map(|sql| format!("  {sql}")))
            .collect::<Result<Vec<_>>>()?;
        statements.push(format!("CREATE TABLE {table} (\n{}\n)", columns.join(",\n")));

        for stmt in &statements {
            tracing::trace!(sql = %stmt, "DDL statement");
        }
        Ok(statements)
    }
}

/// Pick the builder for a dialect.
pub fn ddl_builder_for(dialect: Dialect, registry: &SchemaRegistry) -> Box<dyn DdlBuilder + '_> {
    match dialect {
        Dialect::Sqlite => Box::new(SqliteDdlBuilder::new(registry)),
        Dialect::Postgres => Box::new(PostgresDdlBuilder::new(registry)),
        Dialect::Mysql => Box::new(MysqlDdlBuilder::new(registry)),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::isa::Isa;

    #[test]
    fn test_builder_selection() {
        let registry = SchemaRegistry::new();
        for dialect in [Dialect::Sqlite, Dialect::Postgres, Dialect::Mysql] {
            assert_eq!(ddl_builder_for(dialect, &registry).dialect(), dialect);
        }
    }

    #[test]
    fn test_virtual_columns_excluded() {
        let registry = SchemaRegistry::new();
        let schema = make_schema(
            "t",
            "t",
            vec![
                make_column("a", Isa::Str),
                make_column("computed", Isa::Str).is_virtual(true),
            ],
        );
        let stmts = SqliteDdlBuilder::new(&registry).build(&schema, false).unwrap();
        assert!(!stmts[0].contains("computed"));
    }

    #[test]
    fn test_missing_foreign_schema_is_error() {
        let registry = SchemaRegistry::new();
        let schema = Schema::builder("book")
            .column(make_column("author_id", Isa::Int))
            .relation("author", RelationDef::belongs_to("author_id", "author", "id"))
            .build()
            .unwrap();
        let err = SqliteDdlBuilder::new(&registry)
            .build(&schema, false)
            .unwrap_err();
        assert!(matches!(err, Error::RelationshipConfiguration { .. }));
    }
}
