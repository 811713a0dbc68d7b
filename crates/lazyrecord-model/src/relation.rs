//! Relationship resolution.
//!
//! Resolving a relation turns its metadata into either a related record (to-one
//! relations) or a lazy [`Collection`] (to-many relations). Results are memoized on
//! the owning record by [`Record::relation`].

use std::sync::Arc;

use lazyrecord_core::{Error, Result, Value};
use lazyrecord_query::{Condition, Join};
use lazyrecord_schema::{ForeignKeyRelation, RelationDef, RelationId, Schema};

use crate::collection::{Collection, JunctionLink};
use crate::database::Database;
use crate::record::{Record, single};

/// A resolved relation.
#[derive(Debug)]
pub enum Relation {
    /// A to-one relation without a related row, or any relation whose owner has no
    /// key value to join on.
    None,
    One(Box<Record>),
    Many(Collection),
}

impl Relation {
    pub fn is_none(&self) -> bool {
        matches!(self, Relation::None)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Relation::One(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Relation::Many(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Relation::Many(collection) => Some(collection),
            _ => None,
        }
    }
}

fn foreign_schema(db: &Database, id: &str, fk: &ForeignKeyRelation) -> Result<Arc<Schema>> {
    db.registry().get(&fk.foreign_schema).ok_or_else(|| {
        Error::relationship(id, format!("schema {} is not registered", fk.foreign_schema))
    })
}

pub(crate) fn resolve(owner: &Record, id: &str) -> Result<Relation> {
    let schema = owner.schema();
    let def = schema.get_relation(id).ok_or_else(|| {
        Error::relationship(id, format!("relation is not defined on {}", schema.name()))
    })?;
    tracing::debug!(
        schema = schema.name(),
        relation = id,
        kind = %def.kind(),
        "Resolving relation"
    );

    match def {
        RelationDef::HasOne(fk) | RelationDef::BelongsTo(fk) => resolve_one(owner, id, fk),
        RelationDef::HasMany(fk) => resolve_many(owner, id, fk),
        RelationDef::ManyToMany { junction, target } => {
            resolve_many_to_many(owner, id, junction, target)
        }
    }
}

fn resolve_one(owner: &Record, id: &str, fk: &ForeignKeyRelation) -> Result<Relation> {
    let Some(value) = owner_key(owner, &fk.self_column) else {
        return Ok(Relation::None);
    };

    let db = owner.database();
    let mut related = Record::new(db.clone(), foreign_schema(db, id, fk)?);
    if let Some(user) = owner.current_user() {
        related.set_current_user(Arc::clone(user));
    }
    if let Some(source) = owner.source_override() {
        related.using(source);
    }
    let result = related.load(single(&fk.foreign_column, value));
    if result.is_success() {
        Ok(Relation::One(Box::new(related)))
    } else {
        Ok(Relation::None)
    }
}

/// The owner's value of `column`, when it holds one.
fn owner_key(owner: &Record, column: &str) -> Option<Value> {
    owner.get_value(column).filter(|v| !v.is_null()).cloned()
}

/// A collection that reads and writes where the owner does, as the owner's user.
fn owned_collection(owner: &Record, schema: Arc<Schema>) -> Collection {
    Collection::new(owner.database().clone(), schema)
        .source(owner.source_override().map(str::to_string))
        .user(owner.current_user().cloned())
}

fn resolve_many(owner: &Record, id: &str, fk: &ForeignKeyRelation) -> Result<Relation> {
    let db = owner.database();
    let schema = foreign_schema(db, id, fk)?;
    let Some(value) = owner_key(owner, &fk.self_column) else {
        return Ok(Relation::None);
    };
    let collection = owned_collection(owner, schema)
        .filter(Condition::eq(format!("m.{}", fk.foreign_column), value.clone()))
        .preset(single(&fk.foreign_column, value));
    Ok(Relation::Many(collection))
}

/// Two hops: `junction` leads from the owner to the junction schema, `target` is
/// declared on the junction schema and leads to the target schema.
fn resolve_many_to_many(
    owner: &Record,
    id: &str,
    junction: &RelationId,
    target: &RelationId,
) -> Result<Relation> {
    let db = owner.database();
    let middle = owner
        .schema()
        .get_relation(junction.as_str())
        .ok_or_else(|| {
            Error::relationship(
                junction.as_str(),
                format!("junction relation of {id} is not defined"),
            )
        })?
        .foreign_key()
        .ok_or_else(|| {
            Error::relationship(junction.as_str(), "junction relation must be a foreign key relation")
        })?;
    let junction_schema = foreign_schema(db, junction.as_str(), middle)?;

    let second = junction_schema
        .get_relation(target.as_str())
        .ok_or_else(|| {
            Error::relationship(
                target.as_str(),
                format!("relation is not defined on {}", junction_schema.name()),
            )
        })?
        .foreign_key()
        .ok_or_else(|| {
            Error::relationship(target.as_str(), "target relation must be a foreign key relation")
        })?;
    let target_schema = foreign_schema(db, target.as_str(), second)?;

    let Some(owner_value) = owner_key(owner, &middle.self_column) else {
        return Ok(Relation::None);
    };

    let join = Join::new(junction_schema.table()).alias("b").on(Condition::eq_column(
        format!("b.{}", second.self_column),
        format!("m.{}", second.foreign_column),
    ));
    let link = JunctionLink {
        relation: junction.clone(),
        junction_schema: Arc::clone(&junction_schema),
        link_column: second.self_column.clone(),
        target_column: second.foreign_column.clone(),
        owner_column: middle.foreign_column.clone(),
        owner_value: owner_value.clone(),
    };

    let collection = owned_collection(owner, target_schema)
        .join(join)
        .filter(Condition::eq(
            format!("b.{}", middle.foreign_column),
            owner_value,
        ))
        .link(link);
    Ok(Relation::Many(collection))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazyrecord_core::testing::{MockConnection, MockProvider};
    use lazyrecord_core::{Dialect, QueryDriver, Row, value_map};
    use lazyrecord_schema::{ColumnDef, Isa, SchemaRegistry};

    fn int_pk() -> ColumnDef {
        ColumnDef::new("id").isa(Isa::Int).primary(true).auto_increment(true)
    }

    fn registry() -> SchemaRegistry {
        let author = Schema::builder("author")
            .table("authors")
            .column(int_pk())
            .column(ColumnDef::new("name"))
            .relation("books", RelationDef::has_many("id", "book", "author_id"))
            .build()
            .unwrap();
        let book = Schema::builder("book")
            .table("books")
            .column(int_pk())
            .column(ColumnDef::new("author_id").isa(Isa::Int))
            .column(ColumnDef::new("title"))
            .relation("author", RelationDef::belongs_to("author_id", "author", "id"))
            .relation("book_tags", RelationDef::has_many("id", "book_tag", "book_id"))
            .relation("tags", RelationDef::many_to_many("book_tags", "tag"))
            .relation("labels", RelationDef::many_to_many("book_labels", "tag"))
            .build()
            .unwrap();
        let book_tag = Schema::builder("book_tag")
            .table("book_tags")
            .column(int_pk())
            .column(ColumnDef::new("book_id").isa(Isa::Int))
            .column(ColumnDef::new("tag_id").isa(Isa::Int))
            .relation("tag", RelationDef::belongs_to("tag_id", "tag", "id"))
            .build()
            .unwrap();
        let tag = Schema::builder("tag")
            .table("tags")
            .column(int_pk())
            .column(ColumnDef::new("name"))
            .build()
            .unwrap();
        SchemaRegistry::from_schemas([author, book, book_tag, tag]).unwrap()
    }

    fn setup() -> (Database, Arc<MockConnection>) {
        let conn = Arc::new(MockConnection::new());
        let provider = Arc::new(MockProvider::sqlite(Arc::clone(&conn)));
        (Database::new(registry(), provider), conn)
    }

    #[test]
    fn test_belongs_to_without_value_is_none() {
        let (db, conn) = setup();
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 1 }).unwrap();
        assert!(book.relation("author").unwrap().is_none());
        assert_eq!(conn.execute_count(), 0);
    }

    #[test]
    fn test_belongs_to_loads_and_memoizes() {
        let (db, conn) = setup();
        conn.push_row(Row::from_pairs([
            ("id", Value::Int(7)),
            ("name", Value::from("Le Guin")),
        ]));
        let mut book =
            Record::from_data(&db, "book", value_map! { "id" => 1, "author_id" => 7 }).unwrap();

        let author = book.relation("author").unwrap().as_record().unwrap();
        assert_eq!(author.get("name"), Value::from("Le Guin"));
        assert!(book.relation("author").unwrap().as_record().is_some());
        assert_eq!(
            conn.statements(),
            vec!["SELECT * FROM authors WHERE id = ?1 LIMIT 1"]
        );

        book.flush_cache();
        assert!(book.relation("author").unwrap().is_none());
        assert_eq!(conn.execute_count(), 2);
    }

    #[test]
    fn test_has_many_filters_by_owner_key() {
        let (db, conn) = setup();
        let mut author = Record::from_data(&db, "author", value_map! { "id" => 7 }).unwrap();
        let books = author.relation("books").unwrap().as_collection().unwrap();
        assert_eq!(books.preset_vars(), &value_map! { "author_id" => 7 });
        assert_eq!(conn.execute_count(), 0);

        let (sql, vars) = books.query().build(&QueryDriver::new(Dialect::Sqlite));
        assert_eq!(sql, "SELECT m.* FROM books m WHERE m.author_id = ?1");
        assert_eq!(vars, vec![Value::Int(7)]);
    }

    #[test]
    fn test_to_many_without_owner_key_is_none() {
        let (db, conn) = setup();
        let mut author = db.record("author").unwrap();
        assert!(author.relation("books").unwrap().is_none());

        let mut book = Record::from_data(&db, "book", value_map! { "id" => Value::Null }).unwrap();
        assert!(book.relation("tags").unwrap().is_none());
        assert!(book.relation("labels").is_err());
        assert_eq!(conn.execute_count(), 0);
    }

    #[test]
    fn test_many_to_many_joins_junction() {
        let (db, _conn) = setup();
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        let tags = book.relation("tags").unwrap().as_collection().unwrap();
        let (sql, vars) = tags.query().build(&QueryDriver::new(Dialect::Sqlite));
        assert_eq!(
            sql,
            "SELECT m.* FROM tags m JOIN book_tags b ON (b.tag_id = m.id) WHERE b.book_id = ?1"
        );
        assert_eq!(vars, vec![Value::Int(3)]);
    }

    #[test]
    fn test_many_to_many_missing_junction_names_id() {
        let (db, _conn) = setup();
        let mut book = Record::from_data(&db, "book", value_map! { "id" => 3 }).unwrap();
        let err = book.relation("labels").unwrap_err();
        assert!(matches!(
            err,
            Error::RelationshipConfiguration { ref relation, .. } if relation == "book_labels"
        ));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_relation() {
        let (db, _conn) = setup();
        let mut book = db.record("book").unwrap();
        assert!(matches!(
            book.relation("publisher"),
            Err(Error::RelationshipConfiguration { ref relation, .. }) if relation == "publisher"
        ));
    }
}
