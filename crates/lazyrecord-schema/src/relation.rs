//! Relationship metadata.
//!
//! Relations are declared on a schema under a [`RelationId`]. Foreign-key relations
//! (`has_one`, `has_many`, `belongs_to`) name a column on each side; a many-to-many
//! relation is two hops: a junction relation on the owning schema, then a relation
//! defined on the junction schema that leads to the target.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a relation within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for RelationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The kind of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsTo,
    ManyToMany,
}

impl RelationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "has_one",
            RelationKind::HasMany => "has_many",
            RelationKind::BelongsTo => "belongs_to",
            RelationKind::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column pairing of a foreign-key relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRelation {
    /// Column on the owning schema.
    pub self_column: String,
    /// Registry name of the related schema.
    pub foreign_schema: String,
    /// Column on the related schema.
    pub foreign_column: String,
}

/// A relation declared on a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationDef {
    HasOne(ForeignKeyRelation),
    HasMany(ForeignKeyRelation),
    BelongsTo(ForeignKeyRelation),
    ManyToMany {
        /// Relation on the owning schema that leads to the junction schema.
        junction: RelationId,
        /// Relation on the junction schema that leads to the target schema.
        target: RelationId,
    },
}

fn foreign_key(self_column: &str, foreign_schema: &str, foreign_column: &str) -> ForeignKeyRelation {
    ForeignKeyRelation {
        self_column: self_column.to_string(),
        foreign_schema: foreign_schema.to_string(),
        foreign_column: foreign_column.to_string(),
    }
}

impl RelationDef {
    pub fn has_one(self_column: &str, foreign_schema: &str, foreign_column: &str) -> Self {
        RelationDef::HasOne(foreign_key(self_column, foreign_schema, foreign_column))
    }

    pub fn has_many(self_column: &str, foreign_schema: &str, foreign_column: &str) -> Self {
        RelationDef::HasMany(foreign_key(self_column, foreign_schema, foreign_column))
    }

    pub fn belongs_to(self_column: &str, foreign_schema: &str, foreign_column: &str) -> Self {
        RelationDef::BelongsTo(foreign_key(self_column, foreign_schema, foreign_column))
    }

    pub fn many_to_many(junction: impl Into<RelationId>, target: impl Into<RelationId>) -> Self {
        RelationDef::ManyToMany {
            junction: junction.into(),
            target: target.into(),
        }
    }

    pub const fn kind(&self) -> RelationKind {
        match self {
            RelationDef::HasOne(_) => RelationKind::HasOne,
            RelationDef::HasMany(_) => RelationKind::HasMany,
            RelationDef::BelongsTo(_) => RelationKind::BelongsTo,
            RelationDef::ManyToMany { .. } => RelationKind::ManyToMany,
        }
    }

    /// Column pairing, for the foreign-key kinds.
    pub fn foreign_key(&self) -> Option<&ForeignKeyRelation> {
        match self {
            RelationDef::HasOne(fk) | RelationDef::HasMany(fk) | RelationDef::BelongsTo(fk) => {
                Some(fk)
            }
            RelationDef::ManyToMany { .. } => None,
        }
    }
}
