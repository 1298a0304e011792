//! Core traits for entities and models.

use crate::executor::{LifeError, Row};
use crate::model::ModelTrait;
use crate::query::select::SelectQuery;
use sea_query::{Expr, ExprTrait, Iden, Value};

/// A static SQL identifier (table or column name)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(pub &'static str);

impl Iden for Ident {
    fn unquoted(&self) -> &str {
        self.0
    }
}

/// Maps an entity to its table
pub trait LifeEntityName {
    fn table_name(&self) -> &'static str;
}

/// Decodes a model from a result row
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, LifeError>;
}

/// Entity-level trait
///
/// Following SeaORM's split, the entity is a zero-sized marker type naming a
/// table, and `Model` is the row type read from it.
pub trait LifeModelTrait: LifeEntityName + Default + 'static {
    type Model: FromRow + ModelTrait<Entity = Self>;

    /// Primary key column name
    fn primary_key() -> &'static str {
        "id"
    }

    fn table() -> &'static str {
        Self::default().table_name()
    }

    /// Table-qualified column expression, e.g. `"students"."name"`
    fn column(column: &'static str) -> Expr {
        Expr::col((Ident(Self::table()), Ident(column)))
    }

    /// Select every row of this entity
    fn find() -> SelectQuery<Self> {
        SelectQuery::new()
    }

    /// Select the row whose primary key equals `id`
    fn find_by_id(id: impl Into<Value>) -> SelectQuery<Self> {
        SelectQuery::new().filter(Self::column(Self::primary_key()).eq(id.into()))
    }
}
