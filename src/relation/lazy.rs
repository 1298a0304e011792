//! Dynamic (lazy-query) loading of related entities.
//!
//! A relationship direction declared with [`LoadingMode::Dynamic`] does not
//! return its related rows. Reading it returns a [`DynamicQuery`]: the
//! unexecuted `SELECT` for the owner's related rows, which can be narrowed,
//! ordered, limited, counted and executed any number of times.
//!
//! # Example
//!
//! ```no_run
//! use roster::school::{self, Scenario};
//! use roster::SqliteExecutor;
//!
//! # fn main() -> Result<(), roster::LifeError> {
//! let executor = SqliteExecutor::in_memory()?;
//! let rel = Scenario::LazyDynamicOneToMany.relationship()?;
//! school::create_schema(&executor, rel.cardinality())?;
//! let roster = school::seed(&executor, &rel)?;
//!
//! let students = rel.forward(roster.class("English")?, &executor)?.into_query()?;
//! println!("{}", students.to_sql());
//! let tom = students.filter_by("name", "Tom").first(&executor)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Strategy
//!
//! 1. Reading the relationship builds the query but does not execute it
//! 2. Narrowing methods return a new handle, the receiver is left unchanged
//! 3. `all()`, `first()` and `count()` re-issue the query on every call

use crate::executor::{LifeError, LifeExecutor};
use crate::query::{LifeModelTrait, SelectQuery};
use crate::relation::def::{LoadingMode, RelationDef};
use crate::session::{RowRef, Session};
use sea_query::{ExprTrait, IntoCondition, Order, Value};
use std::fmt;

/// An unexecuted, composable query over the rows related to one owner
///
/// # Type Parameters
///
/// * `E` - The related entity type (e.g. `StudentEntity` for `Class.students`)
pub struct DynamicQuery<E>
where
    E: LifeModelTrait,
{
    query: SelectQuery<E>,
    rel: RelationDef,
    /// Primary key of the owning row
    owner: Value,
}

impl<E> DynamicQuery<E>
where
    E: LifeModelTrait,
{
    /// Build the handle for the rows `rel` relates to `owner`
    pub(crate) fn new(rel: RelationDef, owner: Value) -> Result<Self, LifeError> {
        if rel.loading != LoadingMode::Dynamic || !rel.rel_type.is_many() {
            return Err(LifeError::Configuration(format!(
                "{} -> {} is not a dynamic collection",
                rel.from_tbl, rel.to_tbl
            )));
        }
        let query = rel.select_related::<E>(owner.clone())?;
        Ok(Self { query, rel, owner })
    }

    /// The relation this handle reads
    pub fn relation(&self) -> &RelationDef {
        &self.rel
    }

    /// Primary key value of the owning row
    pub fn owner(&self) -> &Value {
        &self.owner
    }

    /// A narrower handle with an extra predicate
    pub fn filter<C: IntoCondition>(&self, condition: C) -> Self {
        self.with_query(self.query.clone().filter(condition))
    }

    /// Equality shorthand for [`DynamicQuery::filter`]
    ///
    /// ```ignore
    /// students.filter_by("id", 3).first(&executor)?;
    /// ```
    pub fn filter_by(&self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(E::column(column).eq(value.into()))
    }

    pub fn order_by(&self, column: &'static str, order: Order) -> Self {
        self.with_query(self.query.clone().order_by(column, order))
    }

    pub fn limit(&self, limit: u64) -> Self {
        self.with_query(self.query.clone().limit(limit))
    }

    /// Execute and return every related row in query order
    pub fn all<Ex>(&self, executor: &Ex) -> Result<Vec<E::Model>, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        self.query.all(executor)
    }

    /// Execute with `LIMIT 1`
    pub fn first<Ex>(&self, executor: &Ex) -> Result<Option<E::Model>, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        self.query.one(executor)
    }

    /// Count the related rows matching the handle's predicates
    pub fn count<Ex: LifeExecutor + ?Sized>(&self, executor: &Ex) -> Result<u64, LifeError> {
        self.query.count(executor)
    }

    /// Stage the edge between the owner and `related`
    ///
    /// Nothing is written until the session is committed.
    pub fn append(&self, session: &mut Session, related: impl Into<RowRef<E>>) {
        let related: RowRef<E> = related.into();
        session.stage_edge(self.rel, true, self.owner.clone().into(), related.into_key());
    }

    /// Stage removal of the edge between the owner and `related`
    ///
    /// Neither row is deleted.
    pub fn remove(&self, session: &mut Session, related: impl Into<RowRef<E>>) {
        let related: RowRef<E> = related.into();
        session.stage_edge(self.rel, false, self.owner.clone().into(), related.into_key());
    }

    /// The SQL the handle would run, values inlined
    pub fn to_sql(&self) -> String {
        self.query.to_sql()
    }

    /// The underlying select
    pub fn as_select(&self) -> &SelectQuery<E> {
        &self.query
    }

    fn with_query(&self, query: SelectQuery<E>) -> Self {
        Self {
            query,
            rel: self.rel,
            owner: self.owner.clone(),
        }
    }
}

impl<E: LifeModelTrait> Clone for DynamicQuery<E> {
    fn clone(&self) -> Self {
        self.with_query(self.query.clone())
    }
}

impl<E: LifeModelTrait> fmt::Debug for DynamicQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicQuery")
            .field("relation", &format_args!("{} -> {}", self.rel.from_tbl, self.rel.to_tbl))
            .field("owner", &self.owner)
            .field("sql", &self.to_sql())
            .finish()
    }
}

impl<E: LifeModelTrait> fmt::Display for DynamicQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
