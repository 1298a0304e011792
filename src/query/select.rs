//! Select query builder for LifeModel.
//!
//! This module provides `SelectQuery` for building type-safe queries. Query
//! building methods (filter, order_by, limit, ...) are defined here, while
//! execution methods are in the execution module.

use crate::executor::LifeError;
use crate::query::traits::{Ident, LifeModelTrait};
use crate::query::value_conversion::convert_values;
use rusqlite::types::Value as SqlValue;
use sea_query::{Asterisk, Condition, IntoCondition, Order, SelectStatement, SqliteQueryBuilder};
use std::fmt;
use std::marker::PhantomData;

/// Query builder for selecting records of entity `E`
///
/// Every builder method consumes and returns the query, so a query held by
/// value is never changed behind the holder's back. Results come back in
/// primary-key order unless [`SelectQuery::order_by`] is used.
pub struct SelectQuery<E>
where
    E: LifeModelTrait,
{
    pub(crate) query: SelectStatement,
    ordered: bool,
    _phantom: PhantomData<E>,
}

impl<E> SelectQuery<E>
where
    E: LifeModelTrait,
{
    /// Create a new select query: `SELECT "table".* FROM "table"`
    pub fn new() -> Self {
        let table = E::table();
        let mut query = SelectStatement::default();
        query.column((Ident(table), Asterisk)).from(Ident(table));
        Self {
            query,
            ordered: false,
            _phantom: PhantomData,
        }
    }

    /// Add a filter condition
    ///
    /// Accepts anything that implements `IntoCondition` (an `Expr` or a
    /// `Condition`). Repeated filters are combined with `AND`.
    pub fn filter<C: IntoCondition>(mut self, condition: C) -> Self {
        self.query.cond_where(condition.into_condition());
        self
    }

    /// Order by a column of this entity
    pub fn order_by(mut self, column: &'static str, order: Order) -> Self {
        self.query.order_by((Ident(E::table()), Ident(column)), order);
        self.ordered = true;
        self
    }

    /// Limit the number of returned rows
    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit(limit);
        self
    }

    /// Join another table, keeping only this entity's columns in the result
    pub(crate) fn inner_join(mut self, table: &'static str, on: Condition) -> Self {
        self.query.inner_join(Ident(table), on);
        self
    }

    /// The statement as it will be executed
    pub(crate) fn statement(&self) -> SelectStatement {
        let mut statement = self.query.clone();
        if !self.ordered {
            statement.order_by((Ident(E::table()), Ident(E::primary_key())), Order::Asc);
        }
        statement
    }

    /// Build SQL and bound parameters
    pub fn build(&self) -> Result<(String, Vec<SqlValue>), LifeError> {
        let (sql, values) = self.statement().build(SqliteQueryBuilder);
        Ok((sql, convert_values(&values)?))
    }

    /// Render the statement with values inlined (for inspection and logging)
    pub fn to_sql(&self) -> String {
        self.statement().to_string(SqliteQueryBuilder)
    }
}

impl<E: LifeModelTrait> Default for SelectQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: LifeModelTrait> Clone for SelectQuery<E> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            ordered: self.ordered,
            _phantom: PhantomData,
        }
    }
}

impl<E: LifeModelTrait> fmt::Debug for SelectQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectQuery")
            .field("sql", &self.to_sql())
            .finish()
    }
}
