//! RelationDef struct for storing relationship metadata
//!
//! This module provides the `RelationDef` struct which contains all metadata
//! about one direction of an entity relationship, and the statements derived
//! from it: the `SELECT` that reads related rows and the writes that create or
//! remove an edge.

use crate::executor::LifeError;
use crate::query::value_conversion::convert_values;
use crate::query::{Ident, LifeModelTrait, SelectQuery};
use rusqlite::types::Value as SqlValue;
use sea_query::{Condition, Expr, ExprTrait, Query, SqliteQueryBuilder, Value};
use std::fmt;
use std::str::FromStr;

/// Type of relationship between entities, seen from the `from` side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// One-to-one relationship, foreign key on the target
    HasOne,
    /// One-to-many relationship, foreign key on the target
    HasMany,
    /// Many-to-one relationship (belongs_to), foreign key on the source
    BelongsTo,
    /// Many-to-many relationship through a junction table
    ManyToMany,
}

impl RelationType {
    /// Whether reading this direction yields a collection
    pub fn is_many(&self) -> bool {
        matches!(self, RelationType::HasMany | RelationType::ManyToMany)
    }

    /// The type of the mirrored direction
    pub fn rev(&self) -> Self {
        match self {
            RelationType::HasOne | RelationType::HasMany => RelationType::BelongsTo,
            RelationType::BelongsTo => RelationType::HasMany,
            RelationType::ManyToMany => RelationType::ManyToMany,
        }
    }
}

/// Declared multiplicity of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
}

/// When related rows are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadingMode {
    /// Issue the lookup on access and return the related rows (`select`)
    #[default]
    Eager,
    /// Return an unexecuted, composable query handle (`dynamic`)
    Dynamic,
}

impl fmt::Display for LoadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadingMode::Eager => write!(f, "eager"),
            LoadingMode::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl FromStr for LoadingMode {
    type Err = LifeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eager" | "select" | "true" => Ok(LoadingMode::Eager),
            "dynamic" | "lazy-query" => Ok(LoadingMode::Dynamic),
            other => Err(LifeError::Configuration(format!(
                "unknown loading mode `{other}` (expected `eager` or `dynamic`)"
            ))),
        }
    }
}

/// An association table storing pairs of foreign keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Junction {
    pub table: &'static str,
    /// Column referencing the parent side
    pub parent_col: &'static str,
    /// Column referencing the child side
    pub child_col: &'static str,
}

impl Junction {
    pub const fn new(
        table: &'static str,
        parent_col: &'static str,
        child_col: &'static str,
    ) -> Self {
        Self {
            table,
            parent_col,
            child_col,
        }
    }
}

/// The junction hop of a many-to-many direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Via {
    pub table: &'static str,
    /// Junction column referencing the `from` side
    pub from_col: &'static str,
    /// Junction column referencing the `to` side
    pub to_col: &'static str,
}

/// Defines one direction of a relationship between two entities
///
/// - `HasMany`/`HasOne`: `to_tbl.to_col` holds the foreign key, matched
///   against `from_tbl.from_col` (the source primary key).
/// - `BelongsTo`: `from_tbl.from_col` holds the foreign key, matched against
///   `to_tbl.to_col` (the target primary key).
/// - `ManyToMany`: `via` joins `from_pk` to `to_pk` through the junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationDef {
    pub rel_type: RelationType,
    pub from_tbl: &'static str,
    pub to_tbl: &'static str,
    pub from_col: &'static str,
    pub to_col: &'static str,
    pub from_pk: &'static str,
    pub to_pk: &'static str,
    pub via: Option<Via>,
    pub loading: LoadingMode,
}

impl RelationDef {
    /// Reverse this relation (swap from and to)
    ///
    /// If you have Class -> Student (has_many), reversing gives
    /// Student -> Class (belongs_to). The loading mode is kept; set the
    /// reversed direction's own mode with [`RelationDef::with_loading`].
    pub fn rev(self) -> Self {
        Self {
            rel_type: self.rel_type.rev(),
            from_tbl: self.to_tbl,
            to_tbl: self.from_tbl,
            from_col: self.to_col,
            to_col: self.from_col,
            from_pk: self.to_pk,
            to_pk: self.from_pk,
            via: self.via.map(|via| Via {
                table: via.table,
                from_col: via.to_col,
                to_col: via.from_col,
            }),
            loading: self.loading,
        }
    }

    pub fn with_loading(mut self, loading: LoadingMode) -> Self {
        self.loading = loading;
        self
    }

    /// Whether linking writes a foreign key column rather than a junction row
    pub fn assigns_foreign_key(&self) -> bool {
        self.rel_type != RelationType::ManyToMany
    }

    /// Reject loading modes the direction's cardinality cannot support
    pub fn validate(&self) -> Result<(), LifeError> {
        if self.loading == LoadingMode::Dynamic && !self.rel_type.is_many() {
            return Err(LifeError::Configuration(format!(
                "dynamic loading needs a collection, but {} -> {} is {:?}",
                self.from_tbl, self.to_tbl, self.rel_type
            )));
        }
        if self.from_col.is_empty() || self.to_col.is_empty() {
            return Err(LifeError::Configuration(format!(
                "{} -> {} is missing a join column",
                self.from_tbl, self.to_tbl
            )));
        }
        if self.rel_type == RelationType::ManyToMany && self.via.is_none() {
            return Err(LifeError::Configuration(format!(
                "many-to-many {} -> {} needs a junction table",
                self.from_tbl, self.to_tbl
            )));
        }
        Ok(())
    }

    /// The column whose value on a `from` model identifies its related rows
    pub fn owner_column(&self) -> &'static str {
        match self.rel_type {
            RelationType::ManyToMany => self.from_pk,
            _ => self.from_col,
        }
    }

    /// Condition selecting the related rows for `owner`, the value of
    /// [`RelationDef::owner_column`] on the source model
    pub fn where_condition(&self, owner: Value) -> Condition {
        let column = match self.via {
            Some(via) => Expr::col((Ident(via.table), Ident(via.from_col))),
            None => Expr::col((Ident(self.to_tbl), Ident(self.to_col))),
        };
        Condition::all().add(column.eq(owner))
    }

    /// Build the select over `T` (the `to` entity) for `owner`
    pub fn select_related<T>(&self, owner: Value) -> Result<SelectQuery<T>, LifeError>
    where
        T: LifeModelTrait,
    {
        if T::table() != self.to_tbl {
            return Err(LifeError::Configuration(format!(
                "relation targets {}, not {}",
                self.to_tbl,
                T::table()
            )));
        }

        let mut query = SelectQuery::<T>::new();
        if let Some(via) = self.via {
            let on = Condition::all().add(
                Expr::col((Ident(via.table), Ident(via.to_col)))
                    .equals((Ident(self.to_tbl), Ident(self.to_pk))),
            );
            query = query.inner_join(via.table, on);
        }
        Ok(query.filter(self.where_condition(owner)))
    }

    /// Statement creating the edge between the source row `from_key` and the
    /// target row `to_key` (both primary key values)
    ///
    /// Junction inserts are skipped when the pair already exists.
    pub fn link_statement(
        &self,
        from_key: Value,
        to_key: Value,
    ) -> Result<(String, Vec<SqlValue>), LifeError> {
        match self.rel_type {
            RelationType::HasMany | RelationType::HasOne => self.assign_foreign_key(
                self.to_tbl,
                self.to_col,
                self.to_pk,
                to_key,
                from_key,
                None,
            ),
            RelationType::BelongsTo => self.assign_foreign_key(
                self.from_tbl,
                self.from_col,
                self.from_pk,
                from_key,
                to_key,
                None,
            ),
            RelationType::ManyToMany => {
                let via = self.via.ok_or_else(|| self.missing_junction())?;
                let sql = format!(
                    "INSERT INTO \"{t}\" (\"{a}\", \"{b}\") SELECT ?, ? WHERE NOT EXISTS \
                     (SELECT 1 FROM \"{t}\" WHERE \"{a}\" = ? AND \"{b}\" = ?)",
                    t = via.table,
                    a = via.from_col,
                    b = via.to_col,
                );
                let params = convert_values(&sea_query::Values(vec![
                    from_key.clone(),
                    to_key.clone(),
                    from_key,
                    to_key,
                ]))?;
                Ok((sql, params))
            }
        }
    }

    /// Statement removing the edge between `from_key` and `to_key`
    ///
    /// Only the edge is removed; neither row is deleted.
    pub fn unlink_statement(
        &self,
        from_key: Value,
        to_key: Value,
    ) -> Result<(String, Vec<SqlValue>), LifeError> {
        match self.rel_type {
            RelationType::HasMany | RelationType::HasOne => self.assign_foreign_key(
                self.to_tbl,
                self.to_col,
                self.to_pk,
                to_key,
                Value::BigInt(None),
                Some(from_key),
            ),
            RelationType::BelongsTo => self.assign_foreign_key(
                self.from_tbl,
                self.from_col,
                self.from_pk,
                from_key,
                Value::BigInt(None),
                Some(to_key),
            ),
            RelationType::ManyToMany => {
                let via = self.via.ok_or_else(|| self.missing_junction())?;
                let mut stmt = Query::delete();
                stmt.from_table(Ident(via.table))
                    .and_where(Expr::col(Ident(via.from_col)).eq(from_key))
                    .and_where(Expr::col(Ident(via.to_col)).eq(to_key));
                let (sql, values) = stmt.build(SqliteQueryBuilder);
                Ok((sql, convert_values(&values)?))
            }
        }
    }

    /// `UPDATE table SET fk = value WHERE pk = key [AND fk = current]`
    fn assign_foreign_key(
        &self,
        table: &'static str,
        fk: &'static str,
        pk: &'static str,
        key: Value,
        value: Value,
        current: Option<Value>,
    ) -> Result<(String, Vec<SqlValue>), LifeError> {
        let mut stmt = Query::update();
        stmt.table(Ident(table))
            .value(Ident(fk), Expr::val(value))
            .and_where(Expr::col(Ident(pk)).eq(key));
        if let Some(current) = current {
            stmt.and_where(Expr::col(Ident(fk)).eq(current));
        }
        let (sql, values) = stmt.build(SqliteQueryBuilder);
        Ok((sql, convert_values(&values)?))
    }

    fn missing_junction(&self) -> LifeError {
        LifeError::Configuration(format!(
            "many-to-many {} -> {} has no junction table",
            self.from_tbl, self.to_tbl
        ))
    }
}
