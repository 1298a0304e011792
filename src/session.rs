//! Unit of work for staged inserts and relationship edges.
//!
//! A [`Session`] collects new records and edge changes in memory and applies
//! them in one transaction on [`Session::commit`]. Records are written before
//! edges, so an edge may reference a record staged in the same session by its
//! [`Pending`] token.

use crate::active_model::ActiveModelTrait;
use crate::executor::{LifeError, LifeExecutor};
use crate::model::ModelTrait;
use crate::query::LifeModelTrait;
use crate::relation::{RelationDef, Relationship};
use crate::transaction::Transaction;
use rusqlite::types::Value as SqlValue;
use sea_query::Value;
use std::fmt;
use std::marker::PhantomData;

/// Token for a record staged with [`Session::add`]
///
/// Resolves to the stored row through [`Committed`].
pub struct Pending<E> {
    slot: usize,
    _phantom: PhantomData<E>,
}

impl<E> Pending<E> {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl<E> Clone for Pending<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Pending<E> {}

impl<E> fmt::Debug for Pending<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pending({})", self.slot)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Key {
    Stored(Value),
    Pending(usize),
}

impl From<Value> for Key {
    fn from(value: Value) -> Self {
        Key::Stored(value)
    }
}

/// A row of entity `E`, either already stored or staged in the session
pub struct RowRef<E> {
    key: Key,
    _phantom: PhantomData<E>,
}

impl<E> RowRef<E> {
    pub(crate) fn into_key(self) -> Key {
        self.key
    }
}

impl<'a, E: LifeModelTrait> From<&'a E::Model> for RowRef<E> {
    fn from(model: &'a E::Model) -> Self {
        Self {
            key: Key::Stored(model.get_primary_key_value()),
            _phantom: PhantomData,
        }
    }
}

impl<E> From<Pending<E>> for RowRef<E> {
    fn from(pending: Pending<E>) -> Self {
        Self {
            key: Key::Pending(pending.slot),
            _phantom: PhantomData,
        }
    }
}

#[derive(Debug, Clone)]
struct Edge {
    rel: RelationDef,
    link: bool,
    from: Key,
    to: Key,
}

/// A unit of work
#[derive(Debug, Default)]
pub struct Session {
    inserts: Vec<(String, Vec<SqlValue>)>,
    edges: Vec<Edge>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a new record
    pub fn add<A: ActiveModelTrait>(&mut self, record: A) -> Result<Pending<A::Entity>, LifeError> {
        let statement = record.insert_statement()?;
        self.inserts.push(statement);
        Ok(Pending {
            slot: self.inserts.len() - 1,
            _phantom: PhantomData,
        })
    }

    /// Stage the edge between `parent` and `child`
    ///
    /// Assigns the child's foreign key for one-to-many, inserts the junction
    /// row (unless present) for many-to-many.
    pub fn link<P, C>(
        &mut self,
        rel: &Relationship<P, C>,
        parent: impl Into<RowRef<P>>,
        child: impl Into<RowRef<C>>,
    ) where
        P: LifeModelTrait,
        C: LifeModelTrait,
    {
        let (from, to) = (parent.into().into_key(), child.into().into_key());
        self.stage_edge(*rel.forward_def(), true, from, to);
    }

    /// Stage removal of the edge between `parent` and `child`
    pub fn unlink<P, C>(
        &mut self,
        rel: &Relationship<P, C>,
        parent: impl Into<RowRef<P>>,
        child: impl Into<RowRef<C>>,
    ) where
        P: LifeModelTrait,
        C: LifeModelTrait,
    {
        let (from, to) = (parent.into().into_key(), child.into().into_key());
        self.stage_edge(*rel.forward_def(), false, from, to);
    }

    pub(crate) fn stage_edge(&mut self, rel: RelationDef, link: bool, from: Key, to: Key) {
        self.edges.push(Edge { rel, link, from, to });
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.inserts.len() + self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.edges.is_empty()
    }

    /// Discard everything staged
    pub fn clear(&mut self) {
        self.inserts.clear();
        self.edges.clear();
    }

    /// Apply every staged operation in one transaction
    ///
    /// The session is empty afterwards whether or not the commit succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error (`LifeError::Constraint`
    /// for a rejected write) after rolling the whole batch back.
    pub fn commit<Ex>(&mut self, executor: &Ex) -> Result<Committed, LifeError>
    where
        Ex: LifeExecutor + ?Sized,
    {
        let inserts = std::mem::take(&mut self.inserts);
        let edges = std::mem::take(&mut self.edges);
        if inserts.is_empty() && edges.is_empty() {
            return Ok(Committed { ids: Vec::new() });
        }

        let tx = Transaction::begin(executor)?;
        match apply(&tx, &inserts, &edges) {
            Ok(ids) => {
                tx.commit()?;
                log::info!(
                    "committed {} new rows and {} edge changes",
                    inserts.len(),
                    edges.len()
                );
                Ok(Committed { ids })
            }
            Err(e) => {
                log::warn!("commit failed, rolling back: {e}");
                if let Err(rollback) = tx.rollback() {
                    log::error!("rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }
}

fn apply<Ex: LifeExecutor + ?Sized>(
    executor: &Ex,
    inserts: &[(String, Vec<SqlValue>)],
    edges: &[Edge],
) -> Result<Vec<i64>, LifeError> {
    let mut ids = Vec::with_capacity(inserts.len());
    for (sql, params) in inserts {
        ids.push(executor.insert(sql, params)?);
    }

    for edge in edges {
        let from = resolve(&edge.from, &ids)?;
        let to = resolve(&edge.to, &ids)?;
        let (sql, params) = if edge.link {
            edge.rel.link_statement(from, to)?
        } else {
            edge.rel.unlink_statement(from, to)?
        };
        let affected = executor.execute(&sql, &params)?;
        // an UPDATE that matched nothing means the row being linked is absent
        if edge.link && edge.rel.assigns_foreign_key() && affected == 0 {
            return Err(LifeError::Constraint(format!(
                "link {} -> {} matched no row",
                edge.rel.from_tbl, edge.rel.to_tbl
            )));
        }
    }
    Ok(ids)
}

fn resolve(key: &Key, ids: &[i64]) -> Result<Value, LifeError> {
    match key {
        Key::Stored(value) => Ok(value.clone()),
        Key::Pending(slot) => ids
            .get(*slot)
            .map(|id| Value::BigInt(Some(*id)))
            .ok_or_else(|| LifeError::Other(format!("no staged record in slot {slot}"))),
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    ids: Vec<i64>,
}

impl Committed {
    /// Row id assigned to a staged record
    pub fn id<E>(&self, pending: Pending<E>) -> Result<i64, LifeError> {
        self.ids
            .get(pending.slot)
            .copied()
            .ok_or_else(|| {
                LifeError::Other(format!("record {} was not part of this commit", pending.slot))
            })
    }

    /// Read back a committed record
    pub fn load<E, Ex>(&self, pending: Pending<E>, executor: &Ex) -> Result<E::Model, LifeError>
    where
        E: LifeModelTrait,
        Ex: LifeExecutor + ?Sized,
    {
        let id = self.id(pending)?;
        E::find_by_id(id)
            .one(executor)?
            .ok_or_else(|| LifeError::QueryError(format!("{} row {id} not found", E::table())))
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }
}
