//! Declared relationships between a parent and a child entity.
//!
//! A [`Relationship`] holds both directions of an association: *forward*
//! (parent to its children, e.g. `Class.students`) and *backward* (the
//! back-reference, e.g. `Student.classes`). Each direction has its own
//! [`LoadingMode`], which decides the shape of what reading it returns.

use crate::executor::{LifeError, LifeExecutor};
use crate::model::ModelTrait;
use crate::query::LifeModelTrait;
use crate::relation::def::{Cardinality, Junction, LoadingMode, RelationDef, RelationType, Via};
use crate::relation::eager::{load_many, load_one};
use crate::relation::lazy::DynamicQuery;
use std::fmt;
use std::marker::PhantomData;

/// What reading a relationship direction returns
pub enum Loaded<E>
where
    E: LifeModelTrait,
{
    /// Eager "many" direction: the related rows, already fetched
    Many(Vec<E::Model>),
    /// Eager "one" direction: the related row, if any
    One(Option<E::Model>),
    /// Dynamic direction: an unexecuted query handle
    Dynamic(DynamicQuery<E>),
}

impl<E: LifeModelTrait> Loaded<E> {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Loaded::Dynamic(_))
    }

    pub fn as_many(&self) -> Option<&[E::Model]> {
        match self {
            Loaded::Many(models) => Some(models),
            _ => None,
        }
    }

    pub fn as_query(&self) -> Option<&DynamicQuery<E>> {
        match self {
            Loaded::Dynamic(query) => Some(query),
            _ => None,
        }
    }

    pub fn into_many(self) -> Result<Vec<E::Model>, LifeError> {
        match self {
            Loaded::Many(models) => Ok(models),
            other => Err(other.shape_error("an eager collection")),
        }
    }

    pub fn into_one(self) -> Result<Option<E::Model>, LifeError> {
        match self {
            Loaded::One(model) => Ok(model),
            other => Err(other.shape_error("a single value")),
        }
    }

    pub fn into_query(self) -> Result<DynamicQuery<E>, LifeError> {
        match self {
            Loaded::Dynamic(query) => Ok(query),
            other => Err(other.shape_error("a query handle")),
        }
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Loaded::Many(_) => "an eager collection",
            Loaded::One(_) => "a single value",
            Loaded::Dynamic(_) => "a query handle",
        }
    }

    fn shape_error(&self, expected: &str) -> LifeError {
        LifeError::Configuration(format!(
            "expected {expected} from {}, got {}",
            E::table(),
            self.shape_name()
        ))
    }
}

impl<E: LifeModelTrait> fmt::Debug for Loaded<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loaded::Many(models) => f.debug_tuple("Many").field(models).finish(),
            Loaded::One(model) => f.debug_tuple("One").field(model).finish(),
            Loaded::Dynamic(query) => f.debug_tuple("Dynamic").field(query).finish(),
        }
    }
}

/// Prints what an interactive inspection would show: the list of models, the
/// single model (or `None`), or the SQL of a query handle
impl<E> fmt::Display for Loaded<E>
where
    E: LifeModelTrait,
    E::Model: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loaded::Many(models) => {
                f.write_str("[")?;
                for (i, model) in models.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{model}")?;
                }
                f.write_str("]")
            }
            Loaded::One(Some(model)) => write!(f, "{model}"),
            Loaded::One(None) => f.write_str("None"),
            Loaded::Dynamic(query) => write!(f, "{query}"),
        }
    }
}

/// Read the rows `rel` relates to `entity`
///
/// The result shape follows the direction's loading mode and cardinality.
/// Only a dynamic direction leaves the store untouched.
pub fn get_related<M, T, Ex>(
    rel: &RelationDef,
    entity: &M,
    executor: &Ex,
) -> Result<Loaded<T>, LifeError>
where
    M: ModelTrait,
    T: LifeModelTrait,
    Ex: LifeExecutor + ?Sized,
{
    let source = <M::Entity as LifeModelTrait>::table();
    if rel.from_tbl != source {
        return Err(LifeError::Configuration(format!(
            "relation starts at {}, not {source}",
            rel.from_tbl
        )));
    }

    let column = rel.owner_column();
    let owner = entity
        .get(column)
        .ok_or_else(|| LifeError::Configuration(format!("{source} has no column `{column}`")))?;

    match (rel.loading, rel.rel_type.is_many()) {
        (LoadingMode::Dynamic, _) => Ok(Loaded::Dynamic(DynamicQuery::new(*rel, owner)?)),
        (LoadingMode::Eager, true) => Ok(Loaded::Many(load_many::<T, _>(rel, owner, executor)?)),
        (LoadingMode::Eager, false) => Ok(Loaded::One(load_one::<T, _>(rel, owner, executor)?)),
    }
}

/// Both directions of an association between `P` (parent) and `C` (child)
pub struct Relationship<P, C> {
    cardinality: Cardinality,
    forward: RelationDef,
    backward: RelationDef,
    _phantom: PhantomData<fn() -> (P, C)>,
}

impl<P, C> Relationship<P, C>
where
    P: LifeModelTrait,
    C: LifeModelTrait,
{
    /// Parent has many children; `foreign_key` is the child column
    /// referencing the parent
    pub fn one_to_many(foreign_key: &'static str) -> RelationshipBuilder<P, C> {
        RelationshipBuilder::new(Cardinality::OneToMany, foreign_key, None)
    }

    /// Parent has at most one child; `foreign_key` is on the child
    pub fn one_to_one(foreign_key: &'static str) -> RelationshipBuilder<P, C> {
        RelationshipBuilder::new(Cardinality::OneToOne, foreign_key, None)
    }

    /// Parents and children paired through a junction table
    pub fn many_to_many(junction: Junction) -> RelationshipBuilder<P, C> {
        RelationshipBuilder::new(Cardinality::ManyToMany, "", Some(junction))
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Parent-to-child direction
    pub fn forward_def(&self) -> &RelationDef {
        &self.forward
    }

    /// Child-to-parent direction (the back-reference)
    pub fn backward_def(&self) -> &RelationDef {
        &self.backward
    }

    /// Read `parent`'s children
    pub fn forward<Ex: LifeExecutor + ?Sized>(
        &self,
        parent: &P::Model,
        executor: &Ex,
    ) -> Result<Loaded<C>, LifeError> {
        get_related(&self.forward, parent, executor)
    }

    /// Read `child`'s parent(s)
    pub fn backward<Ex: LifeExecutor + ?Sized>(
        &self,
        child: &C::Model,
        executor: &Ex,
    ) -> Result<Loaded<P>, LifeError> {
        get_related(&self.backward, child, executor)
    }
}

impl<P, C> Clone for Relationship<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Relationship<P, C> {}

impl<P, C> fmt::Debug for Relationship<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("cardinality", &self.cardinality)
            .field("forward", &self.forward)
            .field("backward", &self.backward)
            .finish()
    }
}

/// Builder returned by the [`Relationship`] constructors
pub struct RelationshipBuilder<P, C> {
    cardinality: Cardinality,
    foreign_key: &'static str,
    junction: Option<Junction>,
    loading: LoadingMode,
    backref_loading: LoadingMode,
    _phantom: PhantomData<fn() -> (P, C)>,
}

impl<P, C> RelationshipBuilder<P, C>
where
    P: LifeModelTrait,
    C: LifeModelTrait,
{
    fn new(
        cardinality: Cardinality,
        foreign_key: &'static str,
        junction: Option<Junction>,
    ) -> Self {
        Self {
            cardinality,
            foreign_key,
            junction,
            loading: LoadingMode::Eager,
            backref_loading: LoadingMode::Eager,
            _phantom: PhantomData,
        }
    }

    /// Loading mode of the forward direction
    pub fn loading(mut self, mode: LoadingMode) -> Self {
        self.loading = mode;
        self
    }

    /// Loading mode of the back-reference
    pub fn backref_loading(mut self, mode: LoadingMode) -> Self {
        self.backref_loading = mode;
        self
    }

    /// Validate and build the relationship
    ///
    /// # Errors
    ///
    /// Returns `LifeError::Configuration` if a dynamic loading mode is set on
    /// a direction that yields a single value, or if the key columns are
    /// unusable.
    pub fn declare(self) -> Result<Relationship<P, C>, LifeError> {
        let forward = match (self.cardinality, self.junction) {
            (Cardinality::ManyToMany, Some(junction)) => {
                if junction.parent_col.is_empty()
                    || junction.child_col.is_empty()
                    || junction.parent_col == junction.child_col
                {
                    return Err(LifeError::Configuration(format!(
                        "junction {} needs two distinct key columns",
                        junction.table
                    )));
                }
                RelationDef {
                    rel_type: RelationType::ManyToMany,
                    from_tbl: P::table(),
                    to_tbl: C::table(),
                    from_col: P::primary_key(),
                    to_col: C::primary_key(),
                    from_pk: P::primary_key(),
                    to_pk: C::primary_key(),
                    via: Some(Via {
                        table: junction.table,
                        from_col: junction.parent_col,
                        to_col: junction.child_col,
                    }),
                    loading: self.loading,
                }
            }
            (Cardinality::ManyToMany, None) => {
                return Err(LifeError::Configuration(format!(
                    "many-to-many {} -> {} needs a junction table",
                    P::table(),
                    C::table()
                )));
            }
            (cardinality, _) => {
                if self.foreign_key.is_empty() || self.foreign_key == C::primary_key() {
                    return Err(LifeError::Configuration(format!(
                        "`{}` cannot be the foreign key of {} -> {}",
                        self.foreign_key,
                        P::table(),
                        C::table()
                    )));
                }
                RelationDef {
                    rel_type: if cardinality == Cardinality::OneToOne {
                        RelationType::HasOne
                    } else {
                        RelationType::HasMany
                    },
                    from_tbl: P::table(),
                    to_tbl: C::table(),
                    from_col: P::primary_key(),
                    to_col: self.foreign_key,
                    from_pk: P::primary_key(),
                    to_pk: C::primary_key(),
                    via: None,
                    loading: self.loading,
                }
            }
        };
        let backward = forward.rev().with_loading(self.backref_loading);

        forward.validate()?;
        backward.validate()?;

        log::debug!(
            "declared {:?} {} -> {} (loading {}, backref {})",
            self.cardinality,
            forward.from_tbl,
            forward.to_tbl,
            forward.loading,
            backward.loading
        );
        Ok(Relationship {
            cardinality: self.cardinality,
            forward,
            backward,
            _phantom: PhantomData,
        })
    }
}
