//! Eager loading of related entities.
//!
//! Reading an eager direction issues its `SELECT` immediately: a "many"
//! direction yields every related model in primary-key order, a "one"
//! direction yields the related model if the foreign key is set.

use crate::executor::{LifeError, LifeExecutor};
use crate::query::value_conversion::to_sql_value;
use crate::query::LifeModelTrait;
use crate::relation::def::RelationDef;
use rusqlite::types::Value as SqlValue;
use sea_query::Value;

/// Load every `E` row related to `owner`
///
/// `owner` is the value of [`RelationDef::owner_column`] on the source model.
pub fn load_many<E, Ex>(
    rel: &RelationDef,
    owner: Value,
    executor: &Ex,
) -> Result<Vec<E::Model>, LifeError>
where
    E: LifeModelTrait,
    Ex: LifeExecutor + ?Sized,
{
    log::debug!("eager load {} -> {}", rel.from_tbl, rel.to_tbl);
    rel.select_related::<E>(owner)?.all(executor)
}

/// Load the single `E` row related to `owner`
///
/// A null `owner` (an unset foreign key) returns `None` without querying.
pub fn load_one<E, Ex>(
    rel: &RelationDef,
    owner: Value,
    executor: &Ex,
) -> Result<Option<E::Model>, LifeError>
where
    E: LifeModelTrait,
    Ex: LifeExecutor + ?Sized,
{
    if to_sql_value(&owner)? == SqlValue::Null {
        return Ok(None);
    }
    log::debug!("eager load {} -> {}", rel.from_tbl, rel.to_tbl);
    rel.select_related::<E>(owner)?.one(executor)
}
