//! Model trait for accessing model data
//!
//! This module provides the `ModelTrait` which allows dynamic access to model
//! fields and primary key values. Similar to SeaORM's `ModelTrait`.

use crate::query::LifeModelTrait;
use sea_query::Value;

/// Trait for Model-level operations
///
/// Relationship loaders use it to read the key values they join on without
/// knowing the concrete model type.
pub trait ModelTrait: Clone + std::fmt::Debug {
    /// The Entity type that this Model belongs to
    type Entity: LifeModelTrait;

    /// Get the value of a column from the model
    ///
    /// Returns `None` if the model has no such column.
    fn get(&self, column: &str) -> Option<Value>;

    /// Get the primary key value from the model
    fn get_primary_key_value(&self) -> Value;
}
