//! Query building and execution for LifeModel entities.
//!
//! # Architecture
//!
//! The query module follows Sea-ORM's organizational patterns:
//! - **Traits**: Core entity and model traits (`LifeModelTrait`, `LifeEntityName`, `FromRow`)
//! - **Select**: SELECT query builder (`SelectQuery`)
//! - **Execution**: Query execution methods (`all`, `one`, `count`)
//! - **Value Conversion**: SeaQuery `Value` to SQLite bind parameter conversion

// Core traits for entities and models
pub mod traits;
#[doc(inline)]
pub use traits::{FromRow, Ident, LifeEntityName, LifeModelTrait};

// Value conversion utilities
pub(crate) mod value_conversion;

// SELECT query builder
pub mod select;
#[doc(inline)]
pub use select::SelectQuery;

// Query execution methods
pub mod execution;
