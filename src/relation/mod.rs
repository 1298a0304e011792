//! Relation module for entity relationships.
//!
//! This module provides support for declaring and reading relationships:
//! - one-to-many: a parent row referenced by many child rows through a foreign key
//! - many-to-many: rows paired through a junction table
//! - one-to-one: declared only with eager loading
//!
//! # Architecture
//!
//! - **Def**: One direction of a relationship (`RelationDef`, `RelationType`, `LoadingMode`)
//! - **Relationship**: Both directions with their loading modes (`Relationship`, `Loaded`)
//! - **Eager**: Immediate loading (`load_many`, `load_one`)
//! - **Lazy**: Dynamic query handles (`DynamicQuery`)

// Relation definitions
pub mod def;
#[doc(inline)]
pub use def::{Cardinality, Junction, LoadingMode, RelationDef, RelationType, Via};

// Declared relationships
pub mod relationship;
#[doc(inline)]
pub use relationship::{get_related, Loaded, Relationship, RelationshipBuilder};

// Eager loading
pub mod eager;
#[doc(inline)]
pub use eager::{load_many, load_one};

// Dynamic query handles
pub mod lazy;
#[doc(inline)]
pub use lazy::DynamicQuery;
