//! # Roster
//!
//! Relationship loading strategies over a single-file SQLite store: a
//! relationship direction is either read eagerly into a list of models or
//! returned as a dynamic, composable query handle.
//!
//! ```no_run
//! use roster::school::{self, Scenario};
//! use roster::SqliteExecutor;
//!
//! # fn main() -> Result<(), roster::LifeError> {
//! let scenario = Scenario::LazySelect;
//! let executor = SqliteExecutor::open(&scenario.database_url())?;
//! let rel = scenario.relationship()?;
//! school::create_schema(&executor, rel.cardinality())?;
//! let roster = school::seed(&executor, &rel)?;
//!
//! let english = roster.class("English")?;
//! println!("{}", rel.forward(english, &executor)?); // [<Student: 'Tom'>, <Student: 'Ray'>]
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod metrics;

pub mod executor;
pub mod transaction;

pub mod active_model;
pub mod model;
pub mod query;
pub mod relation;
pub mod session;

pub mod school;

pub use config::DatabaseConfig;
pub use connection::{connect, connect_with, parse_connection_string, ConnectionError, DatabasePath};
pub use executor::{LifeError, LifeExecutor, Row, SqliteExecutor};
pub use transaction::{Transaction, TransactionError};

pub use active_model::ActiveModelTrait;
pub use model::ModelTrait;
pub use query::{FromRow, Ident, LifeEntityName, LifeModelTrait, SelectQuery};
pub use relation::{
    get_related, Cardinality, DynamicQuery, Junction, Loaded, LoadingMode, RelationDef,
    RelationType, Relationship, RelationshipBuilder,
};
pub use session::{Committed, Pending, RowRef, Session};

pub use rusqlite::types::Value as SqlValue;
pub use sea_query::{Condition, Expr, ExprTrait, Order, Value};
