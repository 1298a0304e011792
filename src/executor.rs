//! `LifeExecutor` Module
//!
//! Provides the `LifeExecutor` trait that abstracts statement execution over a
//! single SQLite connection, and `SqliteExecutor`, the data-access context that
//! every executing call in this crate receives explicitly.
//!
//! There is no process-wide database handle: callers open an executor, pass it
//! to queries, relationship reads and session commits, and drop or `close()` it
//! when done.

use rusqlite::types::{FromSql, Value as SqlValue, ValueRef};
use rusqlite::{Connection, ErrorCode};
use std::cell::RefCell;
use std::fmt;
use std::time::Instant;

use crate::config::DatabaseConfig;
use crate::connection::{connect_with, ConnectionError};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// `LifeExecutor` error type
///
/// Each variant is a distinct failure kind so calling code can branch on it.
/// Nothing in this crate retries on any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifeError {
    /// Invalid declaration or configuration (e.g. a dynamic loader on a
    /// many-to-one direction, a malformed connection string)
    Configuration(String),
    /// The store is unreachable, could not be opened, or has been torn down
    Connectivity(String),
    /// A foreign key, NOT NULL or CHECK constraint rejected a write
    Constraint(String),
    /// Query execution error
    QueryError(String),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl LifeError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, LifeError::Configuration(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, LifeError::Connectivity(_))
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, LifeError::Constraint(_))
    }
}

impl fmt::Display for LifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifeError::Configuration(s) => write!(f, "Configuration error: {s}"),
            LifeError::Connectivity(s) => write!(f, "Connectivity error: {s}"),
            LifeError::Constraint(s) => write!(f, "Constraint violation: {s}"),
            LifeError::QueryError(s) => write!(f, "Query error: {s}"),
            LifeError::ParseError(s) => write!(f, "Parse error: {s}"),
            LifeError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for LifeError {}

impl From<rusqlite::Error> for LifeError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
                ErrorCode::ConstraintViolation => LifeError::Constraint(err.to_string()),
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied => LifeError::Connectivity(err.to_string()),
                _ => LifeError::QueryError(err.to_string()),
            },
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => {
                LifeError::ParseError(err.to_string())
            }
            _ => LifeError::QueryError(err.to_string()),
        }
    }
}

impl From<ConnectionError> for LifeError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::InvalidConnectionString(_) => {
                LifeError::Configuration(err.to_string())
            }
            ConnectionError::Unreachable(_) => LifeError::Connectivity(err.to_string()),
            ConnectionError::Sqlite(e) => LifeError::from(e),
        }
    }
}

/// A fully materialized result row
///
/// Rows are detached from the statement that produced them, so they can be
/// decoded after the connection borrow has ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Decode the value of a named column
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` if the column is missing or the stored
    /// value cannot be converted to `T`.
    pub fn get<T: FromSql>(&self, column: &str) -> Result<T, LifeError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| LifeError::ParseError(format!("no column named `{column}` in row")))?;
        self.get_idx(idx)
    }

    /// Decode the value at a column index
    pub fn get_idx<T: FromSql>(&self, idx: usize) -> Result<T, LifeError> {
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| LifeError::ParseError(format!("column index {idx} out of range")))?;
        T::column_result(ValueRef::from(value))
            .map_err(|e| LifeError::ParseError(format!("column {idx}: {e}")))
    }
}

/// Trait for executing database operations
///
/// This trait abstracts database execution, allowing different implementations
/// (direct connection, transaction) to be used interchangeably by queries,
/// relationship loaders and sessions.
pub trait LifeExecutor {
    /// Execute a SQL statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the statement execution fails.
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError>;

    /// Execute an INSERT and return the row id of the inserted row
    fn insert(&self, query: &str, params: &[SqlValue]) -> Result<i64, LifeError>;

    /// Execute one or more parameterless statements separated by `;`
    fn execute_batch(&self, sql: &str) -> Result<(), LifeError>;

    /// Execute a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the query execution fails.
    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError>;

    /// Execute a query and return exactly one row
    ///
    /// # Errors
    ///
    /// Returns `LifeError::QueryError` if zero or several rows come back.
    fn query_one(&self, query: &str, params: &[SqlValue]) -> Result<Row, LifeError> {
        let mut rows = self.query_all(query, params)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            0 => Err(LifeError::QueryError("query returned no rows".to_string())),
            n => Err(LifeError::QueryError(format!("query returned {n} rows, expected one"))),
        }
    }
}

/// Implementation of `LifeExecutor` for a `rusqlite::Connection`
///
/// The connection can be torn down with [`SqliteExecutor::close`]; every call
/// made afterwards fails with `LifeError::Connectivity`.
pub struct SqliteExecutor {
    conn: RefCell<Option<Connection>>,
}

impl SqliteExecutor {
    /// Create a new executor from an open connection
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: RefCell::new(Some(conn)),
        }
    }

    /// Open the store named by a connection string (`sqlite:///file.db`)
    /// with foreign key enforcement on
    pub fn open(url: &str) -> Result<Self, LifeError> {
        Self::from_config(&DatabaseConfig::new(url))
    }

    /// Open the store described by a loaded configuration
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, LifeError> {
        if !config.track_modifications {
            log::debug!("modification tracking disabled for {}", config.url);
        }
        let conn = connect_with(config)?;
        Ok(Self::new(conn))
    }

    /// Open a private in-memory store
    pub fn in_memory() -> Result<Self, LifeError> {
        Self::open("sqlite://")
    }

    /// Whether the executor still holds a live connection
    pub fn is_open(&self) -> bool {
        self.conn.borrow().is_some()
    }

    /// Tear down the underlying connection
    ///
    /// Closing twice is a no-op.
    pub fn close(&self) -> Result<(), LifeError> {
        let conn = self.conn.borrow_mut().take();
        match conn {
            Some(conn) => {
                log::debug!("closing sqlite connection");
                conn.close().map_err(|(_, e)| LifeError::from(e))
            }
            None => Ok(()),
        }
    }

    /// Check that the connection is alive by running `SELECT 1`
    pub fn check_health(&self) -> Result<bool, LifeError> {
        let row = self.query_one("SELECT 1", &[])?;
        Ok(row.get_idx::<i64>(0)? == 1)
    }

    fn run<T>(
        &self,
        sql: &str,
        op: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();

        let guard = self.conn.borrow();
        let conn = guard
            .as_ref()
            .ok_or_else(|| LifeError::Connectivity("connection has been closed".to_string()))?;

        log::debug!("executing: {sql}");
        let start = Instant::now();
        let result = op(conn).map_err(|e| {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            LifeError::from(e)
        });

        let duration = start.elapsed();
        log::trace!("statement finished in {duration:?}");
        #[cfg(feature = "metrics")]
        METRICS.record_query_duration(duration);

        result
    }
}

impl fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("open", &self.is_open())
            .finish()
    }
}

impl LifeExecutor for SqliteExecutor {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        self.run(query, |conn| {
            let affected = conn.execute(query, rusqlite::params_from_iter(params.iter()))?;
            Ok(affected as u64)
        })
    }

    fn insert(&self, query: &str, params: &[SqlValue]) -> Result<i64, LifeError> {
        self.run(query, |conn| {
            conn.execute(query, rusqlite::params_from_iter(params.iter()))?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn execute_batch(&self, sql: &str) -> Result<(), LifeError> {
        self.run(sql, |conn| conn.execute_batch(sql))
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        self.run(query, |conn| {
            let mut stmt = conn.prepare(query)?;
            let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
            let width = columns.len();

            let mapped = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
                (0..width)
                    .map(|i| row.get::<_, SqlValue>(i))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })?;

            let mut rows = Vec::new();
            for values in mapped {
                rows.push(Row::new(columns.clone(), values?));
            }
            Ok(rows)
        })
    }
}
