//! Connection Module
//!
//! Parses connection strings and opens the single-file SQLite store.
//!
//! Connection strings follow the `sqlite://` URL convention:
//! - `sqlite:///relative/path.db`: a file relative to the working directory
//! - `sqlite:////absolute/path.db`: an absolute path
//! - `sqlite://` or `sqlite:///:memory:`: a private in-memory store

use rusqlite::{Connection, ErrorCode};
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::DatabaseConfig;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

const SCHEME: &str = "sqlite://";

/// Connection error type
#[derive(Debug)]
pub enum ConnectionError {
    /// Invalid connection string format
    InvalidConnectionString(String),
    /// The database file could not be opened
    Unreachable(String),
    /// Other errors from the SQLite driver
    Sqlite(rusqlite::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidConnectionString(s) => {
                write!(f, "Invalid connection string: {}", s)
            }
            ConnectionError::Unreachable(s) => {
                write!(f, "Database unreachable: {}", s)
            }
            ConnectionError::Sqlite(e) => {
                write!(f, "SQLite error: {}", e)
            }
        }
    }
}

impl std::error::Error for ConnectionError {}

impl From<rusqlite::Error> for ConnectionError {
    fn from(err: rusqlite::Error) -> Self {
        ConnectionError::Sqlite(err)
    }
}

/// Where the store lives
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DatabasePath {
    /// In-memory database.
    #[default]
    Memory,
    /// File-based database.
    File(PathBuf),
}

impl DatabasePath {
    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// Parse a `sqlite://` connection string into a [`DatabasePath`]
pub fn parse_connection_string(connection_string: &str) -> Result<DatabasePath, ConnectionError> {
    if connection_string.is_empty() {
        return Err(ConnectionError::InvalidConnectionString(
            "Connection string cannot be empty".to_string(),
        ));
    }

    let rest = connection_string.strip_prefix(SCHEME).ok_or_else(|| {
        ConnectionError::InvalidConnectionString(format!(
            "`{connection_string}` must start with `{SCHEME}`"
        ))
    })?;

    if rest.is_empty() || rest == ":memory:" {
        return Ok(DatabasePath::Memory);
    }

    // Anything between `sqlite://` and the next `/` would be a host, which a
    // file store cannot have.
    let path = rest.strip_prefix('/').ok_or_else(|| {
        ConnectionError::InvalidConnectionString(format!(
            "`{connection_string}` names a host; use `{SCHEME}/path/to/file.db`"
        ))
    })?;

    match path {
        "" | ":memory:" => Ok(DatabasePath::Memory),
        file => Ok(DatabasePath::File(PathBuf::from(file))),
    }
}

/// Open a connection from a bare connection string with foreign keys enforced
pub fn connect(connection_string: &str) -> Result<Connection, ConnectionError> {
    connect_with(&DatabaseConfig::new(connection_string))
}

/// Open a connection as described by `config`
///
/// This is a blocking call; the returned connection is used synchronously by
/// [`crate::SqliteExecutor`].
pub fn connect_with(config: &DatabaseConfig) -> Result<Connection, ConnectionError> {
    #[cfg(feature = "tracing")]
    let _span = tracing_helpers::acquire_connection_span().entered();

    let start = Instant::now();
    let path = parse_connection_string(&config.url)?;

    let conn = match &path {
        DatabasePath::Memory => Connection::open_in_memory(),
        DatabasePath::File(file) => Connection::open(file),
    }
    .map_err(|e| {
        let cannot_open = matches!(
            &e,
            rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::CannotOpen
        );
        if cannot_open {
            ConnectionError::Unreachable(format!("{}: {e}", config.url))
        } else {
            ConnectionError::Sqlite(e)
        }
    })?;

    if config.foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    }

    log::debug!("opened {:?} in {:?}", path, start.elapsed());
    Ok(conn)
}
