//! Transaction Module
//!
//! Provides the transaction guard used to apply a unit of work atomically.
//!
//! A [`Transaction`] borrows an executor, issues `BEGIN`, and implements
//! [`LifeExecutor`] itself so statements run inside it. It must be closed with
//! [`Transaction::commit`] or [`Transaction::rollback`]; a guard dropped while
//! still open rolls back.

use crate::executor::{LifeError, LifeExecutor, Row};
use rusqlite::types::Value as SqlValue;
use std::fmt;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

/// Transaction error type
#[derive(Debug)]
pub enum TransactionError {
    /// Error from the underlying executor
    Executor(LifeError),
    /// Transaction already committed or rolled back
    TransactionClosed,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::Executor(e) => {
                write!(f, "{}", e)
            }
            TransactionError::TransactionClosed => {
                write!(f, "Transaction has already been committed or rolled back")
            }
        }
    }
}

impl std::error::Error for TransactionError {}

impl From<LifeError> for TransactionError {
    fn from(err: LifeError) -> Self {
        TransactionError::Executor(err)
    }
}

impl From<TransactionError> for LifeError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Executor(e) => e,
            TransactionError::TransactionClosed => {
                LifeError::Other("Transaction closed".to_string())
            }
        }
    }
}

/// A database transaction
///
/// All statements executed through the guard are either committed together or
/// rolled back together.
pub struct Transaction<'a, E: LifeExecutor + ?Sized> {
    executor: &'a E,
    closed: bool,
}

impl<'a, E: LifeExecutor + ?Sized> Transaction<'a, E> {
    /// Start a new transaction on `executor`
    pub fn begin(executor: &'a E) -> Result<Self, TransactionError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::begin_transaction_span().entered();

        executor.execute("BEGIN", &[])?;
        Ok(Self {
            executor,
            closed: false,
        })
    }

    /// Commit the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has already been closed or the
    /// store rejects the commit. A failed commit is rolled back on drop.
    pub fn commit(mut self) -> Result<(), TransactionError> {
        if self.closed {
            return Err(TransactionError::TransactionClosed);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::commit_transaction_span().entered();

        self.executor.execute("COMMIT", &[])?;
        self.closed = true;
        Ok(())
    }

    /// Rollback the transaction
    pub fn rollback(mut self) -> Result<(), TransactionError> {
        if self.closed {
            return Err(TransactionError::TransactionClosed);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();

        self.closed = true;
        self.executor.execute("ROLLBACK", &[])?;
        Ok(())
    }

    /// Check if the transaction is closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), LifeError> {
        if self.closed {
            return Err(LifeError::Other("Transaction is closed".to_string()));
        }
        Ok(())
    }
}

impl<E: LifeExecutor + ?Sized> Drop for Transaction<'_, E> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!("transaction dropped while open, rolling back");
            if let Err(e) = self.executor.execute("ROLLBACK", &[]) {
                log::error!("rollback on drop failed: {e}");
            }
        }
    }
}

impl<E: LifeExecutor + ?Sized> LifeExecutor for Transaction<'_, E> {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        self.ensure_open()?;
        self.executor.execute(query, params)
    }

    fn insert(&self, query: &str, params: &[SqlValue]) -> Result<i64, LifeError> {
        self.ensure_open()?;
        self.executor.insert(query, params)
    }

    fn execute_batch(&self, sql: &str) -> Result<(), LifeError> {
        self.ensure_open()?;
        self.executor.execute_batch(sql)
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        self.ensure_open()?;
        self.executor.query_all(query, params)
    }
}
