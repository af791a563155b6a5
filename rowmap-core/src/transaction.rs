//! Transport capabilities supplied by the database client
//!
//! The mapping engine never talks to a database directly. It reads through a
//! [`ReadTransaction`], writes through a [`ReadWriteTransaction`] (statements
//! executed in place, mutations buffered until commit) or applies mutations
//! immediately through a [`Client`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::fmt;

use crate::key::{Key, KeySet};
use crate::mutation::Mutation;
use crate::row::Row;
use crate::statement::Statement;

/// Rows produced by a read or a query, pulled lazily
pub type RowStream<'a> = BoxStream<'a, Result<Row, TransportError>>;

/// Status code attached to a transport failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Failure reported by the transport
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct TransportError {
    code: Code,
    message: String,
}

impl TransportError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// The "row absent" signal of a key lookup
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }
}

/// Read capability of any transaction
#[async_trait]
pub trait ReadTransaction: Send + Sync {
    /// Rows of `table` whose key is in `keys`, restricted to `columns`.
    ///
    /// Keys with no row are skipped.
    fn read(&self, table: &str, keys: &KeySet, columns: &[&str]) -> RowStream<'_>;

    /// The row of `table` at `key`; fails with [`Code::NotFound`] when absent
    async fn read_row(
        &self,
        table: &str,
        key: &Key,
        columns: &[&str],
    ) -> Result<Row, TransportError>;

    /// Rows produced by a SQL query
    fn query(&self, statement: Statement) -> RowStream<'_>;
}

/// Read-write transaction
#[async_trait]
pub trait ReadWriteTransaction: ReadTransaction {
    /// Execute a DML statement, returning the number of affected rows
    async fn execute_update(&self, statement: Statement) -> Result<i64, TransportError>;

    /// Buffer mutations to be applied when the transaction commits
    fn buffer_write(&self, mutations: Vec<Mutation>) -> Result<(), TransportError>;
}

/// Non-transactional write capability
#[async_trait]
pub trait Client: Send + Sync {
    /// Apply mutations atomically, returning the commit timestamp
    async fn apply(&self, mutations: Vec<Mutation>) -> Result<DateTime<Utc>, TransportError>;
}
