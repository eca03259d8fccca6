//! Traits the runner is generic over.
//!
//! A backend provides a connector (endpoint + credentials to connection), a
//! connection (opens read transactions bound to a database) and a read
//! transaction (runs one statement and yields its records).

use std::future::Future;
use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::error::GraphMiddlewareError;
use crate::query::Query;
use crate::results::Record;

/// Opens connections from a [`ConnectionConfig`].
pub trait GraphConnector {
    type Connection: GraphConnection;

    /// # Errors
    /// Returns `ConnectionError` if the endpoint is unreachable or rejects the credentials.
    #[allow(clippy::manual_async_fn)]
    fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<Self::Connection, GraphMiddlewareError>>;
}

/// An open connection. Dropping it releases the underlying driver resources.
pub trait GraphConnection {
    type Tx: ReadTransaction;

    /// Open a read transaction on `database`.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the session cannot be opened.
    #[allow(clippy::manual_async_fn)]
    fn begin_read(
        &self,
        database: &str,
    ) -> impl Future<Output = Result<Self::Tx, GraphMiddlewareError>>;

    /// Release the connection.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the driver reports a failure while closing.
    #[allow(clippy::manual_async_fn)]
    fn close(self) -> impl Future<Output = Result<(), GraphMiddlewareError>>;
}

/// A read transaction. Dropping it without `commit` or `rollback` releases it
/// and discards its work.
pub trait ReadTransaction {
    /// Submit the query text with its bound parameters.
    ///
    /// # Errors
    /// Returns `QueryError` if the database rejects the statement.
    #[allow(clippy::manual_async_fn)]
    fn execute(&mut self, query: &Query) -> impl Future<Output = Result<(), GraphMiddlewareError>>;

    /// Column names of the executed statement, when known before any record arrives.
    fn columns(&self) -> Option<Arc<Vec<String>>>;

    /// Next record of the executed statement, or `None` once drained.
    ///
    /// # Errors
    /// Returns `QueryError` for database runtime errors and `ConnectionError`
    /// if the connection drops while streaming.
    #[allow(clippy::manual_async_fn)]
    fn next_record(
        &mut self,
    ) -> impl Future<Output = Result<Option<Record>, GraphMiddlewareError>>;

    /// # Errors
    /// Returns an error if the commit is not acknowledged.
    #[allow(clippy::manual_async_fn)]
    fn commit(self) -> impl Future<Output = Result<(), GraphMiddlewareError>>;

    /// # Errors
    /// Returns an error if the rollback is not acknowledged.
    #[allow(clippy::manual_async_fn)]
    fn rollback(self) -> impl Future<Output = Result<(), GraphMiddlewareError>>;
}
