use tracing::{debug, warn};

use crate::backend::{GraphConnection, GraphConnector, ReadTransaction};
use crate::config::ConnectionConfig;
use crate::error::GraphMiddlewareError;
use crate::query::Query;
use crate::results::ResultSet;

/// Runs read-only queries over one connection.
///
/// Every [`QueryRunner::run`] opens its own read transaction and finishes it
/// (commit on success, rollback on failure) before returning, so no state is
/// shared between calls. [`QueryRunner::close`] consumes the runner; dropping
/// it releases the connection as well.
pub struct QueryRunner<C: GraphConnection> {
    connection: C,
    database: String,
}

impl<C: GraphConnection> QueryRunner<C> {
    /// Wrap an already open connection.
    #[must_use]
    pub fn new(connection: C, database: impl Into<String>) -> Self {
        Self {
            connection,
            database: database.into(),
        }
    }

    /// Connect with `connector` and bind the runner to the configured database.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the endpoint is unreachable or rejects the credentials.
    pub async fn connect<K>(
        connector: &K,
        config: &ConnectionConfig,
    ) -> Result<Self, GraphMiddlewareError>
    where
        K: GraphConnector<Connection = C>,
    {
        debug!(uri = config.uri(), database = config.database(), "connecting");
        let connection = connector.connect(config).await?;
        Ok(Self::new(connection, config.database()))
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Run `query` in a read transaction and return every record it produced.
    ///
    /// The query is validated before anything is sent. Records are drained in
    /// full before the transaction commits; on any failure the transaction is
    /// rolled back and no records are returned.
    ///
    /// # Errors
    /// Returns `QueryError` for invalid queries and database runtime errors,
    /// `ConnectionError` if the session cannot be opened or the connection
    /// drops, and `CloseError` if rollback fails after an earlier error.
    pub async fn run(&self, query: &Query) -> Result<ResultSet, GraphMiddlewareError> {
        let scan = query.validate()?;
        debug!(
            database = %self.database,
            parameters = scan.parameters.len(),
            "running read query"
        );

        let mut tx = self.connection.begin_read(&self.database).await?;
        match drain(&mut tx, query).await {
            Ok(result_set) => {
                tx.commit().await?;
                debug!(records = result_set.len(), "read transaction committed");
                Ok(result_set)
            }
            Err(err) => {
                debug!(error = %err, "rolling back read transaction");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                    return Err(GraphMiddlewareError::after_close(rollback_err, Some(err)));
                }
                Err(err)
            }
        }
    }

    /// Open and roll back an empty read transaction.
    ///
    /// # Errors
    /// Returns `ConnectionError` if the endpoint, credentials or database are not usable.
    pub async fn verify_connectivity(&self) -> Result<(), GraphMiddlewareError> {
        let tx = self.connection.begin_read(&self.database).await?;
        tx.rollback().await
    }

    /// Release the connection.
    ///
    /// # Errors
    /// Returns the backend's error if closing fails.
    pub async fn close(self) -> Result<(), GraphMiddlewareError> {
        debug!(database = %self.database, "closing connection");
        self.connection.close().await
    }
}

async fn drain<T: ReadTransaction>(
    tx: &mut T,
    query: &Query,
) -> Result<ResultSet, GraphMiddlewareError> {
    tx.execute(query).await?;
    let mut result_set = ResultSet::default();
    if let Some(columns) = tx.columns() {
        result_set.set_column_names(columns);
    }
    while let Some(record) = tx.next_record().await? {
        result_set.push(record);
    }
    Ok(result_set)
}

/// Connect, run one query, close.
///
/// Validation happens before connecting. The connection is closed on every
/// path; a close failure is reported together with any earlier error.
///
/// # Errors
/// See [`QueryRunner::connect`] and [`QueryRunner::run`].
pub async fn run_with<K: GraphConnector>(
    connector: &K,
    config: &ConnectionConfig,
    query: &Query,
) -> Result<ResultSet, GraphMiddlewareError> {
    query.validate()?;
    let runner = QueryRunner::connect(connector, config).await?;
    let outcome = runner.run(query).await;
    match runner.close().await {
        Ok(()) => outcome,
        Err(close_err) => {
            warn!(error = %close_err, "closing connection failed");
            Err(GraphMiddlewareError::after_close(close_err, outcome.err()))
        }
    }
}

/// Blocking form of [`run_with`], driven on a private current-thread runtime.
///
/// # Errors
/// See [`run_with`]; also `ConnectionError` if called from inside an async
/// runtime (use [`run_with`] there) or if the runtime cannot be started.
pub fn run_blocking_with<K: GraphConnector>(
    connector: &K,
    config: &ConnectionConfig,
    query: &Query,
) -> Result<ResultSet, GraphMiddlewareError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(GraphMiddlewareError::ConnectionError(
            "blocking run called from inside an async runtime; await `run_with` instead"
                .to_string(),
        ));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            GraphMiddlewareError::ConnectionError(format!("failed to start runtime: {e}"))
        })?;
    runtime.block_on(run_with(connector, config, query))
}

/// [`run_with`] against a Bolt endpoint through `neo4rs`.
///
/// # Errors
/// See [`run_with`].
#[cfg(feature = "neo4j")]
pub async fn run(
    config: &ConnectionConfig,
    query: &Query,
) -> Result<ResultSet, GraphMiddlewareError> {
    run_with(&crate::neo4j::Neo4jConnector, config, query).await
}

/// [`run_blocking_with`] against a Bolt endpoint through `neo4rs`.
///
/// # Errors
/// See [`run_with`].
#[cfg(feature = "neo4j")]
pub fn run_blocking(
    config: &ConnectionConfig,
    query: &Query,
) -> Result<ResultSet, GraphMiddlewareError> {
    run_blocking_with(&crate::neo4j::Neo4jConnector, config, query)
}
