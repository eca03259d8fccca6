//! Backend over the `neo4rs` Bolt driver.
//!
//! Errors are classified by phase: anything raised while connecting or
//! opening the transaction is a `ConnectionError`, anything raised while
//! executing or streaming the statement is a `QueryError`.

pub mod config;
pub mod params;
pub mod query;

use std::sync::Arc;

use neo4rs::{Graph, RowStream, Txn};
use tracing::debug;

use crate::backend::{GraphConnection, GraphConnector, ReadTransaction};
use crate::config::ConnectionConfig;
use crate::error::GraphMiddlewareError;
use crate::query::Query;
use crate::results::Record;

pub use config::build_config;
pub use params::{build_query, to_bolt};
pub use query::{row_to_record, row_to_sorted_record};

fn connection_error(err: neo4rs::Error) -> GraphMiddlewareError {
    GraphMiddlewareError::ConnectionError(err.to_string())
}

fn query_error(err: neo4rs::Error) -> GraphMiddlewareError {
    GraphMiddlewareError::QueryError(err.to_string())
}

/// Connects to a Bolt endpoint (`neo4j://`, `bolt://` and their TLS variants).
#[derive(Debug, Clone, Copy, Default)]
pub struct Neo4jConnector;

impl GraphConnector for Neo4jConnector {
    type Connection = Neo4jConnection;

    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<Neo4jConnection, GraphMiddlewareError> {
        let driver_config = build_config(config)?;
        let graph = Graph::connect(driver_config)
            .await
            .map_err(connection_error)?;
        debug!(uri = config.uri(), "bolt connection ready");
        Ok(Neo4jConnection { graph })
    }
}

/// An open `neo4rs` graph handle.
pub struct Neo4jConnection {
    graph: Graph,
}

impl GraphConnection for Neo4jConnection {
    type Tx = Neo4jTransaction;

    /// An unknown database is refused by the server at `BEGIN`, which makes it
    /// a `ConnectionError` like any other failure to open the session.
    async fn begin_read(&self, database: &str) -> Result<Neo4jTransaction, GraphMiddlewareError> {
        let txn = self
            .graph
            .start_txn_on(database)
            .await
            .map_err(connection_error)?;
        Ok(Neo4jTransaction {
            txn,
            stream: None,
            columns: None,
        })
    }

    async fn close(self) -> Result<(), GraphMiddlewareError> {
        // neo4rs releases its pooled connections when the graph handle drops.
        drop(self.graph);
        Ok(())
    }
}

pub struct Neo4jTransaction {
    txn: Txn,
    stream: Option<RowStream>,
    columns: Option<Arc<Vec<String>>>,
}

impl ReadTransaction for Neo4jTransaction {
    async fn execute(&mut self, query: &Query) -> Result<(), GraphMiddlewareError> {
        self.columns = query.result_columns()?.map(Arc::new);
        let stream = self
            .txn
            .execute(build_query(query))
            .await
            .map_err(query_error)?;
        self.stream = Some(stream);
        Ok(())
    }

    fn columns(&self) -> Option<Arc<Vec<String>>> {
        self.columns.clone()
    }

    async fn next_record(&mut self) -> Result<Option<Record>, GraphMiddlewareError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(GraphMiddlewareError::QueryError(
                "no statement has been executed in this transaction".to_string(),
            ));
        };
        let Some(row) = stream.next(self.txn.handle()).await.map_err(query_error)? else {
            return Ok(None);
        };
        match &self.columns {
            Some(columns) => row_to_record(&row, columns).map(Some),
            None => row_to_sorted_record(&row).map(Some),
        }
    }

    async fn commit(self) -> Result<(), GraphMiddlewareError> {
        let Self { txn, stream, .. } = self;
        drop(stream);
        txn.commit().await.map_err(query_error)
    }

    async fn rollback(self) -> Result<(), GraphMiddlewareError> {
        let Self { txn, stream, .. } = self;
        drop(stream);
        txn.rollback().await.map_err(connection_error)
    }
}
