//! Convenient imports for common functionality.

pub use crate::backend::{GraphConnection, GraphConnector, ReadTransaction};
pub use crate::config::{ConnectionConfig, ConnectionConfigBuilder};
pub use crate::error::GraphMiddlewareError;
pub use crate::query::Query;
pub use crate::results::{Record, ResultSet};
pub use crate::runner::{QueryRunner, run_blocking_with, run_with};
pub use crate::types::Value;

#[cfg(feature = "neo4j")]
pub use crate::neo4j::Neo4jConnector;
#[cfg(feature = "neo4j")]
pub use crate::runner::{run, run_blocking};
