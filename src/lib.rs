//! Read-only query runner for Bolt graph databases.
//!
//! Open a connection, run one parameterized Cypher query inside a read
//! transaction, and get every record back as typed [`Value`]s:
//!
//! ```rust,no_run
//! use graph_middleware::prelude::*;
//!
//! # fn main() -> Result<(), GraphMiddlewareError> {
//! let config = ConnectionConfig::from_env()?;
//! let query = Query::new(
//!     "MATCH (u:User {state: $state})-[:WATCHED]->(m)-[:HAS]->(g:Genre)
//!      RETURN g.name AS genre, count(g) AS freq ORDER BY freq DESC",
//! )
//! .param("state", "Texas");
//!
//! for record in run_blocking(&config, &query)? {
//!     println!("{}", record.get_string("genre")?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
#[cfg(feature = "neo4j")]
pub mod neo4j;
pub mod placeholders;
pub mod prelude;
pub mod query;
pub mod results;
pub mod runner;
pub mod types;

pub use config::ConnectionConfig;
pub use error::GraphMiddlewareError;
pub use query::Query;
pub use results::{Record, ResultSet};
pub use runner::{QueryRunner, run_blocking_with, run_with};
#[cfg(feature = "neo4j")]
pub use runner::{run, run_blocking};
pub use types::Value;
