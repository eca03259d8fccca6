//! In-process backend answering queries from registered fixtures.
//!
//! It does not evaluate Cypher. A statement is matched on its text (with
//! whitespace collapsed); when the bound parameters also match, the fixture's
//! rows are streamed, otherwise the result is empty. Open connections and
//! transactions are counted so callers can check that everything was released.
//!
//! ```rust
//! use graph_middleware::memory::{Fixture, MemoryGraph};
//! use graph_middleware::prelude::*;
//!
//! let graph = MemoryGraph::new().with_fixture(
//!     Fixture::new("MATCH (g:Genre) RETURN g.name AS genre")
//!         .columns(["genre"])
//!         .row(["Drama"]),
//! );
//! let config = ConnectionConfig::new("bolt://localhost:7687", "neo4j", "pw", "neo4j").unwrap();
//! let query = Query::new("MATCH (g:Genre) RETURN g.name AS genre");
//! let result = run_blocking_with(&graph, &config, &query).unwrap();
//! assert_eq!(result.column_strings("genre").unwrap(), ["Drama"]);
//! assert_eq!(graph.open_connections(), 0);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{GraphConnection, GraphConnector, ReadTransaction};
use crate::config::{ConnectionConfig, DEFAULT_DATABASE};
use crate::error::GraphMiddlewareError;
use crate::query::Query;
use crate::results::Record;
use crate::types::Value;

/// Canned answer for one statement.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    text: String,
    params: BTreeMap<String, Value>,
    columns: Arc<Vec<String>>,
    rows: Vec<Vec<Value>>,
    failure: Option<String>,
    disconnect_after: Option<usize>,
}

impl Fixture {
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            text: normalize(text),
            ..Self::default()
        }
    }

    /// Parameter value the statement must be called with for rows to be returned.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Arc::new(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn row<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Make the database reject the statement at execution time.
    #[must_use]
    pub fn fails_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Drop the connection after `records` records have been streamed.
    #[must_use]
    pub fn disconnect_after(mut self, records: usize) -> Self {
        self.disconnect_after = Some(records);
        self
    }
}

#[derive(Debug)]
struct MemoryState {
    users: HashMap<String, String>,
    databases: BTreeSet<String>,
    fixtures: Vec<Fixture>,
    reachable: bool,
    open_connections: usize,
    open_transactions: usize,
    statements_executed: usize,
}

/// Shared handle to an in-process graph. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct MemoryGraph {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraph {
    /// A reachable graph with the default database and no fixtures.
    ///
    /// Any credentials are accepted until a user is registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                users: HashMap::new(),
                databases: BTreeSet::from([DEFAULT_DATABASE.to_string()]),
                fixtures: Vec::new(),
                reachable: true,
                open_connections: 0,
                open_transactions: 0,
                statements_executed: 0,
            })),
        }
    }

    #[must_use]
    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.lock()
            .users
            .insert(username.to_string(), password.to_string());
        self
    }

    #[must_use]
    pub fn with_database(self, database: &str) -> Self {
        self.lock().databases.insert(database.to_string());
        self
    }

    #[must_use]
    pub fn with_fixture(self, fixture: Fixture) -> Self {
        self.lock().fixtures.push(fixture);
        self
    }

    /// Toggle whether the endpoint accepts connections and traffic.
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Tear the endpoint down; in-flight operations fail with `ConnectionError`.
    pub fn shutdown(&self) {
        self.set_reachable(false);
    }

    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.lock().open_connections
    }

    #[must_use]
    pub fn open_transactions(&self) -> usize {
        self.lock().open_transactions
    }

    /// Statements that reached the database (client-side rejections excluded).
    #[must_use]
    pub fn statements_executed(&self) -> usize {
        self.lock().statements_executed
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    match state.lock() {
        Ok(guard) => guard,
        // A panicking test thread must not hide the counters from the others.
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ensure_reachable(state: &MemoryState) -> Result<(), GraphMiddlewareError> {
    if state.reachable {
        Ok(())
    } else {
        Err(GraphMiddlewareError::ConnectionError(
            "connection to the graph was closed".to_string(),
        ))
    }
}

impl GraphConnector for MemoryGraph {
    type Connection = MemoryConnection;

    async fn connect(
        &self,
        config: &ConnectionConfig,
    ) -> Result<MemoryConnection, GraphMiddlewareError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(GraphMiddlewareError::ConnectionError(format!(
                "cannot reach {}",
                config.uri()
            )));
        }
        if !state.users.is_empty()
            && state.users.get(config.username()).map(String::as_str) != Some(config.password())
        {
            return Err(GraphMiddlewareError::ConnectionError(format!(
                "authentication rejected for user `{}`",
                config.username()
            )));
        }
        state.open_connections += 1;
        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
        })
    }
}

/// Connection to a [`MemoryGraph`]; released when dropped.
#[derive(Debug)]
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.open_connections = state.open_connections.saturating_sub(1);
    }
}

impl GraphConnection for MemoryConnection {
    type Tx = MemoryTransaction;

    async fn begin_read(&self, database: &str) -> Result<MemoryTransaction, GraphMiddlewareError> {
        let mut state = lock_state(&self.state);
        ensure_reachable(&state)?;
        if !state.databases.contains(database) {
            return Err(GraphMiddlewareError::ConnectionError(format!(
                "database `{database}` does not exist"
            )));
        }
        state.open_transactions += 1;
        Ok(MemoryTransaction {
            state: Arc::clone(&self.state),
            columns: Arc::new(Vec::new()),
            pending: VecDeque::new(),
            delivered: 0,
            disconnect_after: None,
        })
    }

    async fn close(self) -> Result<(), GraphMiddlewareError> {
        drop(self);
        Ok(())
    }
}

/// Read transaction on a [`MemoryGraph`]; released when dropped.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    columns: Arc<Vec<String>>,
    pending: VecDeque<Vec<Value>>,
    delivered: usize,
    disconnect_after: Option<usize>,
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.open_transactions = state.open_transactions.saturating_sub(1);
    }
}

impl ReadTransaction for MemoryTransaction {
    async fn execute(&mut self, query: &Query) -> Result<(), GraphMiddlewareError> {
        let mut state = lock_state(&self.state);
        ensure_reachable(&state)?;
        state.statements_executed += 1;

        let text = normalize(query.text());
        let Some(fixture) = state.fixtures.iter().find(|fixture| fixture.text == text) else {
            return Err(GraphMiddlewareError::QueryError(format!(
                "statement not recognized: {text}"
            )));
        };
        if let Some(message) = &fixture.failure {
            return Err(GraphMiddlewareError::QueryError(message.clone()));
        }

        self.columns = Arc::clone(&fixture.columns);
        self.disconnect_after = fixture.disconnect_after;
        self.delivered = 0;
        self.pending = if fixture.params == *query.params() {
            fixture.rows.iter().cloned().collect()
        } else {
            VecDeque::new()
        };
        Ok(())
    }

    fn columns(&self) -> Option<Arc<Vec<String>>> {
        if self.columns.is_empty() {
            None
        } else {
            Some(Arc::clone(&self.columns))
        }
    }

    async fn next_record(&mut self) -> Result<Option<Record>, GraphMiddlewareError> {
        ensure_reachable(&lock_state(&self.state))?;
        if self.disconnect_after.is_some_and(|limit| self.delivered >= limit) {
            return Err(GraphMiddlewareError::ConnectionError(
                "connection dropped while streaming records".to_string(),
            ));
        }
        let Some(values) = self.pending.pop_front() else {
            return Ok(None);
        };
        self.delivered += 1;
        Record::new(Arc::clone(&self.columns), values).map(Some)
    }

    async fn commit(self) -> Result<(), GraphMiddlewareError> {
        let state = lock_state(&self.state);
        ensure_reachable(&state)
    }

    async fn rollback(self) -> Result<(), GraphMiddlewareError> {
        let state = lock_state(&self.state);
        ensure_reachable(&state)
    }
}
