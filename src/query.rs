use std::collections::BTreeMap;

use crate::error::GraphMiddlewareError;
use crate::placeholders::{QueryScan, scan_query};
use crate::types::Value;

/// Procedures a read query may `CALL`. Any other procedure may write and is refused.
pub const READ_PROCEDURES: [&str; 12] = [
    "db.labels",
    "db.relationshipTypes",
    "db.propertyKeys",
    "db.info",
    "db.ping",
    "db.schema.visualization",
    "db.schema.nodeTypeProperties",
    "db.schema.relTypeProperties",
    "db.index.fulltext.queryNodes",
    "db.index.fulltext.queryRelationships",
    "db.index.vector.queryNodes",
    "dbms.components",
];

/// Query text plus named parameters.
///
/// ```rust
/// use graph_middleware::prelude::*;
///
/// let query = Query::new("MATCH (u:User {state: $state}) RETURN u.name AS name")
///     .param("state", "Texas");
/// assert_eq!(query.params().get("state"), Some(&Value::from("Texas")));
/// assert!(query.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    params: BTreeMap<String, Value>,
    columns: Option<Vec<String>>,
}

impl Query {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: BTreeMap::new(),
            columns: None,
        }
    }

    /// Bind a parameter; a later binding of the same name replaces the earlier one.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn params_from<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Name the result columns explicitly, in order.
    ///
    /// Only needed when the final `RETURN` projects `*` or the query ends in a
    /// procedure call; otherwise the columns are read from the `RETURN` clause.
    #[must_use]
    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    /// Result columns in order: the explicit ones, else those of the final `RETURN`.
    ///
    /// # Errors
    /// Returns `QueryError` if the text is malformed.
    pub fn result_columns(&self) -> Result<Option<Vec<String>>, GraphMiddlewareError> {
        match &self.columns {
            Some(columns) => Ok(Some(columns.clone())),
            None => Ok(scan_query(&self.text)?.columns),
        }
    }

    /// Client-side checks run before anything is sent to the database.
    ///
    /// # Errors
    /// Returns `QueryError` if the text is empty or malformed, contains a write
    /// clause, calls a procedure outside [`READ_PROCEDURES`], references a
    /// parameter that is not bound, or binds a parameter the text never references.
    pub fn validate(&self) -> Result<QueryScan, GraphMiddlewareError> {
        if self.text.trim().is_empty() {
            return Err(GraphMiddlewareError::QueryError(
                "query text is empty".to_string(),
            ));
        }

        let scan = scan_query(&self.text)?;

        if !scan.write_clauses.is_empty() {
            return Err(GraphMiddlewareError::QueryError(format!(
                "write clause {} is not allowed in a read transaction",
                scan.write_clauses.join(", ")
            )));
        }

        let writable: Vec<&str> = scan
            .procedures
            .iter()
            .map(String::as_str)
            .filter(|name| !READ_PROCEDURES.contains(name))
            .collect();
        if !writable.is_empty() {
            return Err(GraphMiddlewareError::QueryError(format!(
                "procedure(s) not known to be read-only: {}",
                writable.join(", ")
            )));
        }

        let missing: Vec<&str> = scan
            .parameters
            .iter()
            .filter(|name| !self.params.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(GraphMiddlewareError::QueryError(format!(
                "missing parameter(s): ${}",
                missing.join(", $")
            )));
        }

        let unused: Vec<&str> = self
            .params
            .keys()
            .filter(|name| !scan.parameters.contains(*name))
            .map(String::as_str)
            .collect();
        if !unused.is_empty() {
            return Err(GraphMiddlewareError::QueryError(format!(
                "parameter(s) not referenced by the query: {}",
                unused.join(", ")
            )));
        }

        Ok(scan)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::new(text)
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::new(text)
    }
}
