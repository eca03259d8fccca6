use std::fmt;

use crate::error::GraphMiddlewareError;

/// Database selected when none is configured.
pub const DEFAULT_DATABASE: &str = "neo4j";

/// URI schemes understood by Bolt drivers.
pub const SUPPORTED_SCHEMES: [&str; 6] = [
    "neo4j",
    "neo4j+s",
    "neo4j+ssc",
    "bolt",
    "bolt+s",
    "bolt+ssc",
];

pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// Where and as whom to connect. Immutable once built.
///
/// ```rust
/// use graph_middleware::prelude::*;
///
/// let config = ConnectionConfig::builder()
///     .uri("neo4j://localhost:7687")
///     .credentials("neo4j", "secret")
///     .database("movies")
///     .build()
///     .unwrap();
/// assert_eq!(config.database(), "movies");
/// assert!(!format!("{config:?}").contains("secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    uri: String,
    username: String,
    password: String,
    database: String,
    fetch_size: Option<usize>,
}

impl ConnectionConfig {
    #[must_use]
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::default()
    }

    /// Shorthand for the common case of URI, credentials and database.
    ///
    /// # Errors
    /// Returns `ConfigError` if any field fails validation.
    pub fn new(
        uri: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Result<Self, GraphMiddlewareError> {
        Self::builder()
            .uri(uri)
            .credentials(username, password)
            .database(database)
            .build()
    }

    /// Read `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD` and `NEO4J_DATABASE`.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, GraphMiddlewareError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ConnectionConfig::from_env`] with an injectable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError` if a required key is missing or invalid.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, GraphMiddlewareError> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| {
                GraphMiddlewareError::ConfigError(format!("{key} is required"))
            })
        };
        let mut builder = Self::builder()
            .uri(required(ENV_URI)?)
            .credentials(required(ENV_USERNAME)?, required(ENV_PASSWORD)?);
        if let Some(database) = lookup(ENV_DATABASE) {
            builder = builder.database(database);
        }
        builder.build()
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn fetch_size(&self) -> Option<usize> {
        self.fetch_size
    }

    /// The URI scheme, e.g. `neo4j` or `bolt+s`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.uri.split_once("://").map_or("", |(scheme, _)| scheme)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionConfigBuilder {
    uri: Option<String>,
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    fetch_size: Option<usize>,
}

impl ConnectionConfigBuilder {
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Number of records the driver pulls per round trip.
    #[must_use]
    pub fn fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = Some(fetch_size);
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    /// Returns `ConfigError` if the URI, username or database is missing or
    /// empty, the URI scheme is not a Bolt scheme, or the fetch size is zero.
    pub fn build(self) -> Result<ConnectionConfig, GraphMiddlewareError> {
        let uri = non_empty(self.uri, "uri")?;
        let username = non_empty(self.username, "username")?;
        let password = self.password.unwrap_or_default();
        let database = match self.database {
            Some(database) => non_empty(Some(database), "database")?,
            None => DEFAULT_DATABASE.to_string(),
        };

        let Some((scheme, rest)) = uri.split_once("://") else {
            return Err(GraphMiddlewareError::ConfigError(format!(
                "uri `{uri}` has no scheme"
            )));
        };
        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(GraphMiddlewareError::ConfigError(format!(
                "unsupported uri scheme `{scheme}`, expected one of {}",
                SUPPORTED_SCHEMES.join(", ")
            )));
        }
        if rest.is_empty() {
            return Err(GraphMiddlewareError::ConfigError(format!(
                "uri `{uri}` has no host"
            )));
        }
        if self.fetch_size == Some(0) {
            return Err(GraphMiddlewareError::ConfigError(
                "fetch_size must be greater than zero".to_string(),
            ));
        }

        Ok(ConnectionConfig {
            uri,
            username,
            password,
            database,
            fetch_size: self.fetch_size,
        })
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String, GraphMiddlewareError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GraphMiddlewareError::ConfigError(format!(
            "{field} is required"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_database() {
        let config = ConnectionConfig::builder()
            .uri("bolt://localhost:7687")
            .credentials("neo4j", "secret")
            .build()
            .unwrap();
        assert_eq!(config.database(), DEFAULT_DATABASE);
        assert_eq!(config.scheme(), "bolt");
        assert_eq!(config.fetch_size(), None);
    }

    #[test]
    fn rejects_missing_and_invalid_fields() {
        let cases = [
            ConnectionConfig::builder().credentials("neo4j", "secret"),
            ConnectionConfig::builder().uri("bolt://localhost:7687"),
            ConnectionConfig::builder()
                .uri("http://localhost:7474")
                .credentials("neo4j", "secret"),
            ConnectionConfig::builder()
                .uri("localhost:7687")
                .credentials("neo4j", "secret"),
            ConnectionConfig::builder()
                .uri("neo4j://")
                .credentials("neo4j", "secret"),
            ConnectionConfig::builder()
                .uri("neo4j://localhost")
                .credentials("neo4j", "secret")
                .database("  "),
            ConnectionConfig::builder()
                .uri("neo4j://localhost")
                .credentials("neo4j", "secret")
                .fetch_size(0),
        ];
        for builder in cases {
            let err = builder.clone().build().unwrap_err();
            assert!(
                matches!(err, GraphMiddlewareError::ConfigError(_)),
                "{builder:?} -> {err}"
            );
        }
    }

    #[test]
    fn lookup_reads_all_keys() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_URI, "neo4j+s://demo.example.com:7687"),
            (ENV_USERNAME, "reader"),
            (ENV_PASSWORD, "pw"),
            (ENV_DATABASE, "movies"),
        ]);
        let config =
            ConnectionConfig::from_lookup(|key| env.get(key).map(ToString::to_string)).unwrap();
        assert_eq!(config.uri(), "neo4j+s://demo.example.com:7687");
        assert_eq!(config.username(), "reader");
        assert_eq!(config.password(), "pw");
        assert_eq!(config.database(), "movies");
    }

    #[test]
    fn lookup_requires_uri() {
        let err = ConnectionConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: NEO4J_URI is required");
    }

    #[test]
    fn debug_redacts_password() {
        let config =
            ConnectionConfig::new("neo4j://localhost", "neo4j", "hunter2", "neo4j").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
