use neo4rs::{Config, ConfigBuilder};

use crate::config::ConnectionConfig;
use crate::error::GraphMiddlewareError;

/// Translate a validated [`ConnectionConfig`] into the driver's configuration.
///
/// # Errors
/// Returns `ConfigError` if `neo4rs` rejects the configuration.
pub fn build_config(config: &ConnectionConfig) -> Result<Config, GraphMiddlewareError> {
    let mut builder = ConfigBuilder::default()
        .uri(config.uri())
        .user(config.username())
        .password(config.password())
        .db(config.database());
    if let Some(fetch_size) = config.fetch_size() {
        builder = builder.fetch_size(fetch_size);
    }
    builder.build().map_err(|e| {
        GraphMiddlewareError::ConfigError(format!("neo4rs rejected the configuration: {e}"))
    })
}
