use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphMiddlewareError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatchError {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field not found in record: {0}")]
    MissingField(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cleanup (rollback or close) failed after an earlier error.
    #[error("{close}; initial error was: {initial}")]
    CloseError {
        close: Box<GraphMiddlewareError>,
        #[source]
        initial: Box<GraphMiddlewareError>,
    },
}

impl GraphMiddlewareError {
    /// True for errors caused by the endpoint, credentials or a dropped connection.
    ///
    /// A `CloseError` is classified by the error that started the failure.
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::CloseError { initial, .. } => initial.is_connection_error(),
            _ => false,
        }
    }

    /// True for malformed queries, parameter mismatches and database runtime errors.
    #[must_use]
    pub fn is_query_error(&self) -> bool {
        match self {
            Self::QueryError(_) => true,
            Self::CloseError { initial, .. } => initial.is_query_error(),
            _ => false,
        }
    }

    /// Combine a cleanup failure with the error that was already propagating.
    ///
    /// With no earlier error the cleanup error is returned on its own.
    #[must_use]
    pub fn after_close(close: GraphMiddlewareError, initial: Option<GraphMiddlewareError>) -> Self {
        match initial {
            Some(initial) => Self::CloseError {
                close: Box::new(close),
                initial: Box::new(initial),
            },
            None => close,
        }
    }
}
