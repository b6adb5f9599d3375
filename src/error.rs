use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlGatewayError {
    #[error(transparent)]
    PostgresError(#[from] postgres::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Statement handle invalidated: {0}")]
    HandleInvalidated(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),
}
