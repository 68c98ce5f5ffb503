use thiserror::Error;

/// Application-wide error types for Ergon.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration is missing or malformed.
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Database or table creation failed.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// An ingestion record is malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A write failed mid-batch; records committed before the failure persist.
    #[error("Ingestion error: {0}")]
    IngestionError(String),

    /// A read query or its connection failed.
    #[error("Query error: {0}")]
    QueryError(String),
}
