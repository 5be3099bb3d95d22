//! Common error types for ORA

use thiserror::Error;

/// Common result type for ORA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the ORA tools
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps mongodb::error::Error)
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Document could not be encoded to BSON
    #[error("BSON encode error: {0}")]
    BsonEncode(#[from] bson::ser::Error),

    /// Document returned by the database did not match the expected shape
    #[error("BSON decode error: {0}")]
    BsonDecode(#[from] bson::de::Error),

    /// CSV reading or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
