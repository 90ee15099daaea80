//! Custom error types for the common library
//!
//! Every failure raised while talking to PostgreSQL is expressed as a
//! [`DatabaseError`]. The `Display` output is what clients eventually see in
//! the `message` field of a failed response, so it stays human readable.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while opening or acquiring a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during plain query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A stored procedure call was rejected by the database
    #[error("Failed to execute stored procedure {procedure}: {source}")]
    Procedure {
        procedure: &'static str,
        #[source]
        source: SqlxError,
    },

    /// A stored procedure completed but left an output parameter empty
    #[error("{0} not returned from stored procedure.")]
    MissingOutput(&'static str),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
