//! Custom error types for the dispatcher service
//!
//! Every failure, whatever its origin, reaches the client as the same JSON
//! envelope: `{"success": false, "message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::{Value, json};
use thiserror::Error;

use crate::session::SessionError;

/// Custom error type for the dispatcher service
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request did not use POST
    #[error("Invalid request method. Please use POST.")]
    InvalidRequestMethod,

    /// The body carried no usable `method` field
    #[error("'method' parameter is required.")]
    MissingMethod,

    /// `method` named an operation that does not exist
    #[error("Unknown method '{0}'.")]
    UnknownMethod(String),

    /// A required field was absent or malformed
    #[error("{0}")]
    Validation(String),

    /// A stored procedure call failed
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The session backend failed
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::InvalidRequestMethod => StatusCode::METHOD_NOT_ALLOWED,
            // Clients key off `success`, not the status line.
            _ => StatusCode::OK,
        }
    }
}

/// The JSON failure envelope
pub fn failure_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({
        "success": false,
        "message": message.into(),
    }))
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        (self.status(), failure_body(self.to_string())).into_response()
    }
}

/// Type alias for dispatcher results
pub type DispatchResult<T> = Result<T, DispatchError>;
