//! Error types for taskdesk.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Request-level errors. Each variant maps to one HTTP status code and is
/// rendered as a `{"success": false, "error": ...}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required fields missing or blank.
    #[error("{0}")]
    Validation(String),

    /// Body could not be parsed as the expected JSON structure.
    #[error("Invalid JSON body: {0}")]
    MalformedPayload(String),

    /// Path segment is not a valid numeric id.
    #[error("Invalid ID format")]
    InvalidIdentifier,

    /// No matching record.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate unique field.
    #[error("{0}")]
    Conflict(String),

    /// Bad credentials or inactive account. One message for every failure
    /// mode so responses carry no user-existence oracle.
    #[error("Invalid username or password")]
    Unauthenticated,

    /// Store unavailable or query failure.
    #[error("Database error: {0}")]
    Store(DatabaseError),

    /// Anything uncaught.
    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            // A unique-constraint violation is the duplicate signal.
            DatabaseError::Constraint(msg) => ApiError::Conflict(msg),
            other => ApiError::Store(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedPayload(_) | ApiError::InvalidIdentifier => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Store(_) | ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        (
            status,
            Json(serde_json::json!({"success": false, "error": message})),
        )
            .into_response()
    }
}
