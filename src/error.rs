use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Result type for trivia state operations
pub type TriviaResult<T> = Result<T, TriviaError>;

/// Errors raised by state operations. Permission and validation errors are
/// always raised before anything is written.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TriviaError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Import failed at row {row}: {message}")]
    Import { row: usize, message: String },
}

impl TriviaError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn transition(from: impl std::fmt::Debug, to: impl std::fmt::Debug) -> Self {
        Self::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            TriviaError::NotFound { .. } => "NOT_FOUND",
            TriviaError::PermissionDenied(_) => "PERMISSION_DENIED",
            TriviaError::Validation(_) => "VALIDATION_ERROR",
            TriviaError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            TriviaError::InvalidTransition { .. } => "INVALID_TRANSITION",
            TriviaError::Import { .. } => "IMPORT_FAILED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            TriviaError::NotFound { .. } => StatusCode::NOT_FOUND,
            TriviaError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            TriviaError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TriviaError::ConstraintViolation(_) | TriviaError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            TriviaError::Import { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for TriviaError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code(),
            "msg": self.to_string(),
        });
        (self.status_code(), axum::Json(body)).into_response()
    }
}
