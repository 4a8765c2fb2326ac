use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Request-level failures, mapped 1:1 to HTTP responses at the handler
/// boundary. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid data")]
    Validation(Vec<String>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Payment processor error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    /// Collapses a unique-constraint violation into the conflict the
    /// pre-insert check reports, closing the race between check and insert.
    pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => ApiError::Conflict(message.to_string()),
            _ => ApiError::Database(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => {
                json!({ "message": "Invalid data", "errors": errors })
            }
            ApiError::Unauthorized => json!({ "message": "Unauthorized" }),
            ApiError::Forbidden => json!({ "message": "Forbidden" }),
            ApiError::NotFound(what) => json!({ "message": format!("{what} not found") }),
            ApiError::Conflict(message) => json!({ "message": message }),
            // Internal detail stays in the server log.
            ApiError::Upstream(detail) => {
                log::error!("Upstream failure: {detail}");
                json!({ "message": "Something went wrong, please try again." })
            }
            ApiError::Database(err) => {
                log::error!("Database failure: {err}");
                json!({ "message": "Something went wrong, please try again." })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Service").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("dup".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Upstream("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
