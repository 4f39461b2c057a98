use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::metrics::CatalogMetrics;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Admin secret mismatch")]
    Unauthorized,

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        CatalogError::NotFound(format!("{entity} {id} not found"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Conflict(_) | CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        // Constraint failures are the storage engine refusing an orphaning write
        if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
            if err.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = msg.clone().unwrap_or_else(|| err.to_string());
                return CatalogError::Conflict(format!("Constraint violated: {detail}"));
            }
        }
        CatalogError::Database {
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        CatalogError::Validation(rejection.body_text())
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        CatalogMetrics::record_error_response(status);
        let body = match &self {
            CatalogError::Unauthorized => "Not authorized".to_string(),
            e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                error!("Request failed: {}", e);
                format!("Unexpected error: {e}")
            }
            e => e.to_string(),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(CatalogError::not_found("Lecture", 3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            CatalogError::Conflict("busy".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(CatalogError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            CatalogError::Database { message: "disk".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(CatalogError::not_found("Subject", 9).to_string(), "Subject 9 not found");
    }
}
