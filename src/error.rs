//! Error types for the weather logging backend.
//!
//! Each layer owns a small typed error (`ValidationError`, `StorageError`,
//! `AuthError`, `ExportError`). Route handlers return [`AppError`], which
//! aggregates them and decides the HTTP status and JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// ---

/// One offending field of a rejected submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Malformed or out-of-range input. Never reaches the store.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {}", describe(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Names of the violating fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Persistence failures surfaced by the record store adapters.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate value: {0}")]
    Duplicate(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("invalid credentials")]
    InvalidCredentials,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv writer error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("xlsx writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Top-level error returned by route handlers and services.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        // ---
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::Duplicate(_)) => StatusCode::CONFLICT,
            AppError::Storage(_) | AppError::Export(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldViolation>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // ---
        let status = self.status();

        // Internal details stay in the log, the client gets a generic message.
        let body = match &self {
            AppError::Validation(e) => ErrorBody {
                error: e.to_string(),
                fields: Some(e.violations.clone()),
            },
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Request failed: {}", self);
                ErrorBody {
                    error: "Internal server error".to_string(),
                    fields: None,
                }
            }
            _ => ErrorBody {
                error: self.to_string(),
                fields: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn validation_message_lists_fields() {
        // ---
        let err = ValidationError {
            violations: vec![
                FieldViolation::new("temperature", "must be between -50 and 60"),
                FieldViolation::new("location", "is required"),
            ],
        };

        assert_eq!(err.fields(), vec!["temperature", "location"]);
        assert_eq!(
            err.to_string(),
            "validation failed: temperature must be between -50 and 60; location is required"
        );
    }

    #[test]
    fn status_mapping() {
        // ---
        let validation = AppError::from(ValidationError { violations: vec![] });
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let auth = AppError::from(AuthError::MissingToken);
        assert_eq!(auth.status(), StatusCode::UNAUTHORIZED);

        let duplicate = AppError::from(StorageError::Duplicate("email".into()));
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let down = AppError::from(StorageError::Unavailable("offline".into()));
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = AppError::NotFound("user".into());
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
