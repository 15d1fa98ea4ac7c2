//! Error types shared across the application.
//!
//! Every handler and store returns [`AppError`], which maps onto an HTTP
//! status and a JSON body at the edge of the router. Client mistakes (404,
//! 400, 409) keep their message; server faults are logged under a generated
//! error id and the response body only carries a generic message.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result type alias for handlers and stores.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was malformed (bad JSON, unparseable parameters).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// One or more request fields failed validation.
    #[error("Validation failed")]
    Validation {
        field_errors: HashMap<String, Vec<String>>,
    },

    /// The operation conflicts with existing records.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The database rejected or failed an operation.
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else that went wrong on our side.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), vec![message.into()]);
        Self::Validation { field_errors }
    }

    /// Attach another field error, converting `self` into a validation error
    /// if it is not one already.
    pub fn with_field_error(self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = match self {
            Self::Validation { field_errors } => field_errors,
            _ => HashMap::new(),
        };
        field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
        Self::Validation { field_errors }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for client responses.
    ///
    /// Client errors (4xx) keep their detail since the caller needs to know
    /// what went wrong. Server errors (5xx) collapse to a generic message so
    /// connection strings and query text never reach a client; the full
    /// error is logged server-side under the error id.
    fn safe_message(&self) -> String {
        match self {
            Self::NotFound(_)
            | Self::BadRequest(_)
            | Self::Validation { .. }
            | Self::Conflict(_) => self.to_string(),
            Self::Database(_) => "Database error".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Standard JSON body for error responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_id = Uuid::new_v4().to_string();

        // Full error message for server logs, not exposed to clients
        tracing::error!(
            status = status.as_u16(),
            error_id = %error_id,
            error = %self,
            "Request failed"
        );

        let error = self.safe_message();
        let field_errors = match self {
            Self::Validation { field_errors } => Some(field_errors),
            _ => None,
        };

        let body = ErrorResponse {
            error,
            error_id: Some(error_id),
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(msg) => Self::NotFound(if msg.is_empty() {
                "Record not found".to_string()
            } else {
                msg
            }),
            sea_orm::DbErr::Conn(inner) => Self::Database(format!("Connection error: {}", inner)),
            sea_orm::DbErr::Query(inner) => Self::Database(format!("Query error: {}", inner)),
            sea_orm::DbErr::Exec(inner) => Self::Database(format!("Execution error: {}", inner)),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = field_errors.entry(field.to_string()).or_default();
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                messages.push(message);
            }
        }
        Self::Validation { field_errors }
    }
}
