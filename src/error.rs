//! API error types and their HTTP mapping.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::telemetry;

/// Broad classification of API failures, used for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    SignatureInvalid,
    TenantNotFound,
    MalformedPayload,
    PayloadTooLarge,
    Persistence,
    Internal,
}

impl ErrorType {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::SignatureInvalid => StatusCode::UNAUTHORIZED,
            Self::TenantNotFound => StatusCode::NOT_FOUND,
            Self::MalformedPayload => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Persistence | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An error surfaced to API clients as `{"error": "..."}` with an
/// appropriate status code.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub error_type: ErrorType,
    pub message: Box<str>,
}

impl ApiError {
    pub fn new(error_type: ErrorType, message: impl Into<Box<str>>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }

    pub fn signature_invalid() -> Self {
        Self::new(ErrorType::SignatureInvalid, "invalid webhook signature")
    }

    pub fn tenant_not_found(domain: &str) -> Self {
        Self::new(
            ErrorType::TenantNotFound,
            format!("no tenant registered for shop domain '{domain}'").into_boxed_str(),
        )
    }

    pub fn malformed(message: impl Into<Box<str>>) -> Self {
        Self::new(ErrorType::MalformedPayload, message)
    }

    pub fn internal(message: impl Into<Box<str>>) -> Self {
        Self::new(ErrorType::Internal, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error_type.status_code();
        if status.is_server_error() {
            tracing::error!(error_type = ?self.error_type, message = %self.message, "request failed");
        } else {
            tracing::warn!(error_type = ?self.error_type, message = %self.message, "request rejected");
        }

        let mut body = json!({ "error": self.message });
        if let Some(trace_id) = telemetry::current_trace_id() {
            body["trace_id"] = json!(trace_id);
        }

        (status, Json(body)).into_response()
    }
}

/// Errors raised by the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0}")]
    NotFound(String),
}

impl RepositoryError {
    pub fn database_error(err: DbErr) -> Self {
        Self::Database(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(db_err) => db_err.into(),
            RepositoryError::NotFound(message) => {
                Self::new(ErrorType::TenantNotFound, message.into_boxed_str())
            }
        }
    }
}

/// Whether a database error is a unique constraint violation. Used to treat
/// concurrent duplicate inserts as replays rather than failures.
pub fn is_unique_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Query(runtime_err) | DbErr::Exec(runtime_err) => {
            let text = runtime_err.to_string();
            text.contains("duplicate key value violates unique constraint")
                || text.contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::new(
            ErrorType::Persistence,
            format!("database operation failed: {err}").into_boxed_str(),
        )
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("internal error: {err}").into_boxed_str())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(format!("invalid JSON body: {rejection}").into_boxed_str())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(format!("invalid JSON body: {err}").into_boxed_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::signature_invalid().error_type.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::tenant_not_found("x.example").error_type.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::malformed("bad").error_type.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("boom").error_type.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unique_violation_detection() {
        let err = DbErr::Query(sea_orm::RuntimeErr::Internal(
            "UNIQUE constraint failed: customers.tenant_id, customers.external_customer_id"
                .to_string(),
        ));
        assert!(is_unique_violation(&err));

        let other = DbErr::Query(sea_orm::RuntimeErr::Internal("syntax error".to_string()));
        assert!(!is_unique_violation(&other));
    }
}
