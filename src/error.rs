use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, ErrorBody};

pub type AppResult<T> = Result<T, AppError>;

/// One entry of the field-level detail list attached to
/// `INVALID_QUERY` / `VALIDATION_ERROR` responses.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid query parameters")]
    InvalidQuery(Vec<FieldError>),
    #[error("{0}")]
    InvalidDates(String),
    #[error("{0}")]
    InvalidCapacity(String),
    #[error("{0}")]
    CapacityExceeded(String),
    #[error("{0}")]
    DriverUnavailable(String),
    #[error("{0}")]
    TripCancelled(String),
    #[error("{0}")]
    FetchFailed(String),
    #[error("{0}")]
    CreationFailed(String),
    #[error("{0}")]
    OperationFailed(String),
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Internal(String),
    #[error("database error")]
    Db(#[from] DbErr),
}

impl AppError {
    /// Stable machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "VALIDATION_ERROR",
            AppError::InvalidQuery(_) => "INVALID_QUERY",
            AppError::InvalidDates(_) => "INVALID_DATES",
            AppError::InvalidCapacity(_) => "INVALID_CAPACITY",
            AppError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            AppError::DriverUnavailable(_) => "DRIVER_UNAVAILABLE",
            AppError::TripCancelled(_) => "TRIP_CANCELLED",
            AppError::FetchFailed(_) => "FETCH_FAILED",
            AppError::CreationFailed(_) => "CREATION_FAILED",
            AppError::OperationFailed(_) | AppError::Db(_) => "OPERATION_FAILED",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_)
            | AppError::CapacityExceeded(_)
            | AppError::DriverUnavailable(_)
            | AppError::TripCancelled(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_)
            | AppError::InvalidQuery(_)
            | AppError::InvalidDates(_)
            | AppError::InvalidCapacity(_) => StatusCode::BAD_REQUEST,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::FetchFailed(_)
            | AppError::CreationFailed(_)
            | AppError::OperationFailed(_)
            | AppError::Internal(_)
            | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Collaborator failures get a generic client message; the verbose
    /// detail stays in the server log (and in debug builds).
    fn client_message(&self) -> String {
        match self {
            AppError::Db(e) => {
                if cfg!(debug_assertions) {
                    format!("database error: {e}")
                } else {
                    "database operation failed".to_string()
                }
            }
            AppError::Internal(msg) => {
                if cfg!(debug_assertions) {
                    msg.clone()
                } else {
                    "internal server error".to_string()
                }
            }
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::InvalidQuery(fields) => serde_json::to_value(fields).ok(),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Db(e) => {
                tracing::error!(error = %e, "database operation failed");
            }
            AppError::FetchFailed(msg)
            | AppError::CreationFailed(msg)
            | AppError::OperationFailed(msg)
            | AppError::Network(msg)
            | AppError::Internal(msg) => {
                tracing::error!(%msg, code = self.code(), "request failed");
            }
            _ => {}
        }

        let body = ApiResponse::<()>::error(ErrorBody {
            code: self.code().to_string(),
            message: self.client_message(),
            details: self.details(),
        });

        (self.status(), Json(body)).into_response()
    }
}
