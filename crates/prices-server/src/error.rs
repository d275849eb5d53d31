//! Server-level error types
//!
//! Feature routes map their own errors; this type covers the handlers that
//! live outside a feature slice.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unavailable(ref message) => {
                tracing::error!("Service unavailable: {}", message);
                (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message.clone())
            },
            AppError::Config(ref message) => {
                tracing::error!("Configuration error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "Server configuration error".to_string(),
                )
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Sqlx(e) => AppError::Unavailable(e.to_string()),
            crate::db::DbError::Config(msg) => AppError::Config(msg),
        }
    }
}
