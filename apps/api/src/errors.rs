use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::guard::FlashCategory;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Denials carry the message category and the safe redirect target alongside
/// the message itself; the front end surfaces all three. Redirects always
/// point away from the resource that denied access, so a client following
/// them cannot loop.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("{message}")]
    AuthorizationDenied {
        message: String,
        category: FlashCategory,
        redirect: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You have already applied for this job.")]
    DuplicateApplication,

    #[error("This job is no longer accepting applications.")]
    JobNotAcceptingApplications,

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, category, redirect) = match &self {
            AppError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "AUTHENTICATION_REQUIRED",
                "Please log in to access this page.".to_string(),
                FlashCategory::Warning,
                "/login",
            ),
            AppError::AuthorizationDenied {
                message,
                category,
                redirect,
            } => (
                StatusCode::FORBIDDEN,
                "AUTHORIZATION_DENIED",
                message.clone(),
                *category,
                *redirect,
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
                FlashCategory::Warning,
                "/",
            ),
            AppError::DuplicateApplication => (
                StatusCode::CONFLICT,
                "DUPLICATE_APPLICATION",
                self.to_string(),
                FlashCategory::Warning,
                "/jobseeker/applications",
            ),
            AppError::JobNotAcceptingApplications => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "JOB_NOT_ACCEPTING",
                self.to_string(),
                FlashCategory::Danger,
                "/jobseeker/jobs",
            ),
            AppError::InvalidTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_TRANSITION",
                msg.clone(),
                FlashCategory::Warning,
                "/",
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                FlashCategory::Danger,
                "/",
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    FlashCategory::Danger,
                    "/",
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                    FlashCategory::Danger,
                    "/",
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    FlashCategory::Danger,
                    "/",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "category": category,
                "redirect": redirect
            }
        }));

        (status, body).into_response()
    }
}

/// Maps a unique-constraint violation on (job_id, jobseeker_id) to
/// `DuplicateApplication`; everything else passes through as a database error.
pub fn map_duplicate_application(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::DuplicateApplication;
        }
    }
    AppError::Database(e)
}
