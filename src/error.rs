//! Web-layer errors and their HTTP responses.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DbLockError;
use crate::filters;
use crate::memorize::SessionError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Lock(#[from] DbLockError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Session(e) => match e {
                SessionError::ChapterNotFound(_) | SessionError::SessionNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                SessionError::AlreadyCompleted(_)
                | SessionError::NotCompleted(_)
                | SessionError::OutOfOrder { .. }
                | SessionError::VerseOutOfRange { .. } => StatusCode::CONFLICT,
                SessionError::EmptyChapter(_) => StatusCode::UNPROCESSABLE_ENTITY,
                SessionError::Grade(_) | SessionError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable identifier for API clients
    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNPROCESSABLE_ENTITY => "INVALID_CONTENT",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message shown to the user; server failures stay generic
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            "Something went wrong on our side".to_string()
        } else {
            self.to_string()
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    reason: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let template = ErrorTemplate {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Error"),
            message: self.public_message(),
        };
        (status, Html(template.render().unwrap_or_default())).into_response()
    }
}

/// Same errors, rendered as JSON for `/api` routes
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError(e.into())
    }
}

impl From<DbLockError> for ApiError {
    fn from(e: DbLockError) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError(err) = self;
        err.log();
        let body = Json(json!({
            "error": {
                "code": err.code(),
                "message": err.public_message(),
            }
        }));
        (err.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memorize::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SessionError::SessionNotFound(1), StatusCode::NOT_FOUND),
            (SessionError::ChapterNotFound(1), StatusCode::NOT_FOUND),
            (SessionError::AlreadyCompleted(1), StatusCode::CONFLICT),
            (SessionError::NotCompleted(1), StatusCode::CONFLICT),
            (SessionError::OutOfOrder { expected: 1, got: 0 }, StatusCode::CONFLICT),
            (
                SessionError::VerseOutOfRange { index: 5, verse_count: 2 },
                StatusCode::CONFLICT,
            ),
            (SessionError::EmptyChapter(1), StatusCode::UNPROCESSABLE_ENTITY),
            (
                SessionError::Store(StoreError::Corrupt("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = AppError::from(SessionError::Store(StoreError::Corrupt("secret".into())));
        assert!(!err.public_message().contains("secret"));

        let err = AppError::from(SessionError::OutOfOrder { expected: 2, got: 0 });
        assert_eq!(err.public_message(), "expected verse 3, got verse 1");
    }
}
