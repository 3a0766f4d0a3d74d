use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::normalize::ErrorMessages;

/// Failure envelope returned by every route.
///
/// Customer routes answer with `{error, details?, suggestion?}`; thread
/// routes add an outcome `status` and always carry `messages`.
#[derive(Debug, Error, Serialize)]
#[error("{error}")]
pub struct ApiError {
    #[serde(skip)]
    pub code: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorMessages>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<ErrorMessages>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'static str>,
}

impl ApiError {
    pub fn new(code: StatusCode, error: &'static str) -> Self {
        Self {
            code,
            status: None,
            error,
            details: None,
            messages: None,
            suggestion: None,
        }
    }

    pub fn bad_request(error: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error)
    }

    pub fn internal(error: &'static str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
    }

    /// Outcome label of thread routes: `fail` or `error`.
    pub fn status(mut self, status: &'static str) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach `details` only when `expose` is set (development mode).
    pub fn details(mut self, details: ErrorMessages, expose: bool) -> Self {
        self.details = expose.then_some(details);
        self
    }

    pub fn messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn suggestion(mut self, suggestion: &'static str) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.code.is_server_error() {
            tracing::error!(status = %self.code, error = self.error, "Request failed");
        } else {
            tracing::debug!(status = %self.code, error = self.error, "Request rejected");
        }

        (self.code, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
