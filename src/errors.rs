use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::classify::{Classification, ErrorCode, FALLBACK_MESSAGE, Severity, classify};
use crate::clients::UpstreamError;
use crate::mail::MailError;
use crate::rate_limit::RateLimitError;

// field name -> message, reported together so the form can mark every field
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("rate limit exceeded for {action}")]
    RateLimited { action: String, reset_in_ms: u64 },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    // informational outcome that still stops the flow (e.g. unverified email)
    #[error("{0}")]
    Notice(String),

    // upstream failure with a message already chosen by the handler
    #[error("{message}")]
    Explained { code: Option<ErrorCode>, message: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

impl AppError {
    pub fn field(field: &'static str, message: &str) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field, message.to_string());
        AppError::Validation(fields)
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: Option<&'static str>,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_in_ms: Option<u64>,
}

impl ErrorBody {
    fn from_classification(c: Classification) -> Self {
        Self {
            code: c.code.map(|c| c.as_str()),
            message: c.message.to_string(),
            severity: c.severity,
            fields: None,
            reset_in_ms: None,
        }
    }

    fn plain(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: None,
            message: message.into(),
            severity,
            fields: None,
            reset_in_ms: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => {
                let mut body = ErrorBody::from_classification(ErrorCode::ValidationFailed.into());
                if let Some(first) = fields.values().next() {
                    body.message = first.clone();
                }
                body.fields = Some(fields);
                (StatusCode::BAD_REQUEST, body)
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::plain(message, Severity::Error))
            }
            AppError::RateLimited { action, reset_in_ms } => {
                tracing::warn!(%action, reset_in_ms, "request rate limited");
                let mut body = ErrorBody::from_classification(ErrorCode::AuthRateLimit.into());
                body.reset_in_ms = Some(reset_in_ms);
                (StatusCode::TOO_MANY_REQUESTS, body)
            }
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, ErrorBody::plain(message, Severity::Error))
            }
            AppError::Conflict(message) => {
                (StatusCode::CONFLICT, ErrorBody::plain(message, Severity::Error))
            }
            AppError::Notice(message) => {
                (StatusCode::FORBIDDEN, ErrorBody::plain(message, Severity::Info))
            }
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, ErrorBody::plain(message, Severity::Error))
            }
            AppError::Explained { code, message } => {
                let mut body = ErrorBody::plain(message, Severity::Error);
                if let Some(code) = code {
                    body.code = Some(code.as_str());
                    body.severity = code.severity();
                }
                (StatusCode::BAD_GATEWAY, body)
            }
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "upstream call failed");
                (StatusCode::BAD_GATEWAY, ErrorBody::from_classification(classify(&e.raw())))
            }
            AppError::Mail(e) => {
                tracing::error!(error = %e, "mail delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::plain("Failed to send notification", Severity::Error),
                )
            }
            AppError::RateLimit(e) => {
                tracing::error!(error = %e, "rate limiter misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::plain(FALLBACK_MESSAGE, Severity::Error),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
