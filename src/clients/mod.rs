pub mod api;
pub mod hosted;

use serde_json::Value;
use thiserror::Error;

use crate::classify::RawError;

pub use api::{BookingApi, HttpBookingApi, LeadSource, PaymentLinkRequest, PaymentLinkResponse, SignupRequest};
pub use hosted::{
    AuthUser, ContactMessage, HostedBackend, OtpType, Payment, PricingPlan, Profile, Session,
    SupabaseClient, UserUpdate,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("request to {service} failed: {message}")]
    Transport { service: &'static str, message: String },

    #[error("{service} returned {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("unexpected response from {service}: {message}")]
    Decode { service: &'static str, message: String },
}

impl UpstreamError {
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            UpstreamError::Decode { service, message: err.to_string() }
        } else {
            UpstreamError::Transport { service, message: err.to_string() }
        }
    }

    // non-2xx: pull whatever message/code the body offers, nothing else is assumed
    pub async fn from_response(service: &'static str, res: reqwest::Response) -> Self {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body);
        UpstreamError::Status {
            service,
            status: status.as_u16(),
            code,
            message: message.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("request failed").to_string()
            }),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            UpstreamError::Status { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UpstreamError::Transport { message, .. }
            | UpstreamError::Status { message, .. }
            | UpstreamError::Decode { message, .. } => message,
        }
    }

    pub fn raw(&self) -> RawError {
        match self {
            UpstreamError::Transport { message, .. } => RawError::Transport { message: message.clone() },
            UpstreamError::Status { code, message, .. } => RawError::Query {
                code: code.clone(),
                message: message.clone(),
            },
            UpstreamError::Decode { message, .. } => RawError::Other(message.clone()),
        }
    }
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return (None, (!trimmed.is_empty()).then(|| trimmed.to_string()));
    };

    let code = ["code", "error_code"].iter().find_map(|k| match value.get(*k) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    });
    let message = ["detail", "message", "msg", "error_description", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str).map(str::to_string));

    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_postgrest_error() {
        let (code, message) =
            parse_error_body(r#"{"code":"PGRST116","message":"no rows","details":null}"#);
        assert_eq!(code.as_deref(), Some("PGRST116"));
        assert_eq!(message.as_deref(), Some("no rows"));
    }

    #[test]
    fn prefers_detail_field() {
        let (code, message) = parse_error_body(r#"{"detail":"Email already registered"}"#);
        assert_eq!(code, None);
        assert_eq!(message.as_deref(), Some("Email already registered"));
    }

    #[test]
    fn auth_errors_use_numeric_code_and_msg() {
        let (code, message) = parse_error_body(r#"{"code":400,"msg":"Invalid login credentials"}"#);
        assert_eq!(code.as_deref(), Some("400"));
        assert_eq!(message.as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn plain_text_and_empty_bodies() {
        assert_eq!(parse_error_body("Bad Gateway"), (None, Some("Bad Gateway".to_string())));
        assert_eq!(parse_error_body("  "), (None, None));
    }

    #[test]
    fn raw_shape_follows_variant() {
        let err = UpstreamError::Status {
            service: "hosted",
            status: 406,
            code: Some("PGRST116".to_string()),
            message: "no rows".to_string(),
        };
        assert_eq!(err.raw().code(), Some("PGRST116"));

        let err = UpstreamError::Transport { service: "api", message: "refused".to_string() };
        assert!(matches!(err.raw(), RawError::Transport { .. }));
    }
}
