use serde::Serialize;
use std::str::FromStr;

pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

// Closed set of application error codes the site knows how to explain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidEmail,
    UserDisabled,
    AuthRateLimit,
    EmailCheck,
    InsufficientFunds,
    PaymentCreationFailed,
    QueryError,
    ConnectionError,
    ValidationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidEmail => "auth/invalid-email",
            ErrorCode::UserDisabled => "auth/user-disabled",
            ErrorCode::AuthRateLimit => "auth/rate-limit",
            ErrorCode::EmailCheck => "auth/email-check",
            ErrorCode::InsufficientFunds => "payment/insufficient-funds",
            ErrorCode::PaymentCreationFailed => "payment/creation-failed",
            ErrorCode::QueryError => "supabase/query-error",
            ErrorCode::ConnectionError => "network/connection-error",
            ErrorCode::ValidationFailed => "security/validation-failed",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidEmail => "Please check your email address",
            ErrorCode::UserDisabled => "Account is temporarily disabled",
            ErrorCode::AuthRateLimit => "Too many requests. Please try again later",
            ErrorCode::EmailCheck => "Email check failed. Please try again",
            ErrorCode::InsufficientFunds => "Payment failed. Please try again",
            ErrorCode::PaymentCreationFailed => "Unable to process payment. Please try again",
            ErrorCode::QueryError => "Unable to fetch data. Please refresh",
            ErrorCode::ConnectionError => "Please check your internet connection",
            ErrorCode::ValidationFailed => "Validation failed. Please try again",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::QueryError | ErrorCode::ConnectionError => Severity::Warning,
            _ => Severity::Error,
        }
    }

    const ALL: [ErrorCode; 9] = [
        ErrorCode::InvalidEmail,
        ErrorCode::UserDisabled,
        ErrorCode::AuthRateLimit,
        ErrorCode::EmailCheck,
        ErrorCode::InsufficientFunds,
        ErrorCode::PaymentCreationFailed,
        ErrorCode::QueryError,
        ErrorCode::ConnectionError,
        ErrorCode::ValidationFailed,
    ];
}

impl FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL.into_iter().find(|c| c.as_str() == s).ok_or(())
    }
}

/// Error shapes reaching the classifier from the collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawError {
    // error object returned by the hosted backend (`{code, message}`)
    Query { code: Option<String>, message: String },
    // the request never produced a response
    Transport { message: String },
    // an application error code raised locally
    Coded(String),
    Other(String),
}

impl RawError {
    pub fn code(&self) -> Option<&str> {
        match self {
            RawError::Query { code, .. } => code.as_deref(),
            RawError::Coded(code) => Some(code),
            RawError::Transport { .. } | RawError::Other(_) => None,
        }
    }
}

impl From<ErrorCode> for RawError {
    fn from(code: ErrorCode) -> Self {
        RawError::Coded(code.as_str().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(serialize_with = "serialize_code")]
    pub code: Option<ErrorCode>,
    pub message: &'static str,
    pub severity: Severity,
}

fn serialize_code<S: serde::Serializer>(code: &Option<ErrorCode>, s: S) -> Result<S::Ok, S::Error> {
    match code {
        Some(code) => s.serialize_str(code.as_str()),
        None => s.serialize_none(),
    }
}

impl From<ErrorCode> for Classification {
    fn from(code: ErrorCode) -> Self {
        Self {
            code: Some(code),
            message: code.message(),
            severity: code.severity(),
        }
    }
}

// total: every input maps to a message + severity
pub fn classify(err: &RawError) -> Classification {
    if let RawError::Transport { .. } = err {
        return ErrorCode::ConnectionError.into();
    }

    match err.code() {
        Some(code) if code.starts_with("PGRST") => ErrorCode::QueryError.into(),
        Some(code) => match code.parse::<ErrorCode>() {
            Ok(known) => known.into(),
            Err(()) => fallback(),
        },
        None => fallback(),
    }
}

fn fallback() -> Classification {
    Classification {
        code: None,
        message: FALLBACK_MESSAGE,
        severity: Severity::Error,
    }
}
