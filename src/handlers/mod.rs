mod auth;
mod checkout;
mod contact;
mod dashboard;
mod health;
mod leads;
mod metrics;
mod payments;

pub use auth::{
    check_email_handler, current_user, password_reset_handler, session_handler, signin_handler,
    signout_handler, signup_handler, update_password_handler, verify_handler,
};
pub use checkout::{close_checkout_handler, mount_checkout_handler, unmount_checkout_handler};
pub use contact::{contact_handler, contact_notification_handler};
pub use dashboard::{dashboard_handler, initials, status_label};
pub use health::health_handler;
pub use leads::{community_handler, free_class_handler};
pub use metrics::{metrics_handler, track_requests};
pub use payments::{payment_link_handler, pricing_handler};

use crate::classify::ErrorCode;
use crate::clients::UpstreamError;
use crate::errors::AppError;
use crate::rate_limit::RateLimitDecision;
use crate::state::AppState;

// Rate limit check - denial becomes a 429 carrying the reset time
fn enforce_rate_limit(
    state: &AppState,
    action: &str,
    identifier: &str,
) -> Result<RateLimitDecision, AppError> {
    let decision = state.rate_limiter.check(action, identifier)?;
    if decision.allowed {
        Ok(decision)
    } else {
        Err(AppError::RateLimited {
            action: action.to_string(),
            reset_in_ms: decision.reset_in_ms(),
        })
    }
}

// email lookups fail the same way wherever they run
fn email_check_failed(err: UpstreamError) -> AppError {
    tracing::error!(error = %err, "email existence check failed");
    AppError::Explained {
        code: Some(ErrorCode::EmailCheck),
        message: ErrorCode::EmailCheck.message().to_string(),
    }
}
