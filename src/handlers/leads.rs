use axum::{Json, extract::State};
use std::sync::Arc;

use super::{email_check_failed, enforce_rate_limit};
use crate::clients::{LeadSource, SignupRequest};
use crate::errors::{AppError, FieldErrors};
use crate::models::{CommunityRequest, FreeClassRequest, MessageResponse};
use crate::rate_limit::EMAIL_CHECK;
use crate::state::AppState;
use crate::validators;

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn check_name_and_email(name: &str, email: &str) -> Result<(), AppError> {
    let mut fields = FieldErrors::new();
    if name.is_empty() {
        fields.insert("name", "Please fill in all required fields.".to_string());
    }
    if email.is_empty() {
        fields.insert("email", "Please fill in all required fields.".to_string());
    } else if !validators::email(email) {
        fields.insert("email", "Please enter a valid email address.".to_string());
    }

    if fields.is_empty() { Ok(()) } else { Err(AppError::Validation(fields)) }
}

// existence check against the booking api, throttled per email
async fn ensure_new_email(state: &AppState, email: &str, taken: &str) -> Result<(), AppError> {
    enforce_rate_limit(state, EMAIL_CHECK, email)?;

    let exists = state.api.email_exists(email).await.map_err(email_check_failed)?;

    if exists {
        Err(AppError::Conflict(taken.to_string()))
    } else {
        Ok(())
    }
}

pub async fn free_class_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FreeClassRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    check_name_and_email(name, email)?;

    ensure_new_email(
        &state,
        email,
        "You have already booked a free class. Please check your email for details.",
    )
    .await?;

    let source = match payload.source {
        Some(LeadSource::GetStarted) => LeadSource::GetStarted,
        _ => LeadSource::FreeClass,
    };
    let mut signup = SignupRequest::lead(email, name, source);
    let country_code = payload.country_code.unwrap_or_default();
    signup.phone = non_empty(payload.phone).map(|phone| format!("{}{}", country_code.trim(), phone));
    signup.health_conditions = non_empty(payload.health_conditions);

    state.api.signup(&signup).await?;

    Ok(Json(MessageResponse::ok(
        "Your account has been created. Please check your email to set your password and access your free class details.",
    )))
}

pub async fn community_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CommunityRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    check_name_and_email(name, email)?;

    ensure_new_email(
        &state,
        email,
        "This email is already registered. Please use a different email or sign in.",
    )
    .await?;

    let mut signup = SignupRequest::lead(email, name, LeadSource::StickyHeader);
    signup.interest = non_empty(payload.interest);

    state.api.signup(&signup).await?;

    Ok(Json(MessageResponse::ok("Thank you for joining! We'll be in touch soon.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_malformed_fields_reported_together() {
        let Err(AppError::Validation(fields)) = check_name_and_email("", "nope") else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["email"], "Please enter a valid email address.");
        assert!(check_name_and_email("Asha", "asha@x.com").is_ok());
    }

    #[test]
    fn blank_optionals_are_dropped() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some(" 555 ".to_string())), Some("555".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
