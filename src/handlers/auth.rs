use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{email_check_failed, enforce_rate_limit};
use crate::clients::{AuthUser, LeadSource, OtpType, SignupRequest, UpstreamError, UserUpdate};
use crate::errors::{AppError, FieldErrors};
use crate::extract::BearerToken;
use crate::models::{
    EmailExistsResponse, EmailRequest, MessageResponse, NewPasswordRequest, SessionResponse,
    SigninRequest, SigninResponse, SignupForm, VerifyRequest, VerifyResponse,
};
use crate::rate_limit::{EMAIL_CHECK, PASSWORD_RESET};
use crate::state::AppState;
use crate::validators;

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const ALREADY_REGISTERED: &str = "User already registered";
const SAME_PASSWORD: &str = "Password should be different";

// upstream rejected the request itself; keep its message for the user
fn explain(err: UpstreamError) -> AppError {
    match err {
        UpstreamError::Status { message, .. } => AppError::Explained { code: None, message },
        other => AppError::Upstream(other),
    }
}

fn signup_field_errors(form: &SignupForm) -> FieldErrors {
    let mut fields = FieldErrors::new();
    let email = form.email.trim();

    if !validators::email(email) {
        fields.insert("email", "Please enter a valid email address.".to_string());
    }
    if form.password.chars().count() < validators::MIN_PASSWORD_LEN {
        fields.insert(
            "password",
            format!("Password must be at least {} characters long.", validators::MIN_PASSWORD_LEN),
        );
    } else if validators::password_strength(&form.password) < validators::REQUIRED_PASSWORD_STRENGTH {
        fields.insert(
            "password",
            "Password is too weak. Use upper and lower case letters and a number.".to_string(),
        );
    }
    if form.password != form.confirm_password {
        fields.insert("confirm_password", "Passwords do not match.".to_string());
    }
    if !validators::username(form.username.trim()) {
        fields.insert("username", "Username must be between 3 and 20 characters.".to_string());
    }
    if !form.agree_to_terms {
        fields.insert("agree_to_terms", "You must agree to the terms and conditions.".to_string());
    }
    fields
}

pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(form): Json<SignupForm>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let fields = signup_field_errors(&form);
    if !fields.is_empty() {
        return Err(AppError::Validation(fields));
    }

    let email = form.email.trim();
    let username = form.username.trim();

    if state.hosted.username_taken(username).await? {
        return Err(AppError::field("username", "This username is already taken."));
    }

    let mut signup = SignupRequest::lead(email, username, LeadSource::AuthForm);
    signup.username = Some(username.to_string());
    signup.password = Some(form.password.clone());

    state.api.signup(&signup).await.map_err(|e| {
        if e.message().contains(ALREADY_REGISTERED) {
            AppError::field("email", "An account with this email already exists.")
        } else {
            explain(e)
        }
    })?;

    tracing::info!(%username, "account created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok(
            "Account created! Please check your email to verify your account.",
        )),
    ))
}

pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest("Please enter your email and password.".to_string()));
    }

    let session = state
        .hosted
        .sign_in_with_password(email, &payload.password)
        .await
        .map_err(|e| {
            if e.message().contains(INVALID_CREDENTIALS) {
                AppError::Unauthorized("Invalid email or password.".to_string())
            } else {
                explain(e)
            }
        })?;

    if !session.user.is_verified() {
        // resend needs the live token, so it goes before the sign-out
        let update = UserUpdate {
            email: Some(email.to_string()),
            ..UserUpdate::default()
        };
        if let Err(e) = state.hosted.update_user(&session.access_token, &update).await {
            tracing::warn!(error = %e, "verification resend failed");
        }
        if let Err(e) = state.hosted.sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "sign-out of unverified user failed");
        }
        return Err(AppError::Notice(
            "Please verify your email before signing in. We've sent you a new verification link."
                .to_string(),
        ));
    }

    Ok(Json(SigninResponse {
        message: "Signed in successfully.".to_string(),
        session,
    }))
}

pub async fn check_email_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<EmailExistsResponse>, AppError> {
    let email = payload.email.trim();
    if !validators::email(email) {
        return Err(AppError::field("email", "Please enter a valid email address."));
    }
    enforce_rate_limit(&state, EMAIL_CHECK, email)?;

    let exists = state.api.email_exists(email).await.map_err(email_check_failed)?;
    Ok(Json(EmailExistsResponse { exists }))
}

pub async fn password_reset_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = payload.email.trim();
    if !validators::email(email) {
        return Err(AppError::field("email", "Please enter a valid email address."));
    }
    enforce_rate_limit(&state, PASSWORD_RESET, email)?;

    state
        .hosted
        .reset_password_for_email(email, &state.site.password_reset_redirect)
        .await
        .map_err(explain)?;

    Ok(Json(MessageResponse::ok(
        "Password reset instructions have been sent to your email.",
    )))
}

pub async fn update_password_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Json(payload): Json<NewPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if payload.password != payload.confirm_password {
        return Err(AppError::field("confirm_password", "Passwords do not match."));
    }
    if payload.password.chars().count() < validators::MIN_PASSWORD_LEN {
        return Err(AppError::field(
            "password",
            &format!("Password must be at least {} characters long.", validators::MIN_PASSWORD_LEN),
        ));
    }

    let update = UserUpdate {
        password: Some(payload.password.clone()),
        ..UserUpdate::default()
    };
    state
        .hosted
        .update_user(&token, &update)
        .await
        .map_err(|e| {
            if e.message().contains(SAME_PASSWORD) {
                AppError::BadRequest(
                    "New password must be different from the current password.".to_string(),
                )
            } else if matches!(e.status(), Some(401 | 403)) {
                AppError::Unauthorized("Your session has expired. Please sign in again.".to_string())
            } else {
                explain(e)
            }
        })?;

    Ok(Json(MessageResponse::ok("Password updated successfully.")))
}

fn otp_type(kind: &str) -> Option<(OtpType, &'static str, &'static str)> {
    match kind {
        "signup" | "email" => Some((
            OtpType::Signup,
            "/auth?tab=signin",
            "Email verified successfully. You can now sign in.",
        )),
        "recovery" => Some((
            OtpType::Recovery,
            "/reset-password",
            "Verification successful. Please choose a new password.",
        )),
        _ => None,
    }
}

pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let token_hash = payload.token_hash.trim();
    let Some((kind, redirect, message)) = otp_type(payload.kind.trim()) else {
        return Err(AppError::BadRequest("Invalid verification link.".to_string()));
    };
    if token_hash.is_empty() {
        return Err(AppError::BadRequest("Invalid verification link.".to_string()));
    }

    let session = state.hosted.verify_otp(token_hash, kind).await.map_err(|e| {
        tracing::warn!(error = %e, "otp verification failed");
        AppError::BadRequest("Verification link is invalid or has expired.".to_string())
    })?;

    Ok(Json(VerifyResponse {
        message: message.to_string(),
        redirect: redirect.to_string(),
        session,
    }))
}

/// Resolves the bearer token to a user; upstream 401/403 become our 401.
pub async fn current_user(state: &AppState, token: &str) -> Result<AuthUser, AppError> {
    state.hosted.get_user(token).await.map_err(|e| match e.status() {
        Some(401 | 403) => AppError::Unauthorized("Please sign in to continue".to_string()),
        _ => AppError::Upstream(e),
    })
}

pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<SessionResponse>, AppError> {
    let user = current_user(&state, &token).await?;
    Ok(Json(SessionResponse { user }))
}

pub async fn signout_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    state.hosted.sign_out(&token).await.map_err(|e| match e.status() {
        Some(401 | 403) => AppError::Unauthorized("Please sign in to continue".to_string()),
        _ => AppError::Upstream(e),
    })?;

    Ok(Json(MessageResponse::ok("Signed out successfully.")))
}
