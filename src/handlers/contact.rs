use axum::{Json, extract::State};
use std::sync::Arc;

use crate::clients::ContactMessage;
use crate::errors::{AppError, FieldErrors};
use crate::mail::{ContactNotification, contact_notification};
use crate::models::{ContactRequest, MessageResponse};
use crate::state::AppState;
use crate::validators;
use crate::worker::send_mail;

fn validate(req: &ContactRequest) -> Result<(), AppError> {
    let mut fields = FieldErrors::new();
    if req.name.trim().is_empty() {
        fields.insert("name", "Please enter your name.".to_string());
    }
    if !validators::email(req.email.trim()) {
        fields.insert("email", "Please enter a valid email address.".to_string());
    }
    if req.message.trim().is_empty() {
        fields.insert("message", "Please enter a message.".to_string());
    }
    if fields.is_empty() { Ok(()) } else { Err(AppError::Validation(fields)) }
}

async fn notify_support(state: &AppState, req: &ContactRequest) -> Result<(), AppError> {
    let notification = ContactNotification {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_string(),
        message: req.message.clone(),
        user_id: req.user_id.clone(),
    };
    let mail = contact_notification(&notification, &state.site.support_mailbox, chrono::Utc::now());
    send_mail(&state.mail_tx, mail).await?;
    Ok(())
}

// contact form: store the message, then mail support
pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate(&payload)?;

    state
        .hosted
        .insert_contact_message(&ContactMessage {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_string(),
            message: payload.message.clone(),
        })
        .await?;

    notify_support(&state, &payload).await?;

    Ok(Json(MessageResponse::ok(
        "Message sent successfully! We'll get back to you soon.",
    )))
}

// email relay: mail only, nothing stored
pub async fn contact_notification_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validate(&payload)?;
    notify_support(&state, &payload).await?;

    Ok(Json(MessageResponse::ok("Support notification sent successfully")))
}
