use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::checkout::{CheckoutConfig, CheckoutOutcome, CheckoutWidget, MountHandle};
use crate::errors::AppError;
use crate::models::{CloseRequest, MessageResponse};
use crate::state::AppState;

fn unknown_checkout(id: &Uuid) -> AppError {
    AppError::NotFound(format!("No checkout is mounted with id {id}"))
}

pub async fn mount_checkout_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<CheckoutConfig>,
) -> Result<(StatusCode, Json<MountHandle>), AppError> {
    if config.button_id.trim().is_empty() {
        return Err(AppError::field("button_id", "A payment button id is required."));
    }

    let button_id = config.button_id.clone();
    let user_id = config.user_id.clone();
    let handle = state.checkout.mount(
        config,
        Box::new(move |outcome: CheckoutOutcome| {
            tracing::info!(%button_id, ?user_id, ?outcome, "checkout closed");
        }),
    );

    tracing::debug!(id = %handle.id, callback = %handle.callback_name, "checkout mounted");
    Ok((StatusCode::CREATED, Json(handle)))
}

pub async fn close_checkout_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<CloseRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // read before firing, the mount is gone afterwards
    let button_id = state.checkout.button_id(&id);
    if !state.checkout.fire(&id, req.outcome) {
        return Err(unknown_checkout(&id));
    }
    tracing::debug!(%id, ?button_id, outcome = ?req.outcome, "checkout close delivered");
    Ok(Json(MessageResponse::ok("Checkout closed")))
}

pub async fn unmount_checkout_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.checkout.unmount(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(unknown_checkout(&id))
    }
}
