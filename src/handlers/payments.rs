use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::{current_user, enforce_rate_limit};
use crate::classify::ErrorCode;
use crate::clients::{PaymentLinkRequest, PricingPlan};
use crate::currency::Currency;
use crate::errors::{AppError, FieldErrors};
use crate::extract::BearerToken;
use crate::models::{PaymentLinkBody, PaymentLinkForm, PricingQuery};
use crate::rate_limit::PAYMENT;
use crate::state::AppState;
use crate::validators;

fn payment_failed() -> AppError {
    AppError::Explained {
        code: Some(ErrorCode::PaymentCreationFailed),
        message: ErrorCode::PaymentCreationFailed.message().to_string(),
    }
}

fn validate_form(form: &PaymentLinkForm) -> Result<Currency, AppError> {
    let mut fields = FieldErrors::new();
    if !validators::amount(form.amount) {
        fields.insert("amount", "Please enter a valid amount.".to_string());
    }
    let currency = form.currency.trim().parse::<Currency>().ok();
    if currency.is_none() {
        fields.insert("currency", "Unsupported currency.".to_string());
    }

    match currency {
        Some(currency) if fields.is_empty() => Ok(currency),
        _ => Err(AppError::Validation(fields)),
    }
}

pub async fn payment_link_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
    Json(form): Json<PaymentLinkForm>,
) -> Result<Json<PaymentLinkBody>, AppError> {
    let currency = validate_form(&form)?;
    let user = current_user(&state, &token).await?;

    enforce_rate_limit(&state, PAYMENT, &user.id)?;

    let request = PaymentLinkRequest {
        amount: currency.to_minor_units(form.amount),
        currency,
        user_id: user.id.clone(),
    };

    let response = state.api.create_payment_link(&request).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %user.id, "payment link creation failed");
        payment_failed()
    })?;

    if !validators::payment_link(&response.payment_link) {
        tracing::error!(link = %response.payment_link, "backend returned an unusable payment link");
        return Err(payment_failed());
    }

    tracing::info!(user_id = %user.id, amount = request.amount, currency = %currency, "payment link created");

    Ok(Json(PaymentLinkBody {
        payment_link: response.payment_link,
    }))
}

// Pricing lookup - served from the TTL cache when possible
pub async fn pricing_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PricingQuery>,
) -> Result<Json<Vec<PricingPlan>>, AppError> {
    let region = query.region.as_deref().map(str::trim).filter(|r| !r.is_empty());

    if let Some(plans) = state.pricing_cache.get(region) {
        tracing::debug!(?region, "pricing cache hit");
        return Ok(Json(plans));
    }

    let plans = state.hosted.pricing_plans(region).await?;
    state.pricing_cache.insert(region, plans.clone());

    Ok(Json(plans))
}
