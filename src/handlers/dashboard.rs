use axum::{Json, extract::State};
use std::sync::Arc;

use super::current_user;
use crate::clients::{AuthUser, Payment, Profile};
use crate::currency;
use crate::errors::AppError;
use crate::extract::BearerToken;
use crate::models::{ClassLink, DashboardResponse, DashboardUser, PaymentRow};
use crate::schedule::{HOME_ZONE, next_session, session_times};
use crate::state::{AppState, SiteSettings};

/// First letter of up to two words of a name; `?` when there is nothing to
/// work with.
pub fn initials(name: Option<&str>) -> String {
    let letters: String = name
        .unwrap_or_default()
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters.to_uppercase()
    }
}

pub fn status_label(status: &str) -> String {
    match status {
        "captured" => "Paid",
        "authorized" => "Processing",
        "failed" => "Failed",
        "refunded" => "Refunded",
        "pending" => "Pending",
        other => other,
    }
    .to_string()
}

fn metadata_name(user: &AuthUser) -> Option<String> {
    ["full_name", "name"]
        .iter()
        .find_map(|k| user.user_metadata.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

fn dashboard_user(user: &AuthUser, profile: Profile) -> DashboardUser {
    let display_name = profile
        .full_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| metadata_name(user))
        .or_else(|| profile.username.clone())
        .or_else(|| user.email.as_deref().and_then(|e| e.split('@').next()).map(str::to_string))
        .unwrap_or_default();

    DashboardUser {
        id: user.id.clone(),
        email: user.email.clone(),
        initials: initials(Some(display_name.as_str())),
        display_name,
        username: profile.username,
        phone: profile.phone,
    }
}

fn payment_row(payment: Payment) -> PaymentRow {
    PaymentRow {
        status_label: status_label(&payment.status),
        currency_symbol: currency::symbol_for(&payment.currency),
        created_at: payment.created_at.to_rfc3339(),
        id: payment.id,
        gateway_payment_id: payment.gateway_payment_id,
        order_id: payment.order_id,
        status: payment.status,
        amount: payment.amount,
        currency: payment.currency,
        payment_method: payment.payment_method,
    }
}

fn class_links(site: &SiteSettings) -> Vec<ClassLink> {
    vec![
        ClassLink {
            title: "Interactive Mode",
            description: "Join the group class with live feedback from your instructor.",
            link: site.meet_link.clone(),
            meeting_type: "Google Meet",
        },
        ClassLink {
            title: "Private Mode",
            description: "Follow along with camera off in a quieter session.",
            link: site.zoom_link.clone(),
            meeting_type: "Zoom",
        },
    ]
}

pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<DashboardResponse>, AppError> {
    let user = current_user(&state, &token).await?;

    // a missing or unreadable profile only costs the display fields
    let profile = match state.hosted.profile(&token, &user.id).await {
        Ok(profile) => profile.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "profile lookup failed");
            Profile::default()
        }
    };

    let mut payments = state.hosted.payment_history(&token, &user.id).await?;
    payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let now = chrono::Utc::now();
    let today = now.with_timezone(&HOME_ZONE).date_naive();

    Ok(Json(DashboardResponse {
        user: dashboard_user(&user, profile),
        payments: payments.into_iter().map(payment_row).collect(),
        class_links: class_links(&state.site),
        session_times: session_times(today),
        next_session: next_session(now).map(|t| t.to_rfc3339()),
    }))
}
