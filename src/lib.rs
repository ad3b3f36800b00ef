pub mod cache;
pub mod checkout;
pub mod classify;
pub mod clients;
pub mod config;
pub mod currency;
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod html;
pub mod mail;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod schedule;
pub mod state;
pub mod upstream;
pub mod validators;
pub mod worker;

use axum::{
    Router,
    http::{HeaderValue, header},
    middleware,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::*;
use crate::state::AppState;

// creating the router with routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/free-class", post(free_class_handler))
        .route("/community", post(community_handler))
        .route("/contact", post(contact_handler))
        .route("/send-contact-notification", post(contact_notification_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/signin", post(signin_handler))
        .route("/auth/check-email", post(check_email_handler))
        .route("/auth/password-reset", post(password_reset_handler))
        .route("/auth/password", post(update_password_handler))
        .route("/auth/verify", post(verify_handler))
        .route("/auth/session", get(session_handler))
        .route("/auth/signout", post(signout_handler))
        .route("/pricing", get(pricing_handler))
        .route("/payments/link", post(payment_link_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/checkout/mount", post(mount_checkout_handler))
        .route("/checkout/{id}/close", post(close_checkout_handler))
        .route("/checkout/{id}", delete(unmount_checkout_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .layer(middleware::from_fn(track_requests))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
