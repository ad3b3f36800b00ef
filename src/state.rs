use std::sync::Arc;
use tokio::sync::mpsc;
use crate::cache::PricingCache;
use crate::checkout::PaymentButtonHost;
use crate::clients::{BookingApi, HostedBackend};
use crate::rate_limit::RateLimiter;
use crate::upstream::UpstreamSet;
use crate::worker::QueuedMail;

// site-level settings the handlers need
#[derive(Clone, Debug)]
pub struct SiteSettings {
    pub support_mailbox: String,
    pub password_reset_redirect: String,
    pub meet_link: String,
    pub zoom_link: String,
}

// app's shared state

pub struct AppState {
    pub api: Arc<dyn BookingApi>,
    pub hosted: Arc<dyn HostedBackend>,
    pub rate_limiter: RateLimiter,           // per-process counters, built once at startup
    pub pricing_cache: PricingCache,
    pub checkout: PaymentButtonHost,
    pub upstreams: Arc<UpstreamSet>,
    pub mail_tx: mpsc::Sender<QueuedMail>,
    pub site: SiteSettings,
}
