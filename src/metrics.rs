use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec, register_gauge,
    register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("yoga_requests_total", "Total number of form/action requests").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "yoga_request_latency_seconds",
        "Form/action request latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_DENIALS: CounterVec = register_counter_vec!(
        "yoga_rate_limit_denials_total",
        "Requests denied by the rate limiter",
        &["action"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("yoga_rate_limit_keys", "Live rate limit counters").unwrap();
    pub static ref PRICING_CACHE_HITS: Counter =
        register_counter!("yoga_pricing_cache_hits_total", "Pricing cache hits").unwrap();
    pub static ref PRICING_CACHE_MISSES: Counter =
        register_counter!("yoga_pricing_cache_misses_total", "Pricing cache misses").unwrap();
    pub static ref MAIL_SENT: Counter =
        register_counter!("yoga_mail_sent_total", "Notification mails delivered").unwrap();
    pub static ref MAIL_FAILED: Counter =
        register_counter!("yoga_mail_failed_total", "Notification mails that failed").unwrap();
    pub static ref CHECKOUT_MOUNTS: Gauge =
        register_gauge!("yoga_checkout_mounts", "Currently mounted checkout buttons").unwrap();
}
