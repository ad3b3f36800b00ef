use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::metrics::{RATE_LIMIT_DENIALS, RATE_LIMIT_KEYS};

pub const PAYMENT: &str = "payment";
pub const EMAIL_CHECK: &str = "email-check";
pub const PASSWORD_RESET: &str = "password-reset";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("no rate limit configured for action `{0}`")]
    UnknownAction(String),
}

// Window length + max requests for one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub window: Duration,
    pub max_requests: u32,
}

impl RateLimitRule {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self { window, max_requests }
    }
}

/// Static action -> rule table, fixed once the limiter is built.
#[derive(Debug, Clone, Default)]
pub struct RateLimitConfig {
    rules: HashMap<String, RateLimitRule>,
}

impl RateLimitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, action: &str, rule: RateLimitRule) -> Self {
        self.rules.insert(action.to_string(), rule);
        self
    }

    pub fn rule(&self, action: &str) -> Option<&RateLimitRule> {
        self.rules.get(action)
    }
}

impl RateLimitConfig {
    // payment 10/hour, email-check 5/minute, password-reset 3 per 5 minutes
    pub fn site_defaults() -> Self {
        Self::new()
            .with_rule(PAYMENT, RateLimitRule::new(Duration::from_secs(3600), 10))
            .with_rule(EMAIL_CHECK, RateLimitRule::new(Duration::from_secs(60), 5))
            .with_rule(PASSWORD_RESET, RateLimitRule::new(Duration::from_secs(300), 3))
    }
}

// One counter per (action, caller). The caller is kept as a sha256 fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    action: String,
    fingerprint: String,
}

impl RateLimitKey {
    pub fn new(action: &str, identifier: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(identifier.as_bytes());
        Self {
            action: action.to_string(),
            fingerprint: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }
}

// Rate limit state - tracks requests per key
#[derive(Debug, Clone, Copy)]
pub struct RateLimitState {
    pub count: u32,
    pub reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in: Duration,
}

impl RateLimitDecision {
    pub fn reset_in_ms(&self) -> u64 {
        self.reset_in.as_millis() as u64
    }
}

/// Fixed-window counter store.
///
/// Each (action, identifier) pair gets its own counter, created lazily and
/// kept for the life of the process. Counters are local to this instance;
/// nothing is shared across processes.
pub struct RateLimiter {
    config: RateLimitConfig,
    store: DashMap<RateLimitKey, RateLimitState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            store: DashMap::new(),
        }
    }

    pub fn check(&self, action: &str, identifier: &str) -> Result<RateLimitDecision, RateLimitError> {
        self.check_at(action, identifier, Instant::now())
    }

    pub fn check_at(
        &self,
        action: &str,
        identifier: &str,
        now: Instant,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let rule = *self
            .config
            .rule(action)
            .ok_or_else(|| RateLimitError::UnknownAction(action.to_string()))?;

        let decision = {
            // entry guard holds the shard lock, so read-modify-write is atomic per key
            let mut state = self
                .store
                .entry(RateLimitKey::new(action, identifier))
                .or_insert(RateLimitState {
                    count: 0,
                    reset_at: now + rule.window,
                });

            // window expired..? start a fresh one
            if now >= state.reset_at {
                state.count = 0;
                state.reset_at = now + rule.window;
            }

            state.count = state.count.saturating_add(1);

            RateLimitDecision {
                allowed: state.count <= rule.max_requests,
                remaining: rule.max_requests.saturating_sub(state.count),
                reset_in: state.reset_at.saturating_duration_since(now),
            }
        };

        RATE_LIMIT_KEYS.set(self.store.len() as f64);
        if !decision.allowed {
            RATE_LIMIT_DENIALS.with_label_values(&[action]).inc();
            tracing::debug!(action, reset_in_ms = decision.reset_in_ms(), "rate limit denied");
        }

        Ok(decision)
    }

    pub fn tracked_keys(&self) -> usize {
        self.store.len()
    }
}
