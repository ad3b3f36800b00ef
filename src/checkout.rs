use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::html;
use crate::metrics::CHECKOUT_MOUNTS;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutConfig {
    pub button_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutOutcome {
    Closed,
    Completed,
}

pub type CloseCallback = Box<dyn FnOnce(CheckoutOutcome) + Send + Sync>;

// mounts nobody closed or unmounted are dropped after this long
pub const DEFAULT_MOUNT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountHandle {
    pub id: Uuid,
    pub callback_name: String,
    pub embed_html: String,
}

/// Embeds the third-party checkout button.
///
/// Every mount owns its own callback name, so two buttons on one page never
/// overwrite each other's close handler. The callback fires at most once;
/// firing, unmounting or outliving the mount TTL drops the mount.
pub trait CheckoutWidget: Send + Sync {
    fn mount(&self, config: CheckoutConfig, on_close: CloseCallback) -> MountHandle;

    fn unmount(&self, id: &Uuid) -> bool;
}

struct MountedButton {
    config: CheckoutConfig,
    on_close: CloseCallback,
    mounted_at: Instant,
}

pub struct PaymentButtonHost {
    script_url: String,
    mounts: DashMap<Uuid, MountedButton>,
    ttl: Duration,
}

impl PaymentButtonHost {
    pub fn new(script_url: &str) -> Self {
        Self {
            script_url: script_url.to_string(),
            mounts: DashMap::new(),
            ttl: DEFAULT_MOUNT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    // invoke the close callback and drop the mount; false if unknown, unmounted or already fired
    pub fn fire(&self, id: &Uuid, outcome: CheckoutOutcome) -> bool {
        let removed = self.mounts.remove(id);
        CHECKOUT_MOUNTS.set(self.mounts.len() as f64);
        // map guard released before running user code
        match removed {
            Some((_, mounted)) => {
                (mounted.on_close)(outcome);
                true
            }
            None => false,
        }
    }

    fn sweep_expired(&self) {
        let ttl = self.ttl;
        self.mounts.retain(|_, m| m.mounted_at.elapsed() < ttl);
    }

    pub fn button_id(&self, id: &Uuid) -> Option<String> {
        self.mounts.get(id).map(|m| m.config.button_id.clone())
    }

    pub fn mounted(&self) -> usize {
        self.mounts.len()
    }

    fn embed_html(&self, config: &CheckoutConfig, callback_name: &str) -> String {
        let user_attr = config
            .user_id
            .as_deref()
            .map(|uid| format!(r#" data-user_id="{}""#, html::escape(uid)))
            .unwrap_or_default();
        format!(
            r#"<form><script src="{src}" data-payment_button_id="{button}" data-modal-close-event="{callback}"{user_attr} async></script></form>"#,
            src = html::escape(&self.script_url),
            button = html::escape(&config.button_id),
            callback = callback_name,
        )
    }
}

impl CheckoutWidget for PaymentButtonHost {
    fn mount(&self, config: CheckoutConfig, on_close: CloseCallback) -> MountHandle {
        let id = Uuid::new_v4();
        let callback_name = format!("onCheckoutClose_{}", id.simple());
        let embed_html = self.embed_html(&config, &callback_name);

        self.sweep_expired();
        self.mounts.insert(
            id,
            MountedButton {
                config,
                on_close,
                mounted_at: Instant::now(),
            },
        );
        CHECKOUT_MOUNTS.set(self.mounts.len() as f64);

        MountHandle { id, callback_name, embed_html }
    }

    fn unmount(&self, id: &Uuid) -> bool {
        let removed = self.mounts.remove(id).is_some();
        CHECKOUT_MOUNTS.set(self.mounts.len() as f64);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SCRIPT: &str = "https://checkout.example.com/v1/payment-button.js";

    fn config(user: Option<&str>) -> CheckoutConfig {
        CheckoutConfig {
            button_id: "pl_abc".to_string(),
            user_id: user.map(str::to_string),
        }
    }

    fn counting() -> (Arc<AtomicUsize>, CloseCallback) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        (calls, Box::new(move |_: CheckoutOutcome| {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn each_mount_gets_its_own_callback_name() {
        let host = PaymentButtonHost::new(SCRIPT);
        let (_, cb1) = counting();
        let (_, cb2) = counting();
        let a = host.mount(config(None), cb1);
        let b = host.mount(config(None), cb2);
        assert_ne!(a.id, b.id);
        assert_ne!(a.callback_name, b.callback_name);
        assert!(a.embed_html.contains(&a.callback_name));
        assert_eq!(host.mounted(), 2);
    }

    #[test]
    fn callback_fires_at_most_once() {
        let host = PaymentButtonHost::new(SCRIPT);
        let (calls, cb) = counting();
        let handle = host.mount(config(None), cb);

        assert!(host.fire(&handle.id, CheckoutOutcome::Closed));
        assert!(!host.fire(&handle.id, CheckoutOutcome::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn firing_removes_the_mount() {
        let host = PaymentButtonHost::new(SCRIPT);
        let (_, cb) = counting();
        let handle = host.mount(config(None), cb);

        assert!(host.fire(&handle.id, CheckoutOutcome::Completed));
        assert_eq!(host.mounted(), 0);
        assert!(!host.unmount(&handle.id));
    }

    #[test]
    fn stale_mounts_are_swept_on_mount() {
        let host = PaymentButtonHost::new(SCRIPT).with_ttl(Duration::ZERO);
        let (calls, cb) = counting();
        let stale = host.mount(config(None), cb);
        let (_, cb) = counting();
        let fresh = host.mount(config(None), cb);

        assert_eq!(host.mounted(), 1);
        assert_eq!(host.button_id(&fresh.id).as_deref(), Some("pl_abc"));
        assert!(!host.fire(&stale.id, CheckoutOutcome::Closed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unmount_drops_callback() {
        let host = PaymentButtonHost::new(SCRIPT);
        let (calls, cb) = counting();
        let handle = host.mount(config(None), cb);

        assert!(host.unmount(&handle.id));
        assert!(!host.unmount(&handle.id));
        assert!(!host.fire(&handle.id, CheckoutOutcome::Completed));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(host.button_id(&handle.id), None);
    }

    #[test]
    fn embed_carries_button_and_user() {
        let host = PaymentButtonHost::new(SCRIPT);
        let (_, cb) = counting();
        let handle = host.mount(config(Some("u-\"1")), cb);
        assert!(handle.embed_html.starts_with("<form><script src=\"https://checkout.example.com"));
        assert!(handle.embed_html.contains(r#"data-payment_button_id="pl_abc""#));
        assert!(handle.embed_html.contains(r#"data-user_id="u-&quot;1""#));

        let (_, cb) = counting();
        let anon = host.mount(config(None), cb);
        assert!(!anon.embed_html.contains("data-user_id"));
    }
}
