use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{Duration, interval};

// Single upstream collaborator with a health endpoint
pub struct Upstream {
    pub name: &'static str,
    pub health_url: String,
    healthy: AtomicBool, // is it answering..?
}

impl Upstream {
    pub fn new(name: &'static str, health_url: String) -> Self {
        Self {
            name,
            health_url,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamStatus {
    pub name: &'static str,
    pub healthy: bool,
}

// The collaborators behind the gateway
pub struct UpstreamSet {
    upstreams: Vec<Arc<Upstream>>,
}

impl UpstreamSet {
    pub fn new(upstreams: Vec<Upstream>) -> Self {
        Self {
            upstreams: upstreams.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn all(&self) -> &[Arc<Upstream>] {
        &self.upstreams
    }

    pub fn statuses(&self) -> Vec<UpstreamStatus> {
        self.upstreams
            .iter()
            .map(|u| UpstreamStatus {
                name: u.name,
                healthy: u.is_healthy(),
            })
            .collect()
    }

    pub fn all_healthy(&self) -> bool {
        self.upstreams.iter().all(|u| u.is_healthy())
    }
}

// Health check loop - any answer below 500 counts as up
pub async fn health_checker(
    upstreams: Arc<UpstreamSet>,
    client: reqwest::Client,
    check_interval: Duration,
) {
    let mut interval = interval(check_interval);

    tracing::info!(interval = ?check_interval, "upstream health checker started");

    loop {
        interval.tick().await;

        for upstream in upstreams.all() {
            let was_healthy = upstream.is_healthy();

            let is_healthy = match client
                .get(&upstream.health_url)
                .timeout(Duration::from_secs(5))
                .send()
                .await
            {
                Ok(res) => !res.status().is_server_error(),
                Err(_) => false,
            };
            upstream.set_healthy(is_healthy);

            // Log status changes
            if was_healthy != is_healthy {
                if is_healthy {
                    tracing::info!(upstream = upstream.name, "upstream is now healthy");
                } else {
                    tracing::warn!(upstream = upstream.name, url = %upstream.health_url, "upstream is now unhealthy");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_reflect_flags() {
        let set = UpstreamSet::new(vec![
            Upstream::new("booking api", "https://api.test".to_string()),
            Upstream::new("hosted backend", "https://hosted.test".to_string()),
        ]);
        assert!(set.all_healthy());

        set.all()[1].set_healthy(false);
        assert!(!set.all_healthy());
        assert_eq!(
            set.statuses(),
            vec![
                UpstreamStatus { name: "booking api", healthy: true },
                UpstreamStatus { name: "hosted backend", healthy: false },
            ]
        );
    }
}
