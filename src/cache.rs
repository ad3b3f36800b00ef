use dashmap::DashMap;
use std::time::{Duration, Instant};
use crate::clients::PricingPlan;
use crate::metrics::{PRICING_CACHE_HITS, PRICING_CACHE_MISSES};

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub plans: Vec<PricingPlan>,
    pub created_at: Instant,
}

// Create a cache key from the region exactly as it goes upstream
// (the backend filter is case-sensitive); "*" for all regions
pub fn make_cache_key(region: Option<&str>) -> String {
    match region {
        Some(r) => r.trim().to_string(),
        None => "*".to_string(),
    }
}

pub struct PricingCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl PricingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, region: Option<&str>) -> Option<Vec<PricingPlan>> {
        let key = make_cache_key(region);
        let hit = self
            .entries
            .get(&key)
            .filter(|entry| entry.created_at.elapsed() < self.ttl)
            .map(|entry| entry.plans.clone());

        match hit {
            Some(_) => PRICING_CACHE_HITS.inc(),
            None => PRICING_CACHE_MISSES.inc(),
        }
        hit
    }

    pub fn insert(&self, region: Option<&str>, plans: Vec<PricingPlan>) {
        self.entries.insert(
            make_cache_key(region),
            CacheEntry {
                plans,
                created_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(region: &str) -> PricingPlan {
        PricingPlan {
            id: 1,
            region: region.to_string(),
            currency: "INR".to_string(),
            discounted_price: "3500".to_string(),
            discount_percentage: 40.0,
            strike_through_price: "5833".to_string(),
            savings: "2333".to_string(),
            button_id: "pl_1".to_string(),
        }
    }

    #[test]
    fn keys_keep_case() {
        assert_eq!(make_cache_key(Some(" India ")), make_cache_key(Some("India")));
        assert_ne!(make_cache_key(Some("India")), make_cache_key(Some("india")));
        assert_ne!(make_cache_key(Some("india")), make_cache_key(None));
    }

    #[test]
    fn hit_within_ttl() {
        let cache = PricingCache::new(Duration::from_secs(60));
        assert!(cache.get(Some("India")).is_none());
        cache.insert(Some("India"), vec![plan("India")]);
        assert_eq!(cache.get(Some(" India")).unwrap()[0].region, "India");
        assert!(cache.get(Some("india")).is_none());
        assert!(cache.get(None).is_none());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let cache = PricingCache::new(Duration::ZERO);
        cache.insert(None, vec![plan("US")]);
        assert!(cache.get(None).is_none());
    }
}
