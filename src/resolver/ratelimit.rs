use std::time::Instant;

use dashmap::DashMap;

use crate::configs::RateLimitConfig;

/// Consulted before every upstream call, keyed by requesting client and
/// target provider. Denial surfaces as a distinct rate-limited outcome,
/// never a silent proceed.
pub trait RateLimiter: Send + Sync {
    fn check(&self, client: &str, provider: &str) -> bool;
}

/// Always allows. The collaborator stub used when limiting is disabled.
pub struct Permissive;

impl RateLimiter for Permissive {
    fn check(&self, _client: &str, _provider: &str) -> bool {
        true
    }
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token buckets per client and per provider, to keep scrape volume under
/// provider ban thresholds.
pub struct TokenBucket {
    capacity: f64,
    refill_per_sec: f64,
    buckets: DashMap<String, Bucket>,
}

impl TokenBucket {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            capacity: f64::from(config.burst).max(0.0),
            refill_per_sec: config.per_second.max(0.0),
            buckets: DashMap::new(),
        }
    }

    fn take(&self, key: String) -> bool {
        let now = Instant::now();
        let mut bucket = self.buckets.entry(key).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refund(&self, key: String) {
        if let Some(mut bucket) = self.buckets.get_mut(&key) {
            bucket.tokens = (bucket.tokens + 1.0).min(self.capacity);
        }
    }
}

impl RateLimiter for TokenBucket {
    fn check(&self, client: &str, provider: &str) -> bool {
        // both budgets must have room, and a denied request must not
        // charge the other party's bucket
        if !self.take(format!("client:{client}")) {
            return false;
        }
        if !self.take(format!("provider:{provider}")) {
            self.refund(format!("client:{client}"));
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(burst: u32, per_second: f64) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            burst,
            per_second,
        }
    }

    #[test]
    fn permissive_always_allows() {
        let limiter = Permissive;
        for _ in 0..1000 {
            assert!(limiter.check("1.2.3.4", "dood"));
        }
    }

    #[test]
    fn burst_is_exhausted_without_refill() {
        let limiter = TokenBucket::new(&config(3, 0.0));
        assert!(limiter.check("a", "vidmoly"));
        assert!(limiter.check("a", "vidmoly"));
        assert!(limiter.check("a", "vidmoly"));
        assert!(!limiter.check("a", "vidmoly"));
    }

    #[test]
    fn clients_have_independent_budgets() {
        let limiter = TokenBucket::new(&config(1, 0.0));
        assert!(limiter.check("a", "vidmoly"));
        assert!(!limiter.check("a", "mixdrop")); // client "a" is out of budget
        assert!(limiter.check("b", "lulu"));
    }

    #[test]
    fn denied_clients_do_not_drain_the_provider_bucket() {
        let limiter = TokenBucket::new(&config(1, 0.0));
        assert!(limiter.check("a", "mixdrop"));
        // "a" is out of client budget; its retries must not charge vidmoly
        for _ in 0..5 {
            assert!(!limiter.check("a", "vidmoly"));
        }
        assert!(limiter.check("b", "vidmoly"));
    }

    #[test]
    fn provider_denial_refunds_the_client_token() {
        let limiter = TokenBucket::new(&config(1, 0.0));
        assert!(limiter.check("a", "vidmoly"));
        // vidmoly's bucket is empty, so "b" is denied but keeps its token
        assert!(!limiter.check("b", "vidmoly"));
        assert!(limiter.check("b", "lulu"));
    }

    #[test]
    fn tokens_refill_over_time() {
        let limiter = TokenBucket::new(&config(1, 1000.0));
        assert!(limiter.check("a", "vidmoly"));
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(limiter.check("a", "vidmoly"));
    }
}
