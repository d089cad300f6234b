//! Shared state for the API layer: request context and the fixed-window
//! rate limiter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::api::security::{ApiKeyValidator, OriginPolicy};
use crate::config::AppConfig;
use crate::model::GenerativeClient;
use crate::storage::{LogStore, ObjectStore};

/// Fixed rate-limit window.
const WINDOW_MS: i64 = 60_000;

/// Shared context for all routes and middleware.
///
/// Constructed once at startup and injected — the rate-limit table is the
/// only mutable piece, and the only state whose lifetime spans requests.
#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<AppConfig>,
    pub keys: Arc<ApiKeyValidator>,
    pub origins: OriginPolicy,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
    pub ocr_model: Arc<dyn GenerativeClient>,
    pub advice_model: Arc<dyn GenerativeClient>,
    pub objects: Arc<dyn ObjectStore>,
    pub logs: Arc<dyn LogStore>,
}

impl ApiContext {
    pub fn new(
        config: AppConfig,
        ocr_model: Arc<dyn GenerativeClient>,
        advice_model: Arc<dyn GenerativeClient>,
        objects: Arc<dyn ObjectStore>,
        logs: Arc<dyn LogStore>,
    ) -> Self {
        Self {
            keys: Arc::new(ApiKeyValidator::from_list(&config.api_keys)),
            origins: OriginPolicy::from_list(&config.allowed_origins),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new())),
            config: Arc::new(config),
            ocr_model,
            advice_model,
            objects,
            logs,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Rate limiter — fixed window per identifier
// ═══════════════════════════════════════════════════════════

/// One identifier's window.
#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u32,
    reset_at_ms: i64,
}

/// Snapshot returned alongside responses (`X-RateLimit-*` headers, 429
/// bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitInfo {
    /// Reset instant as RFC3339, for client-facing `resetTime` fields.
    pub fn reset_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.reset_at_ms)
            .unwrap_or_default()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

/// Fixed-window counter per identifier.
///
/// The first request in a window creates `{count: 1, reset: now+60s}`;
/// later requests increment until the limit, and the first request past the
/// reset time starts a fresh window. Bursts straddling a window boundary
/// can briefly exceed the limit — accepted for this traffic volume.
pub struct RateLimiter {
    windows: HashMap<String, RateLimitRecord>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
        }
    }

    /// Count this request against `identifier`. Returns `true` when the
    /// request goes over the per-window limit.
    pub fn is_limited(&mut self, identifier: &str, limit: u32) -> bool {
        self.is_limited_at(identifier, limit, now_ms())
    }

    /// Remaining budget and reset time, without counting a request.
    pub fn info(&self, identifier: &str, limit: u32) -> RateLimitInfo {
        self.info_at(identifier, limit, now_ms())
    }

    /// Drop records whose window has passed. Runs on a timer; the lock is
    /// held only for this in-memory retain.
    pub fn sweep(&mut self) {
        self.sweep_at(now_ms())
    }

    fn is_limited_at(&mut self, identifier: &str, limit: u32, now_ms: i64) -> bool {
        match self.windows.get_mut(identifier) {
            Some(record) if now_ms <= record.reset_at_ms => {
                if record.count >= limit {
                    return true;
                }
                record.count += 1;
                false
            }
            _ => {
                self.windows.insert(
                    identifier.to_string(),
                    RateLimitRecord {
                        count: 1,
                        reset_at_ms: now_ms + WINDOW_MS,
                    },
                );
                false
            }
        }
    }

    fn info_at(&self, identifier: &str, limit: u32, now_ms: i64) -> RateLimitInfo {
        match self.windows.get(identifier) {
            Some(record) if now_ms <= record.reset_at_ms => RateLimitInfo {
                limit,
                remaining: limit.saturating_sub(record.count),
                reset_at_ms: record.reset_at_ms,
            },
            _ => RateLimitInfo {
                limit,
                remaining: limit,
                reset_at_ms: now_ms + WINDOW_MS,
            },
        }
    }

    fn sweep_at(&mut self, now_ms: i64) {
        self.windows.retain(|_, record| now_ms <= record.reset_at_ms);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn first_request_opens_a_window() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.is_limited_at("k1", 10, T0));
        let info = limiter.info_at("k1", 10, T0);
        assert_eq!(info.remaining, 9);
        assert_eq!(info.reset_at_ms, T0 + 60_000);
    }

    #[test]
    fn request_past_limit_is_limited() {
        let mut limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(!limiter.is_limited_at("k1", 3, T0));
        }
        // The (N+1)-th call inside the window is refused.
        assert!(limiter.is_limited_at("k1", 3, T0 + 1_000));
        assert_eq!(limiter.info_at("k1", 3, T0 + 1_000).remaining, 0);
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.is_limited_at("k1", 1, T0));
        assert!(limiter.is_limited_at("k1", 1, T0 + 30_000));
        // First call after the reset instant starts over at count 1.
        assert!(!limiter.is_limited_at("k1", 1, T0 + 60_001));
        assert_eq!(limiter.info_at("k1", 1, T0 + 60_002).remaining, 0);
    }

    #[test]
    fn identifiers_are_isolated() {
        let mut limiter = RateLimiter::new();
        assert!(!limiter.is_limited_at("k1", 1, T0));
        assert!(!limiter.is_limited_at("k2", 1, T0));
        assert!(limiter.is_limited_at("k1", 1, T0));
    }

    #[test]
    fn info_without_record_reports_full_budget() {
        let limiter = RateLimiter::new();
        let info = limiter.info_at("nobody", 10, T0);
        assert_eq!(info.remaining, 10);
        assert_eq!(info.reset_at_ms, T0 + 60_000);
    }

    #[test]
    fn sweep_drops_only_expired_windows() {
        let mut limiter = RateLimiter::new();
        limiter.is_limited_at("old", 10, T0);
        limiter.is_limited_at("fresh", 10, T0 + 50_000);
        limiter.sweep_at(T0 + 70_000);
        assert_eq!(limiter.len(), 1);
        // The fresh window survives with its count intact.
        assert_eq!(limiter.info_at("fresh", 10, T0 + 70_000).remaining, 9);
    }

    #[test]
    fn reset_time_formats_as_rfc3339() {
        let info = RateLimitInfo {
            limit: 10,
            remaining: 10,
            reset_at_ms: 1_700_000_000_000,
        };
        assert_eq!(info.reset_rfc3339(), "2023-11-14T22:13:20.000Z");
    }
}
