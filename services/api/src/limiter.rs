use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashmap::DashMap;
use scope_pricing::config::RateLimitConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Header identifying the caller for quota purposes.
pub(crate) const CLIENT_ID_HEADER: &str = "x-client-id";
const ANONYMOUS: &str = "anonymous";
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Per-key fixed-window request counter.
#[derive(Debug)]
pub(crate) struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub(crate) fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    pub(crate) fn check(&self, key: &str, now: Instant) -> Decision {
        if self.windows.len() >= PRUNE_THRESHOLD {
            let period = self.config.window;
            self.windows
                .retain(|_, window| now.saturating_duration_since(window.started) < period);
        }

        let mut window = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(window.started);
        if elapsed >= self.config.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.config.max_requests {
            let retry_after = self
                .config
                .window
                .saturating_sub(now.saturating_duration_since(window.started));
            return Decision::Limited { retry_after };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.config.max_requests - window.count,
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(ANONYMOUS)
        .to_string()
}

pub(crate) async fn enforce_rate_limit(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    match limiter.check(&key, Instant::now()) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after } => {
            // Round up so clients never retry inside the closed window.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            warn!(client = %key, retry_after_secs = secs, "rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "rate limit exceeded",
                    "retry_after_secs": secs,
                })),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn quota_is_enforced_within_a_window() {
        let limiter = limiter(2, 60);
        let now = Instant::now();
        assert_eq!(
            limiter.check("crew-a", now),
            Decision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check("crew-a", now + Duration::from_secs(1)),
            Decision::Allowed { remaining: 0 }
        );
        assert_eq!(
            limiter.check("crew-a", now + Duration::from_secs(20)),
            Decision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[test]
    fn window_resets_after_period() {
        let limiter = limiter(1, 10);
        let now = Instant::now();
        assert!(matches!(limiter.check("k", now), Decision::Allowed { .. }));
        assert!(matches!(
            limiter.check("k", now + Duration::from_secs(9)),
            Decision::Limited { .. }
        ));
        assert!(matches!(
            limiter.check("k", now + Duration::from_secs(10)),
            Decision::Allowed { .. }
        ));
    }

    #[test]
    fn keys_are_counted_independently() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(matches!(limiter.check("a", now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("b", now), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("a", now), Decision::Limited { .. }));
    }

    #[test]
    fn stale_windows_are_pruned() {
        let limiter = limiter(1, 1);
        let start = Instant::now();
        for index in 0..PRUNE_THRESHOLD {
            limiter.check(&format!("client-{index}"), start);
        }
        limiter.check("late", start + Duration::from_secs(5));
        assert_eq!(limiter.windows.len(), 1);
        assert!(limiter.windows.contains_key("late"));
    }
}
