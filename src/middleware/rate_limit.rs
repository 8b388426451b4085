// Rate limiting middleware using tower-governor
//
// One quota per client IP across every route: `rate_limit_requests` requests
// replenished evenly over `rate_limit_window_secs`, with the whole quota
// available as a burst. The client IP comes from X-Forwarded-For / X-Real-IP
// when present, otherwise from the peer address.
//
// Applied in app.rs outside CORS and require_auth when enabled

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer};
use tracing::{debug, warn};

use crate::config::ApiConfig;

/// Milliseconds between single-request replenishments
fn replenish_interval_ms(api: &ApiConfig) -> Option<u64> {
    if api.rate_limit_requests == 0 || api.rate_limit_window_secs == 0 {
        return None;
    }
    let window_ms = api.rate_limit_window_secs.saturating_mul(1000);
    Some((window_ms / u64::from(api.rate_limit_requests)).max(1))
}

/// Wrap `router` with the per-IP limiter described by `api`
pub fn apply<S>(router: Router<S>, api: &ApiConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(interval_ms) = replenish_interval_ms(api) else {
        warn!("Rate limiting enabled with an empty quota; limiter not installed");
        return router;
    };

    let Some(config) = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_millisecond(interval_ms)
        .burst_size(api.rate_limit_requests)
        .finish()
    else {
        warn!("Invalid rate limit configuration; limiter not installed");
        return router;
    };
    let config = Arc::new(config);

    // Forget clients whose quota has fully replenished; stops once the router is dropped
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let limiter = Arc::downgrade(config.limiter());
            handle.spawn(async move {
                let mut interval = tokio::time::interval(Duration::from_secs(60));
                loop {
                    interval.tick().await;
                    let Some(limiter) = limiter.upgrade() else {
                        debug!("Rate limiter dropped; cleanup stopped");
                        break;
                    };
                    debug!("Rate limiter tracking {} clients", limiter.len());
                    limiter.retain_recent();
                }
            });
        }
        Err(_) => warn!("No Tokio runtime; rate limiter cleanup not scheduled"),
    }

    router.layer(GovernorLayer { config })
}
