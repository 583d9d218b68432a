//! Per-IP rate limiting using the token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

type IpGovernorLayer =
    GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn build(per_second: u64, burst_size: u32) -> IpGovernorLayer {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst_size)
            .finish()
            .expect("rate limit period and burst are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Limiter for the public redirect route.
///
/// # Limits
///
/// - **Replenish**: one request per second
/// - **Burst**: 200 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Keys are the
/// socket peer address, so the server must be started with connect info.
pub fn layer() -> IpGovernorLayer {
    build(1, 200)
}

/// Stricter limiter for `/api` (signup, login, shortening, stats).
///
/// # Limits
///
/// - **Replenish**: one request per 2 seconds
/// - **Burst**: 20 requests
pub fn secure_layer() -> IpGovernorLayer {
    build(2, 20)
}
