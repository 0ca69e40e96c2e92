use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::error::CollegeMapError;

/// Sliding-window limiter for credential endpoints, keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<DashMap<IpAddr, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            max_requests: config.max_requests,
            window: config.window(),
        }
    }

    /// Records an attempt from `ip`; `false` once the window is exhausted.
    pub fn check_rate_limit(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut entry = self.attempts.entry(ip).or_default();

        entry.retain(|&at| now.duration_since(at) < self.window);
        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }

    pub fn cleanup_old_entries(&self) -> usize {
        let now = Instant::now();
        let before = self.attempts.len();

        self.attempts.retain(|_, attempts| {
            attempts.retain(|&at| now.duration_since(at) < self.window);
            !attempts.is_empty()
        });

        before.saturating_sub(self.attempts.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn rate_limit_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .ok_or_else(|| CollegeMapError::Internal("Unable to determine client IP".to_string()))?;

    let rate_limiter = req
        .app_data::<web::Data<RateLimiter>>()
        .ok_or_else(|| CollegeMapError::Internal("Rate limiter not available".to_string()))?;

    if !rate_limiter.check_rate_limit(ip) {
        log::warn!("Rate limit exceeded for IP: {}", ip);
        return Err(CollegeMapError::RateLimitExceeded.into());
    }

    next.call(req).await
}
