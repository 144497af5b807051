//! Rate limiting middleware
//!
//! Per-client token buckets. Clients are keyed by the first
//! `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

use crate::error::ApiError;

/// Token bucket for rate limiting
#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(max_tokens: f64) -> Self {
        Self {
            tokens: max_tokens,
            last_update: Instant::now(),
        }
    }

    fn try_consume(&mut self, tokens_per_second: f64, max_tokens: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = (self.tokens + elapsed * tokens_per_second).min(max_tokens);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Rate limiter state
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, TokenBucket>>>,
    tokens_per_second: f64,
    max_tokens: f64,
}

impl RateLimiter {
    /// Allow `requests_per_second` sustained, with bursts of twice that
    pub fn new(requests_per_second: u32) -> Self {
        let requests_per_second = requests_per_second.max(1);
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            tokens_per_second: f64::from(requests_per_second),
            max_tokens: f64::from(requests_per_second) * 2.0,
        }
    }

    /// Take one token for `key`, returning whether the request may proceed
    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.write().await;

        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.max_tokens));

        bucket.try_consume(self.tokens_per_second, self.max_tokens)
    }

    /// Drop buckets idle for longer than `max_age`, returning how many
    pub async fn cleanup(&self, max_age: Duration) -> usize {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();
        let before = buckets.len();

        buckets.retain(|_, bucket| now.duration_since(bucket.last_update) < max_age);
        before - buckets.len()
    }
}

/// Use with `axum::middleware::from_fn_with_state`
pub async fn rate_limit(
    State(rate_limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let client_key = client_key(&request);

    if !rate_limiter.check(&client_key).await {
        tracing::warn!(client = %client_key, path = %request.uri().path(), "Rate limit exceeded");
        let mut response = ApiError::TooManyRequests.into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        return response;
    }

    next.run(request).await
}

fn client_key(request: &Request) -> String {
    let headers = request.headers();

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return ip.trim().to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
