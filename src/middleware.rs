//! Axum middleware for request throttling.
//!
//! Fixed-window rate limiter applied to the whole API namespace:
//! each client gets `max_requests` per `window`; requests beyond that
//! are answered with a 429 envelope before reaching the router.
//!
//! Clients are keyed by the first `X-Forwarded-For` hop when present,
//! falling back to the peer socket address.

use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tower::{Layer, Service};

/// Header consulted for the client address behind a proxy.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Create a layer that throttles requests per client.
#[must_use]
pub fn rate_limit_layer(max_requests: u32, window: Duration) -> RateLimitLayer {
    RateLimitLayer {
        limiter: Arc::new(RateLimiter::new(max_requests, window)),
    }
}

/// Shared fixed-window counters.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, ClientWindow>>,
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a hit for `client` and report whether it is still within
    /// its budget for the current window.
    ///
    /// Expired windows are evicted on every hit: client keys are
    /// attacker-influenced (`X-Forwarded-For`), so the map must not
    /// grow with the number of distinct keys ever seen.
    fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        windows.retain(|_, window| now.duration_since(window.started) < self.window);

        let window = windows.entry(client.to_string()).or_insert(ClientWindow {
            started: now,
            count: 0,
        });
        window.count += 1;
        window.count <= self.max_requests
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Layer wrapping services with the rate limiter.
#[derive(Clone, Debug)]
pub struct RateLimitLayer {
    limiter: Arc<RateLimiter>,
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Middleware service enforcing the per-client budget.
#[derive(Clone, Debug)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    limiter: Arc<RateLimiter>,
}

fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return forwarded.trim().to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

impl<S> Service<Request> for RateLimitMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let client = client_key(&req);
        if self.limiter.check(&client) {
            let fut = self.inner.call(req);
            Box::pin(fut)
        } else {
            tracing::warn!(client = %client, "rate limit exceeded");
            let response =
                ApiError::too_many_requests("Too many requests, please try again later")
                    .into_response();
            Box::pin(async move { Ok(response) })
        }
    }
}
