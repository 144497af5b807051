//! Middleware for the car inventory API
//!
//! Request tracing, rate limiting, security headers and bearer-token
//! authentication.

pub mod auth;
mod rate_limiter;
mod security;
mod trace;

pub use auth::{require_auth, AuthenticatedUser};
pub use rate_limiter::{rate_limit, RateLimiter};
pub use security::{hsts_header, security_headers};
pub use trace::{request_tracing, REQUEST_ID_HEADER};
