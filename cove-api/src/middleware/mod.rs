pub mod auth;
pub mod resiliency;

pub use auth::{require_admin, AdminClaims};
pub use resiliency::{checkout_breaker_middleware, CircuitBreaker};
