pub mod auth;
pub mod rate_limit;

pub use auth::{session_middleware, Authenticated, CurrentUser};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
