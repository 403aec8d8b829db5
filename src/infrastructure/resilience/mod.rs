//! Admission control and retries around external inference

mod rate_limiter;
mod retry;

pub use rate_limiter::{
    Admission, LimitType, RateLimitConfig, RateLimitStatus, RateLimiter, WindowLimit,
};
pub use retry::{
    ErrorClass, RetryConfig, RetryController, RetryError, RetryOutcome, RetryPolicy, RetryState,
};
