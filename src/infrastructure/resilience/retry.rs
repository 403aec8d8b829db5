//! Bounded retries with capped exponential backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_seconds: f64,
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: f64,
    #[serde(default)]
    pub jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay() -> f64 {
    1.0
}

fn default_max_delay() -> f64 {
    30.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_seconds: default_base_delay(),
            max_delay_seconds: default_max_delay(),
            jitter: false,
        }
    }
}

/// Backoff policy: `min(base * 2^attempt, max_delay)` before retry `attempt`
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay: max_delay.max(base_delay),
            jitter: false,
        }
    }

    /// A single attempt, no retries
    pub fn no_retry() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, DomainError> {
        let valid = |seconds: f64| seconds.is_finite() && seconds >= 0.0;

        if !valid(config.base_delay_seconds) || !valid(config.max_delay_seconds) {
            return Err(DomainError::configuration(
                "Retry delays must be non-negative numbers of seconds",
            ));
        }

        if config.max_delay_seconds < config.base_delay_seconds {
            return Err(DomainError::configuration(
                "Retry max delay must not be smaller than the base delay",
            ));
        }

        Ok(Self::new(
            config.max_retries,
            Duration::from_secs_f64(config.base_delay_seconds),
            Duration::from_secs_f64(config.max_delay_seconds),
        )
        .with_jitter(config.jitter))
    }

    /// Deterministic delay before retry `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// How a failure should be treated by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// Backoff state of one retried operation
#[derive(Debug, Clone)]
pub struct RetryState {
    policy: RetryPolicy,
    attempt: u32,
    next_delay: Duration,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        let next_delay = Self::jittered(policy, policy.delay_for(0), Duration::ZERO);

        Self {
            policy: policy.clone(),
            attempt: 0,
            next_delay,
        }
    }

    /// Retries scheduled so far
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn next_delay(&self) -> Duration {
        self.next_delay
    }

    pub fn can_retry(&self) -> bool {
        self.attempt < self.policy.max_retries
    }

    /// Register a transient failure. Returns the delay before the next
    /// attempt, or `None` once the retry budget is spent.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if !self.can_retry() {
            return None;
        }

        let delay = self.next_delay;
        self.attempt += 1;

        let base = self.policy.delay_for(self.attempt);
        self.next_delay = Self::jittered(&self.policy, base, delay);

        Some(delay)
    }

    /// Jitter never drops below the previous delay nor exceeds the cap
    fn jittered(policy: &RetryPolicy, base: Duration, floor: Duration) -> Duration {
        let delay = if policy.jitter && !base.is_zero() {
            let factor: f64 = rand::thread_rng().gen_range(0.0..0.25);
            base.saturating_add(base.mul_f64(factor))
        } else {
            base
        };

        delay.max(floor).min(policy.max_delay)
    }
}

/// Successful result of a retried operation
#[derive(Debug, Clone)]
pub struct RetryOutcome<T> {
    pub value: T,
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Delays slept between attempts
    pub delays: Vec<Duration>,
}

/// Terminal failure of a retried operation
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("Retries exhausted after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        delays: Vec<Duration>,
        last_error: E,
    },

    #[error("Permanent failure after {attempts} attempts: {error}")]
    Permanent { attempts: u32, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Permanent { attempts, .. } => *attempts,
        }
    }
}

/// Runs an operation under a retry policy
#[derive(Debug, Clone, Default)]
pub struct RetryController {
    policy: RetryPolicy,
}

impl RetryController {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `operation` (with the 1-based attempt number) until it
    /// succeeds, fails permanently, or the retry budget is spent
    pub async fn run<T, E, F, Fut, C>(
        &self,
        mut operation: F,
        classify: C,
    ) -> Result<RetryOutcome<T>, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> ErrorClass,
        E: Display,
    {
        let mut state = RetryState::new(&self.policy);
        let mut delays = Vec::new();
        let mut attempts = 0;

        loop {
            attempts += 1;

            let error = match operation(attempts).await {
                Ok(value) => {
                    return Ok(RetryOutcome {
                        value,
                        attempts,
                        delays,
                    })
                }
                Err(error) => error,
            };

            if classify(&error) == ErrorClass::Permanent {
                debug!(attempt = attempts, error = %error, "Permanent failure, not retrying");
                return Err(RetryError::Permanent { attempts, error });
            }

            match state.on_failure() {
                Some(delay) => {
                    debug!(
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Transient failure, retrying"
                    );
                    delays.push(delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    warn!(attempts = attempts, error = %error, "Retries exhausted");
                    return Err(RetryError::Exhausted {
                        attempts,
                        delays,
                        last_error: error,
                    });
                }
            }
        }
    }
}
