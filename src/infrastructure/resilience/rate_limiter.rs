//! Rate limiter implementation
//!
//! Rolling-window admission control for external inference calls. Each
//! channel (a model tier) keeps the timestamps of its admitted requests;
//! `admit` suspends the caller until every configured window has room.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::DomainError;
use crate::infrastructure::observability::record_rate_limit_wait;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(3600);
const DAY: Duration = Duration::from_secs(86400);

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_requests_per_day")]
    pub requests_per_day: u32,
}

fn default_true() -> bool {
    true
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_requests_per_day() -> u32 {
    10_000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: default_requests_per_minute(),
            requests_per_day: default_requests_per_day(),
        }
    }
}

impl RateLimitConfig {
    pub fn new(requests_per_minute: u32, requests_per_day: u32) -> Self {
        Self {
            enabled: true,
            requests_per_minute,
            requests_per_day,
        }
    }

    /// No admission control at all
    pub fn unlimited() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.enabled && (self.requests_per_minute == 0 || self.requests_per_day == 0) {
            return Err(DomainError::configuration(
                "Rate limits must be positive when rate limiting is enabled",
            ));
        }

        Ok(())
    }

    /// Windows enforced by this configuration
    pub fn windows(&self) -> Vec<WindowLimit> {
        if !self.enabled {
            return Vec::new();
        }

        vec![
            WindowLimit::new(MINUTE, self.requests_per_minute),
            WindowLimit::new(DAY, self.requests_per_day),
        ]
    }
}

/// Type of rate limit that was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitType {
    PerMinute,
    PerHour,
    PerDay,
    Custom,
}

impl LimitType {
    fn for_window(window: Duration) -> Self {
        match window {
            MINUTE => Self::PerMinute,
            HOUR => Self::PerHour,
            DAY => Self::PerDay,
            _ => Self::Custom,
        }
    }
}

impl std::fmt::Display for LimitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerMinute => write!(f, "per_minute"),
            Self::PerHour => write!(f, "per_hour"),
            Self::PerDay => write!(f, "per_day"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// At most `limit` admissions within any rolling `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub window: Duration,
    pub limit: u32,
    pub limit_type: LimitType,
}

impl WindowLimit {
    /// A zero limit would block forever, so it is raised to one
    pub fn new(window: Duration, limit: u32) -> Self {
        Self {
            window,
            limit: limit.max(1),
            limit_type: LimitType::for_window(window),
        }
    }
}

/// Result of a non-recording rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    /// Whether a request would be admitted right now
    pub allowed: bool,
    /// Remaining requests in the tightest window
    pub remaining: u32,
    /// Limit of the tightest window
    pub limit: u32,
    /// Time until the blocking window has room again
    pub reset_in: Duration,
    /// Which limit is saturated (if any)
    pub limit_type: Option<LimitType>,
}

/// How a request got through admission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Immediate,
    Waited(Duration),
}

impl Admission {
    pub fn waited(&self) -> Duration {
        match self {
            Self::Immediate => Duration::ZERO,
            Self::Waited(duration) => *duration,
        }
    }
}

#[derive(Debug, Default)]
struct ChannelWindow {
    /// Admission times, oldest first
    timestamps: VecDeque<Instant>,
}

impl ChannelWindow {
    fn prune(&mut self, now: Instant, horizon: Duration) {
        while let Some(oldest) = self.timestamps.front() {
            if now.saturating_duration_since(*oldest) >= horizon {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admissions that still count against `window`
    fn in_window(&self, now: Instant, window: Duration) -> impl Iterator<Item = &Instant> {
        self.timestamps
            .iter()
            .filter(move |t| now.saturating_duration_since(**t) < window)
    }

    fn count(&self, now: Instant, window: Duration) -> u32 {
        self.in_window(now, window).count() as u32
    }

    /// How long until `limit` has room, or `None` if it has room now
    fn wait_for(&self, now: Instant, limit: &WindowLimit) -> Option<Duration> {
        if self.count(now, limit.window) < limit.limit {
            return None;
        }

        let oldest = self.in_window(now, limit.window).next()?;
        let elapsed = now.saturating_duration_since(*oldest);
        Some(limit.window.saturating_sub(elapsed))
    }
}

/// Rate limiter for external inference channels
#[derive(Debug)]
pub struct RateLimiter {
    windows: Vec<WindowLimit>,
    /// Per-channel admission records; each channel is locked independently
    channels: RwLock<HashMap<String, Arc<Mutex<ChannelWindow>>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_windows(config.windows())
    }

    /// Limiter with arbitrary windows
    pub fn with_windows(windows: Vec<WindowLimit>) -> Self {
        Self {
            windows,
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Limiter that admits everything
    pub fn unlimited() -> Self {
        Self::with_windows(Vec::new())
    }

    pub fn windows(&self) -> &[WindowLimit] {
        &self.windows
    }

    fn horizon(&self) -> Duration {
        self.windows
            .iter()
            .map(|w| w.window)
            .max()
            .unwrap_or(Duration::ZERO)
    }

    async fn channel(&self, channel: &str) -> Arc<Mutex<ChannelWindow>> {
        if let Some(existing) = self.channels.read().await.get(channel) {
            return existing.clone();
        }

        self.channels
            .write()
            .await
            .entry(channel.to_string())
            .or_default()
            .clone()
    }

    fn required_wait(&self, window: &ChannelWindow, now: Instant) -> Option<Duration> {
        self.windows
            .iter()
            .filter_map(|limit| window.wait_for(now, limit))
            .max()
    }

    /// Wait until a request on `channel` fits every window, then record it
    pub async fn admit(&self, channel: &str) -> Admission {
        if self.windows.is_empty() {
            return Admission::Immediate;
        }

        let entry = self.channel(channel).await;
        let horizon = self.horizon();
        let started = Instant::now();
        let mut waited = false;

        loop {
            let wait = {
                let mut window = entry.lock().await;
                let now = Instant::now();
                window.prune(now, horizon);

                match self.required_wait(&window, now) {
                    None => {
                        window.timestamps.push_back(now);
                        break;
                    }
                    Some(wait) => wait,
                }
            };

            debug!(
                channel = channel,
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, suspending request"
            );
            waited = true;
            tokio::time::sleep(wait).await;
        }

        if waited {
            let elapsed = started.elapsed();
            record_rate_limit_wait(channel, elapsed);
            Admission::Waited(elapsed)
        } else {
            Admission::Immediate
        }
    }

    /// Record an admission without checking the limits
    pub async fn record(&self, channel: &str) {
        let entry = self.channel(channel).await;
        let mut window = entry.lock().await;
        window.timestamps.push_back(Instant::now());
    }

    /// Check whether a request would be admitted now, without recording it
    pub async fn check(&self, channel: &str) -> RateLimitStatus {
        let entry = self.channel(channel).await;
        let mut window = entry.lock().await;
        let now = Instant::now();
        window.prune(now, self.horizon());

        let blocking = self
            .windows
            .iter()
            .filter_map(|limit| window.wait_for(now, limit).map(|wait| (limit, wait)))
            .max_by_key(|(_, wait)| *wait);

        if let Some((limit, wait)) = blocking {
            return RateLimitStatus {
                allowed: false,
                remaining: 0,
                limit: limit.limit,
                reset_in: wait,
                limit_type: Some(limit.limit_type),
            };
        }

        let tightest = self
            .windows
            .iter()
            .min_by_key(|limit| limit.limit.saturating_sub(window.count(now, limit.window)));

        match tightest {
            Some(limit) => RateLimitStatus {
                allowed: true,
                remaining: limit.limit.saturating_sub(window.count(now, limit.window)),
                limit: limit.limit,
                reset_in: limit.window,
                limit_type: None,
            },
            None => RateLimitStatus {
                allowed: true,
                remaining: u32::MAX,
                limit: u32::MAX,
                reset_in: Duration::ZERO,
                limit_type: None,
            },
        }
    }

    /// Admissions on `channel` within the trailing `window`
    pub async fn window_count(&self, channel: &str, window: Duration) -> u32 {
        let entry = self.channel(channel).await;
        let guard = entry.lock().await;
        guard.count(Instant::now(), window)
    }

    /// Reset rate limits for a channel
    pub async fn reset(&self, channel: &str) {
        self.channels.write().await.remove(channel);
    }
}
