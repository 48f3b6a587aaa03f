//! Reconnection policy
//!
//! Supervised retry for sessions whose transport dropped.

use std::time::Duration;

/// Policy applied when an established session loses its transport
///
/// Delays grow by doubling from `initial_delay` up to `max_delay`; a
/// successful handshake resets the attempt counter. The supervising task
/// races every delay against shutdown, so an unbounded policy is still
/// cancellable.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    enabled: bool,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for the growing delay
    pub max_delay: Duration,

    /// Give up after this many consecutive failed attempts (None = no bound)
    pub max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// Default delay before the first retry
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

    /// Default upper bound for the growing delay
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

    /// A policy that never reconnects; the caller owns recovery
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the delay before the first retry
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the upper bound for the growing delay
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Bound the number of consecutive failed attempts
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Check whether reconnection is enabled
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Delay before the given attempt (1-based), doubling and capped
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self.initial_delay.saturating_mul(1_u32 << exponent);
        delay.min(self.max_delay)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            max_attempts: None,
        }
    }
}
