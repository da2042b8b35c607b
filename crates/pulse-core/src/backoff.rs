//! Reconnect backoff calculation.
//!
//! Pure delay math with no I/O. The async driver in `pulse-client` asks for
//! a delay per attempt and sleeps it out; this module only decides how long.
//!
//! Two strategies exist because the original deployments relied on two
//! shapes: a capped exponential curve for UI-event sockets and a fixed
//! linear ramp for order-notification sockets. Both are configuration now.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base delay for the exponential strategy, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
/// Default delay cap, in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
/// Default per-attempt step for the linear strategy, in milliseconds.
pub const DEFAULT_LINEAR_STEP_MS: u64 = 3000;
/// Default reconnect attempt budget before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Maps a zero-based reconnect attempt index to a wait duration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum BackoffPolicy {
    /// `min(base * 2^attempt, cap)`.
    Exponential {
        /// Delay for attempt 0, in milliseconds.
        #[serde(default = "default_base_delay_ms")]
        base_ms: u64,
        /// Upper bound on any delay, in milliseconds.
        #[serde(default = "default_max_delay_ms")]
        cap_ms: u64,
    },
    /// `min(step * (attempt + 1), cap)`.
    Linear {
        /// Per-attempt increment, in milliseconds.
        #[serde(default = "default_linear_step_ms")]
        step_ms: u64,
        /// Upper bound on any delay, in milliseconds.
        #[serde(default = "default_max_delay_ms")]
        cap_ms: u64,
    },
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}
fn default_linear_step_ms() -> u64 {
    DEFAULT_LINEAR_STEP_MS
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::Exponential {
            base_ms: DEFAULT_BASE_DELAY_MS,
            cap_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next connect attempt.
    ///
    /// `attempt` is zero-based: attempt 0 is the first reconnect after a
    /// drop. Saturates instead of overflowing for arbitrarily large attempt
    /// numbers, so the result is always `<= cap`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let ms = match *self {
            Self::Exponential { base_ms, cap_ms } => {
                let factor = 1u64 << attempt.min(31);
                base_ms.saturating_mul(factor).min(cap_ms)
            }
            Self::Linear { step_ms, cap_ms } => step_ms
                .saturating_mul(u64::from(attempt).saturating_add(1))
                .min(cap_ms),
        };
        Duration::from_millis(ms)
    }
}
