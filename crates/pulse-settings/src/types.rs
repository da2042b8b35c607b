//! Settings types with compiled defaults.

use pulse_core::BackoffPolicy;
use pulse_core::backoff::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_LINEAR_STEP_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
};
use serde::{Deserialize, Serialize};

/// Default heartbeat interval in milliseconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 30_000;

/// Root settings document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulseSettings {
    /// Where to connect.
    pub server: ServerSettings,
    /// Reconnect behavior.
    pub reconnect: ReconnectSettings,
    /// Keepalive behavior.
    pub heartbeat: HeartbeatSettings,
}

/// Server endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Base URL including path. `http(s)` schemes upgrade to `ws(s)`.
    pub url: String,
    /// Logical channel passed as the `channel` query parameter.
    pub channel: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/api/v1/insight".to_string(),
            channel: "ui_events".to_string(),
        }
    }
}

/// Which delay curve the reconnect loop uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Capped exponential doubling.
    #[default]
    Exponential,
    /// Fixed per-attempt ramp.
    Linear,
}

/// Reconnect settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconnectSettings {
    /// Delay curve to use.
    pub strategy: BackoffStrategy,
    /// Exponential base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Linear per-attempt step in milliseconds.
    pub step_ms: u64,
    /// Upper bound on any delay in milliseconds.
    pub max_delay_ms: u64,
    /// Attempts before the client gives up and goes terminal.
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            step_ms: DEFAULT_LINEAR_STEP_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ReconnectSettings {
    /// Build the backoff policy these settings describe.
    #[must_use]
    pub fn policy(&self) -> BackoffPolicy {
        match self.strategy {
            BackoffStrategy::Exponential => BackoffPolicy::Exponential {
                base_ms: self.base_delay_ms,
                cap_ms: self.max_delay_ms,
            },
            BackoffStrategy::Linear => BackoffPolicy::Linear {
                step_ms: self.step_ms,
                cap_ms: self.max_delay_ms,
            },
        }
    }
}

/// Keepalive settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeartbeatSettings {
    /// Interval between outbound `{"type":"ping"}` frames in milliseconds.
    pub interval_ms: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_HEARTBEAT_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_policy_exponential() {
        let settings = ReconnectSettings::default();
        assert_eq!(
            settings.policy(),
            BackoffPolicy::Exponential {
                base_ms: 1000,
                cap_ms: 30_000
            }
        );
    }

    #[test]
    fn reconnect_policy_linear() {
        let settings = ReconnectSettings {
            strategy: BackoffStrategy::Linear,
            ..ReconnectSettings::default()
        };
        assert_eq!(
            settings.policy(),
            BackoffPolicy::Linear {
                step_ms: 3000,
                cap_ms: 30_000
            }
        );
    }

    #[test]
    fn settings_serde_partial_document() {
        // A sparse user file fills the rest from defaults
        let json = r#"{"server":{"url":"wss://prod.example.com/rt"}}"#;
        let settings: PulseSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.server.url, "wss://prod.example.com/rt");
        assert_eq!(settings.server.channel, "ui_events");
        assert_eq!(settings.reconnect.max_attempts, 5);
    }

    #[test]
    fn settings_serde_roundtrip() {
        let settings = PulseSettings {
            reconnect: ReconnectSettings {
                strategy: BackoffStrategy::Linear,
                max_attempts: 3,
                ..ReconnectSettings::default()
            },
            ..PulseSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: PulseSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }

    #[test]
    fn settings_json_uses_camel_case() {
        let json = serde_json::to_value(PulseSettings::default()).unwrap();
        assert!(json["reconnect"].get("maxAttempts").is_some());
        assert!(json["heartbeat"].get("intervalMs").is_some());
    }
}
