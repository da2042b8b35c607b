//! Layered settings loading.
//!
//! A user file only has to state what differs from the defaults: the file
//! is deep-merged over [`PulseSettings::default()`], then `PULSE_*`
//! environment variables override individual fields on top. A sparse file
//! like `{"server":{"url":...}}` therefore leaves every other knob at its
//! default.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{BackoffStrategy, PulseSettings};

/// The conventional settings location, `~/.pulse/settings.json`.
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".pulse").join("settings.json")
}

/// Load from the conventional location, env overrides applied.
pub fn load_settings() -> Result<PulseSettings> {
    load_settings_from_path(&settings_path())
}

/// Load from an explicit path, env overrides applied.
///
/// A missing file yields the defaults; a file that exists but does not
/// parse is an error, because silently ignoring a broken config hides
/// typos from the operator.
pub fn load_settings_from_path(path: &Path) -> Result<PulseSettings> {
    let defaults = serde_json::to_value(PulseSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: PulseSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Merge `source` over `target`, recursing through objects.
///
/// Arrays and primitives in `source` replace the target value wholesale;
/// an explicit null in `source` is skipped so it cannot erase a default.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
pub fn apply_env_overrides(settings: &mut PulseSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides from an arbitrary lookup.
///
/// Parsing is strict: integers must be valid and within range, and invalid
/// values are silently ignored (falling back to file/default). Separated
/// from the process environment so tests can inject values without
/// mutating global state.
pub fn apply_overrides_from(
    settings: &mut PulseSettings,
    get: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = read_string(&get, "PULSE_WS_URL") {
        settings.server.url = v;
    }
    if let Some(v) = read_string(&get, "PULSE_CHANNEL") {
        settings.server.channel = v;
    }
    if let Some(v) = read_string(&get, "PULSE_BACKOFF_STRATEGY") {
        match v.as_str() {
            "exponential" => settings.reconnect.strategy = BackoffStrategy::Exponential,
            "linear" => settings.reconnect.strategy = BackoffStrategy::Linear,
            _ => {}
        }
    }
    if let Some(v) = read_u32(&get, "PULSE_MAX_RECONNECTS", 1, 100) {
        settings.reconnect.max_attempts = v;
    }
    if let Some(v) = read_u64(&get, "PULSE_BASE_DELAY_MS", 10, 600_000) {
        settings.reconnect.base_delay_ms = v;
    }
    if let Some(v) = read_u64(&get, "PULSE_STEP_MS", 10, 600_000) {
        settings.reconnect.step_ms = v;
    }
    if let Some(v) = read_u64(&get, "PULSE_MAX_DELAY_MS", 100, 600_000) {
        settings.reconnect.max_delay_ms = v;
    }
    if let Some(v) = read_u64(&get, "PULSE_HEARTBEAT_INTERVAL", 1000, 600_000) {
        settings.heartbeat.interval_ms = v;
    }
}

fn read_string(get: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    get(name).filter(|v| !v.is_empty())
}

fn read_u64(get: &impl Fn(&str) -> Option<String>, name: &str, min: u64, max: u64) -> Option<u64> {
    get(name)?
        .parse::<u64>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}

fn read_u32(get: &impl Fn(&str) -> Option<String>, name: &str, min: u32, max: u32) -> Option<u32> {
    get(name)?
        .parse::<u32>()
        .ok()
        .filter(|v| (min..=max).contains(v))
}
