//! # pulse-cli
//!
//! Terminal client for the Pulse realtime event stream. Connects with the
//! same lifecycle as the app clients (reconnect, heartbeat, dispatch) and
//! prints everything it receives.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pulse_client::{ClientConfig, DATA_UPDATE, LogEffects, MODAL_OPEN, PulseClient, StaticToken};
use pulse_core::ConnectionState;
use pulse_settings::{PulseSettings, load_settings, load_settings_from_path};
use tracing_subscriber::EnvFilter;

/// Pulse realtime event tail.
#[derive(Parser, Debug)]
#[command(name = "pulse", about = "Tail the Pulse realtime event stream")]
struct Cli {
    /// Server URL (overrides settings).
    #[arg(long)]
    url: Option<String>,

    /// Channel to subscribe (overrides settings).
    #[arg(long)]
    channel: Option<String>,

    /// Bearer token; falls back to the PULSE_TOKEN environment variable.
    #[arg(long)]
    token: Option<String>,

    /// Path to a settings file (default `~/.pulse/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl Cli {
    fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("PULSE_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }

    fn resolve_settings(&self) -> PulseSettings {
        match &self.settings {
            Some(path) => load_settings_from_path(path).unwrap_or_default(),
            None => load_settings().unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();

    let Some(token) = args.resolve_token() else {
        bail!("no token: pass --token or set PULSE_TOKEN");
    };

    let mut settings = args.resolve_settings();
    if let Some(url) = args.url {
        settings.server.url = url;
    }
    if let Some(channel) = args.channel {
        settings.server.channel = channel;
    }

    let config = ClientConfig::from_settings(&settings);
    tracing::info!(
        url = settings.server.url,
        channel = settings.server.channel,
        "connecting"
    );

    let client = PulseClient::new(
        config,
        Arc::new(StaticToken::new(token)),
        Arc::new(LogEffects),
    );

    let _data = client.subscribe(DATA_UPDATE, |payload| {
        println!("[data-update] {payload}");
    });
    let _modal = client.subscribe(MODAL_OPEN, |payload| {
        println!("[modal-open] {payload}");
    });

    client.start();

    // Run until interrupted or the client goes terminal on its own
    // (reconnect budget exhausted, credential rejected).
    let watch = async {
        loop {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            if client.state() == ConnectionState::Closed {
                break;
            }
        }
    };
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted, shutting down");
        }
        () = watch => {
            bail!("connection closed");
        }
    }

    client.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_settings() {
        let cli = Cli::parse_from(["pulse"]);
        assert!(cli.url.is_none());
        assert!(cli.channel.is_none());
        assert!(cli.settings.is_none());
    }

    #[test]
    fn cli_explicit_token_wins() {
        let cli = Cli::parse_from(["pulse", "--token", "t-123"]);
        assert_eq!(cli.resolve_token().as_deref(), Some("t-123"));
    }

    #[test]
    fn cli_url_and_channel_overrides() {
        let cli = Cli::parse_from([
            "pulse",
            "--url",
            "wss://pulse.example.com/api/v1/insight",
            "--channel",
            "kitchen",
        ]);
        assert_eq!(
            cli.url.as_deref(),
            Some("wss://pulse.example.com/api/v1/insight")
        );
        assert_eq!(cli.channel.as_deref(), Some("kitchen"));
    }

    #[test]
    fn cli_settings_path() {
        let cli = Cli::parse_from(["pulse", "--settings", "/tmp/settings.json"]);
        assert_eq!(cli.settings, Some(PathBuf::from("/tmp/settings.json")));
    }
}
