//! Connection URL construction.
//!
//! The endpoint is immutable per connection attempt and rebuilt for every
//! reconnect, so a refreshed credential is always honored. The scheme
//! mirrors the configured base URL: `https` upgrades to `wss`, `http` to
//! `ws`, and explicit `ws`/`wss` pass through.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::errors::EndpointError;

/// Where to connect: base URL (including path) plus the logical channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
    channel: String,
}

impl Endpoint {
    /// Create an endpoint descriptor.
    pub fn new(base_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            channel: channel.into(),
        }
    }

    /// The configured channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Build the full connection URL for one attempt.
    ///
    /// The token is percent-encoded into the `token` query parameter and is
    /// never stored on the endpoint itself.
    pub fn connect_url(&self, token: &str) -> Result<String, EndpointError> {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if self.base_url.starts_with("wss://") || self.base_url.starts_with("ws://") {
            self.base_url.clone()
        } else {
            return Err(EndpointError::UnsupportedScheme(self.base_url.clone()));
        };

        let token = utf8_percent_encode(token, NON_ALPHANUMERIC);
        let channel = utf8_percent_encode(&self.channel, NON_ALPHANUMERIC);
        let sep = if ws_base.contains('?') { '&' } else { '?' };
        Ok(format!("{ws_base}{sep}token={token}&channel={channel}"))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn https_upgrades_to_wss() {
        let endpoint = Endpoint::new("https://api.example.com/realtime", "ui_events");
        let url = endpoint.connect_url("tok").unwrap();
        assert_eq!(
            url,
            "wss://api.example.com/realtime?token=tok&channel=ui%5Fevents"
        );
    }

    #[test]
    fn http_upgrades_to_ws() {
        let endpoint = Endpoint::new("http://127.0.0.1:8000/api/v1/insight", "ui_events");
        let url = endpoint.connect_url("tok").unwrap();
        assert!(url.starts_with("ws://127.0.0.1:8000/api/v1/insight?"));
    }

    #[test]
    fn ws_scheme_passes_through() {
        let endpoint = Endpoint::new("ws://localhost:9000/ws", "orders");
        let url = endpoint.connect_url("t").unwrap();
        assert!(url.starts_with("ws://localhost:9000/ws?"));

        let endpoint = Endpoint::new("wss://example.com/ws", "orders");
        let url = endpoint.connect_url("t").unwrap();
        assert!(url.starts_with("wss://example.com/ws?"));
    }

    #[test]
    fn token_is_percent_encoded() {
        let endpoint = Endpoint::new("ws://localhost/ws", "orders");
        let url = endpoint.connect_url("a/b+c=").unwrap();
        assert!(url.contains("token=a%2Fb%2Bc%3D"), "got {url}");
    }

    #[test]
    fn existing_query_appends_with_ampersand() {
        let endpoint = Endpoint::new("ws://localhost/ws?v=2", "orders");
        let url = endpoint.connect_url("t").unwrap();
        assert_eq!(url, "ws://localhost/ws?v=2&token=t&channel=orders");
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let endpoint = Endpoint::new("ftp://example.com", "orders");
        assert_matches!(
            endpoint.connect_url("t"),
            Err(EndpointError::UnsupportedScheme(_))
        );
    }

    #[test]
    fn channel_accessor() {
        let endpoint = Endpoint::new("ws://x/ws", "ui_events");
        assert_eq!(endpoint.channel(), "ui_events");
    }
}
