//! Connection lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the realtime connection.
///
/// Exactly one state exists per logical client. Transitions are driven by
/// the connection driver in `pulse-client`:
///
/// ```text
/// Idle → Connecting → Open → Reconnecting → Connecting → ...
///                                        ↘ Closed (stop / budget exhausted)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Not started, or start was skipped because no credential exists.
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// The socket is established and frames are flowing.
    Open,
    /// Waiting out a backoff delay before the next attempt.
    Reconnecting,
    /// Stopped explicitly, closed normally by the server, or the reconnect
    /// budget is exhausted. Terminal until an explicit restart.
    Closed,
}

impl ConnectionState {
    /// Whether the socket is currently established.
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether no automatic transition leaves this state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_open() {
        assert!(ConnectionState::Open.is_open());
        assert!(!ConnectionState::Connecting.is_open());
        assert!(!ConnectionState::Reconnecting.is_open());
    }

    #[test]
    fn only_closed_is_terminal() {
        assert!(ConnectionState::Closed.is_terminal());
        assert!(!ConnectionState::Idle.is_terminal());
        assert!(!ConnectionState::Open.is_terminal());
    }

    #[test]
    fn display_names() {
        assert_eq!(ConnectionState::Idle.to_string(), "idle");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
    }

    #[test]
    fn serde_roundtrip() {
        for state in [
            ConnectionState::Idle,
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
            ConnectionState::Closed,
        ] {
            let json = serde_json::to_string(&state).unwrap();
            let back: ConnectionState = serde_json::from_str(&json).unwrap();
            assert_eq!(state, back);
        }
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ConnectionState::Open).unwrap();
        assert_eq!(json, "\"open\"");
    }
}
