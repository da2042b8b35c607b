//! Connection driver: owns one physical socket, its lifecycle state
//! machine, the heartbeat, and the reconnect loop.
//!
//! One driver task runs per `start()`. Every state mutation is guarded by a
//! generation compare so a slow-dying driver from a previous `start()` can
//! never touch state that now belongs to a new one. Transport errors are
//! expected during normal operation (server restarts, network blips) and
//! feed the ordinary reconnect path; they never escape this module.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use pulse_core::{ConnectionState, ping_frame};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Utf8Bytes;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::client::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::token::TokenProvider;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// State shared between the public handle and the driver task.
pub(crate) struct ConnectionShared {
    /// Current lifecycle state.
    pub(crate) state: Mutex<ConnectionState>,
    /// Reconnect attempt counter; reset to 0 on every `Open`, pinned to the
    /// maximum by `stop()`.
    pub(crate) attempts: AtomicU32,
    /// Monotonically increasing run token. Bumped on every `start()` and
    /// `stop()`; a driver holding a stale value may not mutate state.
    pub(crate) generation: AtomicU64,
}

impl ConnectionShared {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Idle),
            attempts: AtomicU32::new(0),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Set the state iff `generation` is still current.
    ///
    /// Returns `false` when the driver has been superseded and must exit.
    pub(crate) fn set_state(&self, generation: u64, next: ConnectionState) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *self.state.lock() = next;
        true
    }
}

/// How one established session ended.
enum SessionEnd {
    /// `stop()` was called; a normal close frame was sent.
    Cancelled,
    /// The server closed with a normal-closure code (1000/1001).
    Normal,
    /// Dropped, errored, or closed abnormally — reconnect.
    Abnormal,
}

/// Connect-and-retry loop for one `start()` call.
pub(crate) async fn run_driver(
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
    dispatcher: Arc<Dispatcher>,
    shared: Arc<ConnectionShared>,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() {
            let _ = shared.set_state(generation, ConnectionState::Closed);
            return;
        }

        // The credential is re-read on every attempt so a refreshed token
        // is honored mid-reconnect.
        let Some(token) = tokens.token() else {
            info!("credential no longer available, realtime client going offline");
            let _ = shared.set_state(generation, ConnectionState::Closed);
            return;
        };
        let url = match config.endpoint.connect_url(&token) {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "endpoint misconfigured, realtime client going offline");
                let _ = shared.set_state(generation, ConnectionState::Closed);
                return;
            }
        };

        if !shared.set_state(generation, ConnectionState::Connecting) {
            return;
        }

        match connect_async(url.as_str()).await {
            Ok((socket, _response)) => {
                if !shared.set_state(generation, ConnectionState::Open) {
                    return;
                }
                shared.attempts.store(0, Ordering::SeqCst);
                info!(channel = config.endpoint.channel(), "realtime connection open");

                match run_session(socket, &dispatcher, config.heartbeat_interval, &cancel).await {
                    SessionEnd::Cancelled => {
                        let _ = shared.set_state(generation, ConnectionState::Closed);
                        return;
                    }
                    SessionEnd::Normal => {
                        info!("server closed the connection normally, not reconnecting");
                        let _ = shared.set_state(generation, ConnectionState::Closed);
                        return;
                    }
                    SessionEnd::Abnormal => {
                        debug!("connection lost");
                    }
                }
            }
            Err(error) => {
                // Expected while the server is down; kept quiet.
                debug!(%error, "connect attempt failed");
            }
        }

        let attempt = shared.attempts.load(Ordering::SeqCst);
        if attempt >= config.max_attempts {
            warn!(
                attempts = attempt,
                "reconnect budget exhausted, realtime client going offline"
            );
            let _ = shared.set_state(generation, ConnectionState::Closed);
            return;
        }
        if !shared.set_state(generation, ConnectionState::Reconnecting) {
            return;
        }
        let delay = config.backoff.delay(attempt);
        let _ = shared.attempts.fetch_add(1, Ordering::SeqCst);
        debug!(
            attempt = attempt + 1,
            max = config.max_attempts,
            delay_ms = delay.as_millis() as u64,
            "scheduling reconnect"
        );
        tokio::select! {
            () = cancel.cancelled() => {
                let _ = shared.set_state(generation, ConnectionState::Closed);
                return;
            }
            () = tokio::time::sleep(delay) => {}
        }
    }
}

/// Pump one established socket until it ends.
///
/// The heartbeat lives here: it starts when the session starts (the state
/// is already `Open`) and stops with it, so no timer can outlive the
/// connection it belongs to.
async fn run_session(
    socket: WsStream,
    dispatcher: &Dispatcher,
    heartbeat_interval: Duration,
    cancel: &CancellationToken,
) -> SessionEnd {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut ping_interval = tokio::time::interval(heartbeat_interval);
    // consume the immediate first tick
    let _ = ping_interval.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                let close = CloseFrame {
                    code: CloseCode::Normal,
                    reason: Utf8Bytes::from_static("client stopping"),
                };
                let _ = ws_tx.send(Message::Close(Some(close))).await;
                return SessionEnd::Cancelled;
            }
            _ = ping_interval.tick() => {
                if ws_tx.send(Message::Text(ping_frame().into())).await.is_err() {
                    debug!("keepalive send failed");
                    return SessionEnd::Abnormal;
                }
                trace!("sent keepalive ping");
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => dispatcher.dispatch(text.as_str()),
                Some(Ok(Message::Binary(data))) => match std::str::from_utf8(&data) {
                    Ok(text) => dispatcher.dispatch(text),
                    Err(_) => debug!(len = data.len(), "ignoring non-UTF8 binary frame"),
                },
                Some(Ok(Message::Pong(_))) => trace!("received transport pong"),
                // tungstenite answers transport pings automatically
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    let normal = frame
                        .as_ref()
                        .is_some_and(|f| matches!(f.code, CloseCode::Normal | CloseCode::Away));
                    debug!(code = frame.as_ref().map(|f| u16::from(f.code)), "server sent close frame");
                    return if normal { SessionEnd::Normal } else { SessionEnd::Abnormal };
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    debug!(%error, "transport error");
                    return SessionEnd::Abnormal;
                }
                None => {
                    debug!("socket stream ended");
                    return SessionEnd::Abnormal;
                }
            }
        }
    }
}
