//! Public client surface: `start`, `stop`, `is_connected`, `subscribe`.
//!
//! One `PulseClient` owns one logical connection. Its lifecycle follows the
//! authentication lifecycle of the host application: `start()` on login,
//! `stop()` on logout. Construction does not touch the network.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parking_lot::Mutex;
use pulse_core::{BackoffPolicy, ConnectionState, Endpoint};
use pulse_settings::PulseSettings;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connection::{ConnectionShared, run_driver};
use crate::dispatch::Dispatcher;
use crate::effects::UiEffects;
use crate::registry::{SubscriberRegistry, Subscription};
use crate::token::TokenProvider;

/// Everything the connection driver needs, fixed at construction.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Where to connect.
    pub endpoint: Endpoint,
    /// Reconnect delay curve.
    pub backoff: BackoffPolicy,
    /// Reconnect attempts before going terminal.
    pub max_attempts: u32,
    /// Interval between outbound keepalive pings.
    pub heartbeat_interval: Duration,
}

impl ClientConfig {
    /// Derive a config from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &PulseSettings) -> Self {
        Self {
            endpoint: Endpoint::new(settings.server.url.clone(), settings.server.channel.clone()),
            backoff: settings.reconnect.policy(),
            max_attempts: settings.reconnect.max_attempts,
            heartbeat_interval: Duration::from_millis(settings.heartbeat.interval_ms),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_settings(&PulseSettings::default())
    }
}

/// Driver control handles for the current run, if any.
#[derive(Default)]
struct Control {
    cancel: Option<CancellationToken>,
    task: Option<tokio::task::JoinHandle<()>>,
}

/// The realtime event delivery client.
pub struct PulseClient {
    config: ClientConfig,
    tokens: Arc<dyn TokenProvider>,
    dispatcher: Arc<Dispatcher>,
    registry: Arc<SubscriberRegistry>,
    shared: Arc<ConnectionShared>,
    control: Mutex<Control>,
}

impl PulseClient {
    /// Create a client. No connection is made until [`start`](Self::start).
    pub fn new(
        config: ClientConfig,
        tokens: Arc<dyn TokenProvider>,
        effects: Arc<dyn UiEffects>,
    ) -> Self {
        let registry = Arc::new(SubscriberRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(effects, registry.clone()));
        Self {
            config,
            tokens,
            dispatcher,
            registry,
            shared: Arc::new(ConnectionShared::new()),
            control: Mutex::new(Control::default()),
        }
    }

    /// Start (or restart) the connection driver.
    ///
    /// Precondition: a credential must be obtainable. If the provider has
    /// none this is a logged no-op and the client stays `Idle` until the
    /// next explicit `start()`. Must be called within a tokio runtime.
    pub fn start(&self) {
        let mut control = self.control.lock();

        if self.tokens.token().is_none() {
            info!("no credential available, realtime client stays idle");
            return;
        }

        // Supersede any previous run before its driver can interfere.
        if let Some(cancel) = control.cancel.take() {
            cancel.cancel();
        }
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.attempts.store(0, Ordering::SeqCst);
        let _ = self.shared.set_state(generation, ConnectionState::Connecting);

        let cancel = CancellationToken::new();
        control.cancel = Some(cancel.clone());
        control.task = Some(tokio::spawn(run_driver(
            self.config.clone(),
            self.tokens.clone(),
            self.dispatcher.clone(),
            self.shared.clone(),
            generation,
            cancel,
        )));
        debug!(generation, "realtime client started");
    }

    /// Stop the client.
    ///
    /// Idempotent. Synchronously cancels any pending reconnect timer and
    /// the heartbeat, asks the driver to close the socket with a normal
    /// closure code, and pins the attempt counter so no automatic
    /// reconnect happens until the next `start()`.
    pub fn stop(&self) {
        let mut control = self.control.lock();

        // Invalidate callbacks from the outgoing driver.
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(cancel) = control.cancel.take() {
            cancel.cancel();
        }
        control.task = None;
        self.shared
            .attempts
            .store(self.config.max_attempts, Ordering::SeqCst);
        let _ = self.shared.set_state(generation, ConnectionState::Closed);
        debug!(generation, "realtime client stopped");
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Whether the socket is currently established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Reconnect attempts consumed since the last `Open` (0 while healthy).
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.attempts.load(Ordering::SeqCst)
    }

    /// Register a listener for a named event category.
    ///
    /// The subscription is removed when the returned handle is cancelled
    /// or dropped.
    pub fn subscribe(
        &self,
        category: &str,
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Subscription {
        self.registry.subscribe(category, handler)
    }
}

impl Drop for PulseClient {
    fn drop(&mut self) {
        if let Some(cancel) = self.control.lock().cancel.take() {
            cancel.cancel();
        }
    }
}
