//! Inbound frame dispatch — decodes one text frame and routes it by
//! discriminant to the side-effect seam and the subscriber registry.
//!
//! Dispatch never fails outward: malformed frames and unknown types are
//! logged and dropped, and a panicking effect handler is caught. A single
//! bad frame can never close the connection.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use pulse_core::{Envelope, OrderSummary};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::effects::UiEffects;
use crate::registry::{DATA_UPDATE, MODAL_OPEN, SubscriberRegistry};

/// Routes decoded envelopes to effects and subscribers.
pub struct Dispatcher {
    effects: Arc<dyn UiEffects>,
    registry: Arc<SubscriberRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher over the given effect seam and registry.
    pub fn new(effects: Arc<dyn UiEffects>, registry: Arc<SubscriberRegistry>) -> Self {
        Self { effects, registry }
    }

    /// Decode and route one inbound text frame.
    pub fn dispatch(&self, frame: &str) {
        let envelope = match Envelope::parse(frame) {
            Ok(envelope) => envelope,
            Err(error) => {
                warn!(%error, "dropping undecodable frame");
                return;
            }
        };
        trace!(kind = envelope.kind(), "frame received");

        match envelope {
            Envelope::UiRedirect {
                target: Some(target),
            } => self.effect(|fx| fx.navigate(&target)),
            Envelope::UiRedirect { target: None } => {
                debug!("ui_redirect without target, ignoring");
            }
            Envelope::UiToast(toast) => self.effect(|fx| fx.show_toast(&toast)),
            Envelope::UiRefresh => self.effect(|fx| fx.refresh()),
            Envelope::UiUpdate { data } => self.registry.publish(DATA_UPDATE, &data),
            Envelope::UiModal { data } => self.registry.publish(MODAL_OPEN, &data),
            Envelope::Connected { data } => {
                let message = data.get("message").and_then(Value::as_str).unwrap_or("");
                debug!(message, "server acknowledged connection");
            }
            Envelope::NewOrder { data } => {
                let summary = OrderSummary::from_value(&data);
                self.effect(|fx| fx.order_alert(&summary));
                self.registry.publish(DATA_UPDATE, &data);
            }
            Envelope::OrderUpdated { data } => {
                debug!("order status updated");
                self.registry.publish(DATA_UPDATE, &data);
            }
            Envelope::Ping | Envelope::Pong => trace!("keepalive frame"),
            Envelope::Unknown { kind, .. } => {
                debug!(kind, "unknown message type, ignoring");
            }
        }
    }

    /// Invoke one side effect behind a panic barrier.
    fn effect(&self, f: impl FnOnce(&dyn UiEffects)) {
        if catch_unwind(AssertUnwindSafe(|| f(self.effects.as_ref()))).is_err() {
            warn!("side-effect handler panicked");
        }
    }
}
