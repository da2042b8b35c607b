//! Category-scoped pub/sub fan-out to UI-layer listeners.
//!
//! The registry holds only callbacks, never connection or message state.
//! Fan-out for one publish is synchronous and in registration order. A
//! panicking handler is isolated: it is caught and logged, and the
//! remaining handlers for the same event still run. Publish iterates a
//! snapshot of the handler list, so subscribing or unsubscribing from
//! inside a handler is safe.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

/// Category fed by `ui_update` and domain order events.
pub const DATA_UPDATE: &str = "data-update";
/// Category fed by `ui_modal` events.
pub const MODAL_OPEN: &str = "modal-open";

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

struct Entry {
    id: u64,
    handler: Handler,
}

/// Registry of category-keyed subscribers.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<HashMap<String, Vec<Entry>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a category.
    ///
    /// The returned [`Subscription`] removes the handler when cancelled or
    /// dropped. Handlers registered for the same category are invoked in
    /// registration order.
    pub fn subscribe(
        self: &Arc<Self>,
        category: &str,
        handler: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .entry(category.to_string())
            .or_default()
            .push(Entry {
                id,
                handler: Arc::new(handler),
            });
        Subscription {
            registry: Arc::downgrade(self),
            category: category.to_string(),
            id,
            active: AtomicBool::new(true),
        }
    }

    /// Deliver a payload to every handler registered for `category`.
    ///
    /// A handler that panics is logged and skipped; delivery continues to
    /// the remaining handlers.
    pub fn publish(&self, category: &str, payload: &Value) {
        let snapshot: Vec<Handler> = {
            let subscribers = self.subscribers.lock();
            subscribers
                .get(category)
                .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
                .unwrap_or_default()
        };
        if snapshot.is_empty() {
            debug!(category, "publish with no subscribers");
            return;
        }
        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler(payload))).is_err() {
                warn!(category, "subscriber panicked during fan-out");
            }
        }
    }

    /// Number of handlers currently registered for a category.
    #[must_use]
    pub fn subscriber_count(&self, category: &str) -> usize {
        self.subscribers
            .lock()
            .get(category)
            .map_or(0, Vec::len)
    }

    fn unsubscribe(&self, category: &str, id: u64) {
        let mut subscribers = self.subscribers.lock();
        if let Some(entries) = subscribers.get_mut(category) {
            entries.retain(|e| e.id != id);
            if entries.is_empty() {
                let _ = subscribers.remove(category);
            }
        }
    }
}

/// Handle for one registered subscriber.
///
/// Cancelling (or dropping) removes the handler. `cancel` is idempotent
/// and safe to call from inside a handler mid-fan-out.
pub struct Subscription {
    registry: Weak<SubscriberRegistry>,
    category: String,
    id: u64,
    active: AtomicBool,
}

impl Subscription {
    /// Remove the handler from the registry.
    pub fn cancel(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            if let Some(registry) = self.registry.upgrade() {
                registry.unsubscribe(&self.category, self.id);
            }
        }
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn collector() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |payload: &Value| sink.lock().push(payload.clone()))
    }

    #[test]
    fn publish_reaches_subscriber() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (seen, handler) = collector();
        let _sub = registry.subscribe(DATA_UPDATE, handler);

        registry.publish(DATA_UPDATE, &serde_json::json!({"v": 1}));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(seen.lock()[0]["v"], 1);
    }

    #[test]
    fn publish_other_category_not_delivered() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (seen, handler) = collector();
        let _sub = registry.subscribe(MODAL_OPEN, handler);

        registry.publish(DATA_UPDATE, &serde_json::json!({}));
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn handlers_invoked_in_registration_order() {
        let registry = Arc::new(SubscriberRegistry::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = order.clone();
        let _a = registry.subscribe(DATA_UPDATE, move |_| o1.lock().push("first"));
        let o2 = order.clone();
        let _b = registry.subscribe(DATA_UPDATE, move |_| o2.lock().push("second"));
        let o3 = order.clone();
        let _c = registry.subscribe(DATA_UPDATE, move |_| o3.lock().push("third"));

        registry.publish(DATA_UPDATE, &Value::Null);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn panicking_handler_does_not_suppress_later_handlers() {
        let registry = Arc::new(SubscriberRegistry::new());
        let _bad = registry.subscribe(DATA_UPDATE, |_| panic!("boom"));
        let (seen, handler) = collector();
        let _good = registry.subscribe(DATA_UPDATE, handler);

        registry.publish(DATA_UPDATE, &serde_json::json!({"ok": true}));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn cancel_removes_handler() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (seen, handler) = collector();
        let sub = registry.subscribe(DATA_UPDATE, handler);
        assert_eq!(registry.subscriber_count(DATA_UPDATE), 1);

        sub.cancel();
        assert_eq!(registry.subscriber_count(DATA_UPDATE), 0);
        assert!(!sub.is_active());

        registry.publish(DATA_UPDATE, &Value::Null);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let registry = Arc::new(SubscriberRegistry::new());
        let sub = registry.subscribe(DATA_UPDATE, |_| {});
        sub.cancel();
        sub.cancel();
        assert_eq!(registry.subscriber_count(DATA_UPDATE), 0);
    }

    #[test]
    fn drop_unsubscribes() {
        let registry = Arc::new(SubscriberRegistry::new());
        {
            let _sub = registry.subscribe(DATA_UPDATE, |_| {});
            assert_eq!(registry.subscriber_count(DATA_UPDATE), 1);
        }
        assert_eq!(registry.subscriber_count(DATA_UPDATE), 0);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_fanout() {
        let registry = Arc::new(SubscriberRegistry::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicU32::new(0));

        let slot2 = slot.clone();
        let calls2 = calls.clone();
        let sub = registry.subscribe(DATA_UPDATE, move |_| {
            let _ = calls2.fetch_add(1, Ordering::SeqCst);
            // remove ourselves mid-delivery
            if let Some(sub) = slot2.lock().take() {
                sub.cancel();
            }
        });
        *slot.lock() = Some(sub);

        registry.publish(DATA_UPDATE, &Value::Null);
        registry.publish(DATA_UPDATE, &Value::Null);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscriber_count(DATA_UPDATE), 0);
    }

    #[test]
    fn publish_with_no_subscribers_is_a_no_op() {
        let registry = Arc::new(SubscriberRegistry::new());
        registry.publish("nobody-home", &Value::Null);
    }

    #[test]
    fn cancel_after_registry_dropped_is_safe() {
        let registry = Arc::new(SubscriberRegistry::new());
        let sub = registry.subscribe(DATA_UPDATE, |_| {});
        drop(registry);
        sub.cancel();
    }

    #[test]
    fn multiple_categories_are_independent() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (data_seen, data_handler) = collector();
        let (modal_seen, modal_handler) = collector();
        let _a = registry.subscribe(DATA_UPDATE, data_handler);
        let _b = registry.subscribe(MODAL_OPEN, modal_handler);

        registry.publish(DATA_UPDATE, &serde_json::json!({"d": 1}));
        registry.publish(MODAL_OPEN, &serde_json::json!({"m": 2}));

        assert_eq!(data_seen.lock().len(), 1);
        assert_eq!(modal_seen.lock().len(), 1);
        assert_eq!(data_seen.lock()[0]["d"], 1);
        assert_eq!(modal_seen.lock()[0]["m"], 2);
    }
}
