//! The side-effect seam between dispatched messages and the host UI.
//!
//! Navigation, toast rendering, view refresh, and audible order alerts are
//! owned by the embedding application. The client only decides *when* to
//! fire them. Implementations must be best-effort: a failed sound or a
//! denied notification permission is swallowed, never surfaced to the
//! socket loop (the dispatcher additionally wraps every call in a panic
//! barrier).

use pulse_core::{OrderSummary, Toast};
use tracing::info;

/// Host-supplied side effects, one method per built-in discriminant.
pub trait UiEffects: Send + Sync {
    /// `ui_redirect` — navigate to `target`.
    fn navigate(&self, target: &str);

    /// `ui_toast` — surface a transient notification. The variant is
    /// already resolved (absent on the wire means success).
    fn show_toast(&self, toast: &Toast);

    /// `ui_refresh` — reload the current view.
    fn refresh(&self);

    /// `new_order` — best-effort audible and OS-level alert.
    fn order_alert(&self, order: &OrderSummary);
}

/// Default implementation that logs each effect.
///
/// Useful headless (the CLI) and as a stand-in while the host wires real
/// handlers.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEffects;

impl UiEffects for LogEffects {
    fn navigate(&self, target: &str) {
        info!(target, "ui_redirect");
    }

    fn show_toast(&self, toast: &Toast) {
        info!(
            variant = ?toast.variant,
            title = toast.title.as_deref().unwrap_or(""),
            description = toast.description.as_deref().unwrap_or(""),
            "ui_toast"
        );
    }

    fn refresh(&self) {
        info!("ui_refresh");
    }

    fn order_alert(&self, order: &OrderSummary) {
        info!(
            order_id = order.order_id.as_deref().unwrap_or("?"),
            total = order.total.unwrap_or(0.0),
            name = order.name.as_deref().unwrap_or(""),
            "new_order alert"
        );
    }
}
