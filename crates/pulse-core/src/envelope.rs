//! The wire envelope: one decoded JSON text frame.
//!
//! Every frame carries a `type` discriminant that drives all routing.
//! Unknown discriminants decode to [`Envelope::Unknown`] rather than an
//! error, so new server message kinds never break old clients. Only frames
//! that are not JSON objects with a string `type` fail to parse, and the
//! dispatcher logs and drops those.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::EnvelopeError;

/// Toast styling selector carried by `ui_toast` frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    /// Neutral styling.
    Default,
    /// Success styling. Used when the server omits the field.
    Success,
    /// Error styling.
    Error,
    /// Warning styling.
    Warning,
    /// Informational styling.
    Info,
}

impl Default for ToastVariant {
    fn default() -> Self {
        Self::Success
    }
}

/// Payload of a `ui_toast` frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Headline text.
    pub title: Option<String>,
    /// Secondary text.
    pub description: Option<String>,
    /// Styling selector; defaults to [`ToastVariant::Success`].
    #[serde(default)]
    pub variant: ToastVariant,
}

/// Best-effort typed view of a `new_order` payload.
///
/// Every field is optional: the server is free to send a subset and an
/// alert is still raised with whatever arrived.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderSummary {
    /// Server-side order identifier.
    pub order_id: Option<String>,
    /// Order total.
    pub total: Option<f64>,
    /// Current order status.
    pub status: Option<String>,
    /// Customer name.
    pub name: Option<String>,
    /// Customer phone.
    pub phone: Option<String>,
    /// Delivery address.
    pub address: Option<String>,
    /// Number of line items.
    pub items_count: Option<u64>,
    /// Creation timestamp as sent by the server.
    pub created_at: Option<String>,
}

impl OrderSummary {
    /// Extract a summary from a raw payload, field by field.
    ///
    /// Per-field extraction (rather than a struct-level deserialize) so one
    /// ill-typed field cannot blank out the rest of the alert.
    #[must_use]
    pub fn from_value(data: &Value) -> Self {
        let str_field = |key: &str| data.get(key).and_then(Value::as_str).map(String::from);
        Self {
            order_id: str_field("orderId"),
            total: data.get("total").and_then(Value::as_f64),
            status: str_field("status"),
            name: str_field("name"),
            phone: str_field("phone"),
            address: str_field("address"),
            items_count: data.get("itemsCount").and_then(Value::as_u64),
            created_at: str_field("createdAt"),
        }
    }
}

/// A decoded inbound frame, routed by its `type` discriminant.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    /// `ui_redirect` — navigate the client to `target`.
    UiRedirect {
        /// Navigation target path; the frame is a no-op when absent.
        target: Option<String>,
    },
    /// `ui_toast` — surface a transient notification.
    UiToast(Toast),
    /// `ui_refresh` — force a reload of the current view.
    UiRefresh,
    /// `ui_update` — opaque data for `data-update` subscribers.
    UiUpdate {
        /// Payload relayed verbatim.
        data: Value,
    },
    /// `ui_modal` — opaque data for `modal-open` subscribers.
    UiModal {
        /// Payload relayed verbatim.
        data: Value,
    },
    /// `connected` — server acknowledgement after the upgrade.
    Connected {
        /// Greeting payload (usually `{"message": ...}`).
        data: Value,
    },
    /// `new_order` — domain alert; triggers sound/notification and a
    /// `data-update` publish.
    NewOrder {
        /// Order payload relayed verbatim.
        data: Value,
    },
    /// `order_updated` — order status change, relayed to subscribers.
    OrderUpdated {
        /// Update payload relayed verbatim.
        data: Value,
    },
    /// Keepalive request.
    Ping,
    /// Keepalive reply; accepted and ignored.
    Pong,
    /// Any discriminant this client does not know.
    Unknown {
        /// The unrecognized `type` value.
        kind: String,
        /// The whole frame, for diagnostics.
        payload: Value,
    },
}

impl Envelope {
    /// Decode one text frame.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::Json`] when the frame is not valid JSON,
    /// [`EnvelopeError::MissingType`] when there is no string `type` field.
    pub fn parse(frame: &str) -> Result<Self, EnvelopeError> {
        let mut value: Value = serde_json::from_str(frame)?;
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Err(EnvelopeError::MissingType);
        };
        let kind = kind.to_string();
        Ok(match kind.as_str() {
            "ui_redirect" => Self::UiRedirect {
                target: value
                    .get("target")
                    .and_then(Value::as_str)
                    .map(String::from),
            },
            "ui_toast" => Self::UiToast(serde_json::from_value(value)?),
            "ui_refresh" => Self::UiRefresh,
            "ui_update" => Self::UiUpdate {
                data: take_data(&mut value),
            },
            "ui_modal" => Self::UiModal {
                data: take_data(&mut value),
            },
            "connected" => Self::Connected {
                data: take_data(&mut value),
            },
            "new_order" => Self::NewOrder {
                data: take_data(&mut value),
            },
            "order_updated" => Self::OrderUpdated {
                data: take_data(&mut value),
            },
            "ping" => Self::Ping,
            "pong" => Self::Pong,
            _ => Self::Unknown {
                kind,
                payload: value,
            },
        })
    }

    /// The wire discriminant for this envelope.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::UiRedirect { .. } => "ui_redirect",
            Self::UiToast(_) => "ui_toast",
            Self::UiRefresh => "ui_refresh",
            Self::UiUpdate { .. } => "ui_update",
            Self::UiModal { .. } => "ui_modal",
            Self::Connected { .. } => "connected",
            Self::NewOrder { .. } => "new_order",
            Self::OrderUpdated { .. } => "order_updated",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Unknown { kind, .. } => kind,
        }
    }
}

fn take_data(value: &mut Value) -> Value {
    value.get_mut("data").map_or(Value::Null, Value::take)
}

/// The outbound keepalive frame, `{"type":"ping"}`.
#[must_use]
pub fn ping_frame() -> String {
    serde_json::json!({"type": "ping"}).to_string()
}
