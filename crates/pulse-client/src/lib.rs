//! # pulse-client
//!
//! The resilient realtime event delivery client. Owns one WebSocket at a
//! time, recovers from disconnects with backoff, keeps the connection warm
//! with application-level pings, and routes typed server-pushed messages to
//! decoupled consumers.
//!
//! Layering, leaves first:
//!
//! - [`SubscriberRegistry`]: category-scoped pub/sub fan-out for UI-layer
//!   listeners
//! - [`UiEffects`]: the seam behind which navigation, toasts, refresh, and
//!   order alerts live
//! - [`Dispatcher`]: decodes inbound frames and routes by discriminant to
//!   effects and subscribers
//! - [`PulseClient`]: public surface — `start`/`stop`/`is_connected`/
//!   `subscribe` — wrapping the connection driver

#![deny(unsafe_code)]

pub mod client;
mod connection;
pub mod dispatch;
pub mod effects;
pub mod registry;
pub mod token;

pub use client::{ClientConfig, PulseClient};
pub use dispatch::Dispatcher;
pub use effects::{LogEffects, UiEffects};
pub use registry::{DATA_UPDATE, MODAL_OPEN, SubscriberRegistry, Subscription};
pub use token::{StaticToken, TokenProvider};
