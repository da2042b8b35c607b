//! # pulse-core
//!
//! Portable, sync-only building blocks for the pulse realtime client:
//!
//! - [`ConnectionState`]: the connection lifecycle state machine vocabulary
//! - [`BackoffPolicy`]: pure reconnect delay calculation
//! - [`Envelope`]: the typed wire unit decoded from one JSON text frame
//! - [`Endpoint`]: connection URL construction with scheme upgrade
//!
//! Everything async (the actual socket driver, timers, fan-out) lives in
//! `pulse-client`; this crate has no runtime dependency and is trivially
//! unit-testable.

#![deny(unsafe_code)]

pub mod backoff;
pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod state;

pub use backoff::{BackoffPolicy, DEFAULT_MAX_ATTEMPTS};
pub use endpoint::Endpoint;
pub use envelope::{Envelope, OrderSummary, Toast, ToastVariant, ping_frame};
pub use errors::{EndpointError, EnvelopeError};
pub use state::ConnectionState;
