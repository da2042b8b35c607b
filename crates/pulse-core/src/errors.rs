//! Error types for envelope decoding and endpoint construction.

use thiserror::Error;

/// Errors produced while decoding one inbound frame.
///
/// A frame that fails to decode is logged and dropped by the dispatcher;
/// it never closes the connection.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The frame was not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The frame had no string `type` field to route by.
    #[error("frame has no string `type` discriminant")]
    MissingType,
}

/// Errors produced while building a connection URL.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The configured base URL used a scheme other than http(s) or ws(s).
    #[error("unsupported endpoint scheme in `{0}`")]
    UnsupportedScheme(String),
}
