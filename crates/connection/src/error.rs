//! Error types for the client.

use linkwire_protocol::FrameError;

/// Errors returned synchronously to callers of [`SocketClient`](crate::SocketClient).
///
/// Transport failures never show up here; they become state transitions
/// and a disconnect callback.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not connected")]
    NotConnected,

    #[error("envelope type must not be empty")]
    EmptyType,

    #[error("network quality must be a finite number, got {0}")]
    NonFiniteQuality(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("reactor is not running")]
    ReactorStopped,

    #[error("failed to start reactor: {0}")]
    Spawn(#[from] std::io::Error),
}
