//! Public types for the client.

use std::path::PathBuf;
use std::time::Duration;

use linkwire_protocol::constants::{
    DOWNLOAD_DIR_NAME, HEARTBEAT_INTERVAL, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY,
};

/// Connection state as seen by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket and no pending attempt.
    Disconnected,
    /// Resolving and connecting.
    Connecting,
    /// Socket established; read loop and heartbeat running.
    Connected,
    /// Waiting out the delay before reconnect attempt `attempt` (1-based).
    Reconnecting { attempt: u32 },
}

/// Client tuning. `Default` yields the fixed protocol constants.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Reconnect attempts after a failed connect before giving up.
    pub max_reconnect_attempts: u32,
    /// Fixed delay before each reconnect attempt.
    pub reconnect_delay: Duration,
    /// Period of the heartbeat while connected.
    pub heartbeat_interval: Duration,
    /// Where completed transfers are written. `None` means `download/`
    /// next to the running executable.
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: RECONNECT_DELAY,
            heartbeat_interval: HEARTBEAT_INTERVAL,
            download_dir: None,
        }
    }
}

impl ClientConfig {
    /// Resolves the download directory.
    ///
    /// Falls back to a relative `download` directory when the executable
    /// path cannot be determined.
    pub fn resolve_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }
        linkwire_transfer::default_download_dir().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot locate executable, using relative download directory");
            PathBuf::from(DOWNLOAD_DIR_NAME)
        })
    }
}
