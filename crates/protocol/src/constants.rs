use std::time::Duration;

/// Maximum frame payload size in bytes (100 MiB).
///
/// A received length prefix above this value is a protocol violation and
/// tears the connection down before any payload is read.
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Size of the big-endian length prefix in front of every frame.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Reconnect attempts made after a failed connect before giving up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Fixed delay between reconnect attempts.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// How often a heartbeat is sent while connected.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10000);

/// Name of the directory (next to the executable) receiving transferred files.
pub const DOWNLOAD_DIR_NAME: &str = "download";

/// Message type tag carried in the `type` field of every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Connection management
    Heartbeat,
    HeartbeatAck,

    // Application traffic
    Chat,
    FileRequest,
    NetworkQuality,

    // File transfer (server to client)
    FileStart,
    FileChunk,
    FileEnd,

    /// Forward compatibility: any other tag. The raw string stays on the envelope.
    Unknown,
}

impl MessageType {
    /// Maps a wire tag to its message type.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "heartbeat" => Self::Heartbeat,
            "heartbeat_ack" => Self::HeartbeatAck,
            "chat" => Self::Chat,
            "filerequest" => Self::FileRequest,
            "network_quality" => Self::NetworkQuality,
            "file_start" => Self::FileStart,
            "file_chunk" => Self::FileChunk,
            "file_end" => Self::FileEnd,
            _ => Self::Unknown,
        }
    }

    /// Wire tag for this type. `Unknown` has no canonical tag and maps to `""`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::HeartbeatAck => "heartbeat_ack",
            Self::Chat => "chat",
            Self::FileRequest => "filerequest",
            Self::NetworkQuality => "network_quality",
            Self::FileStart => "file_start",
            Self::FileChunk => "file_chunk",
            Self::FileEnd => "file_end",
            Self::Unknown => "",
        }
    }

    /// Returns true for the three message types of the file-transfer sub-protocol.
    pub fn is_file_transfer(self) -> bool {
        matches!(self, Self::FileStart | Self::FileChunk | Self::FileEnd)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Maps measured bandwidth to the normalized network quality scale reported
/// to the server (0.1 worst, 1.0 best).
pub fn network_quality_from_bandwidth(downstream_kbps: u32, upstream_kbps: u32) -> f64 {
    let total = downstream_kbps.saturating_add(upstream_kbps);
    match total {
        t if t > 10_000 => 1.0,
        t if t > 5_000 => 0.75,
        t if t > 2_000 => 0.5,
        t if t > 1_000 => 0.25,
        _ => 0.1,
    }
}
