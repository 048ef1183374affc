use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// File transfer contents (server to client)
// ---------------------------------------------------------------------------

/// Content of a `file_start` envelope: opens a transfer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStart {
    pub filename: String,
    pub filesize: u64,
}

/// Content of a `file_end` envelope: closes the active transfer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEnd {
    pub filename: String,
}
