use std::path::PathBuf;

/// In-memory accumulation state for one transfer between `file_start` and `file_end`.
#[derive(Debug)]
pub struct TransferSession {
    pub(crate) file_name: String,
    pub(crate) expected_size: u64,
    pub(crate) received_size: u64,
    pub(crate) buffer: Vec<u8>,
}

impl TransferSession {
    pub(crate) fn new(file_name: &str, expected_size: u64) -> Self {
        Self {
            file_name: file_name.to_string(),
            expected_size,
            received_size: 0,
            buffer: Vec::new(),
        }
    }

    /// File name announced by `file_start`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size announced by `file_start`.
    pub fn expected_size(&self) -> u64 {
        self.expected_size
    }

    /// Decoded bytes received so far.
    pub fn received_size(&self) -> u64 {
        self.received_size
    }

    /// Fraction received in `[0.0, 1.0]`; an empty expected size counts as complete.
    pub fn progress(&self) -> f64 {
        if self.expected_size == 0 {
            return 1.0;
        }
        (self.received_size as f64 / self.expected_size as f64).min(1.0)
    }

    /// Reassembled bytes so far.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }
}

/// A transfer that was validated and written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    /// SHA-256 of the written bytes, hex encoded.
    pub sha256: String,
}

/// A size-checked transfer with a validated target path, not yet on disk.
#[derive(Debug)]
pub struct CompletedTransfer {
    pub(crate) file_name: String,
    pub(crate) path: PathBuf,
    pub(crate) data: Vec<u8>,
}

impl CompletedTransfer {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Number of bytes to be written.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Transfer lifecycle notifications delivered to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    /// A `file_start` opened a new session.
    Started { file_name: String, expected_size: u64 },
    /// A chunk was appended. `fraction` is `received / expected`, capped at 1.
    Progress {
        file_name: String,
        received: u64,
        expected: u64,
        fraction: f64,
    },
    /// `file_end` arrived with the expected size and the file was persisted.
    Saved(SavedFile),
    /// The transfer was discarded; nothing was written.
    Failed { file_name: String, reason: String },
}
