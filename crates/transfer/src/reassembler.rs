use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::TransferError;
use crate::decode::decode_base64_lenient;
use crate::types::{CompletedTransfer, SavedFile, TransferSession};
use crate::validation::validate_file_name;

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Accumulates at most one transfer session and persists it on completion.
#[derive(Debug)]
pub struct Reassembler {
    download_dir: PathBuf,
    session: Option<TransferSession>,
}

impl Reassembler {
    /// Creates a reassembler writing completed files into `download_dir`.
    ///
    /// The directory is created on the first successful transfer.
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            session: None,
        }
    }

    /// Opens a new session, discarding any unfinished one.
    ///
    /// Capacity for `total_size` bytes is reserved up front. If the
    /// allocation is refused the buffer grows on demand instead.
    pub fn start(&mut self, file_name: &str, total_size: u64) {
        if let Some(old) = self.session.take() {
            warn!(
                file = %old.file_name,
                received = old.received_size,
                expected = old.expected_size,
                "abandoning unfinished transfer"
            );
        }

        let mut session = TransferSession::new(file_name, total_size);
        let reserve = usize::try_from(total_size).unwrap_or(usize::MAX);
        if let Err(e) = session.buffer.try_reserve_exact(reserve) {
            warn!(file = %file_name, total_size, error = %e, "could not pre-allocate transfer buffer");
        }

        debug!(file = %file_name, total_size, "transfer started");
        self.session = Some(session);
    }

    /// Decodes one base64 chunk and appends it to the active session.
    ///
    /// Returns the number of decoded bytes appended.
    pub fn append_chunk(&mut self, chunk: &str) -> Result<usize, TransferError> {
        let session = self
            .session
            .as_mut()
            .ok_or(TransferError::NoActiveSession)?;

        let decoded = decode_base64_lenient(chunk)?;
        session.buffer.extend_from_slice(&decoded);
        session.received_size += decoded.len() as u64;
        Ok(decoded.len())
    }

    /// Closes the active session.
    ///
    /// When the received size equals the announced size and the name is
    /// a plain file name, the bytes come back ready for
    /// [`CompletedTransfer::persist`]. Otherwise the session is discarded.
    pub fn complete(&mut self) -> Result<CompletedTransfer, TransferError> {
        let session = self.session.take().ok_or(TransferError::NoActiveSession)?;

        if session.received_size != session.expected_size {
            return Err(TransferError::SizeMismatch {
                file_name: session.file_name,
                expected: session.expected_size,
                received: session.received_size,
            });
        }

        validate_file_name(&session.file_name)?;
        Ok(CompletedTransfer {
            path: self.download_dir.join(&session.file_name),
            file_name: session.file_name,
            data: session.buffer,
        })
    }

    /// Closes the active session and writes it to `<download_dir>/<file_name>`
    /// on the calling thread.
    pub fn finish(&mut self) -> Result<SavedFile, TransferError> {
        self.complete()?.persist()
    }

    /// The active session, if a transfer is in progress.
    pub fn session(&self) -> Option<&TransferSession> {
        self.session.as_ref()
    }
}

impl CompletedTransfer {
    /// Creates the download directory, writes the bytes and hashes them.
    ///
    /// Blocking. Async callers run it under `spawn_blocking`.
    pub fn persist(self) -> Result<SavedFile, TransferError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, &self.data)?;

        let saved = SavedFile {
            sha256: checksum_bytes(&self.data),
            size: self.data.len() as u64,
            path: self.path,
            file_name: self.file_name,
        };
        info!(path = %saved.path.display(), size = saved.size, "file saved");
        Ok(saved)
    }
}
