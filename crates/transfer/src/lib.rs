//! Reassembly of chunked file transfers received over the message stream.
//!
//! A transfer is a `file_start` / `file_chunk`* / `file_end` sequence. Chunks
//! carry standard base64 and are decoded independently, then concatenated.
//! The file is persisted only when the decoded byte count matches the size
//! announced by `file_start`.

mod decode;
mod reassembler;
mod types;
mod validation;

use std::path::PathBuf;

use linkwire_protocol::constants::DOWNLOAD_DIR_NAME;

pub use decode::decode_base64_lenient;
pub use reassembler::{Reassembler, checksum_bytes};
pub use types::{CompletedTransfer, SavedFile, TransferEvent, TransferSession};
pub use validation::validate_file_name;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("size mismatch for {file_name}: received {received} bytes, expected {expected}")]
    SizeMismatch {
        file_name: String,
        expected: u64,
        received: u64,
    },

    #[error("no active transfer session")]
    NoActiveSession,

    #[error("invalid file name: {0}")]
    InvalidFileName(String),
}

/// Returns `<directory of the running executable>/download`.
pub fn default_download_dir() -> Result<PathBuf, TransferError> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        TransferError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "executable has no parent directory",
        ))
    })?;
    Ok(dir.join(DOWNLOAD_DIR_NAME))
}
