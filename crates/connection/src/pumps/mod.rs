pub(crate) mod heartbeat;
pub(crate) mod read;
pub(crate) mod write;

/// Reason a pump ended the session on its own.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SessionFault {
    #[error("connection closed by peer")]
    PeerClosed,

    #[error("read failed: {0}")]
    Read(#[from] linkwire_protocol::FrameError),

    #[error("write failed: {0}")]
    Write(std::io::Error),
}
