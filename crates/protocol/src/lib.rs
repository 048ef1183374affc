//! Wire format shared by the client and its tests.
//!
//! Messages are JSON envelopes `{"type": ..., "content": ...}` carried in
//! frames with a 4-byte big-endian length prefix. This crate holds the
//! envelope type, the typed content structs, the frame codec and the
//! protocol constants.

pub mod constants;
pub mod envelope;
pub mod frame;
pub mod messages;

// Re-export primary types for convenience.
pub use constants::MessageType;
pub use envelope::Envelope;
pub use frame::FrameError;
pub use messages::{FileEnd, FileStart};
