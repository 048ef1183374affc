//! Persistent TCP client exchanging length-prefixed JSON envelopes.
//!
//! One reactor (a tokio current-thread runtime) owns the socket, the
//! heartbeat and reconnect timers, and every callback invocation. Callers
//! on other threads only issue commands and enqueue outbound messages.

mod callbacks;
pub mod client;
pub mod connector;
mod dispatch;
pub mod error;
mod pumps;
mod queue;
pub mod reactor;
mod shared;
pub mod types;

#[cfg(test)]
mod testutil;

pub use client::SocketClient;
pub use connector::{Connector, TcpConnector};
pub use error::ClientError;
pub use reactor::Reactor;
pub use types::{ClientConfig, ConnectionState};

pub use linkwire_protocol::{Envelope, MessageType};
pub use linkwire_transfer::{SavedFile, TransferEvent};
