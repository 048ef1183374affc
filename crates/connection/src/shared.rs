use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use linkwire_protocol::Envelope;
use tracing::{trace, warn};

use crate::callbacks::Callbacks;
use crate::error::ClientError;
use crate::queue::OutboundQueue;
use crate::types::ConnectionState;

/// State shared between the client handle, the reactor and its pumps.
pub(crate) struct Shared {
    connected: AtomicBool,
    state: Mutex<ConnectionState>,
    pub(crate) queue: OutboundQueue,
    pub(crate) callbacks: Callbacks,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(false),
            state: Mutex::new(ConnectionState::Disconnected),
            queue: OutboundQueue::default(),
            callbacks: Callbacks::default(),
        }
    }
}

impl Shared {
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records a new state, returning the previous one.
    pub(crate) fn set_state(&self, next: ConnectionState) -> ConnectionState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.connected
            .store(next == ConnectionState::Connected, Ordering::Release);
        std::mem::replace(&mut *state, next)
    }

    /// Serializes `envelope` and queues it on the current connection.
    pub(crate) fn enqueue(&self, envelope: &Envelope) -> Result<(), ClientError> {
        if envelope.msg_type.is_empty() {
            warn!("refusing to send envelope without a type");
            return Err(ClientError::EmptyType);
        }
        if !self.is_connected() {
            warn!(msg_type = %envelope.msg_type, "not connected, message dropped");
            return Err(ClientError::NotConnected);
        }

        let payload = envelope.to_payload()?;
        match self.queue.enqueue(&payload) {
            Ok(()) => {
                trace!(msg_type = %envelope.msg_type, len = payload.len(), "message queued");
                Ok(())
            }
            Err(e) => {
                warn!(msg_type = %envelope.msg_type, error = %e, "message not queued");
                Err(e)
            }
        }
    }
}
