//! Outbound frame queue shared between callers and the write pump.
//!
//! Frames are written strictly in enqueue order, one at a time. The queue
//! is bound to a session id: closing it (on disconnect) drops everything
//! still pending, and a write pump from an older session can never pop a
//! frame that belongs to a newer one.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use linkwire_protocol::frame::encode_frame;
use tokio::sync::Notify;

use crate::error::ClientError;

/// One framed message awaiting transmission.
#[derive(Debug, Clone)]
pub(crate) struct PendingWrite {
    /// Length prefix followed by the payload.
    pub(crate) frame: Arc<[u8]>,
    /// Payload length reported to the send-complete callback.
    pub(crate) payload_len: usize,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<PendingWrite>,
    session: Option<u64>,
}

#[derive(Debug, Default)]
pub(crate) struct OutboundQueue {
    state: Mutex<QueueState>,
    wake: Notify,
}

impl OutboundQueue {
    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Binds the queue to `session` and starts accepting frames.
    pub(crate) fn open(&self, session: u64) {
        let mut state = self.lock();
        state.pending.clear();
        state.session = Some(session);
    }

    /// Stops accepting frames and discards the pending ones.
    ///
    /// Returns how many frames were dropped.
    pub(crate) fn close(&self) -> usize {
        let mut state = self.lock();
        state.session = None;
        let dropped = state.pending.len();
        state.pending.clear();
        dropped
    }

    /// Frames `payload` and appends it.
    ///
    /// Wakes the write pump when the queue was empty; otherwise the pump
    /// picks the frame up after finishing the ones ahead of it.
    pub(crate) fn enqueue(&self, payload: &[u8]) -> Result<(), ClientError> {
        let frame = encode_frame(payload)?;
        let write = PendingWrite {
            frame: frame.into(),
            payload_len: payload.len(),
        };

        let was_empty = {
            let mut state = self.lock();
            if state.session.is_none() {
                return Err(ClientError::NotConnected);
            }
            let was_empty = state.pending.is_empty();
            state.pending.push_back(write);
            was_empty
        };

        if was_empty {
            self.wake.notify_one();
        }
        Ok(())
    }

    /// Head of the queue, if it belongs to `session`.
    pub(crate) fn front(&self, session: u64) -> Option<PendingWrite> {
        let state = self.lock();
        if state.session != Some(session) {
            return None;
        }
        state.pending.front().cloned()
    }

    /// Removes the head after it has been fully written.
    ///
    /// Does nothing when the queue has since been closed or reopened.
    pub(crate) fn complete(&self, session: u64) {
        let mut state = self.lock();
        if state.session == Some(session) {
            state.pending.pop_front();
        }
    }

    /// Resolves once a frame may have been appended to an empty queue.
    pub(crate) async fn wait(&self) {
        self.wake.notified().await;
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().pending.len()
    }
}
