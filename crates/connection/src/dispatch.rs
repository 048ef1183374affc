//! Inbound message routing.

use std::sync::Arc;

use linkwire_protocol::{Envelope, FileEnd, FileStart, MessageType};
use linkwire_transfer::{Reassembler, TransferError, TransferEvent};
use tracing::{debug, error, info, trace, warn};

use crate::shared::Shared;

/// Decodes inbound payloads and routes them.
///
/// File-transfer envelopes feed the session's [`Reassembler`]; every
/// decoded envelope, file-transfer or not, is then handed to the receive
/// callback. One dispatcher lives for exactly one connection.
pub(crate) struct Dispatcher {
    shared: Arc<Shared>,
    reassembler: Reassembler,
}

impl Dispatcher {
    pub(crate) fn new(shared: Arc<Shared>, reassembler: Reassembler) -> Self {
        Self {
            shared,
            reassembler,
        }
    }

    /// Handles one inbound payload.
    ///
    /// Completed transfers are written under `spawn_blocking`; the caller
    /// awaits that before handing over the next frame, so frames are still
    /// processed one at a time and in order.
    pub(crate) async fn dispatch(&mut self, payload: &[u8]) {
        let envelope = match Envelope::from_payload(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(len = payload.len(), error = %e, "dropping malformed message");
                return;
            }
        };

        match envelope.kind() {
            MessageType::FileStart => self.start_transfer(&envelope),
            MessageType::FileChunk => self.append_chunk(&envelope),
            MessageType::FileEnd => self.finish_transfer(&envelope).await,
            MessageType::HeartbeatAck => trace!("heartbeat acknowledged"),
            MessageType::Unknown => {
                debug!(msg_type = %envelope.msg_type, "unrecognized message type")
            }
            kind => trace!(msg_type = %kind, "message received"),
        }

        self.shared.callbacks.received(&envelope);
    }

    fn start_transfer(&mut self, envelope: &Envelope) {
        let start = match envelope.parse_content::<FileStart>() {
            Ok(Some(start)) => start,
            Ok(None) => {
                warn!("file_start without content");
                return;
            }
            Err(e) => {
                warn!(error = %e, "invalid file_start content");
                return;
            }
        };

        info!(file = %start.filename, size = start.filesize, "receiving file");
        self.reassembler.start(&start.filename, start.filesize);
        self.shared.callbacks.transfer(&TransferEvent::Started {
            file_name: start.filename,
            expected_size: start.filesize,
        });
    }

    fn append_chunk(&mut self, envelope: &Envelope) {
        let Some(chunk) = envelope.content_str() else {
            warn!("file_chunk content is not a string");
            return;
        };

        if let Err(e) = self.reassembler.append_chunk(chunk) {
            warn!(error = %e, "dropping file chunk");
            return;
        }

        if let Some(session) = self.reassembler.session() {
            trace!(
                file = %session.file_name(),
                received = session.received_size(),
                expected = session.expected_size(),
                "chunk appended"
            );
            self.shared.callbacks.transfer(&TransferEvent::Progress {
                file_name: session.file_name().to_owned(),
                received: session.received_size(),
                expected: session.expected_size(),
                fraction: session.progress(),
            });
        }
    }

    async fn finish_transfer(&mut self, envelope: &Envelope) {
        let announced = envelope
            .parse_content::<FileEnd>()
            .ok()
            .flatten()
            .map(|end| end.filename);
        let active = self
            .reassembler
            .session()
            .map(|session| session.file_name().to_owned());

        if let (Some(announced), Some(active)) = (&announced, &active)
            && announced != active
        {
            warn!(%announced, %active, "file_end names a different file");
        }

        let result = match self.reassembler.complete() {
            Ok(done) => match tokio::task::spawn_blocking(move || done.persist()).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(e) => Err(format!("save task failed: {e}")),
            },
            Err(TransferError::NoActiveSession) => {
                warn!("file_end without an active transfer");
                return;
            }
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(saved) => self.shared.callbacks.transfer(&TransferEvent::Saved(saved)),
            Err(reason) => {
                let file_name = active.or(announced).unwrap_or_default();
                error!(file = %file_name, error = %reason, "file transfer failed");
                self.shared
                    .callbacks
                    .transfer(&TransferEvent::Failed { file_name, reason });
            }
        }
    }
}
