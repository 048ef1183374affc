//! Read pump: frames in, envelopes out to the dispatcher.

use std::io;

use linkwire_protocol::FrameError;
use linkwire_protocol::frame::read_frame;
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::SessionFault;
use crate::dispatch::Dispatcher;

/// Reads frames until cancelled or the stream fails.
///
/// Any failure is reported on `faults` and ends the pump; the reactor
/// decides what happens to the connection.
pub(crate) async fn read_pump<R>(
    mut reader: R,
    mut dispatcher: Dispatcher,
    faults: mpsc::Sender<SessionFault>,
    cancel: CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            frame = read_frame(&mut reader) => frame,
        };

        let fault = match frame {
            Ok(payload) => {
                dispatcher.dispatch(&payload).await;
                continue;
            }
            Err(FrameError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                info!("server closed the connection");
                SessionFault::PeerClosed
            }
            Err(e @ FrameError::TooLarge { .. }) => {
                error!(error = %e, "refusing oversized frame");
                SessionFault::Read(e)
            }
            Err(e) => {
                warn!(error = %e, "read error");
                SessionFault::Read(e)
            }
        };

        let _ = faults.try_send(fault);
        return;
    }
}
