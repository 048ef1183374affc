//! Write pump: drains the outbound queue one frame at a time.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use super::SessionFault;
use crate::shared::Shared;

/// Writes queued frames for `session` in order.
///
/// A frame that has started writing is always finished before the pump
/// looks at the cancel token again. On exit the write side is shut down.
pub(crate) async fn write_pump<W>(
    mut writer: W,
    shared: Arc<Shared>,
    session: u64,
    faults: mpsc::Sender<SessionFault>,
    cancel: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    loop {
        let Some(next) = shared.queue.front(session) else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = shared.queue.wait() => {}
            }
            continue;
        };

        let result = async {
            writer.write_all(&next.frame).await?;
            writer.flush().await
        }
        .await;

        if let Err(e) = result {
            error!(error = %e, "write error");
            let _ = faults.try_send(SessionFault::Write(e));
            break;
        }

        shared.queue.complete(session);
        trace!(bytes = next.payload_len, "message sent");
        shared.callbacks.send_completed(next.payload_len);

        if cancel.is_cancelled() {
            break;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!(error = %e, "shutdown of write side failed");
    }
}
