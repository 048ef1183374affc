//! Heartbeat pump: periodic keepalive envelopes.

use std::sync::Arc;
use std::time::Duration;

use linkwire_protocol::Envelope;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::shared::Shared;

/// Queues a heartbeat every `period` while the session is alive.
///
/// The first heartbeat goes out one full period after connecting.
pub(crate) async fn heartbeat_pump(
    shared: Arc<Shared>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // Skip immediate first tick.

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !shared.is_connected() {
                    break;
                }
                match shared.enqueue(&Envelope::heartbeat()) {
                    Ok(()) => trace!("heartbeat queued"),
                    Err(e) => {
                        debug!(error = %e, "heartbeat stopped");
                        break;
                    }
                }
            }
        }
    }
}
