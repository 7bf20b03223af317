use anyhow::{Context, Result};
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::events::{Snapshot, Stimulus};

/// Current time on tokio's clock, so a paused test clock drives the engine too.
pub fn now() -> std::time::Instant {
    Instant::now().into_std()
}

/// Drives `engine` from host stimuli and its own deadlines.
///
/// Rules:
/// - Stimuli are applied one at a time, in arrival order.
/// - Between stimuli the task sleeps until the engine's next deadline (lock
///   expiry or autoplay tick) and then lets the engine catch up.
/// - Every snapshot is forwarded to `snapshots`, in order.
/// - Cancellation, a closed stimulus channel or a closed snapshot channel
///   disposes the engine before returning, so no timer outlives the task.
pub async fn run(
    mut engine: Engine,
    mut stimuli: Receiver<Stimulus>,
    snapshots: Sender<Snapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        let deadline = engine.next_deadline();
        let wake_at = deadline.map(Instant::from_std).unwrap_or_else(Instant::now);

        let stimulus = select! {
            _ = cancel.cancelled() => break,

            maybe = stimuli.recv() => match maybe {
                Some(stimulus) => stimulus,
                None => {
                    debug!("stimulus channel closed");
                    break;
                }
            },

            _ = sleep_until(wake_at), if deadline.is_some() => Stimulus::Tick,
        };

        // Dispatch only fails once the engine is disposed.
        let Ok(reduction) = engine.dispatch(stimulus, now()) else {
            break;
        };

        let mut closed = false;
        for snapshot in reduction.snapshots {
            if snapshots.send(snapshot).await.is_err() {
                closed = true;
                break;
            }
        }
        if closed {
            warn!("snapshot channel closed");
            break;
        }
    }

    if !engine.is_disposed() {
        engine.dispose().context("failed to dispose carousel engine")?;
    }
    info!("carousel task stopped");
    Ok(())
}
