//! Update sources feeding the tracker.
//!
//! The tracker does not care where events come from: a push channel and a
//! periodic poll loop both funnel into the same atomic ingest path, and the
//! two may run at once against one tracker.

use crate::error::Result;
use crate::job::TrackerEvent;
use crate::tracker::JobTracker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A pull-based source of tracker events.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetch whatever events accumulated since the last poll.
    async fn poll(&self) -> Result<Vec<TrackerEvent>>;
}

/// Drain a push channel into the tracker.
///
/// The task exits when every sender is dropped.
pub fn spawn_ingest_loop(
    tracker: JobTracker,
    mut events: mpsc::Receiver<TrackerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracker.apply_event(event);
        }
        debug!("push channel closed; ingest loop exiting");
    })
}

/// Poll a source on a fixed period until the token is cancelled.
///
/// A failing poll is logged and the loop keeps going; the source owns its
/// own retry semantics.
pub fn spawn_poll_loop(
    tracker: JobTracker,
    source: Arc<dyn UpdateSource>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!("poll loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match source.poll().await {
                        Ok(events) => {
                            for event in events {
                                tracker.apply_event(event);
                            }
                        }
                        Err(e) => warn!("update source poll failed: {e}"),
                    }
                }
            }
        }
    })
}
