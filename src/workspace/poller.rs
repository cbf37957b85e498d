use crate::api::ApiClient;
use crate::model::{InfoEvent, StatusEntry, StoreStatus, WatchOutcome, WorkspaceEvent};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Parameters for running a status watch loop.
pub(crate) struct WatchParams<'a> {
    pub client: &'a ApiClient,
    pub product_id: &'a str,
    pub interval: Duration,
    pub max_duration: Option<Duration>,
    pub status_timeout_ms: u64,
    pub event_tx: &'a mpsc::UnboundedSender<WorkspaceEvent>,
    pub cancel: Arc<AtomicBool>,
}

/// A status collection is terminal when it is non-empty and no store is still
/// generating. An empty collection is never terminal.
pub(crate) fn is_complete(entries: &[StatusEntry]) -> bool {
    !entries.is_empty() && entries.iter().all(|e| e.status != StoreStatus::Generating)
}

/// Poll generation status at a fixed interval until the job is terminal,
/// the cancel flag is set, or the optional cap expires.
///
/// A failed status fetch is reported and retried on the next tick; there is
/// no backoff and no retry cap.
pub(crate) async fn watch_generation(params: WatchParams<'_>) -> WatchOutcome {
    let WatchParams {
        client,
        product_id,
        interval,
        max_duration,
        status_timeout_ms,
        event_tx,
        cancel,
    } = params;
    let start = Instant::now();
    let mut ticks = 0u64;
    let mut last: Vec<StatusEntry> = Vec::new();

    let _ = event_tx.send(WorkspaceEvent::WatchStarted {
        product_id: product_id.to_string(),
    });

    loop {
        if cancel.load(Ordering::Relaxed) {
            return WatchOutcome {
                product_id: product_id.to_string(),
                ticks,
                completed: false,
                timed_out: false,
                statuses: last,
            };
        }
        if let Some(max) = max_duration {
            if start.elapsed() >= max {
                let _ = event_tx.send(WorkspaceEvent::Info(InfoEvent::Message(format!(
                    "Gave up after {} ticks; the job may still be running",
                    ticks
                ))));
                return WatchOutcome {
                    product_id: product_id.to_string(),
                    ticks,
                    completed: false,
                    timed_out: true,
                    statuses: last,
                };
            }
        }

        ticks += 1;
        match client.generation_status(product_id, status_timeout_ms).await {
            Ok(entries) => {
                let _ = event_tx.send(WorkspaceEvent::StatusTick {
                    tick: ticks,
                    entries: entries.clone(),
                });
                let done = is_complete(&entries);
                last = entries;
                if done {
                    return WatchOutcome {
                        product_id: product_id.to_string(),
                        ticks,
                        completed: true,
                        timed_out: false,
                        statuses: last,
                    };
                }
            }
            Err(e) => {
                tracing::warn!(tick = ticks, error = %e, "status fetch failed");
                let _ = event_tx.send(WorkspaceEvent::Info(InfoEvent::StatusFetchFailed {
                    tick: ticks,
                    error: e.to_string(),
                }));
            }
        }

        tokio::time::sleep(interval).await;
    }
}
