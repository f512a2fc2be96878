//! Reconciliation listener
//!
//! Background task draining the store's change feed into the collection.
//! Stops when the feed ends, on [`ListenerHandle::shutdown`], or when the
//! handle is dropped. Feed errors are logged and the task keeps reading.

use crate::collection::{EventDisposition, ItemCollection};
use futures::StreamExt;
use newsboard_store::ChangeStream;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Counters for one listener run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub applied: usize,
    pub unchanged: usize,
    pub deferred: usize,
    pub errors: usize,
}

/// Running listener
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<ListenerStats>,
}

impl ListenerHandle {
    /// Stop the listener and wait for it to finish
    pub async fn shutdown(mut self) -> ListenerStats {
        if let Some(tx) = self.shutdown.take() {
            // The task may already have ended with the feed.
            let _ = tx.send(());
        }
        match (&mut self.task).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "reconciliation listener task failed");
                ListenerStats::default()
            }
        }
    }

    /// Check if the listener has stopped
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Feed-to-collection pump
pub struct ReconciliationListener;

impl ReconciliationListener {
    /// Spawn the listener over an open feed
    #[must_use]
    pub fn spawn(feed: ChangeStream, collection: Arc<ItemCollection>) -> ListenerHandle {
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(run(feed, collection, rx));
        ListenerHandle {
            shutdown: Some(tx),
            task,
        }
    }
}

async fn run(
    mut feed: ChangeStream,
    collection: Arc<ItemCollection>,
    mut shutdown: oneshot::Receiver<()>,
) -> ListenerStats {
    let mut stats = ListenerStats::default();
    tracing::debug!("reconciliation listener started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("reconciliation listener shutting down");
                break;
            }
            next = feed.next() => {
                match next {
                    Some(Ok(event)) => {
                        let item_id = event.item.id.clone();
                        let kind = event.kind;
                        match collection.apply_event(event) {
                            EventDisposition::Applied => {
                                tracing::debug!(item_id = %item_id, kind = %kind, "applied change event");
                                stats.applied += 1;
                            }
                            EventDisposition::Unchanged => stats.unchanged += 1,
                            EventDisposition::Deferred => stats.deferred += 1,
                        }
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "change feed error");
                        stats.errors += 1;
                    }
                    None => {
                        tracing::info!("change feed closed");
                        break;
                    }
                }
            }
        }
    }

    stats
}
