// SPDX-License-Identifier: AGPL-3.0
// Wayfare Core - Remote destination repository
//
// Owns the authoritative destination set. Writes go straight to the
// backend; reads arrive through a live subscription that re-delivers the
// complete current set on every observed change.

pub mod backend;
pub mod http;
pub mod memory;

pub use backend::{DestinationBackend, RemoteError};
pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::types::{AppError, Destination};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// What a live subscription delivers.
///
/// Listener failures are surfaced, not swallowed; consumers stay on their
/// last-known-good snapshot but can tell the view is stale.
#[derive(Debug, Clone)]
pub enum DestinationUpdate {
    /// The complete current set, provider order.
    Snapshot(Vec<Destination>),
    /// The listener failed this round; it keeps retrying.
    ListenError(String),
}

/// Live repository over a remote destination collection.
///
/// One repository is created per process and shared via `Arc`. The
/// listener task starts with the first subscription and runs until
/// [`DestinationRepository::shutdown`].
pub struct DestinationRepository<B: DestinationBackend> {
    backend: Arc<B>,
    updates: broadcast::Sender<DestinationUpdate>,
    poll_interval: Duration,
    /// Nudges the listener right after a successful local write.
    refresh: Arc<Notify>,
    last_snapshot: Arc<RwLock<Option<Vec<Destination>>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl<B: DestinationBackend> DestinationRepository<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        let (updates, _) = broadcast::channel(64);

        Self {
            backend: Arc::new(backend),
            updates,
            poll_interval,
            refresh: Arc::new(Notify::new()),
            last_snapshot: Arc::new(RwLock::new(None)),
            listener: Mutex::new(None),
        }
    }

    /// Write a new destination document.
    ///
    /// The live subscription reflects the write eventually, not
    /// synchronously with this call returning.
    pub async fn add(&self, destination: Destination) -> Result<Destination, AppError> {
        let stored = self
            .backend
            .add(&destination)
            .await
            .map_err(|e| AppError::RemoteWrite(e.to_string()))?;

        tracing::info!(id = %stored.id, name = %stored.name, "destination added");
        self.refresh.notify_one();
        Ok(stored)
    }

    /// Delete one destination by its unique id.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if id.is_empty() {
            return Err(AppError::Validation(
                "Destination id must not be empty".to_string(),
            ));
        }

        self.backend
            .delete(id)
            .await
            .map_err(|e| AppError::RemoteWrite(e.to_string()))?;

        tracing::info!(id, "destination deleted");
        self.refresh.notify_one();
        Ok(())
    }

    /// Legacy bulk deletion: remove every document whose name matches.
    ///
    /// Matching documents are deleted one by one; a failure partway leaves
    /// the earlier deletions in place. Returns how many were removed.
    ///
    /// Documents written before ids were introduced decode with an empty
    /// id and cannot be addressed individually. When any match is such a
    /// legacy document the whole operation is refused up front, leaving
    /// every document in place.
    pub async fn delete_by_name(&self, name: &str) -> Result<usize, AppError> {
        let matches: Vec<Destination> = self
            .backend
            .list()
            .await
            .map_err(|e| AppError::RemoteWrite(e.to_string()))?
            .into_iter()
            .filter(|d| d.name == name)
            .collect();

        let legacy = matches.iter().filter(|d| d.id.is_empty()).count();
        if legacy > 0 {
            return Err(AppError::RemoteWrite(format!(
                "Cannot delete {:?}: {} matching document(s) have no id",
                name, legacy
            )));
        }

        let mut deleted = 0;
        for document in &matches {
            self.backend
                .delete(&document.id)
                .await
                .map_err(|e| AppError::RemoteWrite(e.to_string()))?;
            deleted += 1;
        }

        if deleted > 0 {
            tracing::info!(name, deleted, "destinations deleted by name");
            self.refresh.notify_one();
        }
        Ok(deleted)
    }

    /// Register a live listener on the collection.
    ///
    /// The subscription yields the complete current set on initial load and
    /// after every observed change, until [`Subscription::cancel`] or drop.
    /// Cancelling does not cancel writes already in flight.
    pub fn subscribe(&self) -> Subscription {
        self.ensure_listener();

        let rx = self.updates.subscribe();
        let initial = self
            .last_snapshot
            .read()
            .unwrap()
            .clone()
            .map(DestinationUpdate::Snapshot);

        Subscription { initial, rx }
    }

    /// Spawn the poll-loop listener the first time someone subscribes.
    fn ensure_listener(&self) {
        let mut listener = self.listener.lock().unwrap();
        if listener.is_some() {
            return;
        }

        let backend = self.backend.clone();
        let updates = self.updates.clone();
        let refresh = self.refresh.clone();
        let last_snapshot = self.last_snapshot.clone();
        let poll_interval = self.poll_interval;

        *listener = Some(tokio::spawn(async move {
            loop {
                match backend.list().await {
                    Ok(documents) => {
                        let changed = {
                            let last = last_snapshot.read().unwrap();
                            last.as_deref() != Some(documents.as_slice())
                        };

                        if changed {
                            *last_snapshot.write().unwrap() = Some(documents.clone());
                            let _ = updates.send(DestinationUpdate::Snapshot(documents));
                        }
                    }
                    Err(e) => {
                        tracing::warn!("destination listener poll failed: {}", e);
                        let _ = updates.send(DestinationUpdate::ListenError(e.to_string()));
                    }
                }

                tokio::select! {
                    _ = sleep(poll_interval) => {}
                    _ = refresh.notified() => {}
                }
            }
        }));
    }

    /// Stop the listener task. Called once at process shutdown.
    pub fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().unwrap().take() {
            handle.abort();
        }
    }
}

/// Handle to a live destination subscription.
pub struct Subscription {
    initial: Option<DestinationUpdate>,
    rx: broadcast::Receiver<DestinationUpdate>,
}

impl Subscription {
    /// Receive the next update.
    ///
    /// The first call returns the last known snapshot immediately when one
    /// exists. Returns `None` once the repository has shut down. A lagging
    /// subscriber skips straight to newer snapshots; every snapshot is the
    /// full set, so nothing is lost.
    pub async fn recv(&mut self) -> Option<DestinationUpdate> {
        if let Some(first) = self.initial.take() {
            return Some(first);
        }

        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicitly end this subscription. No further updates are delivered.
    pub fn cancel(self) {
        drop(self);
    }
}
