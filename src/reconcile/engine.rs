// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalog::{EpisodeRecord, EpisodeStore, MediaLocator};
use crate::error::AdmissionError;
use crate::report::{AbandonReason, CatalogEvent, SharedReporter};

use super::watch::FsEvent;
use super::{RetryPolicy, attempt_admission};

/// How a validation cycle for one folder ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Admitted,
    Abandoned(AbandonReason),
    /// Pre-empted by a removal or by a newer cycle for the same name
    Cancelled,
}

/// What the reconciler did in response to a single event
#[derive(Debug)]
pub enum Reaction {
    /// A validation cycle was started; the handle resolves when it ends
    Scheduled(JoinHandle<Outcome>),
    /// A removal was applied to the store
    Removed { was_present: bool },
    /// The event did not concern an episode folder
    Ignored,
}

/// A validation cycle in flight for one folder name
#[derive(Debug)]
struct PendingValidation {
    generation: u64,
    cancel: CancellationToken,
}

struct Shared {
    root: PathBuf,
    store: EpisodeStore,
    locator: MediaLocator,
    policy: RetryPolicy,
    reporter: SharedReporter,
    /// Folder names currently in the pending state
    pending: Mutex<HashMap<String, PendingValidation>>,
    next_generation: AtomicU64,
}

/// Converts filesystem notifications into episode store mutations
///
/// Each appeared directory gets its own bounded retry task. A removal cancels
/// that task and deletes the key. Admission is committed while holding the
/// pending-table lock, after checking that the cycle is still current, so a
/// removal can never be overtaken by a late upsert.
#[derive(Clone)]
pub struct Reconciler {
    shared: Arc<Shared>,
}

impl Reconciler {
    pub fn new(
        root: impl Into<PathBuf>,
        store: EpisodeStore,
        locator: MediaLocator,
        policy: RetryPolicy,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                root: root.into(),
                store,
                locator,
                policy,
                reporter,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.shared.root
    }

    pub fn store(&self) -> &EpisodeStore {
        &self.shared.store
    }

    /// Number of folders with a validation cycle in flight
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.shared.pending.lock().contains_key(key)
    }

    /// Consume events until the source closes, then cancel whatever is pending
    pub async fn run(self, mut events: mpsc::Receiver<FsEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        debug!("Event source closed, stopping reconciler");
        self.cancel_all();
    }

    /// React to one filesystem notification
    pub async fn handle_event(&self, event: FsEvent) -> Reaction {
        match event {
            FsEvent::Appeared { name } => {
                let path = self.shared.root.join(&name);
                match tokio::fs::metadata(&path).await {
                    Ok(meta) if meta.is_dir() => Reaction::Scheduled(self.begin_validation(name)),
                    Ok(_) => Reaction::Ignored,
                    Err(e) if e.kind() == ErrorKind::NotFound => Reaction::Removed {
                        was_present: self.remove(&name),
                    },
                    Err(e) => {
                        warn!(%name, error = %e, "Error checking element type");
                        Reaction::Ignored
                    }
                }
            }
            FsEvent::Disappeared { name } => Reaction::Removed {
                was_present: self.remove(&name),
            },
        }
    }

    /// Cancel any validation of `key` and drop it from the store
    pub fn remove(&self, key: &str) -> bool {
        let was_present = {
            let mut pending = self.shared.pending.lock();
            if let Some(cycle) = pending.remove(key) {
                cycle.cancel.cancel();
            }
            self.shared.store.remove(key)
        };

        self.shared.reporter.report(CatalogEvent::EpisodeRemoved {
            key: key.to_string(),
            was_present,
        });
        was_present
    }

    /// Cancel every validation cycle in flight
    pub fn cancel_all(&self) {
        for (_, cycle) in self.shared.pending.lock().drain() {
            cycle.cancel.cancel();
        }
    }

    fn begin_validation(&self, key: String) -> JoinHandle<Outcome> {
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        // A repeated notification restarts the cycle
        let previous = self.shared.pending.lock().insert(
            key.clone(),
            PendingValidation {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.cancel.cancel();
        }

        self.shared
            .reporter
            .report(CatalogEvent::FolderDetected { key: key.clone() });

        let this = self.clone();
        tokio::spawn(async move { this.validate_until_deadline(key, generation, cancel).await })
    }

    async fn validate_until_deadline(
        &self,
        key: String,
        generation: u64,
        cancel: CancellationToken,
    ) -> Outcome {
        let policy = self.shared.policy;
        let deadline = tokio::time::sleep(policy.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(policy.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Outcome::Cancelled,
                _ = &mut deadline => {
                    self.finish(&key, generation);
                    return self.abandon(&key, AbandonReason::TimedOut, None);
                }
                _ = ticker.tick() => {}
            }

            let attempt = match self.attempt_off_runtime(&key).await {
                Ok(attempt) => attempt,
                Err(e) => {
                    warn!(%key, error = %e, "Validation attempt did not complete");
                    continue;
                }
            };

            match attempt {
                Ok(Some(record)) => {
                    let title = record.title.clone();
                    if !self.commit(&key, generation, record) {
                        return Outcome::Cancelled;
                    }
                    self.shared
                        .reporter
                        .report(CatalogEvent::EpisodeAdmitted { key, title });
                    return Outcome::Admitted;
                }
                Ok(None) => {
                    self.shared
                        .reporter
                        .report(CatalogEvent::FolderIncomplete { key: key.clone() });
                }
                Err(e) if e.is_transient() => {
                    self.shared.reporter.report(CatalogEvent::FolderUnreadable {
                        key: key.clone(),
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    self.finish(&key, generation);
                    return self.abandon(&key, AbandonReason::MalformedMetadata, Some(e.to_string()));
                }
            }
        }
    }

    /// Run one admission attempt on the blocking pool
    async fn attempt_off_runtime(
        &self,
        key: &str,
    ) -> Result<Result<Option<EpisodeRecord>, AdmissionError>, JoinError> {
        let shared = Arc::clone(&self.shared);
        let key = key.to_string();
        tokio::task::spawn_blocking(move || attempt_admission(&shared.root, &key, &shared.locator))
            .await
    }

    /// Upsert `record` if the cycle identified by `generation` is still current
    fn commit(&self, key: &str, generation: u64, record: EpisodeRecord) -> bool {
        let mut pending = self.shared.pending.lock();
        let current = pending
            .get(key)
            .is_some_and(|cycle| cycle.generation == generation);
        if !current {
            return false;
        }

        pending.remove(key);
        self.shared.store.upsert(key, record);
        true
    }

    /// Drop the pending entry for `key` if it still belongs to `generation`
    fn finish(&self, key: &str, generation: u64) {
        let mut pending = self.shared.pending.lock();
        if pending
            .get(key)
            .is_some_and(|cycle| cycle.generation == generation)
        {
            pending.remove(key);
        }
    }

    fn abandon(&self, key: &str, reason: AbandonReason, error: Option<String>) -> Outcome {
        self.shared.reporter.report(CatalogEvent::FolderAbandoned {
            key: key.to_string(),
            reason,
            error,
        });
        Outcome::Abandoned(reason)
    }
}
