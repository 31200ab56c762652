//! # In-Flight Request Deduplication
//!
//! [`InFlight`] guarantees that at most one computation runs per key at any
//! time. Callers that submit a key whose computation is still running wait on
//! that computation and receive a clone of its outcome.
//!
//! The table is coordination state, not a cache: an entry lives from the first
//! submission until its computation settles and is then removed, so the next
//! submission with the same key always starts fresh work.
//!
//! Computations are spawned onto the Tokio runtime. They run to completion even
//! if every caller that was waiting on them goes away.

use crate::errors::SettleError;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

type SharedOutcome<T, E> = Shared<BoxFuture<'static, Result<T, SettleError<E>>>>;
type PendingTable<K, T, E> = Arc<Mutex<HashMap<K, SharedOutcome<T, E>>>>;

/// A table of pending computations keyed by request fingerprint.
pub struct InFlight<K, T, E> {
    pending: PendingTable<K, T, E>,
}

impl<K, T, E> Clone for InFlight<K, T, E> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<K, T, E> Default for InFlight<K, T, E> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, T, E> std::fmt::Debug for InFlight<K, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlight").finish_non_exhaustive()
    }
}

/// Removes a key from the table when its computation settles, including by panic.
struct SettleGuard<K: Eq + Hash, T, E> {
    key: Option<K>,
    pending: PendingTable<K, T, E>,
}

impl<K: Eq + Hash, T, E> Drop for SettleGuard<K, T, E> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(&self.pending).remove(&key);
        }
    }
}

fn lock<K, T, E>(
    pending: &PendingTable<K, T, E>,
) -> MutexGuard<'_, HashMap<K, SharedOutcome<T, E>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K, T, E> InFlight<K, T, E>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `computation` for `key`, or joins the run already in flight for it.
    ///
    /// `computation` is only invoked when no entry for `key` exists. All
    /// callers sharing a run observe the same `Ok` value or the same
    /// [`SettleError`].
    pub async fn submit<F, Fut>(&self, key: K, computation: F) -> Result<T, SettleError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let outcome = {
            // Lookup and insertion happen under one lock acquisition. The guard
            // in the spawned task cannot remove the entry before it is inserted.
            let mut pending = lock(&self.pending);
            if let Some(existing) = pending.get(&key) {
                debug!(?key, "Joining in-flight computation");
                existing.clone()
            } else {
                // The guard is created inside the task, never on this thread while
                // the lock is held. A panic in `computation` or `spawn` leaves no
                // guard behind and no entry in the table.
                let work = computation();
                let guard_key = key.clone();
                let guard_table = Arc::clone(&self.pending);
                let handle = tokio::spawn(async move {
                    let _guard = SettleGuard {
                        key: Some(guard_key),
                        pending: guard_table,
                    };
                    work.await
                });
                let outcome = async move {
                    match handle.await {
                        Ok(result) => result.map_err(SettleError::Failed),
                        Err(e) => Err(SettleError::Aborted(e.to_string())),
                    }
                }
                .boxed()
                .shared();
                debug!(?key, "Started new computation");
                pending.insert(key, outcome.clone());
                outcome
            }
        };
        outcome.await
    }
}
