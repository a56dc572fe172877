use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Deduplicates concurrent executions of an idempotent async operation.
///
/// The first caller for a key starts the operation; every caller that
/// arrives while it is in flight awaits the same shared future and receives
/// a clone of its output. The entry is removed once the operation settles,
/// so a later caller starts a fresh execution.
pub struct SingleFlight<K, T> {
    inflight: Mutex<HashMap<K, Shared<BoxFuture<'static, T>>>>,
}

impl<K, T> SingleFlight<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `fut` under `key`, or joins the execution already in flight for
    /// that key. `fut` is dropped unpolled when a flight is joined.
    pub async fn run<F>(&self, key: K, fut: F) -> T
    where
        F: Future<Output = T> + Send + 'static,
    {
        let shared = {
            let mut inflight = self.lock();
            if let Some(existing) = inflight.get(&key) {
                debug!("joining in-flight operation");
                existing.clone()
            } else {
                let shared = fut.boxed().shared();
                inflight.insert(key.clone(), shared.clone());
                shared
            }
        };

        let out = shared.clone().await;

        let mut inflight = self.lock();
        if let Some(current) = inflight.get(&key) {
            if Shared::ptr_eq(current, &shared) {
                inflight.remove(&key);
            }
        }

        out
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<K, Shared<BoxFuture<'static, T>>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Clone + Eq + Hash,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
