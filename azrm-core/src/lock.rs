//! Named locks serializing mutations of the same remote resource

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// A table of async mutexes keyed by name
///
/// Locking a name waits until every earlier holder of the same name has
/// dropped its guard. Different names never block each other. An entry
/// lives only while some guard or waiter refers to it.
#[derive(Debug, Default)]
pub struct NamedLocks {
    locks: Arc<LockTable>,
}

/// Guard returned by [`NamedLocks::lock`]; the lock is released on drop
#[derive(Debug)]
pub struct NamedLockGuard {
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl NamedLockGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for NamedLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The table's own reference is the last one once nobody waits
        self.locks
            .remove_if(&self.name, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

impl NamedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, name: &str) -> NamedLockGuard {
        // Clone the Arc out so the map shard is not held across the await
        let mutex = self
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        log::debug!("waiting for lock {:?}", name);
        let guard = mutex.lock_owned().await;
        NamedLockGuard {
            name: name.to_string(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Number of names with a holder or waiter
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Whether `name` is currently held
    pub fn is_locked(&self, name: &str) -> bool {
        self.locks
            .get(name)
            .is_some_and(|mutex| mutex.try_lock().is_err())
    }
}
