use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tracing::debug;

use crate::episodes::Episode;

/// Process-wide view of the latest analysed episodes.
///
/// Readers always see a complete episode list: results are swapped in as a
/// whole with [`ResultsStore::replace`]. Fetch-and-analyze cycles are
/// serialized through a single-slot semaphore.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    episodes: Arc<RwLock<Vec<Episode>>>,
    fetch_gate: Arc<Semaphore>,
    downloading: Arc<AtomicBool>,
}

/// Held for the duration of one fetch-and-analyze cycle
#[derive(Debug)]
pub struct FetchGuard {
    _permit: OwnedSemaphorePermit,
    downloading: Arc<AtomicBool>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.downloading.store(false, Ordering::SeqCst);
        debug!("Fetch cycle finished");
    }
}

impl ResultsStore {
    pub fn new() -> Self {
        Self {
            episodes: Arc::new(RwLock::new(Vec::new())),
            fetch_gate: Arc::new(Semaphore::new(1)),
            downloading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of the latest episode list
    pub async fn get(&self) -> Vec<Episode> {
        self.episodes.read().await.clone()
    }

    /// Swap in a freshly computed episode list
    pub async fn replace(&self, episodes: Vec<Episode>) {
        let count = episodes.len();
        *self.episodes.write().await = episodes;
        debug!("💾 Results store updated with {} episodes", count);
    }

    /// Whether a fetch cycle is currently running
    pub fn is_downloading(&self) -> bool {
        self.downloading.load(Ordering::SeqCst)
    }

    /// Enter the fetch critical section, or `None` when a cycle is already running
    pub fn try_begin_fetch(&self) -> Option<FetchGuard> {
        let permit = Arc::clone(&self.fetch_gate).try_acquire_owned().ok()?;
        self.downloading.store(true, Ordering::SeqCst);
        Some(FetchGuard {
            _permit: permit,
            downloading: Arc::clone(&self.downloading),
        })
    }

    /// Wait for the fetch critical section
    pub async fn begin_fetch(&self) -> FetchGuard {
        let permit = Arc::clone(&self.fetch_gate)
            .acquire_owned()
            .await
            .expect("fetch gate semaphore is never closed");
        self.downloading.store(true, Ordering::SeqCst);
        FetchGuard {
            _permit: permit,
            downloading: Arc::clone(&self.downloading),
        }
    }
}

impl Default for ResultsStore {
    fn default() -> Self {
        Self::new()
    }
}
