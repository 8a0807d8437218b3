//! Single-execution guard for recomputes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sift_core::errors::ClusteringError;

/// Shared flag; at most one [`RecomputeGuard`] exists per lock at any time.
#[derive(Debug, Clone, Default)]
pub struct RecomputeLock {
    is_running: Arc<AtomicBool>,
}

impl RecomputeLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Fails immediately with `RecomputeInProgress` instead of waiting.
    pub fn try_acquire(&self) -> Result<RecomputeGuard, ClusteringError> {
        self.is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ClusteringError::RecomputeInProgress)?;
        Ok(RecomputeGuard {
            flag: Arc::clone(&self.is_running),
        })
    }
}

/// Releases the lock on drop, including on early return and unwind.
#[derive(Debug)]
pub struct RecomputeGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for RecomputeGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_release() {
        let lock = RecomputeLock::new();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.is_running());
        assert!(matches!(
            lock.try_acquire(),
            Err(ClusteringError::RecomputeInProgress)
        ));
        drop(guard);
        assert!(!lock.is_running());
        assert!(lock.try_acquire().is_ok());
    }
}
