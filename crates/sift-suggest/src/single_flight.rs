//! Per-key in-flight registry.
//!
//! The first caller for a key starts the computation; later callers attach to
//! the same shared future. The registry keeps only a weak handle, so when every
//! caller has gone away the computation is dropped and the next caller starts
//! a fresh one. A caller that cancels alone does not affect the others.

use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};

struct Flight<V> {
    id: u64,
    future: WeakShared<BoxFuture<'static, V>>,
}

pub struct SingleFlight<K, V> {
    inflight: DashMap<K, Flight<V>>,
    next_id: AtomicU64,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            inflight: DashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make()` for `key` unless a run is already in flight, then await the shared result.
    ///
    /// `make` is only called when this caller becomes the leader.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let (id, shared) = self.join_or_start(key.clone(), make);
        let output = shared.await;
        self.inflight.remove_if(&key, |_, flight| flight.id == id);
        output
    }

    /// Number of keys with a live computation.
    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    fn join_or_start<F, Fut>(&self, key: K, make: F) -> (u64, Shared<BoxFuture<'static, V>>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        match self.inflight.entry(key) {
            Entry::Occupied(mut entry) => {
                if let Some(shared) = entry.get().future.upgrade() {
                    return (entry.get().id, shared);
                }
                let (id, shared) = self.start(make);
                if let Some(future) = shared.downgrade() {
                    entry.insert(Flight { id, future });
                }
                (id, shared)
            }
            Entry::Vacant(entry) => {
                let (id, shared) = self.start(make);
                if let Some(future) = shared.downgrade() {
                    entry.insert(Flight { id, future });
                }
                (id, shared)
            }
        }
    }

    fn start<F, Fut>(&self, make: F) -> (u64, Shared<BoxFuture<'static, V>>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        (id, make().boxed().shared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_run() {
        let flights: Arc<SingleFlight<&'static str, usize>> = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let flights = Arc::clone(&flights);
            let runs = Arc::clone(&runs);
            handles.push(tokio::spawn(async move {
                flights
                    .run("k", move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        runs.fetch_add(1, Ordering::SeqCst) + 1
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(flights.in_flight(), 0);
    }

    #[tokio::test]
    async fn finished_flight_is_not_reused() {
        let flights: SingleFlight<u8, u32> = SingleFlight::new();
        assert_eq!(flights.run(1, || async { 10 }).await, 10);
        assert_eq!(flights.run(1, || async { 20 }).await, 20);
    }

    #[tokio::test]
    async fn one_cancelled_caller_does_not_cancel_the_others() {
        let flights: Arc<SingleFlight<u8, u32>> = Arc::new(SingleFlight::new());

        let cancelled = {
            let flights = Arc::clone(&flights);
            tokio::spawn(async move {
                flights
                    .run(1, || async {
                        tokio::time::sleep(Duration::from_millis(80)).await;
                        7
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let follower = {
            let flights = Arc::clone(&flights);
            tokio::spawn(async move { flights.run(1, || async { 99 }).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        cancelled.abort();

        assert_eq!(follower.await.unwrap(), 7);
    }
}
