// Memoized async query cache: one entry per key, each entry tracking
// {status, last successful value, last error}. Fetches are deduplicated per
// key while in flight, and a resolved entry (success or error) is served
// without a refetch, so consumers can call `fetch` on every render pass.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

// Lifecycle of a single query entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

// Observable state of one entry. The last successful value survives later
// errors and invalidations; the error message survives until the next
// successful fetch.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    pub value: Option<V>,
    pub error: Option<String>,
}

impl<V> QueryState<V> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

// Counters for cache behavior, readable at any time via `stats()`.
#[derive(Debug, Default, Clone)]
pub struct QueryStats {
    pub lookups: usize,
    pub cached_hits: usize,
    pub deduped: usize,
    pub fetches_started: usize,
    pub fetches_succeeded: usize,
    pub fetches_failed: usize,
    pub invalidations: usize,
}

enum Claim {
    Start,
    Dedup,
    Cached,
}

// Parameter-keyed cache of asynchronous fetches. One instance is shared for
// the process lifetime and injected wherever queries are issued.
pub struct QueryCache<K, V> {
    entries: DashMap<K, Arc<watch::Sender<QueryState<V>>>>,
    stats: Arc<RwLock<QueryStats>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            stats: Arc::new(RwLock::new(QueryStats::default())),
        }
    }

    // Ensure the query behind `key` runs. An in-flight fetch is deduplicated
    // and a resolved entry (success or error) is served as-is; re-running a
    // resolved query requires `invalidate` first. `fetch_fn` is only invoked
    // when this call claims the entry; the fetch itself is spawned, so this
    // must run inside a tokio runtime and completion is observed through
    // `state`/`subscribe`/`settled`.
    pub fn fetch<F, Fut>(&self, key: K, fetch_fn: F)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, String>> + Send + 'static,
    {
        let sender;
        let claim;
        {
            // The entry guard serializes claims per key: whoever sees Idle
            // first flips the entry to Loading before releasing.
            let entry = self
                .entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(watch::channel(QueryState::idle()).0));
            sender = Arc::clone(entry.value());

            claim = match sender.borrow().status {
                QueryStatus::Loading => Claim::Dedup,
                QueryStatus::Success | QueryStatus::Error => Claim::Cached,
                QueryStatus::Idle => Claim::Start,
            };

            if matches!(claim, Claim::Start) {
                let mut next = sender.borrow().clone();
                next.status = QueryStatus::Loading;
                sender.send_replace(next);
            }
        }

        match claim {
            Claim::Dedup => {
                self.stats.write().deduped += 1;
            }
            Claim::Cached => {
                self.stats.write().cached_hits += 1;
            }
            Claim::Start => {
                self.stats.write().fetches_started += 1;
                debug!(key = ?key, "query fetch started");

                let stats = Arc::clone(&self.stats);
                let future = fetch_fn();
                tokio::spawn(async move {
                    let result = future.await;
                    let mut next = sender.borrow().clone();
                    match result {
                        Ok(value) => {
                            debug!(key = ?key, "query fetch succeeded");
                            next.status = QueryStatus::Success;
                            next.value = Some(value);
                            next.error = None;
                            stats.write().fetches_succeeded += 1;
                        }
                        Err(message) => {
                            debug!(key = ?key, error = %message, "query fetch failed");
                            next.status = QueryStatus::Error;
                            next.error = Some(message);
                            stats.write().fetches_failed += 1;
                        }
                    }
                    sender.send_replace(next);
                });
            }
        }
    }

    // Current state of the entry; Idle if the key has never been fetched.
    pub fn state(&self, key: &K) -> QueryState<V> {
        self.stats.write().lookups += 1;
        self.entries
            .get(key)
            .map(|entry| entry.value().borrow().clone())
            .unwrap_or_else(QueryState::idle)
    }

    // Watch receiver for the entry's status transitions. None until the key
    // has been fetched at least once.
    pub fn subscribe(&self, key: &K) -> Option<watch::Receiver<QueryState<V>>> {
        self.entries.get(key).map(|entry| entry.value().subscribe())
    }

    // Wait until the entry is no longer Loading and return its state.
    // Returns immediately for keys with no entry or no fetch in flight.
    pub async fn settled(&self, key: &K) -> QueryState<V> {
        let mut receiver = match self.subscribe(key) {
            Some(receiver) => receiver,
            None => return QueryState::idle(),
        };

        loop {
            let state = receiver.borrow_and_update().clone();
            if state.status != QueryStatus::Loading {
                return state;
            }
            if receiver.changed().await.is_err() {
                return state;
            }
        }
    }

    // Mark the entry stale: back to Idle, last value kept. This is the only
    // way a resolved query runs again. Returns false for unknown keys.
    pub fn invalidate(&self, key: &K) -> bool {
        match self.entries.get(key) {
            Some(entry) => {
                let sender = entry.value();
                let mut next = sender.borrow().clone();
                next.status = QueryStatus::Idle;
                next.error = None;
                sender.send_replace(next);
                self.stats.write().invalidations += 1;
                true
            }
            None => false,
        }
    }

    pub fn stats(&self) -> QueryStats {
        self.stats.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
