//! Single-flight cache for the global settings record.
//!
//! Header, footer and home page all need the same record. The first caller
//! starts a fetch; everyone arriving while it is outstanding awaits that same
//! fetch, and once it succeeds the value is served from memory for the rest
//! of the process. Failures are handed to every waiter of that attempt and
//! are not cached, so the next call starts a fresh attempt.

use std::sync::{Arc, Weak};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::SiteSettings;
use crate::domain::errors::FetchError;
use crate::domain::ports::SettingsStorePort;

/// Outcome of one settings read.
pub type SettingsResult = Result<Arc<SiteSettings>, FetchError>;

type PendingFetch = Shared<BoxFuture<'static, SettingsResult>>;

#[derive(Default)]
struct CacheState {
    value: Option<Arc<SiteSettings>>,
    pending: Option<(u64, PendingFetch)>,
    attempts: u64,
}

/// Deduplicating, non-expiring cache in front of a [`SettingsStorePort`].
///
/// Each instance owns its state; create one per process and share it behind
/// an `Arc`.
pub struct SettingsCache {
    store: Arc<dyn SettingsStorePort>,
    state: Arc<Mutex<CacheState>>,
}

impl std::fmt::Debug for SettingsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SettingsCache")
            .field("cached", &state.value.is_some())
            .field("fetching", &state.pending.is_some())
            .field("attempts", &state.attempts)
            .finish_non_exhaustive()
    }
}

impl SettingsCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(store: Arc<dyn SettingsStorePort>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    /// Returns the settings record, fetching it at most once per attempt.
    ///
    /// # Errors
    /// Returns the store's error. All callers that joined the same attempt
    /// receive the same error.
    pub async fn get(&self) -> SettingsResult {
        let pending = {
            let mut state = self.state.lock();

            if let Some(value) = &state.value {
                trace!("Settings cache hit");
                return Ok(Arc::clone(value));
            }

            let joined = state.pending.as_ref().map(|(attempt, fetch)| {
                debug!(attempt = *attempt, "Joining in-flight settings fetch");
                fetch.clone()
            });

            match joined {
                Some(fetch) => fetch,
                None => self.begin_fetch(&mut state),
            }
        };

        pending.await
    }

    /// Returns the cached record without any I/O.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<SiteSettings>> {
        self.state.lock().value.clone()
    }

    /// Returns true while a fetch is outstanding.
    #[must_use]
    pub fn is_fetching(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    fn begin_fetch(&self, state: &mut CacheState) -> PendingFetch {
        state.attempts += 1;
        let attempt = state.attempts;
        debug!(attempt, "Fetching settings from configuration store");

        let store = Arc::clone(&self.store);
        let cache_state = Arc::downgrade(&self.state);

        let fetch = async move {
            let result = store.fetch_settings().await.map(Arc::new);
            settle(&cache_state, attempt, &result);
            result
        }
        .boxed()
        .shared();

        state.pending = Some((attempt, fetch.clone()));
        fetch
    }
}

/// Records the outcome of an attempt, unless a newer attempt replaced it.
fn settle(state: &Weak<Mutex<CacheState>>, attempt: u64, result: &SettingsResult) {
    let Some(state) = state.upgrade() else {
        return;
    };
    let mut state = state.lock();

    if !matches!(&state.pending, Some((current, _)) if *current == attempt) {
        return;
    }

    // The caller polling this fetch holds its own clone.
    state.pending = None;
    match result {
        Ok(value) => {
            debug!(attempt, "Settings cached");
            state.value = Some(Arc::clone(value));
        }
        Err(e) => {
            warn!(attempt, error = %e, "Settings fetch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockSettingsStore;
    use std::time::Duration;

    fn studio_settings() -> SiteSettings {
        SiteSettings {
            id: Some(1),
            site_title: Some("Lumen Studio".to_string()),
            ..SiteSettings::default()
        }
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_fetch() {
        let store = Arc::new(
            MockSettingsStore::new(studio_settings()).with_delay(Duration::from_millis(20)),
        );
        let cache = SettingsCache::new(store.clone());

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(store.calls(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
        assert_eq!(a.site_title.as_deref(), Some("Lumen Studio"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_gets_across_tasks() {
        let store = Arc::new(
            MockSettingsStore::new(studio_settings()).with_delay(Duration::from_millis(30)),
        );
        let cache = Arc::new(SettingsCache::new(store.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get().await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(store.calls(), 1);
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn test_cached_value_needs_no_fetch() {
        let store = Arc::new(MockSettingsStore::new(studio_settings()));
        let cache = SettingsCache::new(store.clone());

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(store.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!cache.is_fetching());
        assert!(cache.cached().is_some());
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let store = Arc::new(MockSettingsStore::new(studio_settings()));
        store.push_outcome(Err(FetchError::network("connection refused")));
        let cache = SettingsCache::new(store.clone());

        let failed = cache.get().await;
        assert!(matches!(failed, Err(FetchError::Network { .. })));
        assert!(cache.cached().is_none());
        assert!(!cache.is_fetching());

        let recovered = cache.get().await;
        assert!(recovered.is_ok());
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_waiters_share_the_error() {
        let store = Arc::new(
            MockSettingsStore::new(studio_settings()).with_delay(Duration::from_millis(20)),
        );
        store.push_outcome(Err(FetchError::rejected(503, "maintenance")));
        let cache = SettingsCache::new(store.clone());

        let (a, b, c) = tokio::join!(cache.get(), cache.get(), cache.get());

        let expected = FetchError::rejected(503, "maintenance");
        assert_eq!(a.unwrap_err(), expected);
        assert_eq!(b.unwrap_err(), expected);
        assert_eq!(c.unwrap_err(), expected);
        assert_eq!(store.calls(), 1);

        assert!(cache.get().await.is_ok());
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_caller_does_not_restart_fetch() {
        let store = Arc::new(
            MockSettingsStore::new(studio_settings()).with_delay(Duration::from_millis(50)),
        );
        let cache = SettingsCache::new(store.clone());

        let abandoned = tokio::time::timeout(Duration::from_millis(5), cache.get()).await;
        assert!(abandoned.is_err());
        assert!(cache.is_fetching());

        let settings = cache.get().await.unwrap();
        assert_eq!(settings.site_title.as_deref(), Some("Lumen Studio"));
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let store = Arc::new(MockSettingsStore::new(studio_settings()));
        let first = SettingsCache::new(store.clone());
        let second = SettingsCache::new(store.clone());

        first.get().await.unwrap();
        assert!(second.cached().is_none());

        second.get().await.unwrap();
        assert_eq!(store.calls(), 2);
    }
}
