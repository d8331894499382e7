//! Process-wide permission catalog.
//!
//! The catalog holds every permission name the backend knows. It is fetched
//! once after the session is initialized and shared by every consumer.
//! Concurrent loads attach to the same in-flight fetch; [`invalidate`]
//! forgets both the cached set and any pending fetch.
//!
//! The fetch runs on a spawned task and is memoized as a [`Shared`] future,
//! so dropping a caller never cancels it. Each fetch is tagged with the
//! generation it started in; a fetch that finishes after an invalidation
//! cannot write into the cache.
//!
//! [`invalidate`]: PermissionCatalog::invalidate

use crate::backend::PermissionSource;
use crate::error::{BackendError, CatalogError};
use crate::permission::{Permission, PermissionSet};
use crate::session::Session;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use teller_common_log::spans::{catalog_span, record_error, Timer};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

type FetchResult = Result<Arc<PermissionSet>, CatalogError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Point-in-time view of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub permissions: Arc<PermissionSet>,
    /// A fetch has populated the cache.
    pub loaded: bool,
    /// A fetch is in flight.
    pub loading: bool,
    pub error: Option<CatalogError>,
}

#[derive(Default)]
struct CatalogState {
    permissions: Option<Arc<PermissionSet>>,
    in_flight: Option<SharedFetch>,
    generation: u64,
    error: Option<CatalogError>,
}

struct Inner {
    source: Arc<dyn PermissionSource>,
    session: watch::Receiver<Session>,
    state: Mutex<CatalogState>,
    version: watch::Sender<u64>,
}

impl Inner {
    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    /// Store a fetch outcome unless the catalog was invalidated meanwhile.
    fn complete(
        &self,
        generation: u64,
        outcome: Result<Vec<Permission>, BackendError>,
    ) -> FetchResult {
        let result = match outcome {
            Ok(list) => Ok(Arc::new(list.into_iter().collect::<PermissionSet>())),
            Err(e) => {
                record_error(&e);
                Err(CatalogError::fetch(&e))
            }
        };

        {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "discarding fetch from before invalidation"
                );
                return result;
            }

            state.in_flight = None;
            match &result {
                Ok(permissions) => {
                    info!(count = permissions.len(), "permission catalog loaded");
                    state.permissions = Some(Arc::clone(permissions));
                    state.error = None;
                }
                Err(e) => {
                    warn!(detail = e.detail(), "{}", e);
                    state.error = Some(e.clone());
                }
            }
        }

        self.notify();
        result
    }
}

/// Shared handle to the permission catalog. Cloning is cheap.
#[derive(Clone)]
pub struct PermissionCatalog {
    inner: Arc<Inner>,
}

impl PermissionCatalog {
    /// Create an empty catalog that fetches from `source` once `session`
    /// reports initialized.
    pub fn new(source: Arc<dyn PermissionSource>, session: watch::Receiver<Session>) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                source,
                session,
                state: Mutex::new(CatalogState::default()),
                version,
            }),
        }
    }

    /// Load the catalog.
    ///
    /// Returns the cached set when present and attaches to the in-flight
    /// fetch when there is one. Otherwise starts a fetch, but only once the
    /// session is initialized; before that the current (empty) contents are
    /// returned without touching the network.
    pub async fn load(&self) -> FetchResult {
        let fetch = {
            let mut state = self.inner.state.lock();
            if let Some(permissions) = &state.permissions {
                return Ok(Arc::clone(permissions));
            }
            if let Some(fetch) = &state.in_flight {
                fetch.clone()
            } else if !self.inner.session.borrow().initialized {
                debug!("session not initialized; skipping catalog fetch");
                return Ok(Arc::default());
            } else {
                let fetch = self.start_fetch(state.generation);
                state.in_flight = Some(fetch.clone());
                state.error = None;
                drop(state);
                self.inner.notify();
                fetch
            }
        };

        fetch.await
    }

    fn start_fetch(&self, generation: u64) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let span = catalog_span(generation);
        let task = tokio::spawn(
            async move {
                debug!("fetching permission catalog");
                let timer = Timer::start("catalog_fetch");
                let outcome = inner.source.fetch_permissions().await;
                timer.finish();
                inner.complete(generation, outcome)
            }
            .instrument(span),
        );

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(CatalogError::Fetch {
                    detail: e.to_string(),
                }),
            }
        }
        .boxed()
        .shared()
    }

    /// Forget the cached set and any pending fetch in one step. The next
    /// [`load`](Self::load) fetches again.
    pub fn invalidate(&self) {
        {
            let mut state = self.inner.state.lock();
            state.permissions = None;
            state.in_flight = None;
            state.error = None;
            state.generation += 1;
            debug!(generation = state.generation, "permission catalog invalidated");
        }
        self.inner.notify();
    }

    /// Invalidate, then load.
    pub async fn refetch(&self) -> FetchResult {
        self.invalidate();
        self.load().await
    }

    /// Current cached set, empty when nothing is cached.
    pub fn get(&self) -> Arc<PermissionSet> {
        self.inner
            .state
            .lock()
            .permissions
            .clone()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let state = self.inner.state.lock();
        CatalogSnapshot {
            permissions: state.permissions.clone().unwrap_or_default(),
            loaded: state.permissions.is_some(),
            loading: state.in_flight.is_some(),
            error: state.error.clone(),
        }
    }

    /// Last fetch failure, cleared by the next fetch.
    pub fn error(&self) -> Option<CatalogError> {
        self.inner.state.lock().error.clone()
    }

    /// Receiver bumped on every catalog change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }
}

impl std::fmt::Debug for PermissionCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PermissionCatalog")
            .field("cached", &state.permissions.as_ref().map(|p| p.len()))
            .field("in_flight", &state.in_flight.is_some())
            .field("generation", &state.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ten_permissions, FakePermissionSource};
    use std::time::Duration;

    fn initialized() -> watch::Receiver<Session> {
        watch::channel(Session {
            initialized: true,
            ..Session::default()
        })
        .1
    }

    fn catalog(source: &Arc<FakePermissionSource>) -> PermissionCatalog {
        PermissionCatalog::new(source.clone(), initialized())
    }

    #[tokio::test]
    async fn test_load_populates_cache() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let catalog = catalog(&source);

        let loaded = catalog.load().await.unwrap();

        assert_eq!(loaded.len(), 10);
        assert!(loaded.contains("Process Deposit"));
        assert_eq!(catalog.get(), loaded);
        let snapshot = catalog.snapshot();
        assert!(snapshot.loaded);
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let catalog = catalog(&source);

        let first = catalog.load().await.unwrap();
        let second = catalog.load().await.unwrap();
        let third = catalog.load().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[tokio::test]
    async fn test_cached_load_resolves_without_waiting() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let catalog = catalog(&source);
        catalog.load().await.unwrap();

        let mut load = tokio_test::task::spawn(catalog.load());
        let cached = tokio_test::assert_ready!(load.poll()).unwrap();
        assert_eq!(cached.len(), 10);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_load_pending_while_fetch_held() {
        let source = Arc::new(FakePermissionSource::held(ten_permissions()));
        let catalog = catalog(&source);

        let mut load = tokio_test::task::spawn(catalog.load());
        tokio_test::assert_pending!(load.poll());
        assert!(catalog.snapshot().loading);
        assert!(catalog.get().is_empty());
        drop(load);

        source.release();
        assert_eq!(catalog.load().await.unwrap().len(), 10);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let source = Arc::new(FakePermissionSource::held(ten_permissions()));
        let catalog = catalog(&source);

        let (a, b, c) = tokio::join!(
            catalog.load(),
            catalog.load(),
            async {
                tokio::task::yield_now().await;
                assert!(catalog.snapshot().loading);
                source.release();
                catalog.load().await
            }
        );

        assert_eq!(source.calls(), 1);
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert!(!catalog.snapshot().loading);
    }

    #[tokio::test]
    async fn test_uninitialized_session_does_not_fetch() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let (tx, rx) = watch::channel(Session::default());
        let catalog = PermissionCatalog::new(source.clone(), rx);

        assert!(catalog.load().await.unwrap().is_empty());
        assert_eq!(source.calls(), 0);

        tx.send_modify(|s| s.initialized = true);
        assert_eq!(catalog.load().await.unwrap().len(), 10);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_records_error_and_allows_retry() {
        let source = Arc::new(FakePermissionSource::failing());
        let catalog = catalog(&source);

        let err = catalog.load().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to load permissions");
        assert!(catalog.get().is_empty());
        let snapshot = catalog.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.loaded);
        assert_eq!(snapshot.error, Some(err));

        source.set_failing(false);
        source.set_permissions(ten_permissions());
        assert_eq!(catalog.load().await.unwrap().len(), 10);
        assert_eq!(source.calls(), 2);
        assert!(catalog.error().is_none());
    }

    #[tokio::test]
    async fn test_refetch_replaces_contents() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let catalog = catalog(&source);
        catalog.load().await.unwrap();

        source.set_permissions(vec![Permission::new("Close Till")]);
        let fresh = catalog.refetch().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(fresh.len(), 1);
        assert!(catalog.get().contains("Close Till"));
        assert!(!catalog.get().contains("Add Role"));
    }

    #[tokio::test]
    async fn test_invalidate_discards_in_flight_fetch() {
        let source = Arc::new(FakePermissionSource::held(ten_permissions()));
        let catalog = catalog(&source);

        let stale = tokio::spawn({
            let catalog = catalog.clone();
            async move { catalog.load().await }
        });
        while source.calls() == 0 {
            tokio::task::yield_now().await;
        }

        catalog.invalidate();
        assert!(!catalog.snapshot().loading);

        source.release();
        let stale = stale.await.unwrap().unwrap();
        assert_eq!(stale.len(), 10);
        assert!(catalog.get().is_empty());
        assert!(!catalog.snapshot().loaded);

        source.set_permissions(vec![Permission::new("Close Till")]);

        let fresh = catalog.load().await.unwrap();
        assert_eq!(source.calls(), 2);
        assert_eq!(fresh.len(), 1);
    }

    #[tokio::test]
    async fn test_dropped_caller_does_not_cancel_fetch() {
        let source = Arc::new(FakePermissionSource::held(ten_permissions()));
        let catalog = catalog(&source);

        let dropped = tokio::time::timeout(Duration::from_millis(10), catalog.load()).await;
        assert!(dropped.is_err());

        source.release();
        let mut changes = catalog.subscribe();
        while !catalog.snapshot().loaded {
            changes.changed().await.unwrap();
        }

        assert_eq!(catalog.load().await.unwrap().len(), 10);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_load() {
        let source = Arc::new(FakePermissionSource::new(ten_permissions()));
        let catalog = catalog(&source);
        let mut changes = catalog.subscribe();

        catalog.load().await.unwrap();

        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();
        catalog.invalidate();
        assert!(changes.has_changed().unwrap());
    }
}
