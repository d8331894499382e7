//! Access control facade for the view layer.
//!
//! [`AccessControl`] owns the session store and the permission catalog and
//! enforces their ordering: the catalog is fetched only after the session
//! check settles. Failures never escape as errors here; they surface as the
//! `error` flags on the session and on [`AccessEvaluator`].

use crate::backend::{HttpBackend, PermissionSource, SessionSource};
use crate::catalog::PermissionCatalog;
use crate::error::SessionError;
use crate::evaluator::{AccessEvaluator, AccessSettings};
use crate::gate::{AccessPolicy, GateState, GateView, GatedScreen, Screen};
use crate::session::{Session, SessionStore};
use crate::user::UserRecord;
use std::sync::Arc;
use teller_common_config::TellerConfig;
use teller_common_http::HttpError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Session plus catalog, wired together.
pub struct AccessControl {
    session: SessionStore,
    catalog: PermissionCatalog,
    settings: AccessSettings,
}

impl AccessControl {
    pub fn new(
        sessions: Arc<dyn SessionSource>,
        permissions: Arc<dyn PermissionSource>,
        settings: AccessSettings,
    ) -> Self {
        let session = SessionStore::new(sessions);
        let catalog = PermissionCatalog::new(permissions, session.subscribe());
        Self {
            session,
            catalog,
            settings,
        }
    }

    /// Build over the REST backend described by `config`.
    pub fn from_config(config: &TellerConfig) -> Result<Self, HttpError> {
        let backend = Arc::new(HttpBackend::from_config(&config.api)?);
        Ok(Self::new(
            backend.clone(),
            backend,
            AccessSettings::from(&config.access),
        ))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &AccessSettings {
        &self.settings
    }

    /// Check the session, then load the catalog.
    pub async fn bootstrap(&self) -> AccessEvaluator {
        self.session.check().await;
        self.load_catalog().await;
        self.evaluator()
    }

    /// Sign in, then load the catalog if it is not cached yet.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, SessionError> {
        let user = self.session.login(email, password).await?;
        self.load_catalog().await;
        Ok(user)
    }

    /// Sign out. The catalog is not user specific and stays cached.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.session.logout().await
    }

    async fn load_catalog(&self) {
        load_or_log(&self.catalog).await;
    }

    /// Snapshot of the current session and catalog.
    pub fn evaluator(&self) -> AccessEvaluator {
        AccessEvaluator::new(
            self.session.snapshot(),
            self.catalog.snapshot(),
            self.settings.clone(),
        )
    }

    /// Invalidate and reload the catalog.
    pub async fn refetch(&self) -> AccessEvaluator {
        self.catalog.invalidate();
        self.load_catalog().await;
        self.evaluator()
    }

    /// Resolve a gated screen against the current state.
    pub fn gate<S, P>(&self, screen: &GatedScreen<S>, props: P) -> GateView<S::Output>
    where
        S: Screen<P>,
    {
        screen.render(&self.evaluator(), props)
    }

    /// Notifier for session and catalog changes.
    pub fn changes(&self) -> AccessChanges {
        AccessChanges {
            session: self.session.subscribe(),
            catalog: self.catalog.subscribe(),
        }
    }

    /// Wait until `policy` leaves [`GateState::Checking`].
    ///
    /// Returns `Checking` only if the session store goes away first.
    pub async fn wait_settled(&self, policy: &AccessPolicy) -> GateState {
        let mut changes = self.changes();
        loop {
            changes.mark_seen();
            let state = policy.decide(&self.evaluator());
            if state.is_settled() || !changes.changed().await {
                return state;
            }
        }
    }

    /// Load the catalog whenever the session becomes initialized.
    ///
    /// Covers session transitions driven outside [`bootstrap`](Self::bootstrap)
    /// and [`login`](Self::login). The task ends when this facade is dropped.
    pub fn spawn_catalog_loader(&self) -> JoinHandle<()> {
        let catalog = self.catalog.clone();
        let mut session = self.session.subscribe();
        tokio::spawn(async move {
            loop {
                let initialized = session.borrow_and_update().initialized;
                if initialized && !catalog.snapshot().loaded {
                    load_or_log(&catalog).await;
                }
                if session.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

/// Load the catalog. A failure is already recorded on the catalog, so it is
/// only logged here.
async fn load_or_log(catalog: &PermissionCatalog) {
    if let Err(e) = catalog.load().await {
        debug!(detail = e.detail(), "catalog unavailable; permission checks deny");
    }
}

/// Combined change feed of the session and the catalog.
pub struct AccessChanges {
    session: watch::Receiver<Session>,
    catalog: watch::Receiver<u64>,
}

impl AccessChanges {
    /// Treat the current values as seen.
    pub fn mark_seen(&mut self) {
        self.session.borrow_and_update();
        self.catalog.borrow_and_update();
    }

    /// Wait for the next change. False once both sources are gone.
    pub async fn changed(&mut self) -> bool {
        tokio::select! {
            r = self.session.changed() => r.is_ok() || self.catalog.changed().await.is_ok(),
            r = self.catalog.changed() => r.is_ok() || self.session.changed().await.is_ok(),
        }
    }
}
