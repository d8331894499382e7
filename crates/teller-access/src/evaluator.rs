//! Permission queries over a session and catalog snapshot.

use crate::catalog::CatalogSnapshot;
use crate::permission::PermissionSet;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use teller_common_config::AccessConfig;

static NO_PERMISSIONS: PermissionSet = PermissionSet::new();

/// Role and gate behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSettings {
    /// Role whose effective permissions are the whole catalog.
    pub admin_role: String,
    /// Whether the gate grants the admin role without consulting policy.
    /// When off, the admin role is held to the catalog like any query.
    pub admin_override: bool,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            admin_role: "Admin".to_string(),
            admin_override: false,
        }
    }
}

impl From<&AccessConfig> for AccessSettings {
    fn from(config: &AccessConfig) -> Self {
        Self {
            admin_role: config.admin_role.clone(),
            admin_override: config.admin_override,
        }
    }
}

/// Immutable view answering permission queries.
///
/// Every query denies until the session is initialized and no catalog fetch
/// is in flight.
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    session: Session,
    catalog: CatalogSnapshot,
    settings: AccessSettings,
}

impl AccessEvaluator {
    pub fn new(session: Session, catalog: CatalogSnapshot, settings: AccessSettings) -> Self {
        Self {
            session,
            catalog,
            settings,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn settings(&self) -> &AccessSettings {
        &self.settings
    }

    pub fn is_loaded(&self) -> bool {
        self.session.initialized && !self.catalog.loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated
    }

    /// Exact, case-sensitive comparison with the admin role.
    pub fn is_admin(&self) -> bool {
        self.session.role() == Some(self.settings.admin_role.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.session.role()
    }

    /// Whole catalog for admins, assigned permissions otherwise. Empty until
    /// loaded.
    pub fn effective_permissions(&self) -> &PermissionSet {
        if !self.is_loaded() {
            &NO_PERMISSIONS
        } else if self.is_admin() {
            &self.catalog.permissions
        } else {
            &self.session.permissions
        }
    }

    /// Loaded, not admin, and nothing effective.
    pub fn is_empty(&self) -> bool {
        self.is_loaded() && !self.is_admin() && self.effective_permissions().is_empty()
    }

    /// Admins hold what the catalog lists; everyone else what they were
    /// assigned.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.is_loaded() && self.effective_permissions().contains(permission)
    }

    /// False for an empty list.
    pub fn has_any_permission<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.is_loaded()
            && permissions
                .into_iter()
                .any(|p| self.has_permission(p.as_ref()))
    }

    /// True for an empty list once loaded.
    pub fn has_all_permissions<I>(&self, permissions: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.is_loaded()
            && permissions
                .into_iter()
                .all(|p| self.has_permission(p.as_ref()))
    }

    /// A catalog fetch is in flight.
    pub fn loading(&self) -> bool {
        self.catalog.loading
    }

    /// Catalog error message, if the last fetch failed.
    pub fn error(&self) -> Option<String> {
        self.catalog.error.as_ref().map(ToString::to_string)
    }
}
