//! Back office collaborators.
//!
//! The catalog and the session store only see these traits, so both can be
//! driven by in-process fakes in tests.

mod http;

pub use http::HttpBackend;

use crate::error::BackendError;
use crate::permission::Permission;
use crate::user::{Credentials, UserRecord};
use async_trait::async_trait;

/// Source of the global permission catalog.
#[async_trait]
pub trait PermissionSource: Send + Sync {
    /// Every permission name the backend knows, in backend order.
    async fn fetch_permissions(&self) -> Result<Vec<Permission>, BackendError>;
}

/// Source of the signed-in user's profile.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Current profile, `None` when nobody is signed in.
    async fn fetch_profile(&self) -> Result<Option<UserRecord>, BackendError>;

    /// Sign in; on refusal the error carries the backend's message.
    async fn login(&self, credentials: &Credentials) -> Result<UserRecord, BackendError>;

    /// End the server-side session.
    async fn logout(&self) -> Result<(), BackendError>;
}
