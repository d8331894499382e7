//! Teller access control.
//!
//! Client-side permission gate for the Teller back office. It decides, per
//! protected screen, whether the signed-in user may render it.
//!
//! # Architecture
//!
//! - **Session**: the authenticated actor, owned by [`SessionStore`]
//! - **Catalog**: every permission name the backend knows, fetched once and
//!   shared through [`PermissionCatalog`]
//! - **Evaluator**: a pure snapshot of session and catalog answering
//!   permission queries ([`AccessEvaluator`])
//! - **Gate**: [`with_permissions`] wraps a screen with an [`AccessPolicy`]
//! - **Control**: [`AccessControl`] wires the pieces together for the view
//!   layer
//!
//! The backend is reached through the [`PermissionSource`] and
//! [`SessionSource`] traits; [`HttpBackend`] implements both over the REST
//! API.

#![warn(clippy::all)]

pub mod audit;
pub mod backend;
pub mod catalog;
pub mod control;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod permission;
pub mod session;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{HttpBackend, PermissionSource, SessionSource};
pub use catalog::{CatalogSnapshot, PermissionCatalog};
pub use control::AccessControl;
pub use error::{BackendError, CatalogError, SessionError};
pub use evaluator::{AccessEvaluator, AccessSettings};
pub use gate::{with_permissions, AccessDenial, AccessPolicy, GateState, GateView, GatedScreen, Screen};
pub use permission::{Permission, PermissionSet};
pub use session::{Session, SessionStore};
pub use user::{Credentials, UserId, UserRecord};
