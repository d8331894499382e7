//! Error types for access control.

use teller_common_http::{HttpError, ResponseError};
use thiserror::Error;

/// Message recorded when the permission catalog cannot be fetched.
pub const CATALOG_LOAD_FAILED: &str = "Failed to load permissions";

/// Errors raised while talking to the back office.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("malformed response: {0}")]
    Decode(#[from] ResponseError),

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

impl BackendError {
    /// HTTP status attached to the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            Self::Decode(ResponseError::Parse { status, .. }) => Some(*status),
            Self::Decode(ResponseError::Read(_)) => None,
            Self::Rejected { status, .. } => Some(*status),
        }
    }

    /// Whether the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Catalog fetch failure.
///
/// Cloneable because a single failure is handed to every caller attached to
/// the same in-flight fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Failed to load permissions")]
    Fetch { detail: String },
}

impl CatalogError {
    pub(crate) fn fetch(error: &BackendError) -> Self {
        Self::Fetch {
            detail: error.to_string(),
        }
    }

    /// Underlying cause, for logs and diagnostics.
    pub fn detail(&self) -> &str {
        match self {
            Self::Fetch { detail } => detail,
        }
    }
}

/// Session operation failure.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend refused the credentials.
    #[error("{0}")]
    Login(String),

    #[error("session request failed: {0}")]
    Backend(#[from] BackendError),
}

impl SessionError {
    /// Message suitable for the session's `error` field.
    pub fn user_message(&self) -> String {
        match self {
            Self::Login(message) => message.clone(),
            Self::Backend(BackendError::Rejected { message, .. }) => message.clone(),
            Self::Backend(e) => e.to_string(),
        }
    }
}
