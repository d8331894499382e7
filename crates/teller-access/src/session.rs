//! Authentication session.

use crate::backend::SessionSource;
use crate::error::{BackendError, SessionError};
use crate::permission::PermissionSet;
use crate::user::{Credentials, UserRecord};
use std::sync::Arc;
use teller_common_log::spans::{record_error, session_span};
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};

/// The authenticated actor as the gate sees it.
///
/// Starts empty. `initialized` flips once the first profile check settles,
/// whatever its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<UserRecord>,
    /// Assigned permissions, deduplicated.
    pub permissions: PermissionSet,
    pub initialized: bool,
    pub authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    fn signed_in(user: UserRecord) -> Self {
        Self {
            permissions: user.permissions.iter().cloned().collect(),
            user: Some(user),
            initialized: true,
            authenticated: true,
            loading: false,
            error: None,
        }
    }

    fn signed_out(error: Option<String>) -> Self {
        Self {
            initialized: true,
            error,
            ..Self::default()
        }
    }

    /// Role name of the signed-in user.
    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.role_name.as_deref())
    }

    /// Identifier of the signed-in user, rendered as a string.
    pub fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.id.to_string())
    }
}

/// Owns the session and publishes every change on a watch channel.
pub struct SessionStore {
    source: Arc<dyn SessionSource>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    pub fn new(source: Arc<dyn SessionSource>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { source, state }
    }

    /// Bootstrap from `/user-profile`.
    ///
    /// A 401 is the ordinary signed-out outcome. Transport failures record
    /// an error but still mark the session initialized so gates can settle.
    pub async fn check(&self) -> Session {
        self.state.send_modify(|s| s.loading = true);

        let span = session_span("check");
        let outcome = self.source.fetch_profile().instrument(span.clone()).await;
        let _entered = span.enter();

        let next = match outcome {
            Ok(Some(user)) => {
                info!(user_id = %user.id, role = ?user.role_name, "session restored");
                Session::signed_in(user)
            }
            Ok(None) => {
                debug!("no signed-in user");
                Session::signed_out(None)
            }
            Err(e) => {
                record_error(&e);
                warn!(error = %e, "profile check failed");
                Session::signed_out(Some(SessionError::from(e).user_message()))
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    /// Sign in. On refusal the session stays signed out and carries the
    /// backend's message.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserRecord, SessionError> {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        let credentials = Credentials::new(email, password);
        let span = session_span("login");
        let outcome = self.source.login(&credentials).instrument(span.clone()).await;
        let _entered = span.enter();

        match outcome {
            Ok(user) => {
                info!(user_id = %user.id, role = ?user.role_name, "signed in");
                self.state.send_replace(Session::signed_in(user.clone()));
                Ok(user)
            }
            Err(e) => {
                record_error(&e);
                let error = match e {
                    BackendError::Rejected { message, .. } => SessionError::Login(message),
                    other => SessionError::Backend(other),
                };
                warn!(error = %error, "sign in failed");
                self.state
                    .send_replace(Session::signed_out(Some(error.user_message())));
                Err(error)
            }
        }
    }

    /// Sign out. The local session is cleared even when the request fails.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let span = session_span("logout");
        let outcome = self.source.logout().instrument(span.clone()).await;
        let _entered = span.enter();

        self.state.send_replace(Session::signed_out(None));
        match outcome {
            Ok(()) => {
                info!("signed out");
                Ok(())
            }
            Err(e) => {
                record_error(&e);
                warn!(error = %e, "logout request failed; local session cleared");
                Err(e.into())
            }
        }
    }

    /// Current session.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Last session error message.
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }
}
