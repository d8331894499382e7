//! In-process backends for unit tests.

use crate::backend::{PermissionSource, SessionSource};
use crate::error::BackendError;
use crate::permission::Permission;
use crate::user::{Credentials, UserId, UserRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use teller_common_http::HttpError;
use tokio::sync::Semaphore;

pub fn user(role: &str, permissions: &[&str]) -> UserRecord {
    UserRecord {
        id: UserId::Numeric(1),
        first_name: "Ama".to_string(),
        last_name: "Mensah".to_string(),
        email: "ama@bank.test".to_string(),
        role_name: Some(role.to_string()),
        permissions: permissions.iter().copied().map(Permission::from).collect(),
    }
}

pub fn teller(permissions: &[&str]) -> UserRecord {
    user("Teller", permissions)
}

pub fn admin() -> UserRecord {
    user("Admin", &[])
}

/// Ten permission names as served by `/functions`.
pub fn ten_permissions() -> Vec<Permission> {
    [
        "Add Role",
        "Edit Role",
        "View Roles",
        "Add User",
        "Process Deposit",
        "Process Withdrawal",
        "View Accounts",
        "Add Account",
        "View Nominal Ledger",
        "Print Reports",
    ]
    .into_iter()
    .map(Permission::from)
    .collect()
}

fn unreachable_error() -> BackendError {
    BackendError::Http(HttpError::ServerError {
        status: 503,
        body: "unavailable".to_string(),
    })
}

/// Permission source that counts calls and can hold fetches open.
pub struct FakePermissionSource {
    permissions: Mutex<Vec<Permission>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl FakePermissionSource {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self {
            permissions: Mutex::new(permissions),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Fetches block until [`release`](Self::release) is called.
    pub fn held(permissions: Vec<Permission>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(permissions)
        }
    }

    pub fn failing() -> Self {
        let source = Self::new(Vec::new());
        source.set_failing(true);
        source
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    pub fn set_permissions(&self, permissions: Vec<Permission>) {
        *self.permissions.lock() = permissions;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionSource for FakePermissionSource {
    async fn fetch_permissions(&self) -> Result<Vec<Permission>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.map_err(|_| unreachable_error())?;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(unreachable_error());
        }
        Ok(self.permissions.lock().clone())
    }
}

enum ProfileReply {
    User(UserRecord),
    SignedOut,
    Unreachable,
}

/// Session source with a canned profile and one accepted password.
pub struct FakeSessionSource {
    profile: ProfileReply,
    accepted: Option<(String, UserRecord)>,
    logout_fails: bool,
}

impl FakeSessionSource {
    pub fn with_profile(user: UserRecord) -> Self {
        Self {
            profile: ProfileReply::User(user),
            accepted: None,
            logout_fails: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            profile: ProfileReply::SignedOut,
            accepted: None,
            logout_fails: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            profile: ProfileReply::Unreachable,
            accepted: None,
            logout_fails: false,
        }
    }

    pub fn accepting(mut self, password: &str, user: UserRecord) -> Self {
        self.accepted = Some((password.to_string(), user));
        self
    }

    pub fn failing_logout(mut self) -> Self {
        self.logout_fails = true;
        self
    }
}

#[async_trait]
impl SessionSource for FakeSessionSource {
    async fn fetch_profile(&self) -> Result<Option<UserRecord>, BackendError> {
        match &self.profile {
            ProfileReply::User(user) => Ok(Some(user.clone())),
            ProfileReply::SignedOut => Ok(None),
            ProfileReply::Unreachable => Err(unreachable_error()),
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<UserRecord, BackendError> {
        if matches!(self.profile, ProfileReply::Unreachable) {
            return Err(unreachable_error());
        }
        match &self.accepted {
            Some((password, user)) if *password == credentials.password => Ok(user.clone()),
            _ => Err(BackendError::Rejected {
                status: 401,
                message: "Invalid credentials".to_string(),
            }),
        }
    }

    async fn logout(&self) -> Result<(), BackendError> {
        if self.logout_fails {
            Err(unreachable_error())
        } else {
            Ok(())
        }
    }
}
