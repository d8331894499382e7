//! Declarative access gate for protected screens.
//!
//! [`with_permissions`] pairs a screen with an [`AccessPolicy`]. Rendering
//! the resulting [`GatedScreen`] yields either the screen's own output or
//! one of the standard placeholder views:
//!
//! ```
//! use teller_access::{with_permissions, AccessPolicy};
//!
//! let deposits = with_permissions(
//!     |props: &str| format!("deposit form for {props}"),
//!     AccessPolicy::any(["Process Deposit", "Process Withdrawal"]),
//! )
//! .named("cashier/deposit");
//!
//! assert_eq!(deposits.name(), Some("cashier/deposit"));
//! ```

use crate::audit::log_access;
use crate::evaluator::AccessEvaluator;
use crate::permission::Permission;
use serde::{Deserialize, Serialize};

/// Permissions a screen requires.
///
/// An empty list admits any authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub required_permissions: Vec<Permission>,
    /// Every permission (true) or at least one (false).
    #[serde(default)]
    pub require_all: bool,
}

impl AccessPolicy {
    /// Grant when any one of `permissions` is held.
    pub fn any<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            required_permissions: permissions.into_iter().map(Into::into).collect(),
            require_all: false,
        }
    }

    /// Grant only when every one of `permissions` is held.
    pub fn all<I, P>(permissions: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Permission>,
    {
        Self {
            required_permissions: permissions.into_iter().map(Into::into).collect(),
            require_all: true,
        }
    }

    /// Any signed-in user.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Pure decision for the current session and catalog.
    pub fn decide(&self, evaluator: &AccessEvaluator) -> GateState {
        if !evaluator.session().initialized || !evaluator.is_loaded() {
            GateState::Checking
        } else if !evaluator.is_authenticated() {
            GateState::DeniedUnauthenticated
        } else if self.grants(evaluator) {
            GateState::Granted
        } else {
            GateState::DeniedNoAccess
        }
    }

    fn grants(&self, evaluator: &AccessEvaluator) -> bool {
        if evaluator.settings().admin_override && evaluator.is_admin() {
            return true;
        }
        if self.required_permissions.is_empty() {
            return true;
        }
        if self.require_all {
            evaluator.has_all_permissions(&self.required_permissions)
        } else {
            evaluator.has_any_permission(&self.required_permissions)
        }
    }
}

/// Gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Checking,
    DeniedUnauthenticated,
    DeniedNoAccess,
    Granted,
}

impl GateState {
    /// Anything but `Checking`.
    pub fn is_settled(self) -> bool {
        self != Self::Checking
    }
}

/// Diagnostics shown on the "access denied" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDenial {
    pub required: Vec<Permission>,
    pub require_all: bool,
    pub effective: Vec<Permission>,
    pub role: Option<String>,
}

/// What a gated screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView<O> {
    /// Session or catalog still settling.
    Loading,
    /// Signed out; sign in to continue.
    AuthenticationRequired,
    PermissionDenied(AccessDenial),
    /// The wrapped screen's output.
    Granted(O),
}

impl<O> GateView<O> {
    pub fn state(&self) -> GateState {
        match self {
            Self::Loading => GateState::Checking,
            Self::AuthenticationRequired => GateState::DeniedUnauthenticated,
            Self::PermissionDenied(_) => GateState::DeniedNoAccess,
            Self::Granted(_) => GateState::Granted,
        }
    }

    pub fn granted(self) -> Option<O> {
        match self {
            Self::Granted(output) => Some(output),
            _ => None,
        }
    }
}

/// Something that renders from props.
pub trait Screen<P> {
    type Output;

    fn render(&self, props: P) -> Self::Output;
}

impl<F, P, O> Screen<P> for F
where
    F: Fn(P) -> O,
{
    type Output = O;

    fn render(&self, props: P) -> O {
        self(props)
    }
}

/// A screen behind an access policy.
#[derive(Debug, Clone)]
pub struct GatedScreen<S> {
    screen: S,
    policy: AccessPolicy,
    name: Option<String>,
}

/// Wrap `screen` so it renders only when `policy` grants access.
pub fn with_permissions<S>(screen: S, policy: AccessPolicy) -> GatedScreen<S> {
    GatedScreen {
        screen,
        policy,
        name: None,
    }
}

impl<S> GatedScreen<S> {
    /// Label used in audit events.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn decide(&self, evaluator: &AccessEvaluator) -> GateState {
        self.policy.decide(evaluator)
    }

    /// Render the wrapped screen with `props` untouched, or the view for
    /// the denial. Settled decisions are written to the audit log.
    pub fn render<P>(&self, evaluator: &AccessEvaluator, props: P) -> GateView<S::Output>
    where
        S: Screen<P>,
    {
        let state = self.decide(evaluator);
        log_access(evaluator, &self.policy, self.name(), state);

        match state {
            GateState::Checking => GateView::Loading,
            GateState::DeniedUnauthenticated => GateView::AuthenticationRequired,
            GateState::DeniedNoAccess => GateView::PermissionDenied(AccessDenial {
                required: self.policy.required_permissions.clone(),
                require_all: self.policy.require_all,
                effective: evaluator.effective_permissions().iter().cloned().collect(),
                role: evaluator.role().map(String::from),
            }),
            GateState::Granted => GateView::Granted(self.screen.render(props)),
        }
    }
}
