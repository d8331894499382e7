//! Access decision audit logging.

use crate::evaluator::AccessEvaluator;
use crate::gate::{AccessPolicy, GateState};
use chrono::{DateTime, Utc};
use tracing::info;

/// Outcome of a gate decision for one screen.
#[derive(Debug)]
pub struct AccessAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub role: Option<String>,
    pub screen: Option<String>,
    pub required: Vec<String>,
    pub require_all: bool,
    pub granted: bool,
    pub reason: Option<&'static str>,
}

impl AccessAuditEvent {
    pub fn new(
        evaluator: &AccessEvaluator,
        policy: &AccessPolicy,
        screen: Option<&str>,
        state: GateState,
    ) -> Self {
        let reason = match state {
            GateState::Granted if evaluator.is_admin() && evaluator.settings().admin_override => {
                Some("admin")
            }
            GateState::DeniedUnauthenticated => Some("unauthenticated"),
            GateState::DeniedNoAccess => Some("missing_permissions"),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            user_id: evaluator.session().user_id(),
            role: evaluator.role().map(String::from),
            screen: screen.map(String::from),
            required: policy
                .required_permissions
                .iter()
                .map(ToString::to_string)
                .collect(),
            require_all: policy.require_all,
            granted: state == GateState::Granted,
            reason,
        }
    }

    pub fn log(&self) {
        if self.granted {
            info!(
                event = "access_granted",
                user_id = ?self.user_id,
                role = ?self.role,
                screen = ?self.screen,
                reason = ?self.reason,
                "Access granted"
            );
        } else {
            info!(
                event = "access_denied",
                user_id = ?self.user_id,
                role = ?self.role,
                screen = ?self.screen,
                required = ?self.required,
                require_all = self.require_all,
                reason = ?self.reason,
                "Access denied"
            );
        }
    }
}

/// Log a settled gate decision. `Checking` is not a decision and is skipped.
pub fn log_access(
    evaluator: &AccessEvaluator,
    policy: &AccessPolicy,
    screen: Option<&str>,
    state: GateState,
) {
    if state == GateState::Checking {
        return;
    }
    AccessAuditEvent::new(evaluator, policy, screen, state).log();
}
