//! `teller check`: evaluate an access policy for the signed-in user.

use clap::Args;
use serde::Serialize;
use teller_access::{with_permissions, AccessPolicy, GateState, GateView};

use crate::cli::{CommandContext, SignInArgs};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// Decide whether the user may open a screen
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Required permission; repeat for several
    #[arg(short = 'p', long = "require", value_name = "PERMISSION")]
    pub require: Vec<String>,

    /// Require every permission instead of any one
    #[arg(long)]
    pub all: bool,

    /// Screen name recorded in the audit log
    #[arg(long)]
    pub screen: Option<String>,

    #[command(flatten)]
    pub sign_in: SignInArgs,
}

impl CheckCommand {
    fn policy(&self) -> AccessPolicy {
        if self.all {
            AccessPolicy::all(self.require.iter().map(String::as_str))
        } else {
            AccessPolicy::any(self.require.iter().map(String::as_str))
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let access = super::connect(ctx, &self.sign_in).await?;
        let policy = self.policy();
        access.wait_settled(&policy).await;

        let mut screen = with_permissions(|(): ()| (), policy);
        if let Some(name) = &self.screen {
            screen = screen.named(name.as_str());
        }
        let view = access.gate(&screen, ());
        let ev = access.evaluator();

        let output = CheckOutput {
            decision: view.state(),
            role: ev.role().map(String::from),
            admin: ev.is_admin(),
            required: self.require.clone(),
            require_all: self.all,
            missing: self
                .require
                .iter()
                .filter(|p| !ev.has_permission(p))
                .cloned()
                .collect(),
        };
        print_output(ctx, &output)?;

        match view {
            GateView::Granted(()) => Ok(()),
            GateView::AuthenticationRequired => Err(CliError::authentication("not signed in")),
            GateView::PermissionDenied(_) => Err(CliError::access_denied("access denied")),
            GateView::Loading => Err(CliError::network(
                "permission state never settled",
                anyhow::anyhow!("session or catalog still loading"),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub decision: GateState,
    pub role: Option<String>,
    pub admin: bool,
    pub required: Vec<String>,
    pub require_all: bool,
    pub missing: Vec<String>,
}

impl FormattedOutput for CheckOutput {
    fn format_text(&self) -> String {
        let verdict = match self.decision {
            GateState::Granted => "✓ granted",
            GateState::DeniedNoAccess => "✗ denied",
            GateState::DeniedUnauthenticated => "✗ not signed in",
            GateState::Checking => "… checking",
        };
        let mut lines = vec![format!(
            "{verdict} (role: {})",
            self.role.as_deref().unwrap_or("-")
        )];
        if !self.required.is_empty() {
            let mode = if self.require_all { "all of" } else { "any of" };
            lines.push(format!("  requires {mode}: {}", self.required.join(", ")));
        }
        if self.decision == GateState::DeniedNoAccess && !self.missing.is_empty() {
            lines.push(format!("  missing: {}", self.missing.join(", ")));
        }
        lines.join("\n")
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
