//! `teller permissions`: effective permissions of the signed-in user.

use clap::Args;
use serde::Serialize;

use crate::cli::{CommandContext, SignInArgs};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// List the user's effective permissions
#[derive(Debug, Args)]
pub struct PermissionsCommand {
    #[command(flatten)]
    pub sign_in: SignInArgs,
}

impl PermissionsCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let access = super::connect(ctx, &self.sign_in).await?;
        let ev = access.evaluator();

        if !ev.is_authenticated() {
            return Err(CliError::authentication("not signed in"));
        }

        let session = ev.session();
        let output = PermissionsOutput {
            user: session.user.as_ref().map(|u| u.display_name()),
            email: session.user.as_ref().map(|u| u.email.clone()),
            role: ev.role().map(String::from),
            admin: ev.is_admin(),
            permissions: ev
                .effective_permissions()
                .iter()
                .map(ToString::to_string)
                .collect(),
            catalog_error: ev.error(),
        };
        print_output(ctx, &output)
    }
}

#[derive(Debug, Serialize)]
pub struct PermissionsOutput {
    pub user: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub admin: bool,
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_error: Option<String>,
}

impl FormattedOutput for PermissionsOutput {
    fn format_text(&self) -> String {
        let mut lines = vec![format!(
            "{} <{}> role: {}{}",
            self.user.as_deref().unwrap_or("unknown"),
            self.email.as_deref().unwrap_or("-"),
            self.role.as_deref().unwrap_or("-"),
            if self.admin { " (admin)" } else { "" },
        )];
        if let Some(error) = &self.catalog_error {
            lines.push(format!("! {error}"));
        }
        if self.permissions.is_empty() {
            lines.push("  no permissions".to_string());
        }
        lines.extend(self.permissions.iter().map(|p| format!("  {p}")));
        lines.join("\n")
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_output() {
        let output = PermissionsOutput {
            user: Some("Ama Mensah".into()),
            email: Some("ama@bank.test".into()),
            role: Some("Admin".into()),
            admin: true,
            permissions: vec!["Add Role".into(), "View Accounts".into()],
            catalog_error: None,
        };
        assert_eq!(
            output.format_text(),
            "Ama Mensah <ama@bank.test> role: Admin (admin)\n  Add Role\n  View Accounts"
        );
    }

    #[test]
    fn test_empty_permissions() {
        let output = PermissionsOutput {
            user: Some("Kofi Boateng".into()),
            email: None,
            role: Some("Teller".into()),
            admin: false,
            permissions: vec![],
            catalog_error: Some("Failed to load permissions".into()),
        };
        let text = output.format_text();
        assert!(text.contains("! Failed to load permissions"));
        assert!(text.contains("no permissions"));
    }
}
