//! `teller catalog`: every permission name the backend knows.

use clap::Args;
use serde::Serialize;

use crate::cli::{CommandContext, SignInArgs};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput};

/// List every permission the backend knows
#[derive(Debug, Args)]
pub struct CatalogCommand {
    /// Only names containing this text (case-insensitive)
    #[arg(long)]
    pub filter: Option<String>,

    #[command(flatten)]
    pub sign_in: SignInArgs,
}

impl CatalogCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let access = super::connect(ctx, &self.sign_in).await?;

        let permissions = access
            .catalog()
            .load()
            .await
            .map_err(|e| CliError::network(e.to_string(), anyhow::anyhow!("{}", e.detail())))?;

        let needle = self.filter.as_deref().map(str::to_lowercase);
        let output = CatalogOutput {
            permissions: permissions
                .iter()
                .map(ToString::to_string)
                .filter(|name| {
                    needle
                        .as_deref()
                        .map_or(true, |n| name.to_lowercase().contains(n))
                })
                .collect(),
        };
        print_output(ctx, &output)
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogOutput {
    pub permissions: Vec<String>,
}

impl FormattedOutput for CatalogOutput {
    fn format_text(&self) -> String {
        let mut text = self.permissions.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!("{} permission(s)", self.permissions.len()));
        text
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
