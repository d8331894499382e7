//! `teller config`: create and inspect the configuration file.

use clap::{Args, Subcommand};
use serde::Serialize;
use teller_common_config::{ConfigLoader, TellerConfig};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, StatusOutput};

/// Manage configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl ConfigCommand {
    pub fn is_init(&self) -> bool {
        matches!(self.action, ConfigAction::Init { .. })
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match self.action {
            ConfigAction::Init { force } => init(ctx, force),
            ConfigAction::Show => print_output(ctx, &ConfigOutput::redacted(&ctx.config)),
        }
    }
}

fn init(ctx: &CommandContext, force: bool) -> Result<(), CliError> {
    let path = &ctx.config_path;
    if path.exists() && !force {
        return Err(CliError::config_with_hint(
            format!("{} already exists", path.display()),
            "pass --force to overwrite it",
        ));
    }

    ConfigLoader::from_file(path).save(&TellerConfig::default())?;
    print_output(
        ctx,
        &StatusOutput::success(format!("wrote {}", path.display())),
    )
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    config: TellerConfig,
}

impl ConfigOutput {
    fn redacted(config: &TellerConfig) -> Self {
        let mut config = config.clone();
        if config.api.token.is_some() {
            config.api.token = Some("********".to_string());
        }
        Self { config }
    }
}

impl FormattedOutput for ConfigOutput {
    fn format_text(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_else(|e| format!("# {e}"))
    }

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.config)
    }
}
