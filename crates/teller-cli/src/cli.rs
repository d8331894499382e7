//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use teller_common_config::{validate, ConfigError, ConfigLoader, TellerConfig};
use url::Url;

use crate::commands::{CatalogCommand, CheckCommand, ConfigCommand, PermissionsCommand};
use crate::error::CliError;

/// Teller - access checks for the back office
///
/// Signs in against the back-office API and answers which screens and
/// permissions the user holds.
#[derive(Debug, Parser)]
#[command(
    name = "teller",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TELLER_CONFIG_PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Back-office API base URL, overriding the config file
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub api_url: Option<Url>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decide whether the user may open a screen
    Check(CheckCommand),

    /// List the user's effective permissions
    #[command(visible_alias = "perms")]
    Permissions(PermissionsCommand),

    /// List every permission the backend knows
    Catalog(CatalogCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command writes the config file rather than reading it.
    pub fn creates_config(&self) -> bool {
        matches!(self, Self::Config(cmd) if cmd.is_init())
    }
}

/// Credentials for a non-interactive sign in.
///
/// Without them the existing session (cookie or API token) is used.
#[derive(Debug, Clone, Default, Args)]
pub struct SignInArgs {
    /// Account email
    #[arg(long, env = "TELLER_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "TELLER_PASSWORD", hide_env_values = true, requires = "email")]
    pub password: Option<String>,
}

impl SignInArgs {
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Shared state handed to every command.
#[derive(Debug)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub config: TellerConfig,
    pub config_path: PathBuf,
}

impl Cli {
    fn loader(&self) -> Result<ConfigLoader, CliError> {
        match &self.config {
            Some(path) => Ok(ConfigLoader::from_file(path)),
            None => {
                let cwd = std::env::current_dir()
                    .map_err(|e| CliError::io("cannot determine working directory", e))?;
                Ok(ConfigLoader::new(cwd))
            }
        }
    }

    /// Load configuration and apply command line overrides.
    pub fn load_config(&self) -> Result<CommandContext, CliError> {
        let loader = self.loader()?;
        let mut config = match loader.load() {
            Err(ConfigError::NotFound { .. }) if self.command.creates_config() => TellerConfig::default(),
            other => other?,
        };

        if let Some(url) = &self.api_url {
            config.api.base_url = url.as_str().trim_end_matches('/').to_string();
            validate(&config)?;
        }

        Ok(CommandContext {
            format: self.format,
            config,
            config_path: loader.path().to_path_buf(),
        })
    }

    /// Run the selected subcommand.
    pub async fn execute(self, ctx: CommandContext) -> Result<(), CliError> {
        match self.command {
            Command::Check(cmd) => cmd.execute(&ctx).await,
            Command::Permissions(cmd) => cmd.execute(&ctx).await,
            Command::Catalog(cmd) => cmd.execute(&ctx).await,
            Command::Config(cmd) => cmd.execute(&ctx),
        }
    }
}
