//! CLI error handling.

use std::process::ExitCode;

use teller_common_config::ConfigError;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxError>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    Authentication { message: String },

    #[error("{message}")]
    AccessDenied { message: String },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Network { .. } => "E003",
            Self::Authentication { .. } => "E004",
            Self::AccessDenied { .. } => "E005",
            Self::Other(_) => "E999",
        }
    }

    /// Numeric process status for this error
    pub fn status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Network { .. } => 4,
            Self::Authentication { .. } => 6,
            Self::AccessDenied { .. } => 7,
            Self::Other(_) => 1,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::Authentication { .. } => Some("pass --email/--password or set TELLER_EMAIL and TELLER_PASSWORD"),
            _ => None,
        }
    }

    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        let hint = match &e {
            ConfigError::NotFound { .. } => Some("run `teller config init` to create one".to_string()),
            ConfigError::EnvVarNotFound { var } => Some(format!("export {var} or give it a default with ${{{var}:-value}}")),
            _ => None,
        };
        Self::Config {
            message: e.to_string(),
            source: Some(Box::new(e)),
            hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            CliError::config_with_hint("bad", "fix it"),
            CliError::io("disk", std::io::Error::other("full")),
            CliError::network("down", std::io::Error::other("refused")),
            CliError::authentication("who"),
            CliError::access_denied("no"),
            CliError::Other(anyhow::anyhow!("boom")),
        ];
        let mut codes: Vec<_> = errors.iter().map(CliError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_config_error_hint() {
        let err = CliError::from(ConfigError::NotFound {
            path: PathBuf::from("/nowhere/config.yaml"),
        });
        assert!(err.to_string().contains("/nowhere/config.yaml"));
        assert_eq!(err.hint(), Some("run `teller config init` to create one"));
        assert_eq!(err.status(), 2);
    }

    #[test]
    fn test_access_denied_exit_code() {
        assert_eq!(CliError::access_denied("no").status(), 7);
    }
}
