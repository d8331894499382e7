//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::TellerConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Config file location relative to the project directory.
pub const CONFIG_FILE: &str = ".teller/config.yaml";

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is a valid regex")
    })
}

/// Configuration loader.
pub struct ConfigLoader {
    config_path: PathBuf,
    required: bool,
}

impl ConfigLoader {
    /// Create a loader for `.teller/config.yaml` under the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_dir.as_ref().join(CONFIG_FILE),
            required: false,
        }
    }

    /// Create a loader for an explicit file; a missing file is an error.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            required: true,
        }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration, falling back to defaults when the project has no
    /// config file, then apply environment overrides and validate.
    pub fn load(&self) -> Result<TellerConfig, ConfigError> {
        let mut config = if self.config_path.exists() {
            let contents = std::fs::read_to_string(&self.config_path)?;
            self.parse(&contents)?
        } else if self.required {
            return Err(ConfigError::NotFound {
                path: self.config_path.clone(),
            });
        } else {
            TellerConfig::default()
        };

        apply_env_overrides(&mut config);
        validate(&config)?;
        Ok(config)
    }

    fn parse(&self, contents: &str) -> Result<TellerConfig, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Save configuration to file.
    pub fn save(&self, config: &TellerConfig) -> Result<(), ConfigError> {
        if let Some(dir) = self.config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&self.config_path, yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

fn apply_env_overrides(config: &mut TellerConfig) {
    if let Some(base_url) = Environment::get(vars::TELLER_API_BASE_URL) {
        config.api.base_url = base_url;
    }
    if let Some(token) = Environment::get(vars::TELLER_API_TOKEN) {
        config.api.token = Some(token);
    }
}

/// Validate configuration values.
pub fn validate(config: &TellerConfig) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError {
            message: "api.base_url must not be empty".to_string(),
        });
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError {
            message: format!("api.base_url must use http or https: {base_url}"),
        });
    }

    if config.api.connect_timeout_secs == 0 || config.api.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            message: "api timeouts must be greater than 0".to_string(),
        });
    }

    for (name, path) in config.api.endpoints.entries() {
        if !path.starts_with('/') {
            return Err(ConfigError::ValidationError {
                message: format!("api.endpoints.{name} must start with '/': {path}"),
            });
        }
    }

    if config.access.admin_role.is_empty() {
        return Err(ConfigError::ValidationError {
            message: "access.admin_role must not be empty".to_string(),
        });
    }

    Ok(())
}
