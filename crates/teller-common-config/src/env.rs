//! Environment variable handling.

use std::env;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Configuration overrides
    pub const TELLER_API_BASE_URL: &str = "TELLER_API_BASE_URL";
    pub const TELLER_API_TOKEN: &str = "TELLER_API_TOKEN";

    // Development
    pub const TELLER_ENV: &str = "TELLER_ENV";
}

/// Environment configuration.
pub struct Environment {
    _guard: (),
}

impl Environment {
    /// Initialize environment from .env files.
    pub fn init() -> Result<Self, EnvError> {
        // Later files override earlier ones.
        load_optional(".env")?;
        load_optional(".env.local")?;

        if let Ok(env) = env::var(vars::TELLER_ENV) {
            load_optional(&format!(".env.{}", env))?;
        }

        Ok(Self { _guard: () })
    }

    /// Get an optional, non-empty string variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}

/// Load a dotenv file if it exists. A missing file is not an error.
fn load_optional(path: &str) -> Result<(), EnvError> {
    match dotenvy::from_filename(path) {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
