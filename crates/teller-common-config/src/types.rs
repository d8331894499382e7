//! Configuration types.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TellerConfig {
    /// Back-office API connection.
    pub api: ApiConfig,
    /// Access-control policy knobs.
    pub access: AccessConfig,
    /// Logging defaults.
    pub log: LogSection,
}

/// Back-office REST API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,
    /// Optional bearer token sent with every request.
    pub token: Option<String>,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Endpoint paths.
    pub endpoints: EndpointsConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// Endpoint paths, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Permission catalog (`GET`).
    pub functions: String,
    /// Current user profile (`GET`).
    pub user_profile: String,
    /// Sign in (`POST`).
    pub login: String,
    /// Sign out (`POST`).
    pub logout: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            functions: "/functions".to_string(),
            user_profile: "/user-profile".to_string(),
            login: "/login".to_string(),
            logout: "/logout".to_string(),
        }
    }
}

impl EndpointsConfig {
    /// All paths with their field names.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("functions", self.functions.as_str()),
            ("user_profile", self.user_profile.as_str()),
            ("login", self.login.as_str()),
            ("logout", self.logout.as_str()),
        ]
    }
}

/// Access-control settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Role name treated as administrator. Compared exactly.
    pub admin_role: String,
    /// Whether the administrator role passes every gate regardless of the
    /// required permissions. Off by default, so a permission missing from
    /// the catalog denies the administrator too.
    pub admin_override: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_role: "Admin".to_string(),
            admin_override: false,
        }
    }
}

/// Logging defaults; environment variables take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format (`pretty`, `compact`, `json`).
    pub format: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
