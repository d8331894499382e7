//! User records returned by the back office.

use crate::permission::Permission;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Backend user identifier; numeric on most deployments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// User profile as served by `/user-profile` and `/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permissions: Vec<Permission>,
}

impl UserRecord {
    /// "First Last", trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Permission>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Permission>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Sign-in body for `POST /login`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_record() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": 7,
            "first_name": "Ama",
            "last_name": "Mensah",
            "email": "ama@bank.test",
            "role_name": "Teller",
            "permissions": ["Process Deposit"],
            "branch": "Accra Central"
        }))
        .unwrap();

        assert_eq!(user.id, UserId::Numeric(7));
        assert_eq!(user.role_name.as_deref(), Some("Teller"));
        assert_eq!(user.permissions, vec![Permission::new("Process Deposit")]);
        assert_eq!(user.display_name(), "Ama Mensah");
    }

    #[test]
    fn test_null_fields_default() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "u-1",
            "role_name": null,
            "permissions": null
        }))
        .unwrap();

        assert_eq!(user.id.to_string(), "u-1");
        assert!(user.role_name.is_none());
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("ama@bank.test", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("ama@bank.test"));
        assert!(!rendered.contains("hunter2"));
    }
}
