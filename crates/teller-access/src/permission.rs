//! Permission names.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// A named capability such as `"Process Deposit"`.
///
/// Wraps the exact string the backend uses. Equality is byte-for-byte: no
/// case folding or whitespace trimming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Create a permission from its backend name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The backend name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Set of permission names.
pub type PermissionSet = BTreeSet<Permission>;

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self(name)
    }
}
