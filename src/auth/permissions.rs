//! Permission levels for route authorization

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission levels, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum PermissionLevel {
    /// Anonymous visitor - browsing only
    #[default]
    Public = 0,
    /// Signed-in user - submit, vote, discuss
    Authenticated = 1,
    /// Moderator - approve submissions and ads, refresh statistics
    Admin = 2,
}

impl PermissionLevel {
    /// Whether this level grants at least `required`
    pub fn allows(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionLevel::Public => write!(f, "PUBLIC"),
            PermissionLevel::Authenticated => write!(f, "AUTHENTICATED"),
            PermissionLevel::Admin => write!(f, "ADMIN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(PermissionLevel::Admin.allows(PermissionLevel::Authenticated));
        assert!(PermissionLevel::Authenticated.allows(PermissionLevel::Authenticated));
        assert!(!PermissionLevel::Public.allows(PermissionLevel::Authenticated));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&PermissionLevel::Admin).unwrap();
        assert_eq!(json, "\"ADMIN\"");
        let level: PermissionLevel = serde_json::from_str("\"AUTHENTICATED\"").unwrap();
        assert_eq!(level, PermissionLevel::Authenticated);
    }
}
