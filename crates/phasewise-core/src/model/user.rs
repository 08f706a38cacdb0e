use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ParseEnumError;

/// Workspace roles. Reviewer slots on phases are keyed by these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "designer")]
    Designer,
    #[serde(rename = "product-manager-1")]
    ProductManager1,
    #[serde(rename = "product-manager-2")]
    ProductManager2,
    #[serde(rename = "product-manager-3")]
    ProductManager3,
    #[serde(rename = "sponsor")]
    Sponsor,
    #[serde(rename = "operator-1")]
    Operator1,
    #[serde(rename = "operator-2")]
    Operator2,
    #[serde(rename = "operator-3")]
    Operator3,
}

impl UserRole {
    pub const ALL: [Self; 9] = [
        Self::Admin,
        Self::Designer,
        Self::ProductManager1,
        Self::ProductManager2,
        Self::ProductManager3,
        Self::Sponsor,
        Self::Operator1,
        Self::Operator2,
        Self::Operator3,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Designer => "designer",
            Self::ProductManager1 => "product-manager-1",
            Self::ProductManager2 => "product-manager-2",
            Self::ProductManager3 => "product-manager-3",
            Self::Sponsor => "sponsor",
            Self::Operator1 => "operator-1",
            Self::Operator2 => "operator-2",
            Self::Operator3 => "operator-3",
        }
    }

    /// Roles that can hold a reviewer slot on a phase: everyone but admin.
    #[must_use]
    pub const fn can_review(self) -> bool {
        !matches!(self, Self::Admin)
    }

    /// Roles allowed to change the timeline of any project.
    #[must_use]
    pub const fn can_edit_timeline(self) -> bool {
        matches!(
            self,
            Self::Admin
                | Self::ProductManager1
                | Self::ProductManager2
                | Self::ProductManager3
                | Self::Sponsor
        )
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| ParseEnumError {
                expected: "user role",
                got: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub department: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_wire_names() {
        for role in UserRole::ALL {
            assert_eq!(role.as_str().parse::<UserRole>(), Ok(role));
        }
        assert!("manager".parse::<UserRole>().is_err());
    }

    #[test]
    fn serde_names_match_as_str() {
        for role in UserRole::ALL {
            let json = serde_json::to_string(&role).expect("serialize");
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn only_managers_and_sponsors_edit_timeline() {
        assert!(UserRole::ProductManager2.can_edit_timeline());
        assert!(UserRole::Sponsor.can_edit_timeline());
        assert!(!UserRole::Designer.can_edit_timeline());
        assert!(!UserRole::Operator1.can_edit_timeline());
    }
}
