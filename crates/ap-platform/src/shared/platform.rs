//! Platform Discriminator
//!
//! Tenant/application-surface discriminator partitioning roles, permission
//! modules, groups, and special roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Application surface a role or permission module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    None,
    Superadmin,
    Stores,
    Customer,
}

impl Default for Platform {
    fn default() -> Self {
        Self::None
    }
}

impl Platform {
    /// Wire representation, as stored and filtered in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Superadmin => "SUPERADMIN",
            Self::Stores => "STORES",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "SUPERADMIN" => Ok(Self::Superadmin),
            "STORES" => Ok(Self::Stores),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(format!(
                "Invalid platform '{}', acceptable values: SUPERADMIN, STORES, CUSTOMER, NONE",
                other
            )),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_round_trip() {
        for p in [Platform::None, Platform::Superadmin, Platform::Stores, Platform::Customer] {
            assert_eq!(Platform::from_str(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Platform::from_str("stores").unwrap(), Platform::Stores);
        assert!(Platform::from_str("WAREHOUSE").is_err());
    }

    #[test]
    fn test_serde_wire_format() {
        let json = serde_json::to_string(&Platform::Superadmin).unwrap();
        assert_eq!(json, "\"SUPERADMIN\"");
    }
}
