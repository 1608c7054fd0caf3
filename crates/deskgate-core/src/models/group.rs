//! Telegram group domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// The coarse role a registered group plays within its tenant.
///
/// Permission grants are keyed by this type, not by individual group —
/// every group of the same type within a tenant shares one grant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupType {
    Admin,
    Customer,
    Supplier,
}

impl GroupType {
    pub const ALL: [GroupType; 3] = [GroupType::Admin, GroupType::Customer, GroupType::Supplier];

    /// Wire form used in storage and external payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::Admin => "ADMIN",
            GroupType::Customer => "CUSTOMER",
            GroupType::Supplier => "SUPPLIER",
        }
    }

    /// Lowercase role string surfaced in verdicts (`"admin"`, …).
    pub fn role_name(&self) -> &'static str {
        match self {
            GroupType::Admin => "admin",
            GroupType::Customer => "customer",
            GroupType::Supplier => "supplier",
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupType {
    type Err = CoreError;

    /// Accepts the wire form case-insensitively; anything else is a
    /// validation error (the enum is closed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(GroupType::Admin),
            "CUSTOMER" => Ok(GroupType::Customer),
            "SUPPLIER" => Ok(GroupType::Supplier),
            other => Err(CoreError::Validation {
                message: format!(
                    "invalid group type '{other}', expected one of ADMIN, CUSTOMER, SUPPLIER"
                ),
            }),
        }
    }
}

/// A registered external chat bound to exactly one tenant and one role
/// type.
///
/// `chat_id` is unique across the whole store, not just within the owning
/// tenant: an external chat can only ever belong to one tenant, and
/// lookups join through it to discover the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// External Telegram chat identifier (e.g. `"-1001234567890"`).
    pub chat_id: String,
    pub group_type: GroupType,
    /// Display name shown in admin tooling.
    pub name: String,
    /// Chat title as reported by Telegram, if known.
    pub chat_title: Option<String>,
    pub description: Option<String>,
    /// Soft-delete flag. Deactivated groups keep their declarations and
    /// grants but no longer resolve.
    pub is_active: bool,
    pub member_count: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub tenant_id: Uuid,
    pub chat_id: String,
    pub group_type: GroupType,
    pub name: String,
    pub chat_title: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u32>,
}

/// Fields that can be updated on an existing group.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub chat_title: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_type_round_trips_through_str() {
        for gt in GroupType::ALL {
            assert_eq!(gt.as_str().parse::<GroupType>().unwrap(), gt);
        }
    }

    #[test]
    fn group_type_parse_is_case_insensitive() {
        assert_eq!("customer".parse::<GroupType>().unwrap(), GroupType::Customer);
        assert_eq!("Supplier".parse::<GroupType>().unwrap(), GroupType::Supplier);
    }

    #[test]
    fn unknown_group_type_is_rejected() {
        assert!("AGENT".parse::<GroupType>().is_err());
        assert!("".parse::<GroupType>().is_err());
    }
}
