//! Static default-grant policy table.
//!
//! Consulted only when the first group of a type is registered in a
//! tenant, to seed the template store. Once real grants exist for a
//! `(tenant, type)` pair this table is never read again.

use crate::models::group::GroupType;

/// Default capability names seeded for each group type.
pub fn default_grants_for(group_type: GroupType) -> &'static [&'static str] {
    match group_type {
        GroupType::Admin => &[
            "general_access",
            "system_logs",
            "helpdesk_ticket",
            "system_notification",
            "user_management",
            "group_management",
            "system_config",
        ],
        GroupType::Customer => &["general_access", "helpdesk_ticket", "view_own_tickets"],
        GroupType::Supplier => &[
            "general_access",
            "helpdesk_ticket",
            "view_own_tickets",
            "supplier_dashboard",
        ],
    }
}

/// Human-readable description attached to seeded grants.
pub fn default_grant_description(group_type: GroupType) -> String {
    format!("Default permission for {} group", group_type.as_str())
}
