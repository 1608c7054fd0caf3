//! Permission verdict — the derived result of one resolution run.
//!
//! A verdict is a pure function of the four stored entities at query
//! time. It is never persisted and never cached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::group::{Group, GroupType};

/// Why a check was denied. Every denial carries enough structured
/// context for an administrator to remediate; none of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    UnknownTenant,
    UnregisteredGroup,
    UndeclaredUser,
    MissingCapability,
}

/// Diagnostic snapshot of the resolved group, surfaced on both granted
/// and denied verdicts once stage 2 has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupInfo {
    pub id: Uuid,
    pub name: String,
    pub group_type: GroupType,
    pub description: Option<String>,
    pub chat_title: Option<String>,
    pub member_count: Option<u32>,
}

impl From<&Group> for GroupInfo {
    fn from(group: &Group) -> Self {
        GroupInfo {
            id: group.id,
            name: group.name.clone(),
            group_type: group.group_type,
            description: group.description.clone(),
            chat_title: group.chat_title.clone(),
            member_count: group.member_count,
        }
    }
}

/// Pre-filled registration fields for an unregistered chat, produced by
/// the detection heuristic. Advisory only: a suggestion never satisfies
/// a resolution stage and never grants a capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedGroup {
    pub chat_id: String,
    pub name: String,
    pub group_type: GroupType,
    pub chat_title: Option<String>,
    pub description: String,
}

/// The structured result of running the resolution pipeline once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionVerdict {
    pub is_tenant_valid: bool,
    pub is_group_registered: bool,
    pub is_user_declared: bool,
    pub has_permission: bool,
    /// Lowercase role string (`"admin"`, `"customer"`, `"supplier"`)
    /// once a group has resolved.
    pub resolved_role: Option<String>,
    /// Full grant set for the resolved group type — callers commonly
    /// need the list alongside the single-capability answer.
    pub declared_permissions: Vec<String>,
    pub requested_permission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_info: Option<GroupInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_group: Option<SuggestedGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial: Option<Denial>,
}

impl PermissionVerdict {
    /// Baseline verdict with every stage unresolved; the resolver fills
    /// stages in as the pipeline advances.
    pub fn denied_at_start(requested_permission: impl Into<String>, denial: Denial) -> Self {
        PermissionVerdict {
            is_tenant_valid: false,
            is_group_registered: false,
            is_user_declared: false,
            has_permission: false,
            resolved_role: None,
            declared_permissions: Vec::new(),
            requested_permission: requested_permission.into(),
            group_info: None,
            suggested_group: None,
            denial: Some(denial),
        }
    }
}
