//! Permission grant domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::group::GroupType;

/// A named capability granted to a group type within a tenant.
///
/// Identity is the `(tenant_id, group_type, name)` triple — this is a
/// template keyed by *type*, shared by every group of that type in the
/// tenant. The description is informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub group_type: GroupType,
    /// Capability string, e.g. `"system_logs"`.
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to grant a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrant {
    pub tenant_id: Uuid,
    pub group_type: GroupType,
    pub name: String,
    pub description: String,
}
