//! User declaration domain model.
//!
//! A declaration is the only entity binding a real end-user to a role:
//! without one, no capability ever resolves. Declarations are created by
//! explicit administrative action — there is no self-registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binds an external user to a specific registered group within a tenant.
///
/// `tenant_id` is a denormalized copy of the group's tenant so ledger
/// lookups stay tenant-scoped without an extra join. Identity is the
/// `(user_id, group_id, tenant_id)` triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeclaration {
    pub id: Uuid,
    /// External Telegram user identifier.
    pub user_id: String,
    /// Display name only — never used as identity.
    pub username: String,
    pub group_id: Uuid,
    pub tenant_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to declare a user into a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeclaration {
    pub user_id: String,
    pub username: String,
    pub group_id: Uuid,
    pub tenant_id: Uuid,
}

/// Fields that can be updated on an existing declaration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateDeclaration {
    pub username: Option<String>,
}

/// Optional filters for tenant-wide ledger listings.
#[derive(Debug, Clone, Default)]
pub struct DeclarationFilter {
    pub group_id: Option<Uuid>,
    pub user_id: Option<String>,
}
