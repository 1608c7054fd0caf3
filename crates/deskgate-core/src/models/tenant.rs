//! Tenant domain model.
//!
//! A tenant is an isolated helpdesk deployment ("system"). Every group,
//! permission grant and user declaration is scoped to exactly one tenant,
//! and no query may cross that boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An isolated customer deployment owning its own groups, grants and
/// declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Per-tenant override for the external log/transaction search
    /// endpoint. Consumed only by downstream search features, never by
    /// the permission path.
    pub search_backend_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    /// Explicit id, used by seed tooling. A collision fails with
    /// `AlreadyExists`; when `None` a fresh id is generated.
    pub id: Option<Uuid>,
    pub name: String,
    pub search_backend_url: Option<String>,
}

/// Fields that can be updated on an existing tenant.
///
/// The outer `Option` on `search_backend_url` distinguishes "leave as is"
/// (`None`) from "set or clear" (`Some(inner)`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub search_backend_url: Option<Option<String>>,
}
