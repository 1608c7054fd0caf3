//! Permission template service.
//!
//! Grants are keyed by `(tenant, group type)` — editing the permission
//! list "of a group" through admin tooling replaces the template for
//! the whole type, not one group. `replace` makes that explicit.

use deskgate_core::models::grant::{CreateGrant, PermissionGrant};
use deskgate_core::models::group::GroupType;
use deskgate_core::repository::GrantRepository;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;

/// One entry of a template replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantEntry {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Maintains the per-tenant, per-type permission templates.
pub struct TemplateService<P: GrantRepository> {
    grants: P,
}

impl<P: GrantRepository> TemplateService<P> {
    pub fn new(grants: P) -> Self {
        Self { grants }
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        group_type: Option<GroupType>,
    ) -> EngineResult<Vec<PermissionGrant>> {
        Ok(self.grants.list(tenant_id, group_type).await?)
    }

    /// Idempotent single-capability grant; last write wins on the
    /// description.
    pub async fn grant(
        &self,
        tenant_id: Uuid,
        group_type: GroupType,
        name: String,
        description: String,
    ) -> EngineResult<PermissionGrant> {
        Ok(self
            .grants
            .upsert(CreateGrant {
                tenant_id,
                group_type,
                name,
                description,
            })
            .await?)
    }

    /// Replace the entire grant set for `(tenant, type)`.
    ///
    /// Every group of the type is affected at once — callers editing
    /// "one group's" permissions are editing the shared template.
    pub async fn replace(
        &self,
        tenant_id: Uuid,
        group_type: GroupType,
        entries: Vec<GrantEntry>,
    ) -> EngineResult<Vec<PermissionGrant>> {
        let revoked = self.grants.revoke_all(tenant_id, group_type).await?;

        let mut replaced = Vec::with_capacity(entries.len());
        for entry in entries {
            let grant = self
                .grants
                .upsert(CreateGrant {
                    tenant_id,
                    group_type,
                    name: entry.name,
                    description: entry.description,
                })
                .await?;
            replaced.push(grant);
        }

        info!(
            %tenant_id,
            group_type = %group_type,
            revoked,
            granted = replaced.len(),
            "replaced permission template"
        );

        Ok(replaced)
    }

    /// Remove every grant for `(tenant, type)`; returns the count
    /// removed.
    pub async fn revoke_all(&self, tenant_id: Uuid, group_type: GroupType) -> EngineResult<u64> {
        let revoked = self.grants.revoke_all(tenant_id, group_type).await?;
        info!(%tenant_id, group_type = %group_type, revoked, "revoked permission template");
        Ok(revoked)
    }
}
