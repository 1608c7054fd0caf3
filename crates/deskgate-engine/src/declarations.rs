//! User declaration ledger service.
//!
//! Declarations are the authorization anchor: no declaration, no
//! resolvable role. Creation is an explicit administrative action and
//! both references are validated before the row is written.

use deskgate_core::models::declaration::{
    CreateDeclaration, DeclarationFilter, UpdateDeclaration, UserDeclaration,
};
use deskgate_core::repository::{
    DeclarationRepository, GroupRepository, PaginatedResult, Pagination, TenantRepository,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Declaration entry-point payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclareUser {
    pub user_id: String,
    pub username: String,
    pub group_id: Uuid,
    pub tenant_id: Uuid,
}

/// Maintains the user declaration ledger.
pub struct DeclarationService<T, G, D>
where
    T: TenantRepository,
    G: GroupRepository,
    D: DeclarationRepository,
{
    tenants: T,
    groups: G,
    declarations: D,
}

impl<T, G, D> DeclarationService<T, G, D>
where
    T: TenantRepository,
    G: GroupRepository,
    D: DeclarationRepository,
{
    pub fn new(tenants: T, groups: G, declarations: D) -> Self {
        Self {
            tenants,
            groups,
            declarations,
        }
    }

    /// Declare a user into a group.
    ///
    /// The tenant and the group must both resolve — and the group must
    /// belong to that tenant — before the row is written. A duplicate
    /// `(user, group, tenant)` triple fails with `AlreadyDeclared` and
    /// leaves the ledger unchanged.
    pub async fn declare(&self, input: DeclareUser) -> EngineResult<UserDeclaration> {
        // 1. References must resolve.
        self.tenants
            .get_by_id(input.tenant_id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => EngineError::UnknownTenant(input.tenant_id.to_string()),
                e => EngineError::Store(e),
            })?;

        // Tenant-scoped group lookup: a group owned by another tenant is
        // an unknown group here.
        self.groups
            .get_by_id(input.tenant_id, input.group_id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => EngineError::UnknownGroup(input.group_id),
                e => EngineError::Store(e),
            })?;

        // 2. Unique triple.
        let declaration = self
            .declarations
            .create(CreateDeclaration {
                user_id: input.user_id.clone(),
                username: input.username,
                group_id: input.group_id,
                tenant_id: input.tenant_id,
            })
            .await
            .map_err(|e| match e {
                deskgate_core::error::CoreError::AlreadyExists { .. } => {
                    EngineError::AlreadyDeclared {
                        user_id: input.user_id,
                        group_id: input.group_id,
                    }
                }
                e => EngineError::Store(e),
            })?;

        info!(
            tenant_id = %declaration.tenant_id,
            group_id = %declaration.group_id,
            user_id = %declaration.user_id,
            "declared user into group"
        );

        Ok(declaration)
    }

    pub async fn list_by_group(
        &self,
        tenant_id: Uuid,
        group_id: Uuid,
    ) -> EngineResult<Vec<UserDeclaration>> {
        Ok(self.declarations.list_by_group(tenant_id, group_id).await?)
    }

    pub async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: DeclarationFilter,
        pagination: Pagination,
    ) -> EngineResult<PaginatedResult<UserDeclaration>> {
        Ok(self
            .declarations
            .list_by_tenant(tenant_id, filter, pagination)
            .await?)
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDeclaration,
    ) -> EngineResult<UserDeclaration> {
        Ok(self.declarations.update(tenant_id, id, input).await?)
    }

    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> EngineResult<()> {
        self.declarations.delete(tenant_id, id).await?;
        info!(%tenant_id, declaration_id = %id, "deleted user declaration");
        Ok(())
    }
}
