//! Group self-registration workflow.
//!
//! Registering the first group of a type in a tenant seeds the
//! permission template store from the static default table; later
//! groups of the same type share those grants and trigger no reseed.

use deskgate_core::defaults::{default_grant_description, default_grants_for};
use deskgate_core::models::grant::CreateGrant;
use deskgate_core::models::group::{CreateGroup, Group, GroupType};
use deskgate_core::repository::{GrantRepository, GroupRepository, TenantRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Registration entry-point payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterGroup {
    pub tenant_id: Uuid,
    pub chat_id: String,
    pub group_name: String,
    /// Wire form of the group type (`"ADMIN"`, `"CUSTOMER"`,
    /// `"SUPPLIER"`); parsed and validated here.
    pub group_type: String,
    pub chat_title: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u32>,
}

/// Registers groups and seeds their default grants.
pub struct RegistrationService<T, G, P>
where
    T: TenantRepository,
    G: GroupRepository,
    P: GrantRepository,
{
    tenants: T,
    groups: G,
    grants: P,
}

impl<T, G, P> RegistrationService<T, G, P>
where
    T: TenantRepository,
    G: GroupRepository,
    P: GrantRepository,
{
    pub fn new(tenants: T, groups: G, grants: P) -> Self {
        Self {
            tenants,
            groups,
            grants,
        }
    }

    /// Register a group, idempotently seeding default grants for its
    /// type.
    ///
    /// The chat id is checked globally: a chat registered under *any*
    /// tenant fails with [`EngineError::DuplicateChat`] reporting the
    /// existing registration. Group row and seed grants persist in one
    /// transaction.
    pub async fn register(&self, input: RegisterGroup) -> EngineResult<Group> {
        // 1. Group type is a closed enum.
        let group_type: GroupType = input
            .group_type
            .parse()
            .map_err(|_| EngineError::InvalidGroupType(input.group_type.clone()))?;

        // 2. The owning tenant must exist.
        self.tenants
            .get_by_id(input.tenant_id)
            .await
            .map_err(|e| match e {
                e if e.is_not_found() => EngineError::UnknownTenant(input.tenant_id.to_string()),
                e => EngineError::Store(e),
            })?;

        // 3. Global duplicate check — even a registration under another
        //    tenant blocks this one, and the caller learns who owns it.
        match self.groups.find_by_chat(&input.chat_id).await {
            Ok(existing) => {
                return Err(EngineError::DuplicateChat {
                    chat_id: input.chat_id,
                    tenant_id: existing.tenant_id,
                    group_name: existing.name,
                    group_type: existing.group_type,
                    is_active: existing.is_active,
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(EngineError::Store(e)),
        }

        // 4. Seed defaults only when the (tenant, type) template is
        //    still empty; grants are shared across groups of the type.
        let existing_names = self.grants.names(input.tenant_id, group_type).await?;
        let seed = if existing_names.is_empty() {
            default_grants_for(group_type)
                .iter()
                .map(|name| CreateGrant {
                    tenant_id: input.tenant_id,
                    group_type,
                    name: (*name).to_string(),
                    description: default_grant_description(group_type),
                })
                .collect()
        } else {
            Vec::new()
        };
        let seeded = seed.len();

        // 5. Transactional create.
        let group = self
            .groups
            .register(
                CreateGroup {
                    tenant_id: input.tenant_id,
                    chat_id: input.chat_id,
                    group_type,
                    name: input.group_name,
                    chat_title: input.chat_title,
                    description: input.description,
                    member_count: input.member_count,
                },
                seed,
            )
            .await?;

        info!(
            tenant_id = %group.tenant_id,
            chat_id = %group.chat_id,
            group_type = %group.group_type,
            seeded_grants = seeded,
            "registered telegram group"
        );

        Ok(group)
    }

    /// Soft-delete a group, keeping declarations and grants intact.
    pub async fn deactivate(&self, tenant_id: Uuid, group_id: Uuid) -> EngineResult<()> {
        self.groups.deactivate(tenant_id, group_id).await?;
        info!(%tenant_id, %group_id, "deactivated telegram group");
        Ok(())
    }

    /// Hard-delete a group. Refused while declarations still reference
    /// it.
    pub async fn hard_delete(&self, tenant_id: Uuid, group_id: Uuid) -> EngineResult<()> {
        self.groups.hard_delete(tenant_id, group_id).await?;
        info!(%tenant_id, %group_id, "hard-deleted telegram group");
        Ok(())
    }
}
