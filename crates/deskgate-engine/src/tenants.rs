//! Tenant registry service.

use deskgate_core::error::{CoreError, DependentCount};
use deskgate_core::models::tenant::{CreateTenant, Tenant, UpdateTenant};
use deskgate_core::repository::{
    DeclarationRepository, GroupRepository, PaginatedResult, Pagination, TenantRepository,
};
use tracing::info;
use uuid::Uuid;

use crate::backend::BackendUrlCache;
use crate::error::{EngineError, EngineResult};

/// Administrative tenant operations.
///
/// Owns the backend-URL cache invalidation hook: an update that touches
/// `search_backend_url` drops the tenant's cached entries before the
/// updated row is returned.
pub struct TenantService<'a, T, G, D>
where
    T: TenantRepository,
    G: GroupRepository,
    D: DeclarationRepository,
{
    tenants: T,
    groups: G,
    declarations: D,
    backend_cache: &'a BackendUrlCache,
}

impl<'a, T, G, D> TenantService<'a, T, G, D>
where
    T: TenantRepository,
    G: GroupRepository,
    D: DeclarationRepository,
{
    pub fn new(tenants: T, groups: G, declarations: D, backend_cache: &'a BackendUrlCache) -> Self {
        Self {
            tenants,
            groups,
            declarations,
            backend_cache,
        }
    }

    pub async fn create(&self, input: CreateTenant) -> EngineResult<Tenant> {
        let tenant = self.tenants.create(input).await?;
        info!(tenant_id = %tenant.id, name = %tenant.name, "created tenant");
        Ok(tenant)
    }

    pub async fn get(&self, id: Uuid) -> EngineResult<Tenant> {
        Ok(self.tenants.get_by_id(id).await?)
    }

    pub async fn list(&self, pagination: Pagination) -> EngineResult<PaginatedResult<Tenant>> {
        Ok(self.tenants.list(pagination).await?)
    }

    /// Update a tenant, synchronously invalidating cached backend URLs
    /// when the URL changes.
    pub async fn update(&self, id: Uuid, input: UpdateTenant) -> EngineResult<Tenant> {
        let url_changed = input.search_backend_url.is_some();
        let tenant = self.tenants.update(id, input).await?;
        if url_changed {
            self.backend_cache.invalidate_tenant(id);
        }
        Ok(tenant)
    }

    /// Delete a tenant. Refused with `HasDependents` — reporting
    /// per-entity counts — while any group or declaration still
    /// references it.
    pub async fn delete(&self, id: Uuid) -> EngineResult<()> {
        // Existence first, so an unknown id is NotFound rather than a
        // zero-dependent delete of nothing.
        self.tenants.get_by_id(id).await?;

        let group_count = self.groups.count_by_tenant(id).await?;
        let declaration_count = self.declarations.count_by_tenant(id).await?;

        let mut dependents = Vec::new();
        if group_count > 0 {
            dependents.push(DependentCount {
                entity: "telegram_group",
                count: group_count,
            });
        }
        if declaration_count > 0 {
            dependents.push(DependentCount {
                entity: "user_declaration",
                count: declaration_count,
            });
        }
        if !dependents.is_empty() {
            return Err(EngineError::Store(CoreError::HasDependents {
                entity: "tenant".into(),
                id: id.to_string(),
                dependents,
            }));
        }

        self.tenants.delete(id).await?;
        self.backend_cache.invalidate_tenant(id);
        info!(tenant_id = %id, "deleted tenant");
        Ok(())
    }
}
