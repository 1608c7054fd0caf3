//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation; the only
//! deliberate exception is [`GroupRepository::find_by_chat`], which is
//! global because an external chat id can belong to at most one tenant
//! and is the canonical way to discover the owner.

use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    declaration::{CreateDeclaration, DeclarationFilter, UpdateDeclaration, UserDeclaration},
    grant::{CreateGrant, PermissionGrant},
    group::{CreateGroup, Group, GroupType, UpdateGroup},
    tenant::{CreateTenant, Tenant, UpdateTenant},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenant registry (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    fn create(&self, input: CreateTenant) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = CoreResult<Tenant>> + Send;
    /// Plain row delete. The dependent-records guard lives in the tenant
    /// service, which collects counts first.
    fn delete(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Group directory (tenant-scoped, chat ids globally unique)
// ---------------------------------------------------------------------------

pub trait GroupRepository: Send + Sync {
    /// Create the group row and the seed grants in a single transaction:
    /// either both persist or neither does. `seed` is empty when grants
    /// for the `(tenant, type)` pair already exist.
    fn register(
        &self,
        input: CreateGroup,
        seed: Vec<CreateGrant>,
    ) -> impl Future<Output = CoreResult<Group>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreResult<Group>> + Send;

    /// Global chat lookup — ignores the caller's tenant and includes
    /// inactive rows. Used for owner discovery and the duplicate-chat
    /// guard; resolution never trusts a caller-supplied tenant over the
    /// owner recorded here.
    fn find_by_chat(&self, chat_id: &str) -> impl Future<Output = CoreResult<Group>> + Send;

    /// Stage-2 resolution lookup: the chat must be registered to *this*
    /// tenant and still active.
    fn find_active_in_tenant(
        &self,
        tenant_id: Uuid,
        chat_id: &str,
    ) -> impl Future<Output = CoreResult<Group>> + Send;

    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateGroup,
    ) -> impl Future<Output = CoreResult<Group>> + Send;

    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        group_type: Option<GroupType>,
        include_inactive: bool,
    ) -> impl Future<Output = CoreResult<Vec<Group>>> + Send;

    /// Soft delete: flips `is_active` to false, leaving declarations and
    /// grants untouched.
    fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;

    /// Hard delete. Fails with `HasDependents` while any declaration
    /// still references the group.
    fn hard_delete(&self, tenant_id: Uuid, id: Uuid)
    -> impl Future<Output = CoreResult<()>> + Send;

    fn count_by_tenant(&self, tenant_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Permission template store (tenant-scoped, keyed by group type)
// ---------------------------------------------------------------------------

pub trait GrantRepository: Send + Sync {
    /// Idempotent upsert on `(tenant_id, group_type, name)`; last write
    /// wins on the description.
    fn upsert(&self, input: CreateGrant)
    -> impl Future<Output = CoreResult<PermissionGrant>> + Send;

    /// Remove every grant for the `(tenant, type)` pair; returns the
    /// number removed. Used by template-wide replace.
    fn revoke_all(
        &self,
        tenant_id: Uuid,
        group_type: GroupType,
    ) -> impl Future<Output = CoreResult<u64>> + Send;

    fn list(
        &self,
        tenant_id: Uuid,
        group_type: Option<GroupType>,
    ) -> impl Future<Output = CoreResult<Vec<PermissionGrant>>> + Send;

    /// Capability names only — the resolution pipeline needs nothing
    /// heavier.
    fn names(
        &self,
        tenant_id: Uuid,
        group_type: GroupType,
    ) -> impl Future<Output = CoreResult<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// User declaration ledger (tenant-scoped)
// ---------------------------------------------------------------------------

pub trait DeclarationRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the `(user_id, group_id,
    /// tenant_id)` triple is taken.
    fn create(
        &self,
        input: CreateDeclaration,
    ) -> impl Future<Output = CoreResult<UserDeclaration>> + Send;

    fn find(
        &self,
        user_id: &str,
        group_id: Uuid,
        tenant_id: Uuid,
    ) -> impl Future<Output = CoreResult<UserDeclaration>> + Send;

    fn get_by_id(
        &self,
        tenant_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = CoreResult<UserDeclaration>> + Send;

    fn list_by_group(
        &self,
        tenant_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<UserDeclaration>>> + Send;

    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: DeclarationFilter,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<UserDeclaration>>> + Send;

    fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDeclaration,
    ) -> impl Future<Output = CoreResult<UserDeclaration>> + Send;

    fn delete(&self, tenant_id: Uuid, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;

    fn count_by_group(
        &self,
        tenant_id: Uuid,
        group_id: Uuid,
    ) -> impl Future<Output = CoreResult<u64>> + Send;

    fn count_by_tenant(&self, tenant_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
}
