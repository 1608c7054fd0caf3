//! Permission resolution engine.
//!
//! One entry point, [`PermissionResolver::check`], runs the strict
//! four-stage pipeline: tenant → group → declaration → capability.
//! Each stage either advances or produces a terminal verdict; no stage
//! is ever skipped and nothing about a verdict is cached.

use deskgate_core::detect::suggest_group;
use deskgate_core::error::CoreResult;
use deskgate_core::models::verdict::{Denial, GroupInfo, PermissionVerdict};
use deskgate_core::repository::{
    DeclarationRepository, GrantRepository, GroupRepository, TenantRepository,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

/// A single permission check. All fields are required; the engine
/// rejects the request outright when any is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub tenant_id: String,
    pub chat_id: String,
    pub user_id: String,
    pub username: String,
    pub permission_name: String,
    /// Chat title as reported by the relay, if it has one. Only feeds
    /// the registration suggestion for unregistered chats.
    #[serde(default)]
    pub chat_title: Option<String>,
}

impl CheckRequest {
    fn validate(&self) -> EngineResult<()> {
        let mut missing = Vec::new();
        if self.tenant_id.is_empty() {
            missing.push("tenantId");
        }
        if self.chat_id.is_empty() {
            missing.push("chatId");
        }
        if self.user_id.is_empty() {
            missing.push("userId");
        }
        if self.username.is_empty() {
            missing.push("username");
        }
        if self.permission_name.is_empty() {
            missing.push("permissionName");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidRequest(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// The resolution engine.
///
/// Generic over repository implementations so the engine has no
/// dependency on the database crate. Stateless per request — the only
/// process-wide state in this crate is the backend URL cache, which is
/// deliberately not reachable from here.
pub struct PermissionResolver<T, G, P, D>
where
    T: TenantRepository,
    G: GroupRepository,
    P: GrantRepository,
    D: DeclarationRepository,
{
    tenants: T,
    groups: G,
    grants: P,
    declarations: D,
    config: EngineConfig,
}

impl<T, G, P, D> PermissionResolver<T, G, P, D>
where
    T: TenantRepository,
    G: GroupRepository,
    P: GrantRepository,
    D: DeclarationRepository,
{
    pub fn new(tenants: T, groups: G, grants: P, declarations: D, config: EngineConfig) -> Self {
        Self {
            tenants,
            groups,
            grants,
            declarations,
            config,
        }
    }

    /// Run one store lookup with the configured timeout.
    ///
    /// `Ok(None)` means the row was cleanly absent — a denial, not a
    /// fault. Infrastructure failures are logged here with the stage
    /// name and propagated as errors.
    async fn lookup<V>(
        &self,
        stage: &'static str,
        fut: impl Future<Output = CoreResult<V>>,
    ) -> EngineResult<Option<V>> {
        match tokio::time::timeout(self.config.lookup_timeout, fut).await {
            Err(_) => {
                error!(stage, "resolution lookup timed out");
                Err(EngineError::ResolutionTimeout { stage })
            }
            Ok(Err(e)) if e.is_not_found() => Ok(None),
            Ok(Err(e)) => {
                error!(stage, error = %e, "resolution lookup failed");
                Err(EngineError::Store(e))
            }
            Ok(Ok(value)) => Ok(Some(value)),
        }
    }

    /// Resolve one permission check to a verdict.
    ///
    /// Returns `Err` only for malformed requests and infrastructure
    /// faults; every authorization outcome — granted or denied — is an
    /// `Ok` verdict with a structured reason.
    pub async fn check(&self, req: CheckRequest) -> EngineResult<PermissionVerdict> {
        req.validate()?;

        let mut verdict =
            PermissionVerdict::denied_at_start(&req.permission_name, Denial::UnknownTenant);

        // An unparseable tenant id cannot name a tenant; same terminal
        // verdict as an unknown one, and later stages never run.
        let Ok(tenant_id) = Uuid::parse_str(&req.tenant_id) else {
            warn!(
                tenant_id = %req.tenant_id,
                chat_id = %req.chat_id,
                "permission check against malformed tenant id"
            );
            return Ok(verdict);
        };

        // 1. Tenant must exist.
        if self
            .lookup("tenant", self.tenants.get_by_id(tenant_id))
            .await?
            .is_none()
        {
            info!(
                tenant_id = %tenant_id,
                chat_id = %req.chat_id,
                user_id = %req.user_id,
                capability = %req.permission_name,
                "denied: unknown tenant"
            );
            return Ok(verdict);
        }
        verdict.is_tenant_valid = true;

        // 2. Chat must be registered to *this* tenant and active. The
        //    lookup is tenant-scoped, so a chat owned by another tenant
        //    is indistinguishable from an unregistered one here.
        let group = match self
            .lookup(
                "group",
                self.groups.find_active_in_tenant(tenant_id, &req.chat_id),
            )
            .await?
        {
            Some(group) => group,
            None => {
                verdict.denial = Some(Denial::UnregisteredGroup);
                // Advisory suggestion only: pre-fills a registration,
                // never satisfies this stage.
                verdict.suggested_group = Some(suggest_group(
                    &req.chat_id,
                    req.chat_title.as_deref(),
                    Some(req.username.as_str()),
                ));
                info!(
                    tenant_id = %tenant_id,
                    chat_id = %req.chat_id,
                    user_id = %req.user_id,
                    capability = %req.permission_name,
                    "denied: chat not registered to tenant"
                );
                return Ok(verdict);
            }
        };
        verdict.is_group_registered = true;
        verdict.group_info = Some(GroupInfo::from(&group));

        // 3. The user must be declared into the resolved group. The
        //    group info stays on the verdict so an administrator knows
        //    which group to declare the user into.
        if self
            .lookup(
                "declaration",
                self.declarations.find(&req.user_id, group.id, tenant_id),
            )
            .await?
            .is_none()
        {
            verdict.denial = Some(Denial::UndeclaredUser);
            info!(
                tenant_id = %tenant_id,
                chat_id = %req.chat_id,
                user_id = %req.user_id,
                group_type = %group.group_type,
                capability = %req.permission_name,
                "denied: user not declared in group"
            );
            return Ok(verdict);
        }
        verdict.is_user_declared = true;
        verdict.resolved_role = Some(group.group_type.role_name().to_string());

        // 4. Capability must be in the grant set for the group's type.
        //    The full list is returned either way.
        let granted = self
            .lookup("grants", self.grants.names(tenant_id, group.group_type))
            .await?
            .unwrap_or_default();
        verdict.has_permission = granted.iter().any(|name| name == &req.permission_name);
        verdict.declared_permissions = granted;

        if verdict.has_permission {
            verdict.denial = None;
        } else {
            verdict.denial = Some(Denial::MissingCapability);
            info!(
                tenant_id = %tenant_id,
                chat_id = %req.chat_id,
                user_id = %req.user_id,
                group_type = %group.group_type,
                capability = %req.permission_name,
                "denied: capability not granted to group type"
            );
        }

        Ok(verdict)
    }
}
