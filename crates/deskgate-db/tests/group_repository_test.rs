//! Integration tests for the Group repository using in-memory
//! SurrealDB.

use deskgate_core::error::CoreError;
use deskgate_core::models::declaration::CreateDeclaration;
use deskgate_core::models::grant::CreateGrant;
use deskgate_core::models::group::{CreateGroup, GroupType, UpdateGroup};
use deskgate_core::models::tenant::CreateTenant;
use deskgate_core::repository::{
    DeclarationRepository, GrantRepository, GroupRepository, TenantRepository,
};
use deskgate_db::repository::{
    SurrealDeclarationRepository, SurrealGrantRepository, SurrealGroupRepository,
    SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a tenant.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    deskgate_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            id: None,
            name: "Test Tenant".into(),
            search_backend_url: None,
        })
        .await
        .unwrap();

    (db, tenant.id)
}

fn group_input(tenant_id: Uuid, chat_id: &str, group_type: GroupType) -> CreateGroup {
    CreateGroup {
        tenant_id,
        chat_id: chat_id.into(),
        group_type,
        name: format!("{} group", group_type.role_name()),
        chat_title: None,
        description: None,
        member_count: None,
    }
}

fn seed_grant(tenant_id: Uuid, group_type: GroupType, name: &str) -> CreateGrant {
    CreateGrant {
        tenant_id,
        group_type,
        name: name.into(),
        description: "seeded".into(),
    }
}

// -----------------------------------------------------------------------
// Registration
// -----------------------------------------------------------------------

#[tokio::test]
async fn register_creates_group_and_seed_grants() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let grants = SurrealGrantRepository::new(db);

    let seed = vec![
        seed_grant(tenant_id, GroupType::Customer, "general_access"),
        seed_grant(tenant_id, GroupType::Customer, "view_own_tickets"),
    ];
    let group = groups
        .register(group_input(tenant_id, "-100111", GroupType::Customer), seed)
        .await
        .unwrap();

    assert_eq!(group.tenant_id, tenant_id);
    assert_eq!(group.chat_id, "-100111");
    assert!(group.is_active);

    // Both the group and its seed grants persisted.
    let names = grants.names(tenant_id, GroupType::Customer).await.unwrap();
    assert_eq!(names, vec!["general_access", "view_own_tickets"]);
}

#[tokio::test]
async fn register_with_empty_seed_adds_no_grants() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let grants = SurrealGrantRepository::new(db);

    groups
        .register(group_input(tenant_id, "-100112", GroupType::Admin), vec![])
        .await
        .unwrap();

    let names = grants.names(tenant_id, GroupType::Admin).await.unwrap();
    assert!(names.is_empty());
}

#[tokio::test]
async fn duplicate_chat_is_rejected_even_across_tenants() {
    let (db, tenant_a) = setup().await;
    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant_b = tenant_repo
        .create(CreateTenant {
            id: None,
            name: "Other Tenant".into(),
            search_backend_url: None,
        })
        .await
        .unwrap()
        .id;

    let groups = SurrealGroupRepository::new(db);
    groups
        .register(group_input(tenant_a, "-100111", GroupType::Customer), vec![])
        .await
        .unwrap();

    // Same chat under a different tenant hits the global unique index.
    let result = groups
        .register(group_input(tenant_b, "-100111", GroupType::Admin), vec![])
        .await;
    assert!(result.is_err());

    // The original registration still resolves to its owner.
    let found = groups.find_by_chat("-100111").await.unwrap();
    assert_eq!(found.tenant_id, tenant_a);
}

// -----------------------------------------------------------------------
// Lookups
// -----------------------------------------------------------------------

#[tokio::test]
async fn find_by_chat_is_global_and_reports_owner() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    let created = groups
        .register(group_input(tenant_id, "-100555", GroupType::Supplier), vec![])
        .await
        .unwrap();

    let found = groups.find_by_chat("-100555").await.unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.tenant_id, tenant_id);
    assert_eq!(found.group_type, GroupType::Supplier);
}

#[tokio::test]
async fn find_by_chat_includes_inactive_groups() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    let created = groups
        .register(group_input(tenant_id, "-100556", GroupType::Customer), vec![])
        .await
        .unwrap();
    groups.deactivate(tenant_id, created.id).await.unwrap();

    // Global lookup still sees the row — a deactivated chat stays
    // claimed by its tenant.
    let found = groups.find_by_chat("-100556").await.unwrap();
    assert!(!found.is_active);
}

#[tokio::test]
async fn find_active_in_tenant_is_scoped() {
    let (db, tenant_a) = setup().await;
    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant_b = tenant_repo
        .create(CreateTenant {
            id: None,
            name: "Other".into(),
            search_backend_url: None,
        })
        .await
        .unwrap()
        .id;

    let groups = SurrealGroupRepository::new(db);
    groups
        .register(group_input(tenant_a, "-100777", GroupType::Customer), vec![])
        .await
        .unwrap();

    // Resolves under the owning tenant.
    let found = groups
        .find_active_in_tenant(tenant_a, "-100777")
        .await
        .unwrap();
    assert_eq!(found.tenant_id, tenant_a);

    // A caller claiming the wrong tenant gets nothing.
    let result = groups.find_active_in_tenant(tenant_b, "-100777").await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn find_active_in_tenant_excludes_deactivated() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    let created = groups
        .register(group_input(tenant_id, "-100778", GroupType::Customer), vec![])
        .await
        .unwrap();
    groups.deactivate(tenant_id, created.id).await.unwrap();

    let result = groups.find_active_in_tenant(tenant_id, "-100778").await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn list_by_tenant_filters_type_and_active() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    let customer = groups
        .register(group_input(tenant_id, "-100801", GroupType::Customer), vec![])
        .await
        .unwrap();
    groups
        .register(group_input(tenant_id, "-100802", GroupType::Admin), vec![])
        .await
        .unwrap();
    groups.deactivate(tenant_id, customer.id).await.unwrap();

    // Active only by default.
    let active = groups.list_by_tenant(tenant_id, None, false).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].group_type, GroupType::Admin);

    // Type filter plus inactive rows.
    let customers = groups
        .list_by_tenant(tenant_id, Some(GroupType::Customer), true)
        .await
        .unwrap();
    assert_eq!(customers.len(), 1);
    assert!(!customers[0].is_active);
}

#[tokio::test]
async fn update_group_fields() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    let created = groups
        .register(group_input(tenant_id, "-100803", GroupType::Customer), vec![])
        .await
        .unwrap();

    let updated = groups
        .update(
            tenant_id,
            created.id,
            UpdateGroup {
                name: Some("Renamed".into()),
                member_count: Some(42),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.member_count, Some(42));
    assert_eq!(updated.chat_id, "-100803"); // unchanged
}

// -----------------------------------------------------------------------
// Soft vs hard delete
// -----------------------------------------------------------------------

#[tokio::test]
async fn deactivate_keeps_declarations_and_grants() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let grants = SurrealGrantRepository::new(db.clone());
    let declarations = SurrealDeclarationRepository::new(db);

    let group = groups
        .register(
            group_input(tenant_id, "-100900", GroupType::Customer),
            vec![seed_grant(tenant_id, GroupType::Customer, "general_access")],
        )
        .await
        .unwrap();

    declarations
        .create(CreateDeclaration {
            user_id: "u1".into(),
            username: "alice".into(),
            group_id: group.id,
            tenant_id,
        })
        .await
        .unwrap();

    groups.deactivate(tenant_id, group.id).await.unwrap();

    // History survives soft delete.
    assert_eq!(
        declarations
            .count_by_group(tenant_id, group.id)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        grants.names(tenant_id, GroupType::Customer).await.unwrap(),
        vec!["general_access"]
    );
}

#[tokio::test]
async fn hard_delete_is_refused_while_declarations_exist() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db.clone());
    let declarations = SurrealDeclarationRepository::new(db);

    let group = groups
        .register(group_input(tenant_id, "-100901", GroupType::Customer), vec![])
        .await
        .unwrap();

    let declaration = declarations
        .create(CreateDeclaration {
            user_id: "u1".into(),
            username: "alice".into(),
            group_id: group.id,
            tenant_id,
        })
        .await
        .unwrap();

    let result = groups.hard_delete(tenant_id, group.id).await;
    match result {
        Err(CoreError::HasDependents { dependents, .. }) => {
            assert_eq!(dependents.len(), 1);
            assert_eq!(dependents[0].entity, "user_declaration");
            assert_eq!(dependents[0].count, 1);
        }
        other => panic!("expected HasDependents, got {other:?}"),
    }

    // Removing the declaration unblocks the delete.
    declarations.delete(tenant_id, declaration.id).await.unwrap();
    groups.hard_delete(tenant_id, group.id).await.unwrap();
    assert!(groups.find_by_chat("-100901").await.is_err());
}

#[tokio::test]
async fn count_by_tenant_counts_all_groups() {
    let (db, tenant_id) = setup().await;
    let groups = SurrealGroupRepository::new(db);

    groups
        .register(group_input(tenant_id, "-100910", GroupType::Customer), vec![])
        .await
        .unwrap();
    let second = groups
        .register(group_input(tenant_id, "-100911", GroupType::Admin), vec![])
        .await
        .unwrap();
    groups.deactivate(tenant_id, second.id).await.unwrap();

    // Inactive rows still count as dependents.
    assert_eq!(groups.count_by_tenant(tenant_id).await.unwrap(), 2);
}
