//! Integration tests for the user declaration ledger using in-memory
//! SurrealDB.

use deskgate_core::error::CoreError;
use deskgate_core::models::declaration::{
    CreateDeclaration, DeclarationFilter, UpdateDeclaration,
};
use deskgate_core::models::group::{CreateGroup, GroupType};
use deskgate_core::models::tenant::CreateTenant;
use deskgate_core::repository::{
    DeclarationRepository, GroupRepository, Pagination, TenantRepository,
};
use deskgate_db::repository::{
    SurrealDeclarationRepository, SurrealGroupRepository, SurrealTenantRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create tenant + group.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // tenant_id
    Uuid, // group_id
) {
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

    let group_repo = SurrealGroupRepository::new(db.clone());
    let group = group_repo
        .register(
            CreateGroup {
                tenant_id: tenant.id,
                chat_id: "-100111".into(),
                group_type: GroupType::Customer,
                name: "Customer group".into(),
                chat_title: None,
                description: None,
                member_count: None,
            },
            vec![],
        )
        .await
        .unwrap();

    (db, tenant.id, group.id)
}

fn declaration(user_id: &str, username: &str, group_id: Uuid, tenant_id: Uuid) -> CreateDeclaration {
    CreateDeclaration {
        user_id: user_id.into(),
        username: username.into(),
        group_id,
        tenant_id,
    }
}

#[tokio::test]
async fn create_and_find_declaration() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    let created = repo
        .create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();
    assert_eq!(created.user_id, "u1");
    assert_eq!(created.username, "alice");

    let found = repo.find("u1", group_id, tenant_id).await.unwrap();
    assert_eq!(found.id, created.id);
}

#[tokio::test]
async fn duplicate_triple_is_rejected_and_ledger_unchanged() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    repo.create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();

    // Second declaration of the same triple fails even with a new
    // username — the username is display only, not identity.
    let result = repo
        .create(declaration("u1", "alice_renamed", group_id, tenant_id))
        .await;
    assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));

    let found = repo.find("u1", group_id, tenant_id).await.unwrap();
    assert_eq!(found.username, "alice");
    assert_eq!(repo.count_by_group(tenant_id, group_id).await.unwrap(), 1);
}

#[tokio::test]
async fn same_user_in_another_group_is_allowed() {
    let (db, tenant_id, group_id) = setup().await;
    let group_repo = SurrealGroupRepository::new(db.clone());
    let other_group = group_repo
        .register(
            CreateGroup {
                tenant_id,
                chat_id: "-100222".into(),
                group_type: GroupType::Admin,
                name: "Admin group".into(),
                chat_title: None,
                description: None,
                member_count: None,
            },
            vec![],
        )
        .await
        .unwrap();

    let repo = SurrealDeclarationRepository::new(db);
    repo.create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();
    repo.create(declaration("u1", "alice", other_group.id, tenant_id))
        .await
        .unwrap();

    assert_eq!(repo.count_by_tenant(tenant_id).await.unwrap(), 2);
}

#[tokio::test]
async fn get_by_id_is_tenant_scoped() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    let created = repo
        .create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();

    let fetched = repo.get_by_id(tenant_id, created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);

    // A different tenant cannot see the row.
    let result = repo.get_by_id(Uuid::new_v4(), created.id).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn list_by_group_and_tenant_with_filters() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    repo.create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();
    repo.create(declaration("u2", "bob", group_id, tenant_id))
        .await
        .unwrap();

    let by_group = repo.list_by_group(tenant_id, group_id).await.unwrap();
    assert_eq!(by_group.len(), 2);

    let filtered = repo
        .list_by_tenant(
            tenant_id,
            DeclarationFilter {
                user_id: Some("u2".into()),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.items[0].username, "bob");
}

#[tokio::test]
async fn list_by_tenant_paginates() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    for i in 0..4 {
        repo.create(declaration(&format!("u{i}"), "user", group_id, tenant_id))
            .await
            .unwrap();
    }

    let page = repo
        .list_by_tenant(
            tenant_id,
            DeclarationFilter::default(),
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn update_declaration_username() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    let created = repo
        .create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();

    let updated = repo
        .update(
            tenant_id,
            created.id,
            UpdateDeclaration {
                username: Some("alice_v2".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.username, "alice_v2");
    assert_eq!(updated.user_id, "u1"); // identity unchanged
}

#[tokio::test]
async fn delete_declaration() {
    let (db, tenant_id, group_id) = setup().await;
    let repo = SurrealDeclarationRepository::new(db);

    let created = repo
        .create(declaration("u1", "alice", group_id, tenant_id))
        .await
        .unwrap();

    repo.delete(tenant_id, created.id).await.unwrap();
    assert!(repo.find("u1", group_id, tenant_id).await.is_err());

    // Deleting again reports NotFound.
    let result = repo.delete(tenant_id, created.id).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}
