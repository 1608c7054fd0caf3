//! Integration tests for the Tenant repository implementation using
//! in-memory SurrealDB.

use deskgate_core::error::CoreError;
use deskgate_core::models::tenant::{CreateTenant, UpdateTenant};
use deskgate_core::repository::{Pagination, TenantRepository};
use deskgate_db::repository::SurrealTenantRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    deskgate_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn create_and_get_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(CreateTenant {
            id: None,
            name: "HLS System".into(),
            search_backend_url: Some("http://logs.hls.local:9200".into()),
        })
        .await
        .unwrap();

    assert_eq!(tenant.name, "HLS System");
    assert_eq!(
        tenant.search_backend_url.as_deref(),
        Some("http://logs.hls.local:9200")
    );

    // Get by ID should return the same tenant.
    let fetched = repo.get_by_id(tenant.id).await.unwrap();
    assert_eq!(fetched.id, tenant.id);
    assert_eq!(fetched.name, tenant.name);
}

#[tokio::test]
async fn create_with_explicit_id() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let explicit = Uuid::new_v4();
    let tenant = repo
        .create(CreateTenant {
            id: Some(explicit),
            name: "Seeded".into(),
            search_backend_url: None,
        })
        .await
        .unwrap();

    assert_eq!(tenant.id, explicit);
}

#[tokio::test]
async fn explicit_id_collision_is_rejected() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let explicit = Uuid::new_v4();
    repo.create(CreateTenant {
        id: Some(explicit),
        name: "First".into(),
        search_backend_url: None,
    })
    .await
    .unwrap();

    let result = repo
        .create(CreateTenant {
            id: Some(explicit),
            name: "Second".into(),
            search_backend_url: None,
        })
        .await;

    assert!(matches!(result, Err(CoreError::AlreadyExists { .. })));

    // The original row is untouched.
    let fetched = repo.get_by_id(explicit).await.unwrap();
    assert_eq!(fetched.name, "First");
}

#[tokio::test]
async fn update_tenant_name() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(CreateTenant {
            id: None,
            name: "Before".into(),
            search_backend_url: None,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                name: Some("After".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, tenant.id);
    assert_eq!(updated.name, "After");
    assert!(updated.updated_at >= tenant.updated_at);
}

#[tokio::test]
async fn update_can_set_and_clear_backend_url() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(CreateTenant {
            id: None,
            name: "T".into(),
            search_backend_url: None,
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            tenant.id,
            UpdateTenant {
                search_backend_url: Some(Some("http://es.local:9200".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        updated.search_backend_url.as_deref(),
        Some("http://es.local:9200")
    );

    // Inner None clears the override.
    let cleared = repo
        .update(
            tenant.id,
            UpdateTenant {
                search_backend_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.search_backend_url.is_none());
}

#[tokio::test]
async fn delete_tenant() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    let tenant = repo
        .create(CreateTenant {
            id: None,
            name: "To Delete".into(),
            search_backend_url: None,
        })
        .await
        .unwrap();

    repo.delete(tenant.id).await.unwrap();

    let result = repo.get_by_id(tenant.id).await;
    assert!(result.is_err(), "should not find deleted tenant");
}

#[tokio::test]
async fn list_tenants_with_pagination() {
    let db = setup().await;
    let repo = SurrealTenantRepository::new(db);

    for i in 0..5 {
        repo.create(CreateTenant {
            id: None,
            name: format!("Tenant {i}"),
            search_backend_url: None,
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 3);

    let rest = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 2);
}
