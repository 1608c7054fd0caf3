//! SurrealDB implementation of [`GrantRepository`].

use chrono::{DateTime, Utc};
use deskgate_core::error::CoreResult;
use deskgate_core::models::grant::{CreateGrant, PermissionGrant};
use deskgate_core::models::group::GroupType;
use deskgate_core::repository::GrantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GrantRowWithId {
    record_id: String,
    tenant_id: String,
    group_type: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GrantRowWithId {
    fn try_into_grant(self) -> Result<PermissionGrant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        let group_type: GroupType = self
            .group_type
            .parse()
            .map_err(|_| DbError::Migration(format!("unknown group type: {}", self.group_type)))?;
        Ok(PermissionGrant {
            id,
            tenant_id,
            group_type,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for capability-name projections.
#[derive(Debug, SurrealValue)]
struct NameRow {
    name: String,
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the permission template store.
#[derive(Clone)]
pub struct SurrealGrantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGrantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find_existing(
        &self,
        tenant_id: Uuid,
        group_type: GroupType,
        name: &str,
    ) -> CoreResult<Option<PermissionGrant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM group_grant \
                 WHERE tenant_id = $tenant_id \
                 AND group_type = $group_type \
                 AND name = $name",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_type", group_type.as_str().to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_grant()?)),
            None => Ok(None),
        }
    }
}

impl<C: Connection> GrantRepository for SurrealGrantRepository<C> {
    async fn upsert(&self, input: CreateGrant) -> CoreResult<PermissionGrant> {
        // Last write wins on the description; the triple identity never
        // changes.
        if let Some(existing) = self
            .find_existing(input.tenant_id, input.group_type, &input.name)
            .await?
        {
            self.db
                .query(
                    "UPDATE type::record('group_grant', $id) SET \
                     description = $description, updated_at = time::now()",
                )
                .bind(("id", existing.id.to_string()))
                .bind(("description", input.description))
                .await
                .map_err(DbError::from)?
                .check()
                .map_err(|e| DbError::Migration(e.to_string()))?;

            return self
                .find_existing(input.tenant_id, input.group_type, &input.name)
                .await?
                .ok_or_else(|| {
                    DbError::NotFound {
                        entity: "group_grant".into(),
                        id: existing.id.to_string(),
                    }
                    .into()
                });
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('group_grant', $id) SET \
                 tenant_id = $tenant_id, \
                 group_type = $group_type, \
                 name = $name, \
                 description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("group_type", input.group_type.as_str().to_string()))
            .bind(("name", input.name.clone()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        self.find_existing(input.tenant_id, input.group_type, &input.name)
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "group_grant".into(),
                    id: id_str,
                }
                .into()
            })
    }

    async fn revoke_all(&self, tenant_id: Uuid, group_type: GroupType) -> CoreResult<u64> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM group_grant \
                 WHERE tenant_id = $tenant_id \
                 AND group_type = $group_type GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_type", group_type.as_str().to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        self.db
            .query(
                "DELETE group_grant \
                 WHERE tenant_id = $tenant_id \
                 AND group_type = $group_type",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_type", group_type.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(total)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        group_type: Option<GroupType>,
    ) -> CoreResult<Vec<PermissionGrant>> {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if group_type.is_some() {
            conditions.push("group_type = $group_type");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM group_grant \
             WHERE {} \
             ORDER BY group_type ASC, name ASC",
            conditions.join(" AND ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(gt) = group_type {
            builder = builder.bind(("group_type", gt.as_str().to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<GrantRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_grant())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn names(&self, tenant_id: Uuid, group_type: GroupType) -> CoreResult<Vec<String>> {
        let mut result = self
            .db
            .query(
                "SELECT name FROM group_grant \
                 WHERE tenant_id = $tenant_id \
                 AND group_type = $group_type \
                 ORDER BY name ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_type", group_type.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NameRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }
}
