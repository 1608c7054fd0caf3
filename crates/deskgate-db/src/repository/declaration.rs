//! SurrealDB implementation of [`DeclarationRepository`].

use chrono::{DateTime, Utc};
use deskgate_core::error::{CoreError, CoreResult};
use deskgate_core::models::declaration::{
    CreateDeclaration, DeclarationFilter, UpdateDeclaration, UserDeclaration,
};
use deskgate_core::repository::{DeclarationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct DeclarationRow {
    user_id: String,
    username: String,
    group_id: String,
    tenant_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeclarationRow {
    fn into_declaration(self, id: Uuid) -> Result<UserDeclaration, DbError> {
        let group_id = Uuid::parse_str(&self.group_id)
            .map_err(|e| DbError::Migration(format!("invalid group UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        Ok(UserDeclaration {
            id,
            user_id: self.user_id,
            username: self.username,
            group_id,
            tenant_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct DeclarationRowWithId {
    record_id: String,
    user_id: String,
    username: String,
    group_id: String,
    tenant_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DeclarationRowWithId {
    fn try_into_declaration(self) -> Result<UserDeclaration, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let group_id = Uuid::parse_str(&self.group_id)
            .map_err(|e| DbError::Migration(format!("invalid group UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        Ok(UserDeclaration {
            id,
            user_id: self.user_id,
            username: self.username,
            group_id,
            tenant_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the user declaration ledger.
#[derive(Clone)]
pub struct SurrealDeclarationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDeclarationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DeclarationRepository for SurrealDeclarationRepository<C> {
    async fn create(&self, input: CreateDeclaration) -> CoreResult<UserDeclaration> {
        // Duplicate triple check up front; the unique index backstops
        // concurrent inserts.
        match self
            .find(&input.user_id, input.group_id, input.tenant_id)
            .await
        {
            Ok(_) => {
                return Err(CoreError::AlreadyExists {
                    entity: "user_declaration".into(),
                    key: format!(
                        "user={},group={},tenant={}",
                        input.user_id, input.group_id, input.tenant_id
                    ),
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_declaration', $id) SET \
                 user_id = $user_id, \
                 username = $username, \
                 group_id = $group_id, \
                 tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id))
            .bind(("username", input.username))
            .bind(("group_id", input.group_id.to_string()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| CoreError::Database(e.to_string()))?;

        let rows: Vec<DeclarationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_declaration".into(),
            id: id_str,
        })?;

        Ok(row.into_declaration(id)?)
    }

    async fn find(
        &self,
        user_id: &str,
        group_id: Uuid,
        tenant_id: Uuid,
    ) -> CoreResult<UserDeclaration> {
        let user_owned = user_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM user_declaration \
                 WHERE user_id = $user_id \
                 AND group_id = $group_id \
                 AND tenant_id = $tenant_id",
            )
            .bind(("user_id", user_owned))
            .bind(("group_id", group_id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeclarationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_declaration".into(),
            id: format!("user={user_id},group={group_id},tenant={tenant_id}"),
        })?;

        Ok(row.try_into_declaration()?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<UserDeclaration> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('user_declaration', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeclarationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_declaration".into(),
            id: id_str,
        })?;

        Ok(row.into_declaration(id)?)
    }

    async fn list_by_group(
        &self,
        tenant_id: Uuid,
        group_id: Uuid,
    ) -> CoreResult<Vec<UserDeclaration>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM user_declaration \
                 WHERE tenant_id = $tenant_id \
                 AND group_id = $group_id \
                 ORDER BY created_at ASC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DeclarationRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_declaration())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        filter: DeclarationFilter,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<UserDeclaration>> {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if filter.group_id.is_some() {
            conditions.push("group_id = $group_id");
        }
        if filter.user_id.is_some() {
            conditions.push("user_id = $user_id");
        }
        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT count() AS total FROM user_declaration \
             WHERE {where_clause} GROUP ALL"
        );
        let mut count_builder = self
            .db
            .query(&count_query)
            .bind(("tenant_id", tenant_id.to_string()));
        if let Some(group_id) = filter.group_id {
            count_builder = count_builder.bind(("group_id", group_id.to_string()));
        }
        if let Some(ref user_id) = filter.user_id {
            count_builder = count_builder.bind(("user_id", user_id.clone()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM user_declaration \
             WHERE {where_clause} \
             ORDER BY created_at ASC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&list_query)
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(group_id) = filter.group_id {
            builder = builder.bind(("group_id", group_id.to_string()));
        }
        if let Some(user_id) = filter.user_id {
            builder = builder.bind(("user_id", user_id));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<DeclarationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_declaration())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn update(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        input: UpdateDeclaration,
    ) -> CoreResult<UserDeclaration> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.username.is_some() {
            sets.push("username = $username");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user_declaration', $id) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(username) = input.username {
            builder = builder.bind(("username", username));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| CoreError::Database(e.to_string()))?;

        let rows: Vec<DeclarationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_declaration".into(),
            id: id_str,
        })?;

        Ok(row.into_declaration(id)?)
    }

    async fn delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        // Scoped existence check keeps cross-tenant ids indistinguishable
        // from missing ones.
        self.get_by_id(tenant_id, id).await?;

        self.db
            .query(
                "DELETE type::record('user_declaration', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn count_by_group(&self, tenant_id: Uuid, group_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user_declaration \
                 WHERE tenant_id = $tenant_id \
                 AND group_id = $group_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("group_id", group_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user_declaration \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
