//! SurrealDB implementation of [`GroupRepository`].

use chrono::{DateTime, Utc};
use deskgate_core::error::{CoreError, CoreResult, DependentCount};
use deskgate_core::models::grant::CreateGrant;
use deskgate_core::models::group::{CreateGroup, Group, GroupType, UpdateGroup};
use deskgate_core::repository::{DeclarationRepository, GroupRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::SurrealDeclarationRepository;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct GroupRow {
    tenant_id: String,
    chat_id: String,
    group_type: String,
    name: String,
    chat_title: Option<String>,
    description: Option<String>,
    is_active: bool,
    member_count: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRow {
    fn into_group(self, id: Uuid) -> Result<Group, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        Ok(Group {
            id,
            tenant_id,
            chat_id: self.chat_id,
            group_type: parse_group_type(&self.group_type)?,
            name: self.name,
            chat_title: self.chat_title,
            description: self.description,
            is_active: self.is_active,
            member_count: self.member_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct GroupRowWithId {
    record_id: String,
    tenant_id: String,
    chat_id: String,
    group_type: String,
    name: String,
    chat_title: Option<String>,
    description: Option<String>,
    is_active: bool,
    member_count: Option<u32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl GroupRowWithId {
    fn try_into_group(self) -> Result<Group, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Migration(format!("invalid tenant UUID: {e}")))?;
        Ok(Group {
            id,
            tenant_id,
            chat_id: self.chat_id,
            group_type: parse_group_type(&self.group_type)?,
            name: self.name,
            chat_title: self.chat_title,
            description: self.description,
            is_active: self.is_active,
            member_count: self.member_count,
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

fn parse_group_type(s: &str) -> Result<GroupType, DbError> {
    s.parse()
        .map_err(|_| DbError::Migration(format!("unknown group type: {s}")))
}

/// SurrealDB implementation of the Group repository.
#[derive(Clone)]
pub struct SurrealGroupRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealGroupRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> GroupRepository for SurrealGroupRepository<C> {
    async fn register(&self, input: CreateGroup, seed: Vec<CreateGrant>) -> CoreResult<Group> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let tenant_id_str = input.tenant_id.to_string();
        let group_type_str = input.group_type.as_str().to_string();

        // Group row plus seed grants in one transaction — either all
        // statements persist or none do.
        let mut statements = vec![
            "BEGIN TRANSACTION".to_string(),
            "CREATE type::record('telegram_group', $id) SET \
             tenant_id = $tenant_id, \
             chat_id = $chat_id, \
             group_type = $group_type, \
             name = $name, \
             chat_title = $chat_title, \
             description = $description, \
             is_active = true, \
             member_count = $member_count"
                .to_string(),
        ];
        for (i, _) in seed.iter().enumerate() {
            statements.push(format!(
                "CREATE type::record('group_grant', $grant_id_{i}) SET \
                 tenant_id = $tenant_id, \
                 group_type = $group_type, \
                 name = $grant_name_{i}, \
                 description = $grant_desc_{i}"
            ));
        }
        statements.push("COMMIT TRANSACTION".to_string());
        let query = statements.join(";\n");

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id_str))
            .bind(("chat_id", input.chat_id.clone()))
            .bind(("group_type", group_type_str))
            .bind(("name", input.name))
            .bind(("chat_title", input.chat_title))
            .bind(("description", input.description))
            .bind(("member_count", input.member_count));

        for (i, grant) in seed.into_iter().enumerate() {
            builder = builder
                .bind((format!("grant_id_{i}"), Uuid::new_v4().to_string()))
                .bind((format!("grant_name_{i}"), grant.name))
                .bind((format!("grant_desc_{i}"), grant.description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| {
            // The global unique index backstops the duplicate pre-check
            // against concurrent registrations.
            let msg = e.to_string();
            if msg.contains("idx_group_chat") {
                CoreError::AlreadyExists {
                    entity: "telegram_group".into(),
                    key: input.chat_id.clone(),
                }
            } else {
                CoreError::Database(msg)
            }
        })?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "telegram_group".into(),
            id: id_str,
        })?;

        Ok(row.into_group(id)?)
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<Group> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('telegram_group', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "telegram_group".into(),
            id: id_str,
        })?;

        Ok(row.into_group(id)?)
    }

    async fn find_by_chat(&self, chat_id: &str) -> CoreResult<Group> {
        let chat_owned = chat_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM telegram_group \
                 WHERE chat_id = $chat_id",
            )
            .bind(("chat_id", chat_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "telegram_group".into(),
            id: format!("chat={chat_id}"),
        })?;

        Ok(row.try_into_group()?)
    }

    async fn find_active_in_tenant(&self, tenant_id: Uuid, chat_id: &str) -> CoreResult<Group> {
        let chat_owned = chat_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM telegram_group \
                 WHERE tenant_id = $tenant_id \
                 AND chat_id = $chat_id \
                 AND is_active = true",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("chat_id", chat_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "telegram_group".into(),
            id: format!("tenant={tenant_id},chat={chat_id}"),
        })?;

        Ok(row.try_into_group()?)
    }

    async fn update(&self, tenant_id: Uuid, id: Uuid, input: UpdateGroup) -> CoreResult<Group> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.chat_title.is_some() {
            sets.push("chat_title = $chat_title");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.member_count.is_some() {
            sets.push("member_count = $member_count");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('telegram_group', $id) SET {} \
             WHERE tenant_id = $tenant_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(chat_title) = input.chat_title {
            builder = builder.bind(("chat_title", chat_title));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(member_count) = input.member_count {
            builder = builder.bind(("member_count", member_count));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| CoreError::Database(e.to_string()))?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "telegram_group".into(),
            id: id_str,
        })?;

        Ok(row.into_group(id)?)
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        group_type: Option<GroupType>,
        include_inactive: bool,
    ) -> CoreResult<Vec<Group>> {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if group_type.is_some() {
            conditions.push("group_type = $group_type");
        }
        if !include_inactive {
            conditions.push("is_active = true");
        }

        let query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM telegram_group \
             WHERE {} \
             ORDER BY created_at ASC",
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
        let rows: Vec<GroupRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_group())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn deactivate(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('telegram_group', $id) SET \
                 is_active = false, updated_at = time::now() \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<GroupRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "telegram_group".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn hard_delete(&self, tenant_id: Uuid, id: Uuid) -> CoreResult<()> {
        // Existence check first so a bad id reports NotFound, not a
        // silent no-op.
        self.get_by_id(tenant_id, id).await?;

        let declarations = SurrealDeclarationRepository::new(self.db.clone());
        let dependents = declarations.count_by_group(tenant_id, id).await?;
        if dependents > 0 {
            return Err(CoreError::HasDependents {
                entity: "telegram_group".into(),
                id: id.to_string(),
                dependents: vec![DependentCount {
                    entity: "user_declaration",
                    count: dependents,
                }],
            });
        }

        self.db
            .query(
                "DELETE type::record('telegram_group', $id) \
                 WHERE tenant_id = $tenant_id",
            )
            .bind(("id", id.to_string()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn count_by_tenant(&self, tenant_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM telegram_group \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
