//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD search_backend_url ON TABLE tenant TYPE option<string>;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Telegram groups (tenant scope; chat_id unique across ALL tenants)
-- =======================================================================
DEFINE TABLE telegram_group SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE telegram_group TYPE string;
DEFINE FIELD chat_id ON TABLE telegram_group TYPE string;
DEFINE FIELD group_type ON TABLE telegram_group TYPE string \
    ASSERT $value IN ['ADMIN', 'CUSTOMER', 'SUPPLIER'];
DEFINE FIELD name ON TABLE telegram_group TYPE string;
DEFINE FIELD chat_title ON TABLE telegram_group TYPE option<string>;
DEFINE FIELD description ON TABLE telegram_group TYPE option<string>;
DEFINE FIELD is_active ON TABLE telegram_group TYPE bool DEFAULT true;
DEFINE FIELD member_count ON TABLE telegram_group TYPE option<int>;
DEFINE FIELD created_at ON TABLE telegram_group TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE telegram_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_chat ON TABLE telegram_group \
    COLUMNS chat_id UNIQUE;
DEFINE INDEX idx_group_tenant_chat ON TABLE telegram_group \
    COLUMNS tenant_id, chat_id;
DEFINE INDEX idx_group_tenant_type ON TABLE telegram_group \
    COLUMNS tenant_id, group_type;

-- =======================================================================
-- Group permission grants (tenant scope, keyed by group type)
-- =======================================================================
DEFINE TABLE group_grant SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE group_grant TYPE string;
DEFINE FIELD group_type ON TABLE group_grant TYPE string \
    ASSERT $value IN ['ADMIN', 'CUSTOMER', 'SUPPLIER'];
DEFINE FIELD name ON TABLE group_grant TYPE string;
DEFINE FIELD description ON TABLE group_grant TYPE string;
DEFINE FIELD created_at ON TABLE group_grant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE group_grant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_grant_identity ON TABLE group_grant \
    COLUMNS tenant_id, group_type, name UNIQUE;
DEFINE INDEX idx_grant_tenant_type ON TABLE group_grant \
    COLUMNS tenant_id, group_type;

-- =======================================================================
-- User declarations (tenant scope)
-- =======================================================================
DEFINE TABLE user_declaration SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_declaration TYPE string;
DEFINE FIELD username ON TABLE user_declaration TYPE string;
DEFINE FIELD group_id ON TABLE user_declaration TYPE string;
DEFINE FIELD tenant_id ON TABLE user_declaration TYPE string;
DEFINE FIELD created_at ON TABLE user_declaration TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_declaration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_declaration_identity ON TABLE user_declaration \
    COLUMNS user_id, group_id, tenant_id UNIQUE;
DEFINE INDEX idx_declaration_group ON TABLE user_declaration \
    COLUMNS tenant_id, group_id;
DEFINE INDEX idx_declaration_user ON TABLE user_declaration \
    COLUMNS tenant_id, user_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
