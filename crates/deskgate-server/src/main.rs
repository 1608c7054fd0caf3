//! Deskgate Server — application entry point.
//!
//! Connects to SurrealDB, applies migrations and leaves the permission
//! core ready for whichever transport the deployment wires in (HTTP
//! relay, bot webhook); transports are external collaborators.

use std::env;

use deskgate_db::{DbConfig, DbManager};
use tracing_subscriber::EnvFilter;

fn config_from_env() -> DbConfig {
    let defaults = DbConfig::default();
    DbConfig {
        url: env::var("DESKGATE_DB_URL").unwrap_or(defaults.url),
        namespace: env::var("DESKGATE_DB_NAMESPACE").unwrap_or(defaults.namespace),
        database: env::var("DESKGATE_DB_DATABASE").unwrap_or(defaults.database),
        username: env::var("DESKGATE_DB_USERNAME").unwrap_or(defaults.username),
        password: env::var("DESKGATE_DB_PASSWORD").unwrap_or(defaults.password),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("deskgate=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Deskgate server...");

    let config = config_from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = deskgate_db::run_migrations(manager.db()).await {
        tracing::error!(error = %e, "failed to run migrations");
        std::process::exit(1);
    }

    tracing::info!("Deskgate permission core ready.");
}
