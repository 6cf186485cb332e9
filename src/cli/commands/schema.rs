use anyhow::{bail, Context};
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, PgStore};

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.backend != StoreBackend::Postgres {
        bail!("schema bootstrap needs DATABASE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    PgStore::new(pool).ensure_schema().await?;

    output_success(
        &output_format,
        "Collection tables are in place",
        Some(json!({ "tables": ["areas", "managers", "departments", "employees"] })),
    )
}
