use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Executor;
use std::{fs, path::Path};

use crate::config::Config;

pub mod auth;
pub mod users;

const SCHEMA_DIRS: [&str; 2] = ["databases/users", "databases/auth"];
const REQUIRED_TABLES: [&str; 2] = ["users", "pending_registrations"];

/// Pending registrations older than this are dropped at startup.
const PENDING_RETENTION_HOURS: i64 = 24;

fn load_all_schemas(schema_dirs: &[&str]) -> Result<String> {
    let mut combined_sql = String::new();

    for dir in schema_dirs {
        let schema_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(dir).join("schema.sql");
        let sql = fs::read_to_string(&schema_path)
            .with_context(|| format!("Failed to read schema file: {:?}", schema_path))?;
        combined_sql.push_str(&sql);
        combined_sql.push('\n');
    }

    Ok(combined_sql)
}

fn missing_tables<'a>(required: &[&'a str], present: &[String]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|p| p.as_str() == *table))
        .collect()
}

/// Names of `tables` not yet created in the public schema.
async fn find_missing_tables<'a>(pool: &PgPool, tables: &[&'a str]) -> Result<Vec<&'a str>> {
    let names: Vec<String> = tables.iter().map(|t| t.to_string()).collect();
    let present: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables
         WHERE table_schema = 'public' AND table_name::text = ANY($1)",
    )
    .bind(names)
    .fetch_all(pool)
    .await
    .context("Failed to look up existing tables")?;

    Ok(missing_tables(tables, &present))
}

/// Connects to PostgreSQL, creates missing tables and purges stale pending
/// registrations.
pub async fn setup_backend(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let missing = find_missing_tables(&pool, &REQUIRED_TABLES).await?;
    if !missing.is_empty() {
        info!("Tables {:?} missing, running schema SQL", missing);
        let combined_schema_sql = load_all_schemas(&SCHEMA_DIRS)?;
        pool.execute(combined_schema_sql.as_str())
            .await
            .context("Failed to execute schema SQL")?;
        info!("Schema SQL executed successfully");
    } else {
        info!("All required tables exist");
    }

    let cutoff = Utc::now() - Duration::hours(PENDING_RETENTION_HOURS);
    let purged = auth::pendingdb::purge_stale(&pool, cutoff)
        .await
        .context("Failed to purge stale pending registrations")?;
    info!("Purged {} stale pending registrations", purged);

    Ok(pool)
}
