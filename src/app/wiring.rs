use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::context;
use crate::repository::SqliteRepository;

pub fn init_data_dir(ctx: &context::Context) -> Result<()> {
    let data_dir = &ctx.config.data_dir;
    if !data_dir.exists() {
        log::info!("creating the {} directory", data_dir.display());
    }
    std::fs::create_dir_all(data_dir)?;
    Ok(())
}

pub fn reset_database(ctx: &context::Context) -> Result<()> {
    let path = ctx.config.db_path();
    if !path.exists() {
        return Ok(());
    }
    log::warn!("removing database {}", path.display());
    std::fs::remove_file(&path)?;
    Ok(())
}

pub fn init_repository(ctx: &context::Context) -> Result<SqliteRepository> {
    let db_path = ctx.config.db_path();
    if ctx.config.reset {
        reset_database(ctx).context("resetting database")?;
    }

    let conn = Connection::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    conn.busy_timeout(Duration::from_millis(500))?;

    let mut repo = SqliteRepository::open(conn).context("initializing repository")?;
    if let Some(table) = ctx.config.table.as_deref() {
        repo.switch_table(table)
            .with_context(|| format!("switching to table {table}"))?;
    }
    Ok(repo)
}
