use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

/// Creates the SQLite connection pool and makes sure the schema exists.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite...");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .with_context(|| format!("Failed to open database at '{database_url}'"))?;

    init_schema(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the `plants` table and its `(slug, language)` unique index if missing.
///
/// The unique index is the authoritative guard against slug collisions; the
/// store translates its violation into a conflict.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plants (
            id BLOB PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            language TEXT NOT NULL,
            scientific_name TEXT,
            title TEXT,
            brief_description TEXT,
            content TEXT,
            slug TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create plants table")?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS slug_language_unique_idx ON plants (slug, language)",
    )
    .execute(pool)
    .await
    .context("Failed to create slug_language_unique_idx")?;

    Ok(())
}

/// Single-connection in-memory pool for tests. Every `:memory:` connection is
/// its own database, so the pool must never open a second one.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
