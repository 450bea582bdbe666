use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const DB_FILENAME: &str = "signals.db";

/// Opens (creating if needed) `{data_folder}/sqlitedata/signals.db` and applies the schema.
pub async fn connect(data_folder: &str) -> Result<SqlitePool, sqlx::Error> {
    let db_path = format!("{}/sqlitedata", data_folder);
    std::fs::create_dir_all(&db_path)?;

    let db_filename = format!("{}/{}", db_path, DB_FILENAME);

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_filename))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlite::SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(30))
        .statement_cache_capacity(100);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;
    info!("Database ready at {}", db_filename);
    Ok(pool)
}

/// Single-connection in-memory database, every extra connection would see an empty db.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    apply_schema(&pool).await?;
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema = include_str!("../../../sql/schema.sql");

    sqlx::raw_sql(schema).execute(pool).await?;
    Ok(())
}
