use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

pub type DatabaseDriver = sqlx::Sqlite;
pub type DatabasePool = sqlx::SqlitePool;
pub type DatabaseTransaction<'a> = sqlx::Transaction<'a, DatabaseDriver>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 8;

#[derive(Clone)]
pub struct Database {
    pub pool: DatabasePool,
}

impl Database {
    /// Opens (creating if needed) the database at `url` and applies pending migrations.
    ///
    /// In-memory databases are private to each connection, so they get a pool of one.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let in_memory = url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url: {url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);
        let options = if in_memory {
            options
        } else {
            options.journal_mode(SqliteJournalMode::Wal)
        };

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .context("failed to open database")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        info!(in_memory, "database ready");

        Ok(Self { pool })
    }

    pub fn clone_pool(&self) -> DatabasePool {
        self.pool.clone()
    }
}
