use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Owns the Postgres pool shared by every repository.
#[derive(Clone)]
pub struct DbClient {
    pub pool: PgPool,
}

impl DbClient {
    /// Connects with a short acquire timeout so a down database fails the
    /// boot sequence instead of hanging it.
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// Applies the migrations embedded from `migrations/` at build time.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Applying database migrations");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Database schema is up to date");
        Ok(())
    }
}
