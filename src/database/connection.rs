use crate::config::WorkerConfig;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;
use tracing::debug;

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &WorkerConfig) -> Result<Self, sqlx::Error> {
        let database_url = config.database_url.as_deref().ok_or_else(|| {
            sqlx::Error::Configuration(
                "Database URL is not set (PICKWALK_DATABASE_URL or DATABASE_URL)".into(),
            )
        })?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_db_connections)
            .acquire_timeout(Duration::from_secs(30))
            .test_before_acquire(true) // Ensure connections are valid
            .connect(database_url)
            .await?;

        debug!(
            max_connections = config.max_db_connections,
            "Database connection pool created"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
