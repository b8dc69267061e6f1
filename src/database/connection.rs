use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::env;

use crate::config::BookingConfig;

/// Explicitly constructed data-access handle with a defined open/close
/// lifecycle, owned by the hosting process.
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Connect using DATABASE_URL, falling back to the development default.
    pub async fn new() -> Result<Self, sqlx::Error> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| BookingConfig::default().database_url);

        let pool = PgPool::connect(&database_url).await?;

        Ok(Self { pool })
    }

    /// Connect using an explicit configuration.
    pub async fn from_config(config: &BookingConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

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
