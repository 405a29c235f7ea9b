use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::DatabaseError;

pub const MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MEMORY_URL)
    }

    pub fn from_cli_or_env_or_yaml(cli_arg: Option<String>, yaml_config: Option<String>) -> Self {
        let url = if let Some(arg) = cli_arg {
            arg
        } else if let Ok(env) = std::env::var("DATABASE_URL") {
            env
        } else if let Some(yaml) = yaml_config {
            yaml
        } else {
            MEMORY_URL.to_string()
        };

        Self::new(url)
    }

    pub fn is_in_memory(&self) -> bool {
        self.url == ":memory:" || self.url.starts_with(MEMORY_URL)
    }

    /// Accepts `sqlite:` URLs, `:memory:`, or a bare file path.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str(MEMORY_URL)
        } else if self.url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&self.url)
        } else {
            Ok(SqliteConnectOptions::new().filename(&self.url))
        }
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        Ok(options.create_if_missing(true).foreign_keys(true))
    }

    pub async fn create_pool(&self) -> Result<sqlx::SqlitePool, DatabaseError> {
        // every connection to an in-memory database gets its own empty database, so pin it to one
        let pool_options = if self.is_in_memory() {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.pool_size)
        };

        pool_options
            .connect_with(self.connect_options()?)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))
    }
}
