pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod stores;

#[cfg(test)]
mod tests;

pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use retry::retry_with_backoff;
pub use stores::{MemoryStore, ScoreStore, SqliteStore};
