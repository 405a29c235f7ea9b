pub mod memory_store;
pub mod sqlite_store;
pub mod traits;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use traits::ScoreStore;
