use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(i64),

    #[error("Game not found: {0}")]
    GameNotFound(i64),
}

impl DatabaseError {
    /// Errors worth retrying: the database could not be reached, e.g. a locked or busy file.
    pub fn is_transient(&self) -> bool {
        matches!(self, DatabaseError::Connection(_))
    }
}
