use database::DatabaseError;
use thiserror::Error;
use types::NameError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error("Invalid player name: {0}")]
    InvalidName(#[from] NameError),

    #[error("No players selected")]
    EmptySelection,

    #[error("Game {0} is still in progress")]
    GameInProgress(i64),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
