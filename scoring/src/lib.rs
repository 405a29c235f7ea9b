pub mod config;
pub mod engine;
pub mod error;
mod game_flow;
pub mod history;
pub mod observable;
pub mod preferences;
pub mod recovery;

pub use config::AppConfig;
pub use engine::ScoreEngine;
pub use error::{ConfigError, EngineError};
pub use history::HistoryBrowser;
pub use observable::Observable;
pub use preferences::{PreferenceStore, Preferences, ThemeMode, DEFAULT_BACKGROUND_OPACITY};
pub use recovery::RecoveryOutcome;
pub use types::compute_outcome;
