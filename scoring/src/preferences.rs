use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{ConfigError, Observable};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThemeMode::System => write!(f, "system"),
            ThemeMode::Light => write!(f, "light"),
            ThemeMode::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(ThemeMode::System),
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            other => Err(format!("unknown theme mode '{other}', expected system, light or dark")),
        }
    }
}

pub const DEFAULT_BACKGROUND_OPACITY: f32 = 0.22;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme_mode: ThemeMode,
    pub background_opacity: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme_mode: ThemeMode::default(),
            background_opacity: DEFAULT_BACKGROUND_OPACITY,
        }
    }
}

fn valid_opacity(opacity: f32) -> bool {
    opacity.is_finite() && (0.0..=1.0).contains(&opacity)
}

/// Preferences backed by a YAML file, written through on every change.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    current: Observable<Preferences>,
}

impl PreferenceStore {
    /// Reads the file, falling back to defaults when it doesn't exist yet.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let mut preferences = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                path: path.display().to_string(),
                source,
            })?
        } else {
            log::debug!("No preferences at {}, using defaults", path.display());
            Preferences::default()
        };

        if !valid_opacity(preferences.background_opacity) {
            log::warn!(
                "Stored background opacity {} is out of range, using {DEFAULT_BACKGROUND_OPACITY}",
                preferences.background_opacity
            );
            preferences.background_opacity = DEFAULT_BACKGROUND_OPACITY;
        }

        Ok(Self {
            path,
            current: Observable::new(preferences),
        })
    }

    pub fn preferences(&self) -> Preferences {
        self.current.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.current.subscribe()
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), ConfigError> {
        self.current.modify(|p| p.theme_mode = mode);
        self.save()
    }

    /// Stores an opacity in 0.0–1.0. Anything else is ignored and `false` returned.
    pub fn set_background_opacity(&self, opacity: f32) -> Result<bool, ConfigError> {
        if !valid_opacity(opacity) {
            log::warn!("Ignoring background opacity {opacity}");
            return Ok(false);
        }
        self.current.modify(|p| p.background_opacity = opacity);
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(&self.current.get()).map_err(|source| ConfigError::Yaml {
            path: self.path.display().to_string(),
            source,
        })?;
        std::fs::write(&self.path, yaml).map_err(|source| ConfigError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}
