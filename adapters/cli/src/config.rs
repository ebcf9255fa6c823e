//! Adapter settings loaded from an optional TOML file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use defense_arcade_core::rules;
use defense_arcade_leaderboard::DEFAULT_BASE_URL;
use serde::Deserialize;
use thiserror::Error;

/// Settings file picked up from the working directory when no path is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "defense-arcade.toml";

const DEFAULT_LOCAL_SCORES: &str = "defense-arcade-scores.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) leaderboard_url: String,
    pub(crate) local_scores: PathBuf,
    pub(crate) frame_interval_ms: u64,
    pub(crate) top_scores: usize,
    pub(crate) accuracy: f64,
    pub(crate) seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            leaderboard_url: DEFAULT_BASE_URL.to_owned(),
            local_scores: PathBuf::from(DEFAULT_LOCAL_SCORES),
            frame_interval_ms: 16,
            top_scores: rules::LEADERBOARD_LIMIT,
            accuracy: 0.8,
            seed: None,
        }
    }
}

impl Settings {
    /// Loads `path`, or the default file when it exists, or built-in defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub(crate) fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ConfigError::Invalid(format!(
                "accuracy must lie in 0.0..=1.0 (received {})",
                self.accuracy
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be positive".to_owned(),
            ));
        }
        if self.top_scores == 0 {
            return Err(ConfigError::Invalid("top_scores must be positive".to_owned()));
        }
        Ok(())
    }
}
