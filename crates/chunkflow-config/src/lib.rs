use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Size and punctuation limits used to decide whether an edit only needs
/// re-analysis of the segment it touched or of the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeThresholds {
    /// Insertions longer than this are always global.
    pub global_insert_chars: usize,
    /// Deletions longer than this are always global.
    pub global_delete_chars: usize,
    /// Insertions must be shorter than this to count as local.
    pub local_insert_chars: usize,
    /// Deletions must be shorter than this to count as local.
    pub local_delete_chars: usize,
    /// Maximum sentence terminators an edit may carry and stay local.
    pub local_max_terminators: usize,
    /// Maximum newlines an edit may carry and stay local.
    pub local_max_newlines: usize,
}

impl Default for ScopeThresholds {
    fn default() -> Self {
        Self {
            global_insert_chars: 1000,
            global_delete_chars: 500,
            local_insert_chars: 200,
            local_delete_chars: 100,
            local_max_terminators: 2,
            local_max_newlines: 2,
        }
    }
}

/// Tunables for the segmentation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Debounce window for the local (per-segment) metrics queue.
    pub local_debounce_ms: u64,
    /// Debounce window for the contextual metrics queue.
    pub contextual_debounce_ms: u64,
    /// Mark segments stale when an edit earlier in the document only shifts them.
    pub invalidate_shifted_segments: bool,
    /// After index matching, let unclaimed old segments claim new segments with identical text.
    pub reconcile_by_content: bool,
    pub scope: ScopeThresholds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            local_debounce_ms: 300,
            contextual_debounce_ms: 300,
            invalidate_shifted_segments: true,
            reconcile_by_content: false,
            scope: ScopeThresholds::default(),
        }
    }
}

impl EngineSettings {
    pub fn local_debounce(&self) -> Duration {
        Duration::from_millis(self.local_debounce_ms)
    }

    pub fn contextual_debounce(&self) -> Duration {
        Duration::from_millis(self.contextual_debounce_ms)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Topic passed to the analysis collaborator when none is given on the command line.
    #[serde(default)]
    pub default_topic: Option<String>,
    #[serde(default)]
    pub engine: EngineSettings,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the config file, falling back to defaults when it does not exist.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/chunkflow");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }
}
