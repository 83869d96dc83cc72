use crate::query::{MatchMode, ScoringWeights};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "symdex";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the user config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shard files or directories used when none are given on the command line
    #[serde(default)]
    pub index_paths: Vec<PathBuf>,

    /// Result limit applied when `--limit` is not given
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Default matching strategy
    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub case_sensitive: bool,

    /// Glob patterns selecting shard files inside index directories
    #[serde(default = "default_shard_patterns")]
    pub shard_patterns: Vec<String>,

    /// Scoring weights for result ranking
    #[serde(default)]
    pub scoring: ScoringWeights,
}

fn default_limit() -> usize {
    20
}

fn default_shard_patterns() -> Vec<String> {
    vec!["*.js".to_string(), "*.json".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index_paths: Vec::new(),
            default_limit: default_limit(),
            match_mode: MatchMode::default(),
            case_sensitive: false,
            shard_patterns: default_shard_patterns(),
            scoring: ScoringWeights::default(),
        }
    }
}

impl AppConfig {
    /// Load config from the user config directory, or return default if not found
    pub fn load() -> Result<Self> {
        match get_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from an explicit path; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to the given path, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(config_path, content)
            .context("Failed to write config file")?;
        Ok(())
    }
}

/// Get the path to the config file, if the platform has a config directory
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
