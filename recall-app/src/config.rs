use anyhow::{Context, Result};
use recall_core::{CardFilter, Difficulty};
use recall_json::paths::{config_root, default_store_file};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub storage: StorageConfig,
    pub review: ReviewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            storage: StorageConfig::default(),
            review: ReviewConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    /// Unset means `<data_file parent>/backups`.
    pub backups_dir: Option<PathBuf>,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_store_file(),
            backups_dir: None,
            max_backups: 10,
        }
    }
}

impl StorageConfig {
    /// Data file and backups dir, with `data_file` (from `--data-file`)
    /// taking precedence over the configured one.
    pub fn resolve(&self, data_file: Option<PathBuf>) -> (PathBuf, PathBuf) {
        let data = data_file.unwrap_or_else(|| self.data_file.clone());
        let backups = self
            .backups_dir
            .clone()
            .unwrap_or_else(|| backups_next_to(&data));
        (data, backups)
    }
}

fn backups_next_to(data_file: &Path) -> PathBuf {
    data_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .join("backups")
}

/// Default tag filter for review sessions; CLI flags take precedence.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ReviewConfig {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
}

impl ReviewConfig {
    pub fn filter(&self, category: Option<String>, difficulty: Option<Difficulty>) -> CardFilter {
        CardFilter {
            category: category.or_else(|| self.category.clone()),
            difficulty: difficulty.or(self.difficulty),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    config_root().join("config.toml")
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Self::load_from(default_config_path()),
        }
    }

    /// A missing file means defaults; a malformed one is an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AppConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// RECALL_DATA and RECALL_LOG_LEVEL.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RECALL_DATA") {
            self.storage.data_file = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("RECALL_LOG_LEVEL") {
            self.log_level = val;
        }
    }
}
