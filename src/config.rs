use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "ORGANIZE_CONFIG";
pub const DATA_FILE_ENV: &str = "ORGANIZE_DATA_FILE";
pub const LOG_ENV: &str = "ORGANIZE_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Where all task lists and the reset marker are kept.
    pub data_file: PathBuf,
    /// Default tracing filter; `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_file: PathBuf::from("organize.yaml"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{}': {e}", path.display()))?;
        Self::from_toml(&contents)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(DATA_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_file = PathBuf::from(v);
        }
        if let Some(v) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            self.log_level = v;
        }
    }
}

/// `$ORGANIZE_CONFIG`, then `./organize.toml`, then defaults. Env overrides apply last.
pub fn load_default() -> anyhow::Result<AppConfig> {
    let explicit = std::env::var(CONFIG_ENV).ok().filter(|v| !v.trim().is_empty());
    let local = Path::new("organize.toml");

    let mut cfg = match explicit {
        Some(path) => AppConfig::from_file(Path::new(&path))?,
        None if local.exists() => AppConfig::from_file(local)?,
        None => AppConfig::default(),
    };
    cfg.apply_overrides(|key| std::env::var(key).ok());
    Ok(cfg)
}
