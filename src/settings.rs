use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

fn default_base_url() -> String {
    "https://cdn.data-system.org/cdn/404".to_string()
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notfound-launcher")
}

fn default_local_news_path() -> PathBuf {
    PathBuf::from("data/news.json")
}

/// Local launcher settings, stored as TOML in the platform data dir.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherSettings {
    /// Content server the manifests are fetched from.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// On-disk fallback news file.
    #[serde(default = "default_local_news_path")]
    pub local_news_path: PathBuf,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            data_dir: default_data_dir(),
            local_news_path: default_local_news_path(),
        }
    }
}

impl LauncherSettings {
    pub fn default_path() -> PathBuf {
        default_data_dir().join("settings.toml")
    }

    /// Loads settings, writing defaults on first run.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save(path)?;
            log::info!("Wrote default settings to {}", path.display());
            return Ok(settings);
        }

        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
