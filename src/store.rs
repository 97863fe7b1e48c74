use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::Result;

/// Client-side persisted configuration: the user's selections plus the
/// knobs the launch options are derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub selected_instance: Option<String>,
    pub selected_account: Option<Uuid>,
    #[serde(default)]
    pub game_config: GameConfig,
    #[serde(default)]
    pub java_config: JavaConfig,
    #[serde(default)]
    pub launcher_config: LauncherBehavior,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            selected_instance: None,
            selected_account: None,
            game_config: GameConfig::default(),
            java_config: JavaConfig::default(),
            launcher_config: LauncherBehavior::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub game_path: PathBuf,
    pub screen_size: ScreenSize,
}

impl Default for GameConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notfound-launcher");

        Self {
            game_path: data_dir.join("game"),
            screen_size: ScreenSize::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaConfig {
    /// `None` launches with whatever `java` resolves to on PATH.
    pub java_path: Option<PathBuf>,
    pub java_memory: MemoryRange,
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            java_path: None,
            java_memory: MemoryRange::default(),
        }
    }
}

/// Memory bounds in GiB, converted to MiB strings at launch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRange {
    pub min: u32,
    pub max: u32,
}

impl Default for MemoryRange {
    fn default() -> Self {
        Self { min: 2, max: 4 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherBehavior {
    pub close_launcher: CloseBehavior,
    pub download_multi: u32,
}

impl Default for LauncherBehavior {
    fn default() -> Self {
        Self {
            close_launcher: CloseBehavior::KeepOpen,
            download_multi: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseBehavior {
    /// Close launcher and game together.
    CloseAll,
    /// Hide the launcher while the game runs.
    CloseLauncher,
    KeepOpen,
}

/// Single-writer accessor over the persisted client config.
///
/// The panel refresh timer and user-driven selection can touch the config
/// concurrently; funneling every read-modify-write through [`update`]
/// keeps them from clobbering each other.
///
/// [`update`]: ClientStore::update
#[derive(Debug)]
pub struct ClientStore {
    path: PathBuf,
    state: Mutex<ClientConfig>,
}

impl ClientStore {
    /// Opens the store, creating the file with defaults when missing.
    pub async fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let config = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let config = ClientConfig::default();
                let content = serde_json::to_string_pretty(&config)?;
                tokio::fs::write(&path, content).await?;
                log::info!("Created client config at {}", path.display());
                config
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            path,
            state: Mutex::new(config),
        })
    }

    /// Snapshot of the current config.
    pub async fn read(&self) -> ClientConfig {
        self.state.lock().await.clone()
    }

    /// Applies `mutate` and persists the result while holding the lock, so
    /// concurrent updates cannot lose each other's writes.
    pub async fn update<F>(&self, mutate: F) -> Result<ClientConfig>
    where
        F: FnOnce(&mut ClientConfig),
    {
        let mut state = self.state.lock().await;
        mutate(&mut state);
        let content = serde_json::to_string_pretty(&*state)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(state.clone())
    }
}
