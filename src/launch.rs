use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::account::Account;
use crate::instance::InstanceDescriptor;
use crate::store::{ClientConfig, CloseBehavior, ScreenSize};
use crate::{Error, Result};

const LAUNCH_TIMEOUT_MS: u64 = 10_000;

/// The options value handed to the game-bootstrapping library. This is the
/// whole contract with that collaborator: we build it, it emits
/// [`LaunchEvent`]s back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub url: Option<String>,
    pub authenticator: Authenticator,
    pub timeout: u64,
    pub path: PathBuf,
    pub instance: String,
    pub version: String,
    pub detached: bool,
    pub download_file_multiple: u32,
    pub loader: LoaderOptions,
    pub verify: bool,
    pub ignored: Vec<String>,
    pub java_path: PathBuf,
    pub jvm_args: Vec<String>,
    pub game_args: Vec<String>,
    pub screen: ScreenSize,
    pub memory: MemorySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authenticator {
    pub name: String,
    pub uuid: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderOptions {
    #[serde(rename = "type")]
    pub loader_type: crate::instance::LoaderType,
    pub build: Option<String>,
    pub enable: bool,
}

/// JVM heap bounds as the collaborator expects them ("2048M").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySettings {
    pub min: String,
    pub max: String,
}

/// Derives launch options from an instance, the selected account and the
/// client config. Pure function; the collaborator is invoked separately so
/// nothing here needs to subclass or wrap it.
pub fn build_launch_options(
    instance: &InstanceDescriptor,
    account: &Account,
    config: &ClientConfig,
) -> LaunchOptions {
    let memory = &config.java_config.java_memory;

    LaunchOptions {
        url: instance.url.clone(),
        authenticator: Authenticator {
            name: account.name.clone(),
            uuid: account.uuid.clone(),
            access_token: account.access_token.clone(),
        },
        timeout: LAUNCH_TIMEOUT_MS,
        path: config.game_config.game_path.clone(),
        instance: instance.name.clone(),
        version: instance.loader.minecraft_version.clone(),
        detached: config.launcher_config.close_launcher != CloseBehavior::CloseAll,
        download_file_multiple: config.launcher_config.download_multi,
        loader: LoaderOptions {
            loader_type: instance.loader.loader_type,
            build: instance.loader.loader_version.clone(),
            enable: instance.loader.is_enabled(),
        },
        verify: instance.verify,
        ignored: instance.ignored.clone(),
        java_path: config
            .java_config
            .java_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("java")),
        jvm_args: instance.jvm_args.clone(),
        game_args: instance.game_args.clone(),
        screen: config.game_config.screen_size,
        memory: MemorySettings {
            min: format!("{}M", memory.min * 1024),
            max: format!("{}M", memory.max * 1024),
        },
    }
}

/// Events emitted by the collaborator over the course of a launch.
#[derive(Debug, Clone)]
pub enum LaunchEvent {
    Progress { current: u64, total: u64 },
    Check { current: u64, total: u64 },
    Extract(String),
    Patch(String),
    /// Download speed in bytes per second.
    Speed(u64),
    /// Estimated seconds remaining.
    Estimated(u64),
    /// A line of game output; the game process is up once these arrive.
    Data(String),
    Close(i32),
    Error(String),
}

/// Seam for the vendored launch library. Implementations consume the
/// options and push events until the game exits or the attempt dies.
#[async_trait]
pub trait GameLauncher: Send + Sync {
    async fn launch(&self, options: LaunchOptions, events: mpsc::Sender<LaunchEvent>)
        -> Result<()>;
}

/// Status line for the progress indicator, mapped from an event. `None`
/// for events that only feed diagnostics.
pub fn progress_text(event: &LaunchEvent) -> Option<String> {
    match event {
        LaunchEvent::Progress { current, total } => {
            Some(format!("Downloading {}%", percent(*current, *total)))
        }
        LaunchEvent::Check { current, total } => {
            Some(format!("Verifying {}%", percent(*current, *total)))
        }
        LaunchEvent::Extract(_) => Some("Extracting files...".to_string()),
        LaunchEvent::Patch(_) => Some("Applying patches...".to_string()),
        LaunchEvent::Data(_) => Some("Game is starting...".to_string()),
        LaunchEvent::Close(_) => Some("Ready to launch".to_string()),
        LaunchEvent::Error(_) => Some("Launch failed".to_string()),
        LaunchEvent::Speed(_) | LaunchEvent::Estimated(_) => None,
    }
}

fn percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    current * 100 / total
}

/// Drives a launch to completion, logging events as they arrive. An
/// `Error` event is terminal for the attempt; otherwise the game's exit
/// code is returned once `Close` is seen.
pub async fn run_launch(launcher: &dyn GameLauncher, options: LaunchOptions) -> Result<i32> {
    let (tx, mut rx) = mpsc::channel(64);

    let drain = async move {
        let mut exit_code = None;
        let mut error = None;
        while let Some(event) = rx.recv().await {
            log_event(&event);
            match event {
                LaunchEvent::Close(code) => exit_code = Some(code),
                LaunchEvent::Error(message) => {
                    // Terminal for the attempt; keep draining so the
                    // collaborator can finish sending without erroring.
                    if error.is_none() {
                        error = Some(message);
                    }
                }
                _ => {}
            }
        }
        (exit_code, error)
    };

    let (launched, (exit_code, error)) = tokio::join!(launcher.launch(options, tx), drain);
    launched?;

    if let Some(message) = error {
        return Err(Error::Launch(message));
    }
    Ok(exit_code.unwrap_or(0))
}

fn log_event(event: &LaunchEvent) {
    match event {
        LaunchEvent::Speed(bytes_per_sec) => {
            log::debug!("Download speed: {:.2} Mb/s", *bytes_per_sec as f64 / 1_048_576.0)
        }
        LaunchEvent::Estimated(seconds) => {
            let hours = seconds / 3600;
            let minutes = (seconds % 3600) / 60;
            log::debug!("Estimated time: {}h {}m {}s", hours, minutes, seconds % 60)
        }
        LaunchEvent::Data(line) => log::debug!("Game: {}", line),
        LaunchEvent::Error(message) => log::error!("Launch error: {}", message),
        LaunchEvent::Close(code) => log::info!("Game closed with code {}", code),
        other => {
            if let Some(text) = progress_text(other) {
                log::info!("{}", text);
            }
        }
    }
}
