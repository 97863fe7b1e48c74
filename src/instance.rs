use serde::{Deserialize, Serialize};

/// Name of the synthesized instance returned when every manifest fetch
/// attempt has failed.
pub const FALLBACK_INSTANCE_NAME: &str = "404NotFound";

/// One playable server/modpack profile from the remote manifest.
///
/// The serde field names mirror the wire JSON exactly, including the
/// `loadder` spelling the content server has always used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    /// Unique key; injected from the manifest object key, not the value.
    #[serde(default)]
    pub name: String,

    /// Files CDN for this instance. `None` disables remote file downloads.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_verify")]
    pub verify: bool,

    /// Glob-ish patterns of files the download step must leave alone.
    #[serde(default)]
    pub ignored: Vec<String>,

    #[serde(default)]
    pub whitelist: Vec<String>,

    #[serde(default, rename = "whitelistActive")]
    pub whitelist_active: bool,

    #[serde(default, rename = "loadder")]
    pub loader: LoaderSpec,

    #[serde(default)]
    pub status: Option<ServerStatus>,

    #[serde(default)]
    pub jvm_args: Vec<String>,

    #[serde(default)]
    pub game_args: Vec<String>,

    /// Set only on the synthesized offline instance, never by the server.
    #[serde(default, rename = "isFallback")]
    pub is_fallback: bool,
}

fn default_verify() -> bool {
    true
}

impl InstanceDescriptor {
    /// Whether `account_name` may launch this instance.
    pub fn allows(&self, account_name: &str) -> bool {
        !self.whitelist_active || self.whitelist.iter().any(|n| n == account_name)
    }

    /// Degradation transform applied after fetching when remote file
    /// downloads must be disabled: no verification, no files CDN, every
    /// local file ignored. This replaces the original client's habit of
    /// rewriting instances behind a patched fetch.
    pub fn apply_offline_overrides(&mut self) {
        self.verify = false;
        self.url = None;
        self.ignored = vec!["*".to_string()];
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderSpec {
    #[serde(default)]
    pub minecraft_version: String,

    #[serde(default, rename = "loadder_type")]
    pub loader_type: LoaderType,

    #[serde(default, rename = "loadder_version")]
    pub loader_version: Option<String>,
}

impl LoaderSpec {
    /// Vanilla instances carry `loadder_type: "none"` and launch without a
    /// mod loader.
    pub fn is_enabled(&self) -> bool {
        self.loader_type != LoaderType::None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    #[default]
    None,
    Forge,
    Fabric,
    Quilt,
    NeoForge,
}

/// Server connection info shown on the home panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default, rename = "nameServer")]
    pub server_name: String,

    #[serde(default)]
    pub ip: String,

    #[serde(default)]
    pub port: u16,
}

/// The hardcoded offline instance substituted when the remote manifest is
/// unavailable. Values match the profile the launcher has always shipped
/// for degraded operation.
pub fn fallback_instance() -> InstanceDescriptor {
    InstanceDescriptor {
        name: FALLBACK_INSTANCE_NAME.to_string(),
        url: None,
        verify: false,
        ignored: vec!["*".to_string()],
        whitelist: Vec::new(),
        whitelist_active: false,
        loader: LoaderSpec {
            minecraft_version: "1.20.1".to_string(),
            loader_type: LoaderType::Forge,
            loader_version: Some("1.20.1-47.4.0".to_string()),
        },
        status: Some(ServerStatus {
            server_name: FALLBACK_INSTANCE_NAME.to_string(),
            ip: "82.64.34.8".to_string(),
            port: 25569,
        }),
        jvm_args: Vec::new(),
        game_args: Vec::new(),
        is_fallback: true,
    }
}

/// Connection state shown by the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Online,
    Offline,
    /// Running against the fallback instance; everything is local, so the
    /// indicator shows "Local Mode" rather than an error.
    LocalMode,
}

impl ServerState {
    pub fn classify(instance: Option<&InstanceDescriptor>) -> Self {
        match instance {
            Some(i) if i.is_fallback => ServerState::LocalMode,
            Some(i) if i.status.is_some() => ServerState::Online,
            _ => ServerState::Offline,
        }
    }
}
