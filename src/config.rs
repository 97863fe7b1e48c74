use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Launcher configuration served from
/// `<base>/launcher/config-launcher/config.json`. Fetched fresh on every
/// request and never cached; only the fields the backend acts on are typed,
/// everything else rides along in `extra` for the UI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub maintenance: bool,

    #[serde(default)]
    pub maintenance_message: String,

    /// Optional RSS feed URL; when present it is preferred over the JSON
    /// news endpoint.
    #[serde(default)]
    pub rss: Option<String>,

    /// Optional override for the JSON news endpoint.
    #[serde(default)]
    pub news: Option<String>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}
