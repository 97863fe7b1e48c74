use std::sync::Arc;

use crate::config::RemoteConfig;
use crate::error::ConfigError;
use crate::instance::{InstanceDescriptor, ServerState};
use crate::manifest::ManifestFetcher;
use crate::store::ClientStore;
use crate::Result;

/// Decision for the startup flow after the maintenance check.
#[derive(Debug, Clone)]
pub enum StartupGate {
    Proceed(RemoteConfig),
    /// The server asked us to stand down; the UI shows the message and the
    /// user may still continue into offline mode.
    Maintenance { message: String },
    /// Config could not be fetched at all. Also continuable: the instance
    /// list has its own fallback.
    ConfigUnavailable(ConfigError),
}

/// Backend of the home panel: instance selection, status refresh and the
/// startup maintenance gate. One component instead of the several copies
/// the old client accumulated; this is the defensive variant.
pub struct HomePanel {
    fetcher: ManifestFetcher,
    store: Arc<ClientStore>,
}

impl HomePanel {
    pub fn new(fetcher: ManifestFetcher, store: Arc<ClientStore>) -> Self {
        Self { fetcher, store }
    }

    /// Runs the maintenance check. Config failures are surfaced, not
    /// swallowed: the caller decides whether to block or continue.
    pub async fn startup_gate(&self) -> StartupGate {
        match self.fetcher.fetch_config().await {
            Ok(config) if config.maintenance => {
                let message = if config.maintenance_message.is_empty() {
                    "The server is under maintenance.".to_string()
                } else {
                    config.maintenance_message.clone()
                };
                StartupGate::Maintenance { message }
            }
            Ok(config) => StartupGate::Proceed(config),
            Err(err) => {
                log::error!("Maintenance check failed: {}", err);
                StartupGate::ConfigUnavailable(err)
            }
        }
    }

    /// Resolves the instance to show: the stored selection when it still
    /// exists, otherwise the first instance open to everyone (persisted as
    /// the new selection). Always yields an instance thanks to the
    /// manifest fallback.
    pub async fn select_instance(&self) -> Result<InstanceDescriptor> {
        let instances = self.fetcher.fetch_instance_list().await;
        let selected = self.store.read().await.selected_instance;

        if let Some(name) = selected {
            if let Some(instance) = instances.iter().find(|i| i.name == name) {
                return Ok(instance.clone());
            }
            log::warn!("Stored instance '{}' is gone from the manifest", name);
        }

        let chosen = instances
            .iter()
            .find(|i| !i.whitelist_active)
            .unwrap_or(&instances[0])
            .clone();

        self.store
            .update(|config| config.selected_instance = Some(chosen.name.clone()))
            .await?;
        log::info!("Selected instance '{}'", chosen.name);
        Ok(chosen)
    }

    /// One tick of the periodic status refresh: refetch the manifest and
    /// classify the selected instance's state.
    pub async fn refresh_status(&self) -> ServerState {
        let instances = self.fetcher.fetch_instance_list().await;
        let selected = self.store.read().await.selected_instance;

        let current = selected
            .as_deref()
            .and_then(|name| instances.iter().find(|i| i.name == name));
        let state = ServerState::classify(current);
        log::debug!("Status refresh: {:?}", state);
        state
    }
}
