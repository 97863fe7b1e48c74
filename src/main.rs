use std::sync::Arc;

use anyhow::Result;
use env_logger::Env;

use notfound_launcher::account::Account;
use notfound_launcher::instance::ServerState;
use notfound_launcher::launch::build_launch_options;
use notfound_launcher::manifest::ManifestFetcher;
use notfound_launcher::news::display_date;
use notfound_launcher::panel::{HomePanel, StartupGate};
use notfound_launcher::settings::LauncherSettings;
use notfound_launcher::store::ClientStore;

/// Diagnostic driver: exercises every remote operation and logs what the
/// UI would show, which makes CDN trouble visible without booting the
/// desktop shell.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let settings = LauncherSettings::load_or_init(&LauncherSettings::default_path())?;
    log::info!("Content server: {}", settings.base_url);

    let fetcher = ManifestFetcher::new(&settings.base_url)?
        .with_local_news_path(settings.local_news_path.clone());
    let store = Arc::new(ClientStore::open(settings.data_dir.join("client.json")).await?);
    let panel = HomePanel::new(fetcher.clone(), store.clone());

    match panel.startup_gate().await {
        StartupGate::Proceed(config) => {
            log::info!("Config OK ({} extra fields)", config.extra.len());
            if let Some(rss) = &config.rss {
                log::info!("RSS feed: {}", rss);
            }
        }
        StartupGate::Maintenance { message } => {
            log::warn!("Maintenance mode: {}", message);
        }
        StartupGate::ConfigUnavailable(err) => {
            log::warn!("Config unavailable ({}), continuing offline", err);
        }
    }

    let instance = panel.select_instance().await?;
    log::info!(
        "Instance '{}' (minecraft {}, fallback: {})",
        instance.name,
        instance.loader.minecraft_version,
        instance.is_fallback
    );

    match panel.refresh_status().await {
        ServerState::Online => log::info!("Server status: online"),
        ServerState::Offline => log::warn!("Server status: offline"),
        ServerState::LocalMode => log::warn!("Server status: local mode"),
    }

    match fetcher.fetch_news().await {
        Some(items) => {
            log::info!("{} news item(s)", items.len());
            for item in items.iter().take(3) {
                let date = display_date(&item.publish_date)
                    .map(|(day, month)| format!("{} {}", day, month))
                    .unwrap_or_else(|| item.publish_date.clone());
                log::info!("  {} ({}) by {}", item.title, date, item.author);
            }
        }
        None => log::warn!("No news source available"),
    }

    let config = store.read().await;
    let account = Account::new_offline("Player");
    let options = build_launch_options(&instance, &account, &config);
    log::info!(
        "Launch options ready: version {}, loader {:?} (enabled: {}), memory {}..{}",
        options.version,
        options.loader.loader_type,
        options.loader.enable,
        options.memory.min,
        options.memory.max
    );

    Ok(())
}
