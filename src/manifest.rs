use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{ConfigError, ConfigErrorKind};
use crate::instance::{fallback_instance, InstanceDescriptor};
use crate::news::{self, NewsItem};
use crate::Result;

/// Retry and timeout policy for remote fetches. The defaults are the
/// launcher's long-standing constants; tests inject shorter delays.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Total attempts for the instance-list fetch.
    pub attempts: u32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Pause between attempts.
    pub retry_delay: Duration,
    /// Redirect hop cap.
    pub max_redirects: usize,
    /// Extra attempts for the JSON news endpoint after the first.
    pub news_retries: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(10),
            retry_delay: Duration::from_millis(2000),
            max_redirects: 10,
            news_retries: 2,
        }
    }
}

/// Fetches and validates the remote manifests: launcher config, instance
/// list, and news. Every response is decoded at the boundary; a body that
/// is not the expected JSON never escapes past this type.
#[derive(Debug, Clone)]
pub struct ManifestFetcher {
    client: Client,
    base_url: String,
    policy: FetchPolicy,
    local_news_path: PathBuf,
}

impl ManifestFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_policy(base_url, FetchPolicy::default())
    }

    pub fn with_policy(base_url: &str, policy: FetchPolicy) -> Result<Self> {
        // Parsed only to validate; endpoints are built by formatting so the
        // base may carry a path segment (e.g. <cdn>/cdn/404).
        Url::parse(base_url)?;

        let client = Client::builder()
            .timeout(policy.timeout)
            .redirect(redirect::Policy::limited(policy.max_redirects))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
            local_news_path: PathBuf::from("data/news.json"),
        })
    }

    /// Overrides the on-disk fallback news file location.
    pub fn with_local_news_path(mut self, path: PathBuf) -> Self {
        self.local_news_path = path;
        self
    }

    fn files_url(&self) -> String {
        // Trailing slash avoids a redirect hop on the CDN.
        format!("{}/files/", self.base_url)
    }

    fn config_url(&self) -> String {
        format!("{}/launcher/config-launcher/config.json", self.base_url)
    }

    fn news_url(&self) -> String {
        format!("{}/launcher/news-launcher/news.json", self.base_url)
    }

    /// Fetches the instance manifest with bounded retry and a deterministic
    /// fallback. Never errors and never returns an empty vec: when the
    /// server is unreachable or keeps answering garbage, the result is the
    /// single-element fallback sequence.
    pub async fn fetch_instance_list(&self) -> Vec<InstanceDescriptor> {
        let url = self.files_url();

        for attempt in 1..=self.policy.attempts {
            match self.fetch_json_value(&url).await {
                Ok(value) => {
                    // The fetch itself succeeded; a structurally wrong body
                    // will not get better on retry.
                    return match reshape_instances(value) {
                        Some(list) if !list.is_empty() => list,
                        _ => {
                            log::error!("Instance manifest is not a non-empty object, using fallback instance");
                            vec![fallback_instance()]
                        }
                    };
                }
                Err(err) => {
                    log::warn!(
                        "Instance list fetch attempt {}/{} failed: {}",
                        attempt,
                        self.policy.attempts,
                        err
                    );
                    if attempt < self.policy.attempts {
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        log::error!("All instance list attempts failed, using fallback instance");
        vec![fallback_instance()]
    }

    /// Fetches the launcher config. Single attempt; failures are surfaced
    /// as a structured value so callers can decide how critical they are.
    pub async fn fetch_config(&self) -> std::result::Result<RemoteConfig, ConfigError> {
        let value = self
            .fetch_json_value(&self.config_url())
            .await
            .map_err(ConfigError::from)?;

        serde_json::from_value(value).map_err(|err| {
            ConfigError::new(
                ConfigErrorKind::ParseError,
                format!("config shape invalid: {}", err),
            )
        })
    }

    /// Fetches news, trying in order: the JSON news endpoint (with retry),
    /// the RSS feed declared in the remote config, and the local fallback
    /// file. Returns the first source yielding at least one item, `None`
    /// when every source fails.
    pub async fn fetch_news(&self) -> Option<Vec<NewsItem>> {
        let config = match self.fetch_config().await {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Config unavailable for news lookup, using defaults: {}", err);
                RemoteConfig::default()
            }
        };

        let news_url = config.news.clone().unwrap_or_else(|| self.news_url());
        if let Some(items) = self.fetch_json_news(&news_url).await {
            return Some(items);
        }

        if let Some(rss_url) = config.rss.as_deref() {
            match self.fetch_text(rss_url).await {
                Ok(body) => match news::decode_rss(&body) {
                    Ok(items) if !items.is_empty() => return Some(items),
                    Ok(_) => log::warn!("RSS feed at {} has no items", rss_url),
                    Err(err) => log::warn!("Failed to decode RSS feed: {}", err),
                },
                Err(err) => log::warn!("RSS fetch failed: {}", err),
            }
        }

        match news::load_local_news(&self.local_news_path) {
            Ok(items) if !items.is_empty() => {
                log::info!("Serving news from local fallback file");
                Some(items)
            }
            Ok(_) => {
                log::warn!("Local news file is empty");
                None
            }
            Err(err) => {
                log::warn!(
                    "Local news file {} unavailable: {}",
                    self.local_news_path.display(),
                    err
                );
                None
            }
        }
    }

    async fn fetch_json_news(&self, url: &str) -> Option<Vec<NewsItem>> {
        let attempts = self.policy.news_retries + 1;
        for attempt in 1..=attempts {
            match self.fetch_json_value(url).await {
                Ok(value) => match serde_json::from_value::<Vec<NewsItem>>(value) {
                    Ok(items) if !items.is_empty() => return Some(items),
                    Ok(_) => {
                        log::warn!("News endpoint returned an empty list");
                        return None;
                    }
                    Err(err) => log::warn!(
                        "News attempt {}/{} has wrong shape: {}",
                        attempt,
                        attempts,
                        err
                    ),
                },
                Err(err) => log::warn!("News attempt {}/{} failed: {}", attempt, attempts, err),
            }
            if attempt < attempts {
                tokio::time::sleep(self.policy.retry_delay).await;
            }
        }
        None
    }

    /// GET `url` and decode the body as JSON, enforcing status, declared
    /// content type, and an HTML sniff on the body itself. This is the
    /// single validation point for every remote JSON resource.
    async fn fetch_json_value(&self, url: &str) -> std::result::Result<Value, FetchFailure> {
        let body = self.fetch_checked_body(url, true).await?;
        serde_json::from_str(&body).map_err(FetchFailure::Parse)
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        self.fetch_checked_body(url, false).await
    }

    async fn fetch_checked_body(
        &self,
        url: &str,
        expect_json: bool,
    ) -> std::result::Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response.text().await.map_err(FetchFailure::Transport)?;

        if expect_json {
            // Sniff before trusting the header: the CDN serves HTML error
            // pages with assorted content types.
            if looks_like_html(&body) {
                log::error!("HTML response from {}: {}", url, snippet(&body));
                return Err(FetchFailure::HtmlBody);
            }

            let declared_json = content_type
                .as_deref()
                .map_or(false, |value| value.contains("application/json"));
            if !declared_json {
                log::error!(
                    "Non-JSON content type {:?} from {}: {}",
                    content_type,
                    url,
                    snippet(&body)
                );
                return Err(FetchFailure::ContentType(content_type));
            }
        }

        Ok(body)
    }
}

/// Reshapes the manifest object (instance name -> partial descriptor) into
/// a list, injecting each key as the `name` field. `None` when the value
/// is not an object.
fn reshape_instances(value: Value) -> Option<Vec<InstanceDescriptor>> {
    let map = match value {
        Value::Object(map) => map,
        _ => return None,
    };

    let mut list = Vec::with_capacity(map.len());
    for (name, entry) in map {
        match serde_json::from_value::<InstanceDescriptor>(entry) {
            Ok(mut instance) => {
                instance.name = name;
                list.push(instance);
            }
            Err(err) => log::warn!("Skipping malformed instance entry '{}': {}", name, err),
        }
    }
    Some(list)
}

/// Detects HTML error pages handed back in place of JSON.
fn looks_like_html(body: &str) -> bool {
    let prefix: String = body
        .trim_start()
        .chars()
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    if prefix.starts_with("<!doctype") || prefix.starts_with("<html") {
        return true;
    }

    let lowered = body.to_ascii_lowercase();
    lowered.contains("<head>") || lowered.contains("<body>")
}

fn snippet(body: &str) -> String {
    body.chars().take(200).collect()
}

#[derive(Debug, Error)]
enum FetchFailure {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("server returned HTTP {0}")]
    Status(StatusCode),

    #[error("response is not JSON (content type {0:?})")]
    ContentType(Option<String>),

    #[error("response body is an HTML document")]
    HtmlBody,

    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

impl From<FetchFailure> for ConfigError {
    fn from(failure: FetchFailure) -> Self {
        let kind = match &failure {
            FetchFailure::Transport(_) | FetchFailure::Status(_) => ConfigErrorKind::Unreachable,
            FetchFailure::ContentType(_) | FetchFailure::HtmlBody => {
                ConfigErrorKind::InvalidResponse
            }
            FetchFailure::Parse(_) => ConfigErrorKind::ParseError,
        };
        ConfigError::new(kind, failure.to_string())
    }
}
