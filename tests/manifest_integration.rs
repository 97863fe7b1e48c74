//! Integration tests for the manifest fetcher against a mock content
//! server: retry budgets, HTML sniffing, and the news source chain.

use std::time::Duration;

use notfound_launcher::instance::{LoaderType, FALLBACK_INSTANCE_NAME};
use notfound_launcher::manifest::{FetchPolicy, ManifestFetcher};
use notfound_launcher::ConfigErrorKind;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_policy() -> FetchPolicy {
    FetchPolicy {
        retry_delay: Duration::from_millis(10),
        ..FetchPolicy::default()
    }
}

fn fetcher(server: &MockServer) -> ManifestFetcher {
    ManifestFetcher::with_policy(&server.uri(), test_policy()).expect("fetcher should build")
}

fn json_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
}

const MANIFEST: &str = r#"{
    "Survival": {
        "url": "https://cdn.example.org/files",
        "verify": true,
        "loadder": {
            "minecraft_version": "1.20.1",
            "loadder_type": "forge",
            "loadder_version": "1.20.1-47.4.0"
        },
        "status": { "nameServer": "Survival", "ip": "play.example.org", "port": 25565 }
    },
    "Creative": {
        "verify": false,
        "loadder": { "minecraft_version": "1.21", "loadder_type": "none" }
    }
}"#;

#[tokio::test]
async fn test_instance_list_names_come_from_keys() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(json_response(MANIFEST))
        .expect(1)
        .mount(&server)
        .await;

    let mut instances = fetcher(&server).fetch_instance_list().await;
    instances.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].name, "Creative");
    assert_eq!(instances[1].name, "Survival");
    assert_eq!(instances[1].loader.loader_type, LoaderType::Forge);
    assert!(instances.iter().all(|i| !i.is_fallback));
}

#[tokio::test]
async fn test_server_error_retries_three_times_then_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let instances = fetcher(&server).fetch_instance_list().await;

    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].name, FALLBACK_INSTANCE_NAME);
    assert!(instances[0].is_fallback);
}

#[tokio::test]
async fn test_html_body_is_malformed_despite_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<!DOCTYPE html><html><head></head><body>404</body></html>",
            "application/json",
        ))
        .expect(3)
        .mount(&server)
        .await;

    let instances = fetcher(&server).fetch_instance_list().await;
    assert_eq!(instances.len(), 1);
    assert!(instances[0].is_fallback);
}

#[tokio::test]
async fn test_non_json_content_type_retries_then_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(MANIFEST, "text/plain"))
        .expect(3)
        .mount(&server)
        .await;

    let instances = fetcher(&server).fetch_instance_list().await;
    assert!(instances[0].is_fallback);
}

#[tokio::test]
async fn test_empty_mapping_is_fallback_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(json_response("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let instances = fetcher(&server).fetch_instance_list().await;
    assert_eq!(instances.len(), 1);
    assert_eq!(instances[0].name, FALLBACK_INSTANCE_NAME);
}

#[tokio::test]
async fn test_non_object_body_is_fallback_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/"))
        .respond_with(json_response("[1, 2, 3]"))
        .expect(1)
        .mount(&server)
        .await;

    let instances = fetcher(&server).fetch_instance_list().await;
    assert!(instances[0].is_fallback);
}

#[tokio::test]
async fn test_config_html_is_invalid_response_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<!DOCTYPE html><html><body>error</body></html>",
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_config().await.unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_config_unreachable_and_parse_error_kinds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_config().await.unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::Unreachable);

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(json_response("{ not json"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetcher(&server).fetch_config().await.unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::ParseError);
}

#[tokio::test]
async fn test_config_success_with_maintenance_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(json_response(
            r#"{ "maintenance": true, "maintenance_message": "back at noon", "discord": "x" }"#,
        ))
        .mount(&server)
        .await;

    let config = fetcher(&server).fetch_config().await.unwrap();
    assert!(config.maintenance);
    assert_eq!(config.maintenance_message, "back at noon");
    assert!(config.extra.contains_key("discord"));
}

#[tokio::test]
async fn test_news_from_json_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(json_response("{}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/launcher/news-launcher/news.json"))
        .respond_with(json_response(
            r#"[{ "title": "Hello", "content": "World", "author": "admin", "publish_date": "15/07/2025" }]"#,
        ))
        .mount(&server)
        .await;

    let news = fetcher(&server).fetch_news().await.unwrap();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].title, "Hello");
}

#[tokio::test]
async fn test_news_falls_back_to_rss() {
    let server = MockServer::start().await;
    let rss_url = format!("{}/feed.xml", server.uri());

    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(json_response(&format!(r#"{{ "rss": "{}" }}"#, rss_url)))
        .mount(&server)
        .await;
    // JSON endpoint keeps failing; 1 + 2 retries.
    Mock::given(method("GET"))
        .and(path("/launcher/news-launcher/news.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
                <channel>
                  <item>
                    <title>From RSS</title>
                    <content:encoded>Feed body</content:encoded>
                    <dc:creator>admin</dc:creator>
                    <pubDate>Tue, 15 Jul 2025 10:30:00 +0000</pubDate>
                  </item>
                </channel>
              </rss>"#,
            "application/rss+xml",
        ))
        .mount(&server)
        .await;

    let news = fetcher(&server).fetch_news().await.unwrap();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].title, "From RSS");
    assert_eq!(news[0].author, "admin");
}

#[tokio::test]
async fn test_news_local_file_is_last_resort() {
    let server = MockServer::start().await;
    // Config is down, so no RSS URL is known; the JSON endpoint is down
    // too. Only the local file can serve.
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/launcher/news-launcher/news.json"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("news.json");
    std::fs::write(
        &local,
        r#"[{ "title": "Offline note", "content": "cached", "author": "system", "publish_date": "2025-07-15" }]"#,
    )
    .unwrap();

    let fetcher = ManifestFetcher::with_policy(&server.uri(), test_policy())
        .unwrap()
        .with_local_news_path(local);

    let news = fetcher.fetch_news().await.unwrap();
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].title, "Offline note");
}

#[tokio::test]
async fn test_news_none_when_every_source_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/launcher/config-launcher/config.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/launcher/news-launcher/news.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let fetcher = ManifestFetcher::with_policy(&server.uri(), test_policy())
        .unwrap()
        .with_local_news_path(dir.path().join("missing.json"));

    assert!(fetcher.fetch_news().await.is_none());
}
