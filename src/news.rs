use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One news entry, as served by the JSON news endpoint and the local
/// fallback file. RSS items are converted into this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub author: String,

    /// Kept as the raw string; the server has shipped `DD/MM/YYYY`,
    /// RFC 2822 (from RSS) and ISO dates over time.
    #[serde(default)]
    pub publish_date: String,

    #[serde(default)]
    pub link: Option<String>,
}

/// Parses the known publish-date formats.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(raw) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day number and month abbreviation for the news card header.
pub fn display_date(raw: &str) -> Option<(u32, &'static str)> {
    let date = parse_publish_date(raw)?;
    Some((date.day(), MONTHS[date.month0() as usize]))
}

// RSS 2.0 document shape. quick-xml strips namespace prefixes from element
// names, so `content:encoded` and `dc:creator` are matched without them.

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(default, rename = "item")]
    items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: String,

    #[serde(default, rename = "encoded")]
    content: String,

    #[serde(default, rename = "creator")]
    creator: String,

    #[serde(default, rename = "pubDate")]
    pub_date: String,

    #[serde(default)]
    link: Option<String>,
}

impl From<RssItem> for NewsItem {
    fn from(item: RssItem) -> Self {
        NewsItem {
            title: item.title,
            content: item.content,
            author: item.creator,
            publish_date: item.pub_date,
            link: item.link,
        }
    }
}

/// Decodes an RSS feed body into news items. A channel with a single
/// `<item>` decodes the same as one with many.
pub fn decode_rss(xml: &str) -> Result<Vec<NewsItem>> {
    let document: RssDocument = quick_xml::de::from_str(xml)?;
    Ok(document
        .channel
        .items
        .into_iter()
        .map(NewsItem::from)
        .collect())
}

/// Reads the on-disk fallback news file (`data/news.json`), the last
/// resort when both remote sources are exhausted.
pub fn load_local_news(path: &Path) -> Result<Vec<NewsItem>> {
    let content = std::fs::read_to_string(path)?;
    let items: Vec<NewsItem> = serde_json::from_str(&content)?;
    Ok(items)
}
