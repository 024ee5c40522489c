//! URL metadata fetching
//!
//! Auto-names URL items: page title when the site is reachable, a
//! capitalized domain otherwise. Non-URL values are used verbatim.

use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// Derive a display name for an item value.
pub async fn item_name(value: &str) -> String {
    match normalize_url(value) {
        Some(url) => match fetch_title(url.as_str()).await {
            Some(title) => title,
            None => domain_name(&url).unwrap_or_else(|| value.to_string()),
        },
        None => value.to_string(),
    }
}

/// Parse a value as a URL, accepting bare domains like "example.com".
pub fn normalize_url(value: &str) -> Option<Url> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Url::parse(value).ok();
    }
    if looks_like_domain(value) {
        return Url::parse(&format!("https://{}", value)).ok();
    }
    None
}

fn looks_like_domain(value: &str) -> bool {
    let host = value.split('/').next().unwrap_or("");
    host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Capitalized first label of the domain ("www.example.com" -> "Example").
fn domain_name(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    let label = host.split('.').next()?;
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().collect::<String>() + chars.as_str())
}

/// Fetch the page title (graceful degradation: `None` on any failure).
async fn fetch_title(url: &str) -> Option<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT))
        .user_agent("Mozilla/5.0 (compatible; Wallet/0.1)")
        .build()
        .ok()?;

    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }

    let html = response.text().await.ok()?;
    parse_title(&html)
}

/// Parse a title from HTML content
fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    // Try og:title first
    if let Some(og_title) = extract_meta_content(&document, "og:title") {
        return Some(og_title);
    }

    // Fall back to <title> tag
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract content from a meta tag by property or name
fn extract_meta_content(document: &Html, property: &str) -> Option<String> {
    for attr in ["property", "name"] {
        let selector = format!(r#"meta[{}="{}"]"#, attr, property);
        if let Some(selector) = Selector::parse(&selector).ok() {
            if let Some(el) = document.select(&selector).next() {
                if let Some(content) = el.value().attr("content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            }
        }
    }

    None
}
