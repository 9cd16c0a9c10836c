//! Douban "recent hot" listing, used for ordinary movie and TV categories.

use regex::Regex;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use super::params::GeneralQuery;
use super::types::NormalizedItem;
use super::upstream::{get_json, json_to_string, UpstreamError};
use crate::config::UpstreamEndpoint;

// Douban rejects requests that do not look like they come from its own site.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const REFERER: &str = "https://movie.douban.com/";
const ACCEPT: &str = "application/json, text/plain, */*";
const ORIGIN: &str = "https://movie.douban.com";

#[derive(Debug, Deserialize)]
struct RecentHotResponse {
    items: Vec<RecentHotItem>,
}

#[derive(Debug, Deserialize)]
struct RecentHotItem {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    card_subtitle: Option<String>,
    #[serde(default)]
    pic: Option<Pic>,
    #[serde(default)]
    rating: Option<Rating>,
}

#[derive(Debug, Deserialize)]
struct Pic {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    normal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Rating {
    #[serde(default)]
    value: Option<f64>,
}

static YEAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn year_pattern() -> &'static Regex {
    YEAR_PATTERN.get_or_init(|| Regex::new(r"[0-9]{4}").expect("valid year regex"))
}

/// First run of four digits in a subtitle like "美国 / 2021 / 剧情".
fn extract_year(subtitle: &str) -> String {
    year_pattern()
        .find(subtitle)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// One decimal place, rounding exact halves away from zero. Only values
/// ending in .x5 that are exact in binary (x.25, x.75) are halves; the rest
/// already format correctly from their exact binary value.
fn to_fixed_1(value: f64) -> String {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return format!("{:.1}", (value * 10.0).round() / 10.0);
    }
    format!("{:.1}", value)
}

fn format_rating(rating: Option<&Rating>) -> String {
    match rating.and_then(|r| r.value) {
        Some(value) if value != 0.0 => to_fixed_1(value),
        _ => String::new(),
    }
}

fn poster_url(pic: Option<&Pic>) -> String {
    let Some(pic) = pic else {
        return String::new();
    };
    [pic.normal.as_deref(), pic.large.as_deref()]
        .into_iter()
        .flatten()
        .find(|url| !url.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn to_normalized_item(item: &RecentHotItem) -> NormalizedItem {
    NormalizedItem {
        id: json_to_string(&item.id),
        title: item.title.clone().unwrap_or_default(),
        poster: poster_url(item.pic.as_ref()),
        rate: format_rating(item.rating.as_ref()),
        year: item
            .card_subtitle
            .as_deref()
            .map(extract_year)
            .unwrap_or_default(),
    }
}

pub struct DoubanClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl DoubanClient {
    pub fn new(endpoint: &UpstreamEndpoint) -> Result<Self, UpstreamError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            timeout: endpoint.timeout(),
        })
    }

    pub async fn recent_hot(&self, query: &GeneralQuery) -> Result<Vec<NormalizedItem>, UpstreamError> {
        let url = format!("{}/subject/recent_hot/{}", self.base_url, query.kind.as_str());
        debug!(
            url = %url,
            start = query.start,
            limit = query.limit,
            category = %query.category,
            "Fetching Douban recent hot"
        );

        let request = self
            .http
            .get(&url)
            .query(&[
                ("start", query.start.to_string()),
                ("limit", query.limit.to_string()),
                ("category", query.category.clone()),
                ("type", query.item_type.clone()),
            ])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::REFERER, REFERER)
            .header(header::ACCEPT, ACCEPT)
            .header(header::ORIGIN, ORIGIN);

        let response: RecentHotResponse = get_json(request, self.timeout).await?;
        Ok(response.items.iter().map(to_normalized_item).collect())
    }
}
