//! Short drama listing from the wwzy video-list API.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::params::ShortVideoQuery;
use super::types::NormalizedItem;
use super::upstream::{get_json, json_to_string, json_to_string_or_empty, UpstreamError};
use crate::config::UpstreamEndpoint;

/// Upstream type id of the short drama category.
const SHORT_DRAMA_TYPE_ID: &str = "1";

#[derive(Debug, Deserialize)]
struct VodListResponse {
    list: Vec<VodItem>,
}

#[derive(Debug, Deserialize)]
struct VodItem {
    #[serde(default)]
    vod_id: Value,
    #[serde(default)]
    vod_name: Option<String>,
    #[serde(default)]
    vod_pic: Option<String>,
    #[serde(default)]
    vod_score: Value,
    #[serde(default)]
    vod_year: Value,
}

fn to_normalized_item(item: &VodItem) -> NormalizedItem {
    NormalizedItem {
        id: json_to_string(&item.vod_id),
        title: item.vod_name.clone().unwrap_or_default(),
        poster: item.vod_pic.clone().unwrap_or_default(),
        rate: json_to_string_or_empty(&item.vod_score),
        year: json_to_string_or_empty(&item.vod_year),
    }
}

pub struct ShortVideoClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ShortVideoClient {
    pub fn new(endpoint: &UpstreamEndpoint) -> Result<Self, UpstreamError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            timeout: endpoint.timeout(),
        })
    }

    pub async fn video_list(&self, query: &ShortVideoQuery) -> Result<Vec<NormalizedItem>, UpstreamError> {
        let url = format!("{}/api.php/provide/vod", self.base_url);
        debug!(url = %url, page = query.page, page_size = query.page_size, "Fetching short drama list");

        let request = self.http.get(&url).query(&[
            ("ac", "videolist".to_string()),
            ("pg", query.page.to_string()),
            ("pagesize", query.page_size.to_string()),
            ("t", SHORT_DRAMA_TYPE_ID.to_string()),
        ]);

        let response: VodListResponse = get_json(request, self.timeout).await?;
        Ok(response.list.iter().map(to_normalized_item).collect())
    }
}
