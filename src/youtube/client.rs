use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::app_config::YouTubeConfig;
use crate::errors::ApiError;

use super::duration::parse_iso8601_duration;
use super::{VideoDetails, VideoSource};

/// YouTube Data API v3 client
///
/// Keys are tried in configured order starting from the last one that
/// worked. A `quotaExceeded` response moves on to the next key; any other
/// error aborts the request.
pub struct YouTubeClient {
    client: Client,
    endpoint: String,
    api_keys: Vec<String>,
    active_key: AtomicUsize,
}

// @struct: search response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

// @struct: videos response
#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

// @struct: error envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ErrorReason {
    #[serde(default)]
    reason: String,
}

impl YouTubeClient {
    /// Create a client; `proxy` is an https proxy URL
    pub fn new(config: &YouTubeConfig, proxy: Option<&str>) -> Result<Self, ApiError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::https(proxy)
                .map_err(|e| ApiError::RequestFailed(format!("Invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_keys: config.api_keys.clone(),
            active_key: AtomicUsize::new(0),
        })
    }

    /// Index of the key the next request starts with
    pub fn active_key_index(&self) -> usize {
        self.active_key.load(Ordering::Relaxed)
    }

    /// GET `<endpoint>/<resource>` with key rotation
    async fn get<T>(&self, resource: &str, query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if self.api_keys.is_empty() {
            return Err(ApiError::RequestFailed("No API keys configured".to_string()));
        }

        let url = format!("{}/{}", self.endpoint, resource);
        let start = self.active_key_index();

        for offset in 0..self.api_keys.len() {
            let index = (start + offset) % self.api_keys.len();
            let key = &self.api_keys[index];

            let response = self
                .client
                .get(&url)
                .query(query)
                .query(&[("key", key.as_str())])
                .send()
                .await
                .map_err(|e| ApiError::RequestFailed(format!("{} request failed: {}", resource, e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::RequestFailed(format!("Failed to read {} response: {}", resource, e)))?;

            if status.is_success() {
                self.active_key.store(index, Ordering::Relaxed);
                return serde_json::from_str(&body).map_err(|e| ApiError::ParseError(e.to_string()));
            }

            if is_quota_exceeded(&body) {
                warn!("Quota exceeded for API key #{}, trying next key", index + 1);
                continue;
            }

            return Err(ApiError::Api {
                status_code: status.as_u16(),
                message: error_message(&body),
            });
        }

        Err(ApiError::QuotaExhausted)
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn recent_videos(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>, ApiError> {
        debug!("Fetching recent videos for channel {}", channel_id);
        let response: SearchResponse = self
            .get(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("channelId", channel_id.to_string()),
                    ("maxResults", max_results.to_string()),
                    ("order", "date".to_string()),
                    ("type", "video".to_string()),
                ],
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetails>, ApiError> {
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Fetching details for {}", video_ids.join(","));
        let response: VideosResponse = self
            .get(
                "videos",
                &[
                    ("part", "snippet,contentDetails".to_string()),
                    ("id", video_ids.join(",")),
                ],
            )
            .await?;

        response.items.into_iter().map(into_details).collect()
    }
}

fn into_details(item: VideoItem) -> Result<VideoDetails, ApiError> {
    Ok(VideoDetails {
        duration_secs: parse_iso8601_duration(&item.content_details.duration)?,
        video_id: item.id,
        title: item.snippet.title,
        description: item.snippet.description.lines().next().unwrap_or_default().to_string(),
        tags: item.snippet.tags,
    })
}

/// Whether an error body's first reason is `quotaExceeded`
fn is_quota_exceeded(body: &str) -> bool {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.errors.into_iter().next())
        .is_some_and(|r| r.reason == "quotaExceeded")
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) if !e.error.message.is_empty() => e.error.message,
        _ => body.trim().to_string(),
    }
}
