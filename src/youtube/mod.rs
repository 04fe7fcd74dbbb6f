/*!
 * Channel source: where the monitor learns about new uploads.
 *
 * - `client`: YouTube Data API v3 over reqwest, with API-key rotation
 * - `duration`: ISO-8601 duration parsing for `contentDetails.duration`
 */

pub mod client;
pub mod duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

pub use client::YouTubeClient;
pub use duration::parse_iso8601_duration;

/// What the monitor needs to know about one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    /// First line of the description only
    pub description: String,
    pub tags: Vec<String>,
    pub duration_secs: u64,
}

impl VideoDetails {
    /// Watch URL handed to the downloader
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Source of recent uploads per channel
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Most recent video ids of a channel, newest first
    async fn recent_videos(&self, channel_id: &str, max_results: u32) -> Result<Vec<String>, ApiError>;

    /// Details for the given ids; unknown ids are left out
    async fn video_details(&self, video_ids: &[String]) -> Result<Vec<VideoDetails>, ApiError>;
}
