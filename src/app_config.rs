use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use log::warn;

use crate::merge::{default_dedup_window, default_target_min_duration_ms, MergeSettings};
use crate::sanitize::SanitizeRule;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory where downloads and outputs are written
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// Optional HTTPS proxy for API calls
    #[serde(default)]
    pub proxy: Option<String>,

    /// Platform API settings
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Channel lists selectable by 1-based index
    #[serde(default)]
    pub channel_lists: Vec<ChannelList>,

    /// Subtitle fetch and merge settings
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Channel monitor settings
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// YouTube Data API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct YouTubeConfig {
    // @field: Keys tried in order when one runs out of quota
    #[serde(default)]
    pub api_keys: Vec<String>,

    // @field: API base URL
    #[serde(default = "default_api_endpoint")]
    pub endpoint: String,

    // @field: Recent uploads fetched per channel
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    // @field: Timeout seconds
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            endpoint: default_api_endpoint(),
            max_results: default_max_results(),
            timeout_secs: default_api_timeout_secs(),
        }
    }
}

/// A named list of channels monitored together
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChannelList {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// A single monitored channel
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Channel {
    pub channel_id: String,
    pub name: String,
}

/// Which caption languages to request from the downloader
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleLanguages {
    /// No captions, the video is only copied
    None,
    /// Simplified Chinese only
    ChineseOnly,
    /// English plus simplified Chinese
    #[default]
    Bilingual,
    /// English only
    EnglishOnly,
}

impl SubtitleLanguages {
    /// Map the numeric preset used on the command line (0-3)
    pub fn from_preset(preset: u8) -> Result<Self> {
        match preset {
            0 => Ok(Self::None),
            1 => Ok(Self::ChineseOnly),
            2 => Ok(Self::Bilingual),
            3 => Ok(Self::EnglishOnly),
            _ => Err(anyhow!("Invalid subtitle language preset: {} (expected 0-3)", preset)),
        }
    }

    /// Value passed to yt-dlp --sub-lang
    pub fn sub_lang_arg(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ChineseOnly => Some("zh-Hans,zh-Hans-en"),
            Self::Bilingual => Some("en,zh-Hans,zh-Hans-en"),
            Self::EnglishOnly => Some("en"),
        }
    }
}

/// Configuration for subtitle processing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Caption languages to fetch
    #[serde(default)]
    pub languages: SubtitleLanguages,

    /// Whether to apply the sanitize rules before merging
    #[serde(default = "default_true")]
    pub censor: bool,

    /// Intervals at most this wide are dropped by the merger
    #[serde(default)]
    pub min_gap_ms: u64,

    /// Minimum duration of the first visible cue
    #[serde(default = "default_target_min_duration_ms")]
    pub target_min_duration_ms: u64,

    /// Preceding cues consulted by the deduplicator
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,

    /// Ordered replacement rules
    #[serde(default)]
    pub sanitize_rules: Vec<SanitizeRule>,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            languages: SubtitleLanguages::default(),
            censor: true,
            min_gap_ms: 0,
            target_min_duration_ms: default_target_min_duration_ms(),
            dedup_window: default_dedup_window(),
            sanitize_rules: Vec::new(),
        }
    }
}

impl SubtitleConfig {
    /// Settings for the merge engine
    pub fn merge_settings(&self) -> MergeSettings {
        MergeSettings {
            min_gap_ms: self.min_gap_ms,
            target_min_duration_ms: self.target_min_duration_ms,
            dedup_window: self.dedup_window,
        }
    }
}

/// External binaries
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolsConfig {
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: String,

    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: default_yt_dlp_path(),
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Channel monitor behaviour
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    /// Channel workflows running at the same time
    #[serde(default = "default_max_concurrent_channels")]
    pub max_concurrent_channels: usize,

    /// Pause between polling rounds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Longer videos are skipped
    #[serde(default = "default_max_video_length_minutes")]
    pub max_video_length_minutes: u64,

    /// Videos shorter than this get the small font
    #[serde(default = "default_short_video_secs")]
    pub short_video_secs: u64,

    /// Processed-video database; defaults to the user data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_channels: default_max_concurrent_channels(),
            poll_interval_secs: default_poll_interval_secs(),
            max_video_length_minutes: default_max_video_length_minutes(),
            short_video_secs: default_short_video_secs(),
            database_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_api_endpoint() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_max_results() -> u32 {
    10
}

fn default_api_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_yt_dlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    1800 // downloads of long videos can be slow
}

fn default_max_concurrent_channels() -> usize {
    3
}

fn default_poll_interval_secs() -> u64 {
    4 * 3600
}

fn default_max_video_length_minutes() -> u64 {
    15
}

fn default_short_video_secs() -> u64 {
    240
}

impl Config {
    /// Load a configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.subtitles.dedup_window == 0 {
            return Err(anyhow!("subtitles.dedup_window must be at least 1"));
        }
        if self.subtitles.target_min_duration_ms == 0 {
            return Err(anyhow!("subtitles.target_min_duration_ms must be positive"));
        }
        if self.monitor.max_concurrent_channels == 0 {
            return Err(anyhow!("monitor.max_concurrent_channels must be at least 1"));
        }
        if self.monitor.poll_interval_secs == 0 {
            return Err(anyhow!("monitor.poll_interval_secs must be positive"));
        }

        for list in &self.channel_lists {
            if let Some(channel) = list.channels.iter().find(|c| c.channel_id.trim().is_empty()) {
                return Err(anyhow!(
                    "Channel '{}' in list '{}' has an empty channel_id",
                    channel.name, list.name
                ));
            }
        }

        Ok(())
    }

    /// Channel list by 1-based index
    pub fn channel_list(&self, index: usize) -> Result<&ChannelList> {
        index
            .checked_sub(1)
            .and_then(|i| self.channel_lists.get(i))
            .ok_or_else(|| anyhow!(
                "Channel list {} does not exist ({} configured)",
                index,
                self.channel_lists.len()
            ))
    }

    /// Use the given keys when the config file has none
    pub fn with_fallback_api_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        if self.youtube.api_keys.is_empty() {
            self.youtube.api_keys = keys.into_iter().filter(|k| !k.trim().is_empty()).collect();
        }
        self
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            work_dir: default_work_dir(),
            proxy: None,
            youtube: YouTubeConfig::default(),
            channel_lists: Vec::new(),
            subtitles: SubtitleConfig::default(),
            tools: ToolsConfig::default(),
            monitor: MonitorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
