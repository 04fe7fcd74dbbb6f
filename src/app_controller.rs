use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::app_config::{Channel, Config, SubtitleLanguages};
use crate::database::{DatabaseConnection, ProcessedVideo, Repository};
use crate::file_utils::FileManager;
use crate::merge::{MergeEngine, MergeOutcome};
use crate::sanitize::Sanitizer;
use crate::tools::{Burner, Downloader, FontSize};
use crate::youtube::{VideoDetails, VideoSource, YouTubeClient};

// @module: Application controller for the download, merge and burn-in workflow

/// Extension of the thumbnail written next to the video
const THUMBNAIL_EXTENSION: &str = "jpg";

/// Metadata written next to each processed video as `<stem>.txt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    pub channel_name: String,
}

impl VideoMetadata {
    /// Metadata for a video: the description becomes
    /// `<title> <first description line> #tag1 #tag2`
    pub fn from_details(details: &VideoDetails, channel_name: &str) -> Self {
        let tags = details
            .tags
            .iter()
            .map(|tag| format!("#{}", tag.replace(' ', "")))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            title: details.title.clone(),
            description: format!("{} {} {}", details.title, details.description, tags),
            channel_name: channel_name.to_string(),
        }
    }
}

/// Counters for one monitoring round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub channels: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MonitorReport {
    fn absorb(&mut self, other: MonitorReport) {
        self.channels += other.channels;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    downloader: Downloader,
    burner: Burner,
    engine: MergeEngine,
    sanitizer: Sanitizer,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let sanitizer = Sanitizer::new(&config.subtitles.sanitize_rules)
            .context("Failed to compile sanitize rules")?;

        Ok(Self {
            downloader: Downloader::new(&config.tools),
            burner: Burner::new(&config.tools),
            engine: MergeEngine::new(config.subtitles.merge_settings()),
            sanitizer,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }

    /// Font size category for a video of the given length
    pub fn font_size_for(&self, duration_secs: u64) -> FontSize {
        if duration_secs < self.config.monitor.short_video_secs {
            FontSize::Small
        } else {
            FontSize::Medium
        }
    }

    /// Final path of a video without downloading anything
    pub async fn output_path_for(&self, url: &str) -> Result<PathBuf> {
        let title = self.downloader.video_title(url).await?;
        let stem = FileManager::sanitize_file_stem(&title);
        Ok(FileManager::artifact_path(self.work_dir(), &stem, "mp4"))
    }

    /// Download one video with bilingual subtitles burned in.
    ///
    /// Returns the path of `<stem>.mp4` in the work directory. Every
    /// intermediate `.srt` is removed afterwards.
    pub async fn process_video(&self, url: &str, languages: SubtitleLanguages, font_size: FontSize) -> Result<PathBuf> {
        let start_time = std::time::Instant::now();
        let dir = self.work_dir().to_path_buf();
        FileManager::ensure_dir(&dir)?;

        let title = self
            .downloader
            .video_title(url)
            .await
            .with_context(|| format!("Failed to look up title of {}", url))?;
        let stem = FileManager::sanitize_file_stem(&title);
        info!("Processing '{}' as {}", title, stem);

        let stale = FileManager::remove_subtitle_artifacts(&dir, &stem)?;
        let final_path = FileManager::artifact_path(&dir, &stem, "mp4");
        if FileManager::remove_if_exists(&final_path)? || stale > 0 {
            debug!("Removed stale artifacts of {}", stem);
        }

        let merged_path = Downloader::merged_subtitle_path(&dir, &stem);
        if languages != SubtitleLanguages::None {
            self.downloader
                .download_subtitles(url, &dir, &stem, languages)
                .await
                .context("Failed to download subtitles")?;
            self.merge_captions(&dir, &stem, &merged_path)?;
        }

        self.downloader
            .download_thumbnail(url, &dir, &stem, THUMBNAIL_EXTENSION)
            .await;
        let video_path = self
            .downloader
            .download_video(url, &dir, &stem)
            .await
            .context("Failed to download video")?;

        let subbed_path = FileManager::artifact_path(&dir, &stem, "subbed.mp4");
        if merged_path.is_file() {
            self.burner
                .burn_in(&video_path, &merged_path, &subbed_path, font_size)
                .await
                .context("Failed to burn in subtitles")?;
        } else {
            warn!("No merged subtitles for {}, copying video without burn-in", stem);
            self.burner
                .copy_streams(&video_path, &subbed_path)
                .await
                .context("Failed to copy video streams")?;
        }

        FileManager::remove_subtitle_artifacts(&dir, &stem)?;
        FileManager::rename_file(&subbed_path, &final_path)?;

        info!(
            "Finished {} in {:.1}s",
            final_path.display(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(final_path)
    }

    /// Sanitise (when enabled) and merge the downloaded caption files
    fn merge_captions(&self, dir: &Path, stem: &str, merged_path: &Path) -> Result<MergeOutcome> {
        let primary = Downloader::primary_subtitle_path(dir, stem);
        let secondary = Downloader::secondary_subtitle_path(dir, stem);

        if self.config.subtitles.censor && !self.sanitizer.is_empty() {
            for path in [&primary, &secondary] {
                if path.is_file() {
                    self.sanitizer.sanitize_file(path)?;
                }
            }
        }

        let outcome = self
            .engine
            .merge_files(&primary, &secondary, merged_path)
            .with_context(|| format!("Failed to merge subtitles of {}", stem))?;
        debug!("Merge outcome for {}: {:?}", stem, outcome);
        Ok(outcome)
    }

    /// Watch a configured channel list (1-based), processing new uploads.
    ///
    /// Runs until interrupted, or for a single round when `once` is set.
    pub async fn monitor(&self, list_index: usize, once: bool) -> Result<()> {
        let source = YouTubeClient::new(&self.config.youtube, self.config.proxy.as_deref())?;
        let store = match &self.config.monitor.database_path {
            Some(path) => Repository::new(DatabaseConnection::new(path)?),
            None => Repository::new_default()?,
        };

        loop {
            let report = self.monitor_round(&source, &store, list_index).await?;
            info!(
                "Round complete: {} channel(s), {} processed, {} skipped, {} failed",
                report.channels, report.processed, report.skipped, report.failed
            );

            if once {
                return Ok(());
            }

            let pause = Duration::from_secs(self.config.monitor.poll_interval_secs);
            debug!("Sleeping {}s until the next round", pause.as_secs());
            tokio::time::sleep(pause).await;
        }
    }

    /// One polling round over every channel of a list
    pub async fn monitor_round(
        &self,
        source: &dyn VideoSource,
        store: &Repository,
        list_index: usize,
    ) -> Result<MonitorReport> {
        let list = self.config.channel_list(list_index)?;
        info!("Checking {} channel(s) of list '{}'", list.channels.len(), list.name);

        let multi_progress = MultiProgress::new();
        let concurrency = self.config.monitor.max_concurrent_channels.max(1);
        let semaphore = Semaphore::new(concurrency);

        let reports: Vec<MonitorReport> = stream::iter(list.channels.iter())
            .map(|channel| {
                let semaphore = &semaphore;
                let multi_progress = &multi_progress;
                async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            error!("Channel semaphore closed: {}", e);
                            return MonitorReport { channels: 1, ..Default::default() };
                        }
                    };

                    match self.process_channel(source, store, channel, multi_progress).await {
                        Ok(report) => report,
                        Err(e) => {
                            error!("Channel '{}' failed: {:#}", channel.name, e);
                            MonitorReport { channels: 1, failed: 1, ..Default::default() }
                        }
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut total = MonitorReport::default();
        for report in reports {
            total.absorb(report);
        }
        Ok(total)
    }

    async fn process_channel(
        &self,
        source: &dyn VideoSource,
        store: &Repository,
        channel: &Channel,
        multi_progress: &MultiProgress,
    ) -> Result<MonitorReport> {
        debug!("Monitoring channel {} ({})", channel.name, channel.channel_id);
        let mut report = MonitorReport { channels: 1, ..Default::default() };

        let ids = source
            .recent_videos(&channel.channel_id, self.config.youtube.max_results)
            .await
            .with_context(|| format!("Failed to list videos of {}", channel.name))?;
        let videos = source
            .video_details(&ids)
            .await
            .with_context(|| format!("Failed to fetch video details for {}", channel.name))?;
        debug!("{} video(s) fetched for {}", videos.len(), channel.name);

        let progress_bar = multi_progress.add(ProgressBar::new(videos.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message(channel.name.clone());

        for video in &videos {
            match self.process_listed_video(store, video, &channel.name).await {
                Ok(true) => report.processed += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    error!("Failed to process '{}': {:#}", video.title, e);
                    report.failed += 1;
                }
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message(format!("{} done", channel.name));
        Ok(report)
    }

    /// Returns whether the video was processed now
    async fn process_listed_video(&self, store: &Repository, video: &VideoDetails, channel_name: &str) -> Result<bool> {
        let url = video.url();

        if store.is_processed(&video.video_id).await? {
            match self.output_path_for(&url).await {
                Ok(path) if path.exists() => debug!("Already processed: {}", path.display()),
                Ok(path) => debug!("Already processed, output no longer present: {}", path.display()),
                Err(e) => debug!("Already processed {}, path lookup failed: {}", video.video_id, e),
            }
            return Ok(false);
        }

        let max_secs = self.config.monitor.max_video_length_minutes * 60;
        if video.duration_secs > max_secs {
            debug!(
                "Skipping '{}' ({} minutes)",
                video.title,
                video.duration_secs / 60
            );
            return Ok(false);
        }

        let font_size = self.font_size_for(video.duration_secs);
        debug!(
            "Video {}: {}s, font size {}",
            video.video_id, video.duration_secs, font_size
        );

        let output = self
            .process_video(&url, self.config.subtitles.languages, font_size)
            .await?;

        store
            .mark_processed(ProcessedVideo::new(
                video.video_id.clone(),
                video.title.clone(),
                output.to_string_lossy(),
            ))
            .await?;

        let metadata_path = output.with_extension("txt");
        if let Err(e) = Self::write_metadata(&metadata_path, &VideoMetadata::from_details(video, channel_name)) {
            warn!("Failed to write metadata for '{}': {:#}", video.title, e);
        }

        Ok(true)
    }

    /// Write metadata JSON
    pub fn write_metadata(path: &Path, metadata: &VideoMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
        FileManager::write_to_file(path, &json)
    }
}
