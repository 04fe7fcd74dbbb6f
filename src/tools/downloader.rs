use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app_config::{SubtitleLanguages, ToolsConfig};
use crate::errors::ToolError;
use crate::file_utils::FileManager;

use super::run_tool;

/// Language suffix of the primary (English) caption file
pub const PRIMARY_LANGUAGE: &str = "en";

/// Secondary caption suffixes in order of preference
pub const SECONDARY_LANGUAGES: [&str; 2] = ["zh-Hans", "zh-Hans-en"];

/// yt-dlp wrapper
#[derive(Debug, Clone)]
pub struct Downloader {
    program: String,
    timeout_secs: u64,
}

impl Downloader {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            program: config.yt_dlp_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Title of the video behind `url`
    pub async fn video_title(&self, url: &str) -> Result<String, ToolError> {
        let output = run_tool(&self.program, ["--get-title", url], self.timeout_secs).await?;
        let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if title.is_empty() {
            return Err(ToolError::Failed {
                tool: self.program.clone(),
                message: format!("no title returned for {}", url),
            });
        }
        Ok(title)
    }

    /// Fetch auto-generated captions as `<dir>/<stem>.<lang>.srt`
    pub async fn download_subtitles(
        &self,
        url: &str,
        dir: &Path,
        stem: &str,
        languages: SubtitleLanguages,
    ) -> Result<(), ToolError> {
        let Some(sub_lang) = languages.sub_lang_arg() else {
            debug!("No caption languages requested for {}", url);
            return Ok(());
        };

        let template = output_template(dir, stem);
        info!("Downloading {} captions for {}", sub_lang, url);
        run_tool(
            &self.program,
            [
                "--write-auto-subs",
                "--skip-download",
                "--sub-lang",
                sub_lang,
                "--convert-subs",
                "srt",
                "-o",
                template.as_str(),
                url,
            ],
            self.timeout_secs,
        )
        .await?;
        Ok(())
    }

    /// Download the video as `<dir>/<stem>.mp4`, capped at 1080p
    pub async fn download_video(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf, ToolError> {
        let template = output_template(dir, stem);
        info!("Downloading video {}", url);
        run_tool(
            &self.program,
            [
                "-f",
                "bestvideo[height<=1080]+bestaudio/best[height<=1080]",
                "--merge-output-format",
                "mp4",
                "-o",
                template.as_str(),
                url,
            ],
            self.timeout_secs,
        )
        .await?;
        Ok(FileManager::artifact_path(dir, stem, "mp4"))
    }

    /// Download the thumbnail as `<dir>/<stem>.<extension>`. Failure is logged
    /// and reported as `false`.
    pub async fn download_thumbnail(&self, url: &str, dir: &Path, stem: &str, extension: &str) -> bool {
        let template = output_template(dir, stem);
        let result = run_tool(
            &self.program,
            [
                "--write-thumbnail",
                "--convert-thumbnails",
                extension,
                "--skip-download",
                "-o",
                template.as_str(),
                url,
            ],
            self.timeout_secs,
        )
        .await;

        match result {
            Ok(_) => {
                debug!("Thumbnail saved for {}", url);
                true
            }
            Err(e) => {
                warn!("Failed to download thumbnail for {}: {}", url, e);
                false
            }
        }
    }

    /// Conventional path of the primary caption file
    pub fn primary_subtitle_path(dir: &Path, stem: &str) -> PathBuf {
        FileManager::subtitle_path(dir, stem, PRIMARY_LANGUAGE)
    }

    /// Secondary caption file: the first preferred language that exists,
    /// otherwise the last candidate
    pub fn secondary_subtitle_path(dir: &Path, stem: &str) -> PathBuf {
        SECONDARY_LANGUAGES
            .iter()
            .map(|lang| FileManager::subtitle_path(dir, stem, lang))
            .find(|path| path.is_file())
            .unwrap_or_else(|| FileManager::subtitle_path(dir, stem, SECONDARY_LANGUAGES[1]))
    }

    /// Where the merged track is written
    pub fn merged_subtitle_path(dir: &Path, stem: &str) -> PathBuf {
        FileManager::artifact_path(dir, stem, "merged_subtitles.srt")
    }
}

/// yt-dlp output template that yields `<stem>.<ext>` (and `<stem>.<lang>.srt`)
fn output_template(dir: &Path, stem: &str) -> String {
    dir.join(format!("{}.%(ext)s", stem)).to_string_lossy().into_owned()
}
