use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;
use log::info;
use serde::{Deserialize, Serialize};

use crate::app_config::ToolsConfig;
use crate::errors::ToolError;

use super::run_tool;

/// Subtitle font size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    /// Point size handed to the subtitle renderer
    pub fn points(&self) -> u32 {
        match self {
            Self::Small => 16,
            Self::Medium => 24,
            Self::Large => 32,
        }
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for FontSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(anyhow!("Invalid font size: {}", s)),
        }
    }
}

/// ffmpeg wrapper
#[derive(Debug, Clone)]
pub struct Burner {
    program: String,
    timeout_secs: u64,
}

impl Burner {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            program: config.ffmpeg_path.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Composite `subtitles` into the frames of `video`
    pub async fn burn_in(&self, video: &Path, subtitles: &Path, output: &Path, font_size: FontSize) -> Result<(), ToolError> {
        info!("Burning {} into {} ({} font)", subtitles.display(), video.display(), font_size);
        let filter = Self::subtitle_filter(subtitles, font_size);
        let (video, output) = (video.to_string_lossy(), output.to_string_lossy());

        run_tool(
            &self.program,
            [
                "-y",
                "-i",
                &*video,
                "-vf",
                filter.as_str(),
                "-c:a",
                "copy",
                &*output,
            ],
            self.timeout_secs,
        )
        .await?;
        Ok(())
    }

    /// Remux without subtitles
    pub async fn copy_streams(&self, video: &Path, output: &Path) -> Result<(), ToolError> {
        info!("No subtitles for {}, copying streams", video.display());
        let (video, output) = (video.to_string_lossy(), output.to_string_lossy());
        run_tool(
            &self.program,
            [
                "-y",
                "-i",
                &*video,
                "-c:a",
                "copy",
                "-c:v",
                "copy",
                &*output,
            ],
            self.timeout_secs,
        )
        .await?;
        Ok(())
    }

    /// `subtitles=` filter expression with the house style
    pub fn subtitle_filter(subtitles: &Path, font_size: FontSize) -> String {
        format!(
            "subtitles={}:force_style='FontName=Arial,FontSize={},PrimaryColour=&H00FF00&,OutlineColour=&H54000008&,BackColour=&H80000000&,BorderStyle=3,Outline=1'",
            escape_filter_path(subtitles),
            font_size.points()
        )
    }
}

/// Escape characters the filter graph parser treats specially
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
        .replace('=', "\\=")
        .replace(',', "\\,")
}
