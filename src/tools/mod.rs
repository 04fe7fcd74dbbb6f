/*!
 * External command-line collaborators.
 *
 * - `downloader`: yt-dlp for titles, captions, thumbnails and video
 * - `burner`: ffmpeg for compositing subtitles into frames
 */

pub mod burner;
pub mod downloader;

use std::ffi::OsStr;
use std::process::Output;
use std::time::Duration;

use log::debug;
use tokio::process::Command;

use crate::errors::ToolError;

pub use burner::{Burner, FontSize};
pub use downloader::Downloader;

/// Run a tool to completion, failing on timeout or non-zero exit
pub(crate) async fn run_tool<I, S>(program: &str, args: I, timeout_secs: u64) -> Result<Output, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args).kill_on_drop(true);
    debug!("Running {:?}", command.as_std());

    let timeout_duration = Duration::from_secs(timeout_secs);
    let output = tokio::select! {
        result = command.output() => {
            result.map_err(|e| ToolError::Launch {
                tool: program.to_string(),
                message: e.to_string(),
            })?
        },
        _ = tokio::time::sleep(timeout_duration) => {
            return Err(ToolError::Timeout {
                tool: program.to_string(),
                secs: timeout_secs,
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::Failed {
            tool: program.to_string(),
            message: filter_stderr(&stderr),
        });
    }

    Ok(output)
}

/// Keep only meaningful stderr lines, stripping ffmpeg banner and stream
/// metadata noise and yt-dlp progress lines.
pub(crate) fn filter_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "[download]",
        "[info]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
