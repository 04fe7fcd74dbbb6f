/*!
 * Error types for the bisub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while loading, merging or saving subtitle tracks
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The timed-text file could not be parsed
    #[error("Malformed subtitle track at line {line}: {reason}")]
    MalformedTrack {
        /// 1-based line number in the source file
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Reading or writing a track file failed
    #[error("Subtitle file error: {0}")]
    Io(String),
}

impl From<std::io::Error> for SubtitleError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Errors raised by the external command-line collaborators (yt-dlp, ffmpeg)
#[derive(Error, Debug)]
pub enum ToolError {
    /// The binary could not be started at all
    #[error("Failed to launch {tool}: {message}")]
    Launch { tool: String, message: String },

    /// The binary ran but exited unsuccessfully
    #[error("{tool} failed: {message}")]
    Failed { tool: String, message: String },

    /// The binary did not finish in time
    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },
}

/// Errors that can occur when talking to the video platform API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Every configured API key hit its quota
    #[error("All API keys exhausted their quota")]
    QuotaExhausted,

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from an external tool
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Error from the platform API
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
