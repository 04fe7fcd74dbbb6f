/*!
 * # bisub - bilingual subtitle merging and burn-in
 *
 * A Rust library that turns two single-language caption tracks of the same
 * video into one bilingual track, and drives the download and burn-in
 * pipeline around it.
 *
 * ## Features
 *
 * - Parse and write SRT timed-text tracks
 * - Remove lines auto-captioning repeats from preceding cues
 * - Merge two tracks over their combined time breakpoints
 * - Stretch a too-short first cue so it stays readable
 * - Ordered literal text replacement before merging
 * - Channel monitoring through the YouTube Data API with key rotation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Cue and track model, SRT codec
 * - `merge`: The merge engine:
 *   - `merge::dedup`: Rolling-window line deduplication
 *   - `merge::interval`: Breakpoint sweep merge
 *   - `merge::timing`: First-cue timing correction
 * - `sanitize`: Text replacement rules
 * - `tools`: yt-dlp and ffmpeg collaborators
 * - `youtube`: Channel source and duration parsing
 * - `database`: Store of already-processed videos
 * - `app_config`: Configuration management
 * - `app_controller`: Per-video workflow and channel monitor
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod merge;
pub mod sanitize;
pub mod tools;
pub mod youtube;
pub mod database;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use merge::{MergeEngine, MergeOutcome, MergeSettings};
pub use subtitle_processor::{Cue, Track};
pub use errors::{ApiError, AppError, SubtitleError, ToolError};
