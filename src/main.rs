// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, LevelFilter, Level, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use bisub::app_config::{self, Config, SubtitleLanguages};
use bisub::merge::{MergeEngine, MergeOutcome};
use bisub::tools::FontSize;
use bisub::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for FontSize to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFontSize {
    Small,
    Medium,
    Large,
}

impl From<CliFontSize> for FontSize {
    fn from(size: CliFontSize) -> Self {
        match size {
            CliFontSize::Small => FontSize::Small,
            CliFontSize::Medium => FontSize::Medium,
            CliFontSize::Large => FontSize::Large,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge two local subtitle tracks into one bilingual track
    Merge {
        /// Primary track (shown first in each cue)
        #[arg(value_name = "PRIMARY")]
        primary: PathBuf,

        /// Secondary track
        #[arg(value_name = "SECONDARY")]
        secondary: PathBuf,

        /// Output track
        #[arg(short, long)]
        output: PathBuf,

        /// Drop merged intervals at most this wide
        #[arg(long)]
        min_gap_ms: Option<u64>,

        /// Minimum duration of the first visible cue
        #[arg(long)]
        min_duration_ms: Option<u64>,
    },

    /// Remove repeated caption lines from a track in place
    Dedup {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Download a video and burn bilingual subtitles into it
    Process {
        /// Video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Caption preset: 0 none, 1 Chinese, 2 English + Chinese, 3 English
        #[arg(short = 'L', long, value_parser = clap::value_parser!(u8).range(0..=3))]
        languages: Option<u8>,

        /// Subtitle font size
        #[arg(short, long, value_enum, default_value = "medium")]
        font_size: CliFontSize,
    },

    /// Watch a configured channel list for new uploads
    Monitor {
        /// 1-based index into channel_lists
        #[arg(value_name = "LIST")]
        list: usize,

        /// Run a single polling round and exit
        #[arg(long)]
        once: bool,

        /// Do not apply the sanitize rules
        #[arg(long)]
        skip_censor: bool,

        /// Skip videos longer than this many minutes
        #[arg(long)]
        max_video_length: Option<u64>,

        /// Primary API key (when the config has none)
        #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Secondary API key (when the config has none)
        #[arg(long, env = "YOUTUBE_API_KEY_2", hide_env_values = true)]
        api_key_2: Option<String>,
    },

    /// Generate shell completions for bisub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// bisub - bilingual subtitle merging and burn-in
///
/// Fetches English and Chinese auto-captions, merges them into one
/// bilingual track and burns it into the video.
#[derive(Parser, Debug)]
#[command(name = "bisub")]
#[command(version)]
#[command(about = "Bilingual subtitle merger and burn-in pipeline")]
#[command(long_about = "bisub merges two single-language subtitle tracks into one bilingual track.

EXAMPLES:
    bisub merge a.en.srt a.zh-Hans.srt -o a.merged.srt   # Merge local tracks
    bisub dedup a.en.srt                                 # Remove repeated caption lines
    bisub process https://youtu.be/xyz -f small          # Download, merge and burn in
    bisub monitor 1 --once                               # One round over channel list 1
    bisub completions bash > bisub.bash                  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The boxed logger accepts everything; set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    // Completions need no configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "bisub", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Commands::Merge { primary, secondary, output, min_gap_ms, min_duration_ms } => {
            let mut settings = config.subtitles.merge_settings();
            if let Some(gap) = min_gap_ms {
                settings.min_gap_ms = gap;
            }
            if let Some(duration) = min_duration_ms {
                settings.target_min_duration_ms = duration;
            }
            config.validate().context("Configuration validation failed")?;

            let outcome = MergeEngine::new(settings)
                .merge_files(&primary, &secondary, &output)
                .context("Merge failed")?;
            match outcome {
                MergeOutcome::Merged { cues } => info!("Wrote {} merged cues to {}", cues, output.display()),
                MergeOutcome::Renamed { from, cues } => {
                    info!("Moved {} ({} cues) to {}", from.display(), cues, output.display())
                }
                MergeOutcome::NoInput => anyhow::bail!(
                    "Neither {} nor {} exists",
                    primary.display(),
                    secondary.display()
                ),
            }
        }
        Commands::Dedup { file } => {
            config.validate().context("Configuration validation failed")?;
            let removed = MergeEngine::new(config.subtitles.merge_settings())
                .deduplicate_file(&file)
                .with_context(|| format!("Failed to deduplicate {}", file.display()))?;
            info!("Removed {} repeated line(s) from {}", removed, file.display());
        }
        Commands::Process { url, languages, font_size } => {
            let languages = match languages {
                Some(preset) => SubtitleLanguages::from_preset(preset)?,
                None => config.subtitles.languages,
            };
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            let output = controller.process_video(&url, languages, font_size.into()).await?;
            info!("Saved {}", output.display());
        }
        Commands::Monitor { list, once, skip_censor, max_video_length, api_key, api_key_2 } => {
            if skip_censor {
                config.subtitles.censor = false;
            }
            if let Some(minutes) = max_video_length {
                config.monitor.max_video_length_minutes = minutes;
            }
            let config = config.with_fallback_api_keys(api_key.into_iter().chain(api_key_2));
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            controller.monitor(list, once).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
