use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::debug;
use crate::errors::SubtitleError;

// @module: Timed-text tracks and the SRT codec

// @const: SRT timing line regex, trailing cue settings are ignored
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timing regex is valid")
});

// @struct: Single timed caption entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    // @field: 1-based position, reassigned after structural edits
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Display lines joined with '\n', may be empty
    pub text: String,
}

impl Cue {
    /// Creates a cue without validating the time range
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Cue {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    // @creates: Cue with start < end enforced
    pub fn new_validated(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Result<Self, String> {
        if end_ms <= start_ms {
            return Err(format!(
                "Invalid time range: end time {} <= start time {}",
                end_ms, start_ms
            ));
        }

        Ok(Self::new(index, start_ms, end_ms, text))
    }

    /// Individual display lines of the cue; empty text has no lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// True when there is nothing to display
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// On-screen duration in ms
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, String> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(format!("Invalid timestamp format: {}", timestamp));
        }

        let mut values = [0u64; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse()
                .map_err(|_| format!("Invalid timestamp component '{}' in {}", part, timestamp))?;
        }

        Self::compose_timestamp(values[0], values[1], values[2], values[3])
            .ok_or_else(|| format!("Invalid time components in timestamp: {}", timestamp))
    }

    fn compose_timestamp(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }
        hours
            .checked_mul(3_600_000)?
            .checked_add(minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered sequence of cues for one subtitle language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    /// File the track was loaded from, if any
    pub source_file: Option<PathBuf>,

    /// Cues in source order
    pub cues: Vec<Cue>,
}

impl Track {
    /// Create an empty in-memory track
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already-built cues
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        Track {
            source_file: None,
            cues,
        }
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Reassign indices densely, 1-based, in current order
    pub fn renumber(&mut self) {
        for (i, cue) in self.cues.iter_mut().enumerate() {
            cue.index = i + 1;
        }
    }

    /// First cue that has something to display
    pub fn first_non_empty_mut(&mut self) -> Option<&mut Cue> {
        self.cues.iter_mut().find(|cue| !cue.is_blank())
    }

    /// Load a track from an SRT file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| SubtitleError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        let cues = Self::parse_srt_string(&content)?;
        debug!("Loaded {} cues from {}", cues.len(), path.display());

        Ok(Track {
            source_file: Some(path.to_path_buf()),
            cues,
        })
    }

    /// Write the track to an SRT file, UTF-8 encoded
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SubtitleError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    SubtitleError::Io(format!("Failed to create directory {}: {}", parent.display(), e))
                })?;
            }
        }

        let file = File::create(path)
            .map_err(|e| SubtitleError::Io(format!("Failed to create {}: {}", path.display(), e)))?;
        let mut writer = BufWriter::new(file);
        write!(writer, "{}", self.to_srt_string())?;
        writer.flush()?;

        Ok(())
    }

    /// Serialize to SRT text
    pub fn to_srt_string(&self) -> String {
        self.cues.iter().map(|cue| cue.to_string()).collect()
    }

    /// Parse SRT content into cues, keeping source order
    pub fn parse_srt_string(content: &str) -> Result<Vec<Cue>, SubtitleError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut cues = Vec::new();
        let mut state = ParseState::Index;
        let mut last_line = 0;

        for (i, raw) in content.lines().enumerate() {
            let line_no = i + 1;
            last_line = line_no;
            let line = raw.trim();

            state = match state {
                ParseState::Index => {
                    if line.is_empty() {
                        ParseState::Index
                    } else {
                        let index = line.parse::<usize>().map_err(|_| SubtitleError::MalformedTrack {
                            line: line_no,
                            reason: format!("expected cue index, found '{}'", line),
                        })?;
                        ParseState::Timing { index }
                    }
                }
                ParseState::Timing { index } => {
                    let (start_ms, end_ms) = Self::parse_timing_line(line).ok_or_else(|| {
                        SubtitleError::MalformedTrack {
                            line: line_no,
                            reason: format!("invalid timing line for cue {}: '{}'", index, line),
                        }
                    })?;
                    if end_ms <= start_ms {
                        return Err(SubtitleError::MalformedTrack {
                            line: line_no,
                            reason: format!("cue {} ends at {} but starts at {}", index, end_ms, start_ms),
                        });
                    }
                    ParseState::Text { index, start_ms, end_ms, lines: Vec::new() }
                }
                ParseState::Text { index, start_ms, end_ms, mut lines } => {
                    if line.is_empty() {
                        cues.push(Cue::new(index, start_ms, end_ms, lines.join("\n")));
                        ParseState::Index
                    } else {
                        // text keeps its indentation
                        lines.push(raw.trim_end().to_string());
                        ParseState::Text { index, start_ms, end_ms, lines }
                    }
                }
            };
        }

        match state {
            ParseState::Index => {}
            ParseState::Timing { index } => {
                return Err(SubtitleError::MalformedTrack {
                    line: last_line,
                    reason: format!("cue {} has no timing line", index),
                });
            }
            ParseState::Text { index, start_ms, end_ms, lines } => {
                cues.push(Cue::new(index, start_ms, end_ms, lines.join("\n")));
            }
        }

        Ok(cues)
    }

    fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
        let caps = TIMING_REGEX.captures(line)?;
        let field = |idx: usize| -> Option<u64> { caps.get(idx)?.as_str().parse().ok() };

        let start = Cue::compose_timestamp(field(1)?, field(2)?, field(3)?, field(4)?)?;
        let end = Cue::compose_timestamp(field(5)?, field(6)?, field(7)?, field(8)?)?;
        Some((start, end))
    }
}

// @enum: Position inside the current SRT block
enum ParseState {
    Index,
    Timing { index: usize },
    Text { index: usize, start_ms: u64, end_ms: u64, lines: Vec<String> },
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        if let Some(source) = &self.source_file {
            writeln!(f, "Source: {:?}", source)?;
        }
        writeln!(f, "Cues: {}", self.cues.len())?;
        Ok(())
    }
}
