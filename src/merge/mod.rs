/*!
 * Bilingual subtitle merge engine.
 *
 * - `dedup`: strips rolling repeated caption lines from one track
 * - `interval`: sweeps the union of both tracks' boundaries into one track
 * - `timing`: stretches the first visible cue for the burn-in tool
 *
 * `MergeEngine` ties the three together over track files, including the
 * degraded paths where one or both language variants were never fetched.
 */

pub mod dedup;
pub mod interval;
pub mod timing;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle_processor::Track;

pub use dedup::{deduplicate, deduplicate_with_window, DEFAULT_DEDUP_WINDOW};
pub use interval::{collect_breakpoints, merge};
pub use timing::{fix_first_cue_timing, TimingAdjustment, DEFAULT_TARGET_MIN_DURATION_MS};

/// Tunables for the merge engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Intervals at most this wide are skipped
    #[serde(default)]
    pub min_gap_ms: u64,

    /// Minimum duration enforced on the first visible cue
    #[serde(default = "default_target_min_duration_ms")]
    pub target_min_duration_ms: u64,

    /// How many preceding cues count as already shown during dedup
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            min_gap_ms: 0,
            target_min_duration_ms: DEFAULT_TARGET_MIN_DURATION_MS,
            dedup_window: DEFAULT_DEDUP_WINDOW,
        }
    }
}

pub(crate) fn default_target_min_duration_ms() -> u64 {
    DEFAULT_TARGET_MIN_DURATION_MS
}

pub(crate) fn default_dedup_window() -> usize {
    DEFAULT_DEDUP_WINDOW
}

/// What `merge_files` produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Both tracks existed and were merged
    Merged { cues: usize },
    /// Only one track existed; it became the output as-is
    Renamed { from: PathBuf, cues: usize },
    /// Neither track existed, nothing was written
    NoInput,
}

impl MergeOutcome {
    /// Whether an output track file now exists
    pub fn has_output(&self) -> bool {
        !matches!(self, MergeOutcome::NoInput)
    }
}

/// Runs dedup, merge and first-cue correction
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    settings: MergeSettings,
}

impl MergeEngine {
    pub fn new(settings: MergeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MergeSettings {
        &self.settings
    }

    /// Deduplicate both tracks, merge them and correct the first cue
    pub fn merge_tracks(&self, primary: &mut Track, secondary: &mut Track) -> Track {
        deduplicate_with_window(primary, self.settings.dedup_window);
        deduplicate_with_window(secondary, self.settings.dedup_window);

        let mut merged = merge(primary, secondary, self.settings.min_gap_ms);
        fix_first_cue_timing(&mut merged, self.settings.target_min_duration_ms);
        merged
    }

    /// Deduplicate a track file in place, returning the number of lines removed
    pub fn deduplicate_file(&self, path: &Path) -> Result<usize, SubtitleError> {
        let mut track = Track::load(path)?;
        let removed = deduplicate_with_window(&mut track, self.settings.dedup_window);
        track.save(path)?;
        debug!("Removed {} repeated line(s) from {}", removed, path.display());
        Ok(removed)
    }

    /// Merge two optional track files into `output`.
    ///
    /// Existing inputs are deduplicated in place first. With a single input the
    /// file is renamed to `output`. The first-cue correction runs as a post-pass
    /// over the written file.
    pub fn merge_files(&self, primary: &Path, secondary: &Path, output: &Path) -> Result<MergeOutcome, SubtitleError> {
        let primary_exists = primary.is_file();
        let secondary_exists = secondary.is_file();

        if primary_exists {
            self.deduplicate_file(primary)?;
        }
        if secondary_exists {
            self.deduplicate_file(secondary)?;
        }

        let outcome = match (primary_exists, secondary_exists) {
            (true, true) => {
                let a = Track::load(primary)?;
                let b = Track::load(secondary)?;
                let merged = merge(&a, &b, self.settings.min_gap_ms);
                merged.save(output)?;
                info!(
                    "Merged {} and {} into {} cues",
                    primary.display(),
                    secondary.display(),
                    merged.len()
                );
                MergeOutcome::Merged { cues: merged.len() }
            }
            (true, false) | (false, true) => {
                let (from, missing) = if primary_exists { (primary, secondary) } else { (secondary, primary) };
                warn!(
                    "Subtitle track {} not found, using {} alone",
                    missing.display(),
                    from.display()
                );
                Self::move_file(from, output)?;
                MergeOutcome::Renamed { from: from.to_path_buf(), cues: 0 }
            }
            (false, false) => {
                warn!(
                    "Neither {} nor {} exists, no merged subtitles produced",
                    primary.display(),
                    secondary.display()
                );
                return Ok(MergeOutcome::NoInput);
            }
        };

        let cues = self.correct_first_cue_file(output)?;

        Ok(match outcome {
            MergeOutcome::Renamed { from, .. } => MergeOutcome::Renamed { from, cues },
            other => other,
        })
    }

    /// Reload a written track, fix the first cue and save it back
    fn correct_first_cue_file(&self, path: &Path) -> Result<usize, SubtitleError> {
        let mut track = Track::load(path)?;
        if let Some(adjustment) = fix_first_cue_timing(&mut track, self.settings.target_min_duration_ms) {
            info!(
                "First cue {} now starts at {}ms (was {}ms)",
                adjustment.index, adjustment.new_start_ms, adjustment.old_start_ms
            );
            track.save(path)?;
        }
        Ok(track.len())
    }

    fn move_file(from: &Path, to: &Path) -> Result<(), SubtitleError> {
        if from == to {
            return Ok(());
        }
        if fs::rename(from, to).is_err() {
            // rename fails across filesystems
            fs::copy(from, to).map_err(|e| {
                SubtitleError::Io(format!("Failed to copy {} to {}: {}", from.display(), to.display(), e))
            })?;
            fs::remove_file(from)?;
        }
        Ok(())
    }
}
