//! First-cue display duration correction.
//!
//! The ffmpeg subtitles filter drops the very first cue when it is shown for
//! less than about two seconds, so the first visible cue is stretched backwards.

use log::debug;

use crate::subtitle_processor::Track;

/// Minimum on-screen duration for the first visible cue
pub const DEFAULT_TARGET_MIN_DURATION_MS: u64 = 2000;

/// Change applied to the first visible cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingAdjustment {
    pub index: usize,
    pub old_start_ms: u64,
    pub new_start_ms: u64,
}

/// Move the start of the first non-empty cue earlier so it lasts at least
/// `target_min_duration_ms`. The end time and every other cue stay untouched.
pub fn fix_first_cue_timing(track: &mut Track, target_min_duration_ms: u64) -> Option<TimingAdjustment> {
    let cue = track.first_non_empty_mut()?;

    if cue.duration_ms() >= target_min_duration_ms {
        return None;
    }

    let old_start_ms = cue.start_ms;
    cue.start_ms = if cue.end_ms <= target_min_duration_ms {
        0
    } else {
        cue.end_ms - target_min_duration_ms
    };

    debug!(
        "Extended first cue {} start from {}ms to {}ms",
        cue.index, old_start_ms, cue.start_ms
    );

    Some(TimingAdjustment {
        index: cue.index,
        old_start_ms,
        new_start_ms: cue.start_ms,
    })
}
