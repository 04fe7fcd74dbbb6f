/*!
 * Removal of rolling repeated caption lines.
 *
 * Auto-generated captions re-display the tail of the previous cue as a lead-in
 * to the next one. Each cue is compared against the lines of the last few kept
 * cues only, so dialogue that legitimately repeats further apart survives.
 */

use std::collections::HashSet;

use log::debug;

use crate::subtitle_processor::Track;

/// Number of preceding kept cues whose lines count as already shown
pub const DEFAULT_DEDUP_WINDOW: usize = 3;

/// Deduplicate a track in place using the default window
pub fn deduplicate(track: &mut Track) -> usize {
    deduplicate_with_window(track, DEFAULT_DEDUP_WINDOW)
}

/// Deduplicate a track in place, comparing each cue against the previous
/// `window` cues. Returns the number of lines removed.
///
/// Cues are never dropped, a fully repeated cue ends up with empty text.
/// The seen set is rebuilt for every cue from the already rewritten
/// predecessors.
pub fn deduplicate_with_window(track: &mut Track, window: usize) -> usize {
    let mut removed = 0;

    for i in 0..track.cues.len() {
        let (kept, rest) = track.cues.split_at_mut(i);
        let cue = &mut rest[0];

        let seen: HashSet<&str> = kept[i.saturating_sub(window)..]
            .iter()
            .flat_map(|prev| prev.lines())
            .collect();

        let (filtered, dropped) = {
            let lines: Vec<&str> = cue.lines().collect();
            let filtered: Vec<&str> = lines.iter().copied().filter(|line| !seen.contains(line)).collect();
            (filtered.join("\n"), lines.len() - filtered.len())
        };

        if dropped > 0 {
            debug!("Cue {}: dropped {} repeated line(s)", cue.index, dropped);
            cue.text = filtered;
            removed += dropped;
        }
    }

    removed
}
