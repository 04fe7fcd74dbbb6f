/*!
 * Interval sweep merge of two subtitle tracks.
 *
 * All start and end timestamps of both tracks become breakpoints. Every pair of
 * consecutive breakpoints is one candidate output cue; it carries the text of
 * whichever cue from each track fully contains it.
 */

use log::debug;

use crate::subtitle_processor::{Cue, Track};

/// Merge two tracks into a new one.
///
/// Intervals no wider than `min_gap_ms` are skipped, as are intervals where
/// neither track has text. Output indices are dense and 1-based.
pub fn merge(primary: &Track, secondary: &Track, min_gap_ms: u64) -> Track {
    let breakpoints = collect_breakpoints(primary, secondary);

    let mut primary_cursor = 0;
    let mut secondary_cursor = 0;
    let mut cues = Vec::new();

    for pair in breakpoints.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        if end - start <= min_gap_ms {
            continue;
        }

        let text_a = find_active(&primary.cues, start, end, &mut primary_cursor);
        let text_b = find_active(&secondary.cues, start, end, &mut secondary_cursor);

        let text = join_lines(text_a, text_b);
        if !text.is_empty() {
            cues.push(Cue::new(0, start, end, text));
        }
    }

    let mut merged = Track::from_cues(cues);
    merged.renumber();

    debug!(
        "Merged {} + {} cues over {} breakpoints into {} cues",
        primary.len(),
        secondary.len(),
        breakpoints.len(),
        merged.len()
    );

    merged
}

/// Every start and end of both tracks, ascending
pub fn collect_breakpoints(primary: &Track, secondary: &Track) -> Vec<u64> {
    let mut breakpoints: Vec<u64> = primary
        .cues
        .iter()
        .chain(secondary.cues.iter())
        .flat_map(|cue| [cue.start_ms, cue.end_ms])
        .collect();
    breakpoints.sort_unstable();
    breakpoints
}

/// Text of the cue that fully contains `[start, end]`, or "".
///
/// The cursor only moves forward. Intervals must be visited in non-decreasing
/// start order for matches to be found.
fn find_active<'a>(cues: &'a [Cue], start: u64, end: u64, cursor: &mut usize) -> &'a str {
    let mut i = *cursor;

    while i < cues.len() {
        let cue = &cues[i];
        if cue.start_ms >= end {
            break;
        }
        if cue.start_ms <= start && end <= cue.end_ms {
            *cursor = i;
            return &cue.text;
        }
        i += 1;
    }

    *cursor = i;
    ""
}

fn join_lines(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (false, false) => format!("{}\n{}", a, b),
        _ => format!("{}{}", a, b),
    }
}
