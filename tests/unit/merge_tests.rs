/*!
 * Tests for the deduplicator, interval merger and first-cue correction
 */

use bisub::merge::{collect_breakpoints, deduplicate, fix_first_cue_timing, merge, MergeEngine, MergeSettings};
use bisub::subtitle_processor::{Cue, Track};

fn track(cues: &[(u64, u64, &str)]) -> Track {
    Track::from_cues(
        cues.iter()
            .enumerate()
            .map(|(i, (s, e, t))| Cue::new(i + 1, *s, *e, *t))
            .collect(),
    )
}

fn spans(track: &Track) -> Vec<(u64, u64, String)> {
    track.cues.iter().map(|c| (c.start_ms, c.end_ms, c.text.clone())).collect()
}

#[test]
fn test_deduplicate_withRollingCaptions_shouldKeepOnlyNewLines() {
    let mut t = track(&[
        (0, 1000, "one"),
        (1000, 2000, "one\ntwo"),
        (2000, 3000, "two\nthree"),
    ]);

    let removed = deduplicate(&mut t);

    assert_eq!(removed, 2);
    let texts: Vec<&str> = t.cues.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn test_deduplicate_withRepeatOutsideWindow_shouldKeepLine() {
    let mut t = track(&[
        (0, 1000, "again"),
        (1000, 2000, "b"),
        (2000, 3000, "c"),
        (3000, 4000, "d"),
        (4000, 5000, "again"),
    ]);

    assert_eq!(deduplicate(&mut t), 0);
    assert_eq!(t.cues[4].text, "again");
}

#[test]
fn test_deduplicate_shouldNeverDropCuesOrChangeTiming() {
    let mut t = track(&[(0, 1000, "x"), (1000, 2000, "x"), (2000, 3000, "x")]);
    let before: Vec<(u64, u64)> = t.cues.iter().map(|c| (c.start_ms, c.end_ms)).collect();

    deduplicate(&mut t);

    let after: Vec<(u64, u64)> = t.cues.iter().map(|c| (c.start_ms, c.end_ms)).collect();
    assert_eq!(before, after);
    assert_eq!(t.cues[1].text, "");
    assert_eq!(t.cues[2].text, "");
}

#[test]
fn test_merge_withOverlappingTracks_shouldSplitAtEveryBreakpoint() {
    let a = track(&[(0, 2000, "A1"), (2000, 4000, "A2")]);
    let b = track(&[(1000, 3000, "B1")]);

    let merged = merge(&a, &b, 0);

    assert_eq!(
        spans(&merged),
        vec![
            (0, 1000, "A1".to_string()),
            (1000, 2000, "A1\nB1".to_string()),
            (2000, 3000, "A2\nB1".to_string()),
            (3000, 4000, "A2".to_string()),
        ]
    );
    let indices: Vec<usize> = merged.cues.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
}

#[test]
fn test_merge_withGapBetweenCues_shouldOmitSilentInterval() {
    let a = track(&[(0, 1000, "A"), (3000, 4000, "B")]);
    let merged = merge(&a, &Track::new(), 0);
    assert_eq!(spans(&merged), vec![(0, 1000, "A".to_string()), (3000, 4000, "B".to_string())]);
}

#[test]
fn test_merge_withMinGap_shouldDropNarrowIntervals() {
    let a = track(&[(0, 1000, "A")]);
    let b = track(&[(0, 1050, "B")]);

    let merged = merge(&a, &b, 100);

    assert_eq!(spans(&merged), vec![(0, 1000, "A\nB".to_string())]);
}

#[test]
fn test_collectBreakpoints_shouldBeSortedAndKeepDuplicates() {
    let a = track(&[(0, 1000, "A")]);
    let b = track(&[(500, 1000, "B")]);
    assert_eq!(collect_breakpoints(&a, &b), vec![0, 500, 1000, 1000]);
}

#[test]
fn test_fixFirstCueTiming_shouldSkipBlankLeadingCues() {
    let mut t = track(&[(0, 500, ""), (4000, 4500, "first words")]);

    let adjustment = fix_first_cue_timing(&mut t, 2000).unwrap();

    assert_eq!(adjustment.index, 2);
    assert_eq!(t.cues[1].start_ms, 2500);
    assert_eq!(t.cues[1].end_ms, 4500);
    assert_eq!(t.cues[0].start_ms, 0);
}

#[test]
fn test_fixFirstCueTiming_withLongEnoughCue_shouldDoNothing() {
    let mut t = track(&[(1000, 3000, "fine")]);
    assert!(fix_first_cue_timing(&mut t, 2000).is_none());
    assert_eq!(t.cues[0].start_ms, 1000);
}

#[test]
fn test_fixFirstCueTiming_withAllBlank_shouldBeNoOp() {
    let mut t = track(&[(0, 100, ""), (100, 200, " ")]);
    assert!(fix_first_cue_timing(&mut t, 2000).is_none());
}

#[test]
fn test_mergeEngine_withCustomSettings_shouldApplyThem() {
    let engine = MergeEngine::new(MergeSettings {
        min_gap_ms: 0,
        target_min_duration_ms: 500,
        dedup_window: 1,
    });
    let mut a = track(&[(1000, 1400, "x"), (1400, 2000, "y"), (2000, 3000, "x")]);
    let mut b = Track::new();

    let merged = engine.merge_tracks(&mut a, &mut b);

    // window of one: the third "x" only looks at "y"
    assert_eq!(a.cues[2].text, "x");
    assert_eq!(merged.cues[0].start_ms, 900);
}

#[test]
fn test_mergeSettings_default_shouldMatchDocumentedValues() {
    let settings = MergeSettings::default();
    assert_eq!(settings.min_gap_ms, 0);
    assert_eq!(settings.target_min_duration_ms, 2000);
    assert_eq!(settings.dedup_window, 3);
}
