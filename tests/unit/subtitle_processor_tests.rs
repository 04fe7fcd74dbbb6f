/*!
 * Tests for the cue model and SRT codec
 */

use anyhow::Result;
use bisub::errors::SubtitleError;
use bisub::subtitle_processor::{Cue, Track};
use crate::common;

/// Test that timestamps round-trip through the SRT format
#[test]
fn test_formatTimestamp_withLargeValue_shouldPadEachComponent() {
    assert_eq!(Cue::format_timestamp(3_723_004), "01:02:03,004");
    assert_eq!(Cue::format_timestamp(0), "00:00:00,000");
}

/// Test that both millisecond separators are accepted
#[test]
fn test_parseTimestamp_withCommaOrDot_shouldAgree() {
    assert_eq!(Cue::parse_timestamp("00:01:02,500").unwrap(), 62_500);
    assert_eq!(Cue::parse_timestamp("00:01:02.500").unwrap(), 62_500);
    assert!(Cue::parse_timestamp("00:61:00,000").is_err());
    assert!(Cue::parse_timestamp("garbage").is_err());
}

#[test]
fn test_newValidated_withInvertedRange_shouldFail() {
    assert!(Cue::new_validated(1, 2000, 1000, "x").is_err());
    assert!(Cue::new_validated(1, 1000, 1000, "x").is_err());
    assert!(Cue::new_validated(1, 1000, 1001, "x").is_ok());
}

#[test]
fn test_parseSrtString_withBomAndCrlf_shouldParseCues() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nfirst\r\nline two\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nsecond\r\n";

    let cues = Track::parse_srt_string(content).unwrap();

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "first\nline two");
    assert_eq!(cues[1].start_ms, 3000);
}

#[test]
fn test_parseSrtString_withEmptyTextCue_shouldKeepIt() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:02,000 --> 00:00:03,000\nvisible\n";

    let cues = Track::parse_srt_string(content).unwrap();

    assert_eq!(cues.len(), 2);
    assert!(cues[0].is_blank());
    assert_eq!(cues[1].text, "visible");
}

#[test]
fn test_parseSrtString_withTimingSettings_shouldIgnoreThem() {
    let content = "1\n00:00:01,000 --> 00:00:02,000 align:start position:0%\nhi\n";
    let cues = Track::parse_srt_string(content).unwrap();
    assert_eq!((cues[0].start_ms, cues[0].end_ms), (1000, 2000));
}

#[test]
fn test_parseSrtString_withMalformedIndex_shouldReportLine() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nok\n\nabc\n00:00:03,000 --> 00:00:04,000\nbad\n";

    match Track::parse_srt_string(content) {
        Err(SubtitleError::MalformedTrack { line, .. }) => assert_eq!(line, 5),
        other => panic!("expected MalformedTrack, got {:?}", other),
    }
}

#[test]
fn test_parseSrtString_withEndBeforeStart_shouldFail() {
    let content = "1\n00:00:05,000 --> 00:00:02,000\nbackwards\n";
    assert!(matches!(
        Track::parse_srt_string(content),
        Err(SubtitleError::MalformedTrack { line: 2, .. })
    ));
}

#[test]
fn test_parseSrtString_withMissingTiming_shouldFail() {
    assert!(Track::parse_srt_string("1\n").is_err());
    assert!(Track::parse_srt_string("1\nnot a timing line\ntext\n").is_err());
}

#[test]
fn test_parseSrtString_withWhitespaceOnly_shouldYieldEmptyTrack() {
    assert!(Track::parse_srt_string("").unwrap().is_empty());
    assert!(Track::parse_srt_string("\n\n  \n").unwrap().is_empty());
}

#[test]
fn test_parseSrtString_withOverflowingHours_shouldFail() {
    let content = "1\n9999999999999999:00:00,000 --> 9999999999999999:00:01,000\nx\n";
    assert!(matches!(
        Track::parse_srt_string(content),
        Err(SubtitleError::MalformedTrack { line: 2, .. })
    ));
}

#[test]
fn test_parseSrtString_withIndentedText_shouldKeepLeadingWhitespace() -> Result<()> {
    let content = "  1  \n 00:00:01,000 --> 00:00:02,000 \n  indented\nflush  \n   \n2\n00:00:02,000 --> 00:00:03,000\n\tnext\n";
    let cues = Track::parse_srt_string(content)?;

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "  indented\nflush");
    assert_eq!(cues[1].text, "\tnext");

    let reparsed = Track::parse_srt_string(&Track::from_cues(cues.clone()).to_srt_string())?;
    assert_eq!(reparsed, cues);
    Ok(())
}

#[test]
fn test_parseSrtString_shouldPreserveSourceOrder() {
    let content = "1\n00:00:05,000 --> 00:00:06,000\nlater\n\n2\n00:00:01,000 --> 00:00:02,000\nearlier\n";
    let cues = Track::parse_srt_string(content).unwrap();
    assert_eq!(cues[0].text, "later");
    assert_eq!(cues[1].text, "earlier");
}

#[test]
fn test_saveAndLoad_shouldPreserveCues() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");

    let mut track = Track::from_cues(vec![
        Cue::new(7, 0, 1500, "你好\nhello"),
        Cue::new(9, 1500, 2500, ""),
    ]);
    track.renumber();
    track.save(&path)?;

    let loaded = Track::load(&path)?;

    assert_eq!(loaded.cues, track.cues);
    assert_eq!(loaded.source_file.as_deref(), Some(path.as_path()));
    Ok(())
}

#[test]
fn test_toSrtString_shouldWriteBlocksSeparatedByBlankLines() {
    let track = Track::from_cues(vec![Cue::new(1, 1000, 2000, "a"), Cue::new(2, 2000, 3000, "b")]);
    assert_eq!(
        track.to_srt_string(),
        "1\n00:00:01,000 --> 00:00:02,000\na\n\n2\n00:00:02,000 --> 00:00:03,000\nb\n\n"
    );
}

#[test]
fn test_load_withMissingFile_shouldReturnIoError() {
    assert!(matches!(Track::load("/definitely/not/here.srt"), Err(SubtitleError::Io(_))));
}
