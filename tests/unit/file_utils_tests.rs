/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use bisub::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.tmp", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

#[test]
fn test_sanitizeFileStem_shouldReplaceEverythingButWordCharsAndDashes() {
    assert_eq!(FileManager::sanitize_file_stem("Hello, World! (2024)"), "Hello__World___2024_");
    assert_eq!(FileManager::sanitize_file_stem("keep_this-one"), "keep_this-one");
    assert_eq!(FileManager::sanitize_file_stem("新闻 速递"), "新闻_速递");
}

#[test]
fn test_subtitlePath_shouldFollowLanguageSuffixConvention() {
    let path = FileManager::subtitle_path(Path::new("/work"), "clip", "zh-Hans");
    assert_eq!(path, Path::new("/work/clip.zh-Hans.srt"));
}

#[test]
fn test_removeSubtitleArtifacts_shouldOnlyTouchMatchingStem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "clip.en.srt", "")?;
    common::create_test_file(dir, "clip.merged_subtitles.srt", "")?;
    common::create_test_file(dir, "clip.mp4", "")?;
    common::create_test_file(dir, "clip2.en.srt", "")?;

    let removed = FileManager::remove_subtitle_artifacts(dir, "clip")?;

    assert_eq!(removed, 2);
    assert!(dir.join("clip.mp4").exists());
    assert!(dir.join("clip2.en.srt").exists());
    assert!(!dir.join("clip.en.srt").exists());
    Ok(())
}

#[test]
fn test_findArtifacts_shouldReturnSortedMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "v.zh-Hans.srt", "")?;
    common::create_test_file(dir, "v.en.srt", "")?;

    let found = FileManager::find_artifacts(dir, "v", "srt")?;

    assert_eq!(found, vec![dir.join("v.en.srt"), dir.join("v.zh-Hans.srt")]);
    Ok(())
}

#[test]
fn test_removeIfExists_shouldReportWhetherAnythingWasRemoved() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "gone.mp4", "x")?;

    assert!(FileManager::remove_if_exists(&file)?);
    assert!(!FileManager::remove_if_exists(&file)?);
    Ok(())
}

#[test]
fn test_renameFile_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::rename_file(temp_dir.path().join("a"), temp_dir.path().join("b"));
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("meta.txt");

    FileManager::write_to_file(&path, "{}")?;

    assert_eq!(fs::read_to_string(&path)?, "{}");
    Ok(())
}
