/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use bisub::app_config::{Channel, ChannelList, Config, LogLevel, SubtitleLanguages};
use bisub::merge::MergeSettings;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_shouldHaveDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.youtube.max_results, 10);
    assert_eq!(config.subtitles.languages, SubtitleLanguages::Bilingual);
    assert!(config.subtitles.censor);
    assert_eq!(config.subtitles.dedup_window, 3);
    assert_eq!(config.subtitles.target_min_duration_ms, 2000);
    assert_eq!(config.tools.yt_dlp_path, "yt-dlp");
    assert_eq!(config.monitor.max_concurrent_channels, 3);
    assert_eq!(config.monitor.poll_interval_secs, 14_400);
    assert_eq!(config.monitor.max_video_length_minutes, 15);
    assert!(config.validate().is_ok());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.subtitles.dedup_window, 3);
    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.monitor.poll_interval_secs, config.monitor.poll_interval_secs);
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "log_level": "debug",
            "subtitles": {
                "languages": "english_only",
                "sanitize_rules": [{ "pattern": "foo", "replacement": "bar" }]
            },
            "channel_lists": [
                { "name": "news", "channels": [{ "channel_id": "UC1", "name": "One" }] }
            ]
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.subtitles.languages, SubtitleLanguages::EnglishOnly);
    assert!(config.subtitles.sanitize_rules[0].case_insensitive);
    assert_eq!(config.subtitles.min_gap_ms, 0);
    assert_eq!(config.channel_list(1)?.channels[0].channel_id, "UC1");
    Ok(())
}

#[test]
fn test_loadOrCreate_withEmptySubtitleSection_shouldUseMergeDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{ "subtitles": {} }"#)?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.subtitles.merge_settings(), MergeSettings::default());
    assert_eq!(config.subtitles.merge_settings(), Config::default().subtitles.merge_settings());
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_validate_withZeroValues_shouldFail() {
    let mut config = Config::default();
    config.monitor.max_concurrent_channels = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.subtitles.dedup_window = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.monitor.poll_interval_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withEmptyChannelId_shouldFail() {
    let mut config = Config::default();
    config.channel_lists.push(ChannelList {
        name: "broken".to_string(),
        channels: vec![Channel { channel_id: " ".to_string(), name: "Nobody".to_string() }],
    });
    assert!(config.validate().is_err());
}

#[test]
fn test_channelList_withOutOfRangeIndex_shouldFail() {
    let config = Config::default();
    assert!(config.channel_list(0).is_err());
    assert!(config.channel_list(1).is_err());
}

#[test]
fn test_withFallbackApiKeys_shouldOnlyApplyWhenConfigHasNone() {
    let config = Config::default().with_fallback_api_keys(vec!["k1".to_string(), "".to_string()]);
    assert_eq!(config.youtube.api_keys, vec!["k1".to_string()]);

    let config = config.with_fallback_api_keys(vec!["k2".to_string()]);
    assert_eq!(config.youtube.api_keys, vec!["k1".to_string()]);
}

#[test]
fn test_subtitleLanguages_fromPreset_shouldMapAllPresets() {
    assert_eq!(SubtitleLanguages::from_preset(0).unwrap().sub_lang_arg(), None);
    assert_eq!(SubtitleLanguages::from_preset(1).unwrap().sub_lang_arg(), Some("zh-Hans,zh-Hans-en"));
    assert_eq!(SubtitleLanguages::from_preset(2).unwrap().sub_lang_arg(), Some("en,zh-Hans,zh-Hans-en"));
    assert_eq!(SubtitleLanguages::from_preset(3).unwrap().sub_lang_arg(), Some("en"));
    assert!(SubtitleLanguages::from_preset(4).is_err());
}
