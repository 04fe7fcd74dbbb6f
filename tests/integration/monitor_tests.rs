/*!
 * Channel monitor tests against a mock video source
 *
 * The external tools point at binaries that do not exist so any attempt to
 * download shows up as a failed video.
 */

use anyhow::Result;
use bisub::app_config::{Channel, ChannelList, Config};
use bisub::app_controller::{Controller, MonitorReport, VideoMetadata};
use bisub::database::{ProcessedVideo, Repository};
use crate::common;
use crate::common::mock_source::{video, MockVideoSource};

fn test_config(work_dir: &std::path::Path, channels: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    config.work_dir = work_dir.to_path_buf();
    config.tools.yt_dlp_path = "bisub-test-missing-yt-dlp".to_string();
    config.tools.ffmpeg_path = "bisub-test-missing-ffmpeg".to_string();
    config.channel_lists.push(ChannelList {
        name: "test".to_string(),
        channels: channels
            .iter()
            .map(|(id, name)| Channel { channel_id: id.to_string(), name: name.to_string() })
            .collect(),
    });
    config
}

#[tokio::test]
async fn test_monitorRound_shouldSkipProcessedAndLongVideos() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(temp_dir.path(), &[("UC1", "One")]))?;
    let store = Repository::new_in_memory()?;
    store.mark_processed(ProcessedVideo::new("seen", "Seen", "Seen.mp4")).await?;

    let source = MockVideoSource::new().with_channel(
        "UC1",
        vec![video("seen", "Seen", 60), video("long", "Long", 16 * 60)],
    );

    let report = controller.monitor_round(&source, &store, 1).await?;

    assert_eq!(report, MonitorReport { channels: 1, processed: 0, skipped: 2, failed: 0 });
    assert_eq!(store.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_monitorRound_withFailingDownload_shouldNotMarkProcessed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(temp_dir.path(), &[("UC1", "One")]))?;
    let store = Repository::new_in_memory()?;
    let source = MockVideoSource::new().with_channel("UC1", vec![video("new", "New", 120)]);

    let report = controller.monitor_round(&source, &store, 1).await?;

    assert_eq!(report.failed, 1);
    assert!(!store.is_processed("new").await?);
    Ok(())
}

#[tokio::test]
async fn test_monitorRound_withExhaustedQuota_shouldContinueOtherChannels() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = test_config(temp_dir.path(), &[("UC1", "One"), ("UC2", "Two"), ("UC3", "Three")]);
    let controller = Controller::with_config(config)?;
    let store = Repository::new_in_memory()?;
    store.mark_processed(ProcessedVideo::new("v3", "V3", "V3.mp4")).await?;

    let source = MockVideoSource::new()
        .with_exhausted_channel("UC1")
        .with_channel("UC2", vec![])
        .with_channel("UC3", vec![video("v3", "V3", 30)]);
    let tracker = source.tracker();

    let report = controller.monitor_round(&source, &store, 1).await?;

    assert_eq!(report.channels, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    let mut listed = tracker.lock().unwrap().recent_calls.clone();
    listed.sort();
    assert_eq!(listed, vec!["UC1", "UC2", "UC3"]);
    // the exhausted channel never asks for details
    assert_eq!(tracker.lock().unwrap().detail_calls, 2);
    Ok(())
}

#[tokio::test]
async fn test_monitorRound_withUnknownList_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(temp_dir.path(), &[]))?;
    let store = Repository::new_in_memory()?;

    assert!(controller.monitor_round(&MockVideoSource::new(), &store, 2).await.is_err());
    Ok(())
}

#[test]
fn test_writeMetadata_shouldWriteJsonWithHashtags() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("News.txt");
    let metadata = VideoMetadata::from_details(&video("id", "News", 100), "Channel");

    Controller::write_metadata(&path, &metadata)?;

    let written: VideoMetadata = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written.description, "News About News #testtag");
    assert_eq!(written.channel_name, "Channel");
    Ok(())
}

#[tokio::test]
async fn test_processVideo_withMissingDownloader_shouldFailCleanly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(test_config(temp_dir.path(), &[]))?;

    let result = controller
        .process_video(
            "https://www.youtube.com/watch?v=x",
            bisub::app_config::SubtitleLanguages::Bilingual,
            bisub::tools::FontSize::Medium,
        )
        .await;

    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 0);
    Ok(())
}
