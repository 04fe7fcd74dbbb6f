/*!
 * Repository for processed-video records.
 */

use anyhow::Result;
use chrono::Utc;
use log::debug;
use rusqlite::{params, OptionalExtension};

use super::connection::DatabaseConnection;

/// A video the monitor has finished with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedVideo {
    pub video_id: String,
    pub title: String,
    pub output_path: String,
    /// RFC 3339 timestamp, filled in on insert when empty
    pub processed_at: String,
}

impl ProcessedVideo {
    pub fn new(video_id: impl Into<String>, title: impl Into<String>, output_path: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            output_path: output_path.into(),
            processed_at: String::new(),
        }
    }
}

/// Repository for processed-video operations
#[derive(Clone)]
pub struct Repository {
    conn: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given connection
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Create an in-memory repository (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Whether a video id has already been recorded
    pub async fn is_processed(&self, video_id: &str) -> Result<bool> {
        let video_id = video_id.to_string();

        self.conn
            .execute_async(move |conn| {
                let found: Option<i64> = conn
                    .query_row(
                        "SELECT 1 FROM processed_videos WHERE video_id = ?1",
                        params![video_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(found.is_some())
            })
            .await
    }

    /// Record a video. Returns false when it was already present.
    pub async fn mark_processed(&self, record: ProcessedVideo) -> Result<bool> {
        self.conn
            .execute_async(move |conn| {
                let processed_at = if record.processed_at.is_empty() {
                    Utc::now().to_rfc3339()
                } else {
                    record.processed_at
                };

                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO processed_videos (video_id, title, output_path, processed_at) VALUES (?1, ?2, ?3, ?4)",
                    params![record.video_id, record.title, record.output_path, processed_at],
                )?;

                debug!("Recorded processed video {} (new: {})", record.video_id, inserted > 0);
                Ok(inserted > 0)
            })
            .await
    }

    /// Look up a recorded video
    pub async fn get(&self, video_id: &str) -> Result<Option<ProcessedVideo>> {
        let video_id = video_id.to_string();

        self.conn
            .execute_async(move |conn| {
                let record = conn
                    .query_row(
                        "SELECT video_id, title, output_path, processed_at FROM processed_videos WHERE video_id = ?1",
                        params![video_id],
                        |row| {
                            Ok(ProcessedVideo {
                                video_id: row.get(0)?,
                                title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                                output_path: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                                processed_at: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(record)
            })
            .await
    }

    /// Number of recorded videos
    pub async fn count(&self) -> Result<usize> {
        self.conn
            .execute_async(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM processed_videos", [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
    }
}
