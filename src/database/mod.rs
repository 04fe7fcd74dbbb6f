/*!
 * Database module for persistent storage of processed videos.
 *
 * The monitor consults this store before downloading anything, so a video
 * is only ever processed once across polling rounds and restarts.
 */

pub mod schema;
pub mod connection;
pub mod repository;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::{ProcessedVideo, Repository};
