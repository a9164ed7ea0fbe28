use thiserror::Error;

use crate::model::{SegmentId, VideoId};

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced by engine commands and model conversion.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid position {latitude}, {longitude}")]
    InvalidPosition { latitude: f64, longitude: f64 },
    #[error("invalid chainage in segment {segment_id}: {start}..{end}")]
    InvalidChainage {
        segment_id: SegmentId,
        start: f64,
        end: f64,
    },
    #[error("video not found: {video_id}")]
    VideoNotFound { video_id: VideoId },
    #[error("unknown layout mode {0:?}, expected \"compact\" or \"regular\"")]
    InvalidLayoutMode(String),
    #[error("data provider error: {0}")]
    Provider(#[from] roads_api::ApiError),
}
