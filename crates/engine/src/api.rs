use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::cache::FrameCache;
use crate::error::{EngineError, Result};
use crate::locator::{LocateOutcome, LocateRequest, RequestId};
use crate::model::{FrameSample, PathSegment, VideoDescriptor, VideoId};
use crate::provider::{DataProvider, HttpDataProvider, is_not_found};

const FRAME_CACHE_CAPACITY: usize = 8;

/// Commands accepted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Loads every segment. The request id is echoed so an older snapshot
    /// cannot replace a newer one.
    LoadRoads {
        request_id: RequestId,
    },
    ListVideos,
    /// Loads the geocoded frames of `video_id`, from cache when possible.
    SelectVideo {
        video_id: VideoId,
    },
    /// Queries the nearest segment for a map click.
    ///
    /// The request id is echoed in the answer so the caller can drop
    /// responses to superseded clicks.
    Locate(LocateRequest),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::LoadRoads { request_id } => CommandKind::LoadRoads {
                request_id: *request_id,
            },
            Self::ListVideos => CommandKind::ListVideos,
            Self::SelectVideo { video_id } => CommandKind::SelectVideo {
                video_id: *video_id,
            },
            Self::Locate(request) => CommandKind::Locate {
                request_id: request.id,
            },
        }
    }
}

/// Identifies the command an error event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    LoadRoads { request_id: RequestId },
    ListVideos,
    SelectVideo { video_id: VideoId },
    Locate { request_id: RequestId },
}

/// Events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RoadsLoaded {
        request_id: RequestId,
        segments: Arc<[PathSegment]>,
    },
    VideosListed(Vec<VideoDescriptor>),
    VideoFramesReady {
        video_id: VideoId,
        /// Playable file handed to the video host.
        file_url: String,
        frames: Arc<[FrameSample]>,
    },
    SegmentLocated {
        request_id: RequestId,
        outcome: LocateOutcome,
    },
    Error(EngineErrorEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// The provider could not be reached or answered with an error status.
    Network,
    NotFound,
    /// The provider answered with data the engine cannot use.
    InvalidData,
}

impl From<&EngineError> for EngineErrorKind {
    fn from(value: &EngineError) -> Self {
        match value {
            EngineError::VideoNotFound { .. } => Self::NotFound,
            EngineError::Provider(error) if is_not_found(error) => Self::NotFound,
            EngineError::Provider(roads_api::ApiError::Decode { .. }) => Self::InvalidData,
            EngineError::Provider(_) => Self::Network,
            EngineError::InvalidPosition { .. }
            | EngineError::InvalidChainage { .. }
            | EngineError::InvalidLayoutMode(_) => Self::InvalidData,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineErrorEvent {
    pub origin: CommandKind,
    pub kind: EngineErrorKind,
    pub message: String,
}

impl EngineErrorEvent {
    pub fn from_error(origin: CommandKind, error: &EngineError) -> Self {
        Self {
            origin,
            kind: EngineErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Engine serving dashboard data commands.
///
/// Commands take `&self` so independent requests can run concurrently.
#[derive(Debug)]
pub struct Engine<P> {
    provider: P,
    frame_cache: Mutex<FrameCache>,
}

impl<P> Engine<P>
where
    P: DataProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            frame_cache: Mutex::new(FrameCache::new(FRAME_CACHE_CAPACITY)),
        }
    }

    /// Runs one command and returns emitted events.
    pub fn handle_command(&self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::LoadRoads { request_id } => self.load_roads(request_id),
            Command::ListVideos => self.list_videos(),
            Command::SelectVideo { video_id } => self.select_video(video_id),
            Command::Locate(request) => self.locate(request),
        }
    }

    /// Runs one command and folds any failure into an [`Event::Error`].
    pub fn dispatch(&self, command: Command) -> Vec<Event> {
        let origin = command.kind();
        match self.handle_command(command) {
            Ok(events) => events,
            Err(error) => {
                warn!(?origin, %error, "command failed");
                vec![Event::Error(EngineErrorEvent::from_error(origin, &error))]
            }
        }
    }

    fn load_roads(&self, request_id: RequestId) -> Result<Vec<Event>> {
        let segments = self.provider.roads()?;
        Ok(vec![Event::RoadsLoaded {
            request_id,
            segments: segments.into(),
        }])
    }

    fn list_videos(&self) -> Result<Vec<Event>> {
        let videos = self.provider.videos()?;
        debug!(count = videos.len(), "videos listed");
        Ok(vec![Event::VideosListed(videos)])
    }

    fn select_video(&self, video_id: VideoId) -> Result<Vec<Event>> {
        let file_url = self.provider.video_file_url(video_id);
        if let Some(frames) = self.lock_frame_cache().get(video_id) {
            debug!(video_id, "frame cache hit");
            return Ok(vec![Event::VideoFramesReady {
                video_id,
                file_url,
                frames,
            }]);
        }

        debug!(video_id, "frame cache miss");
        let frames: Arc<[FrameSample]> = self.provider.video_frames(video_id)?.into();
        info!(video_id, frames = frames.len(), "video frames loaded");
        self.lock_frame_cache()
            .insert(video_id, Arc::clone(&frames));

        Ok(vec![Event::VideoFramesReady {
            video_id,
            file_url,
            frames,
        }])
    }

    fn locate(&self, request: LocateRequest) -> Result<Vec<Event>> {
        let outcome = self
            .provider
            .segment_near(request.position, request.radius)?;
        debug!(
            request_id = request.id,
            found = matches!(outcome, LocateOutcome::Found(_)),
            "locate answered"
        );
        Ok(vec![Event::SegmentLocated {
            request_id: request.id,
            outcome,
        }])
    }

    fn lock_frame_cache(&self) -> std::sync::MutexGuard<'_, FrameCache> {
        self.frame_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Engine<HttpDataProvider> {
    /// Creates an engine wired to the HTTP provider at `base_url`.
    pub fn with_http(base_url: &str) -> Result<Self> {
        Ok(Self::new(HttpDataProvider::new(base_url)?))
    }
}
