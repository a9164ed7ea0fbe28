use roads_api::{ApiError, RoadsClient};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::locator::LocateOutcome;
use crate::model::{FrameSample, GeoPosition, PathSegment, VideoDescriptor, VideoId};

/// Read access to the road survey data required by the engine.
pub trait DataProvider {
    /// Loads every segment that can be placed on the map.
    fn roads(&self) -> Result<Vec<PathSegment>>;

    /// Finds the segment nearest to `position` within `radius`.
    fn segment_near(&self, position: GeoPosition, radius: f64) -> Result<LocateOutcome>;

    fn videos(&self) -> Result<Vec<VideoDescriptor>>;

    /// URL of the playable file for `video_id`.
    fn video_file_url(&self, video_id: VideoId) -> String;

    /// Loads the geocoded frames of one video in playback order.
    fn video_frames(&self, video_id: VideoId) -> Result<Vec<FrameSample>>;
}

/// HTTP-backed provider used by production wiring.
#[derive(Debug, Clone)]
pub struct HttpDataProvider {
    client: RoadsClient,
}

impl HttpDataProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: RoadsClient::new(base_url)?,
        })
    }
}

impl DataProvider for HttpDataProvider {
    fn roads(&self) -> Result<Vec<PathSegment>> {
        let records = self.client.roads()?;
        let total = records.len();
        let mut segments = Vec::with_capacity(total);
        for record in &records {
            match PathSegment::from_record(record) {
                Ok(segment) if segment.start.is_some() => segments.push(segment),
                Ok(segment) => debug!(segment_id = segment.id, "segment without start skipped"),
                Err(error) => warn!(segment_id = record.id, %error, "invalid segment skipped"),
            }
        }

        info!(total, kept = segments.len(), "roads loaded");
        Ok(segments)
    }

    fn segment_near(&self, position: GeoPosition, radius: f64) -> Result<LocateOutcome> {
        let response =
            self.client
                .road_by_location(position.latitude, position.longitude, radius)?;
        match response.segment {
            Some(record) => {
                let segment = PathSegment::from_record(&record)?;
                debug!(
                    segment_id = segment.id,
                    distance = ?response.distance,
                    "nearest segment found"
                );
                Ok(LocateOutcome::Found(Box::new(segment)))
            }
            None => Ok(LocateOutcome::NotFound {
                message: response.message,
            }),
        }
    }

    fn videos(&self) -> Result<Vec<VideoDescriptor>> {
        Ok(self
            .client
            .videos()?
            .into_iter()
            .map(VideoDescriptor::from)
            .collect())
    }

    fn video_file_url(&self, video_id: VideoId) -> String {
        self.client.endpoints().video_file(video_id).to_string()
    }

    fn video_frames(&self, video_id: VideoId) -> Result<Vec<FrameSample>> {
        let detail = match self.client.video(video_id) {
            Ok(detail) => detail,
            Err(error) if is_not_found(&error) => {
                return Err(EngineError::VideoNotFound { video_id });
            }
            Err(error) => return Err(error.into()),
        };

        let total = detail.coordinates.len();
        let frames: Vec<FrameSample> = detail
            .coordinates
            .iter()
            .filter_map(FrameSample::from_record)
            .collect();
        if frames.len() < total {
            warn!(
                video_id,
                dropped = total - frames.len(),
                "frames without coordinates dropped"
            );
        }
        Ok(frames)
    }
}

pub(crate) fn is_not_found(error: &ApiError) -> bool {
    error.status() == Some(404)
}
