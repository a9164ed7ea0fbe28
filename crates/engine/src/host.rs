//! Seams to the map and video widgets owned by the shell.

use crate::model::{FrameSample, GeoPosition};
use crate::time::frame_at;

/// Zoom used when jumping to a chart sample.
pub const SEGMENT_ZOOM: u8 = 16;
/// Zoom of the initial map camera.
pub const DEFAULT_ZOOM: u8 = 13;
/// Center of the initial map camera.
pub const DEFAULT_CENTER: GeoPosition = GeoPosition {
    latitude: 28.6139,
    longitude: 77.2090,
};

/// Markers the map host can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// Animated position of the playing video.
    VideoPosition,
    /// Last position clicked on the map.
    ClickPosition,
}

/// Camera and marker operations a map widget must offer.
pub trait MapHost {
    fn recenter(&mut self, position: GeoPosition, zoom: u8);

    /// Shows `icon` at `position`, or removes it for `None`.
    fn place_marker(&mut self, icon: MarkerIcon, position: Option<GeoPosition>);
}

/// Instructions for the map host produced by UI-agnostic code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapCommand {
    Recenter { position: GeoPosition, zoom: u8 },
}

impl MapCommand {
    pub fn apply(self, host: &mut impl MapHost) {
        match self {
            Self::Recenter { position, zoom } => host.recenter(position, zoom),
        }
    }
}

/// Playback clock exposed by a video widget, in seconds.
pub trait VideoHost {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
}

/// Position of the frame the video host is currently showing.
pub fn current_position(video: &impl VideoHost, frames: &[FrameSample]) -> Option<GeoPosition> {
    frame_at(video.current_time(), video.duration(), frames).map(FrameSample::position)
}
