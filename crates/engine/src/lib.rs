//! UI-agnostic core of the road quality dashboard.

pub mod animate;
pub mod api;
pub mod cache;
pub mod chart;
pub mod error;
pub mod format;
pub mod host;
pub mod locator;
pub mod model;
pub mod provider;
pub mod time;

pub use animate::{
    AnimationHandle, AnimatorState, MARKER_ANIMATION_DURATION, PositionAnimator, Tick,
    ease_out_quad,
};
pub use api::{Command, CommandKind, Engine, EngineErrorEvent, EngineErrorKind, Event};
pub use chart::{
    ChartLayout, ChartPoint, CurveStep, LayoutMode, QualityBand, area_outline, hover_caption,
    navigate_command, sample_points, smoothed_curve,
};
pub use error::{EngineError, Result};
pub use host::{
    DEFAULT_CENTER, DEFAULT_ZOOM, MapCommand, MapHost, MarkerIcon, SEGMENT_ZOOM, VideoHost,
    current_position,
};
pub use locator::{
    DEFAULT_SEARCH_RADIUS, LocateOutcome, LocateRequest, LocatorState, RequestId, SegmentLocator,
};
pub use model::{
    FrameSample, GeoPosition, Lane, LaneMeasurements, MeasurementLimits, PathSegment, SegmentId,
    VideoDescriptor, VideoId, average_quality_percent,
};
pub use provider::{DataProvider, HttpDataProvider};
pub use roads_api::DEFAULT_BASE_URL;
pub use time::{frame_at, frame_index_at};
