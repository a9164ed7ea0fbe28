//! Blocking HTTP client for the road survey data provider.

mod client;
mod endpoints;
mod error;
mod records;

pub use client::{DEFAULT_TIMEOUT, RoadsClient};
pub use endpoints::{DEFAULT_BASE_URL, Endpoints};
pub use error::{ApiError, Result};
pub use records::{FrameRecord, LocateResponse, RoadRecord, VideoDetail, VideoRecord};
