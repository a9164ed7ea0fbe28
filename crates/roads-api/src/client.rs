use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::endpoints::Endpoints;
use crate::error::{ApiError, Result};
use crate::records::{LocateResponse, RoadRecord, VideoDetail, VideoRecord};

/// Request timeout applied when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the provider routes.
///
/// Calls block the current thread and must not run on an async executor.
///
/// # Example
/// ```no_run
/// use roads_api::RoadsClient;
///
/// let client = RoadsClient::new("http://localhost:8000").expect("valid url");
/// let roads = client.roads().expect("provider reachable");
/// println!("{} segments", roads.len());
/// ```
#[derive(Debug, Clone)]
pub struct RoadsClient {
    http: Client,
    endpoints: Endpoints,
}

impl RoadsClient {
    /// Creates a client with [`DEFAULT_TIMEOUT`].
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let endpoints = Endpoints::new(base_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches every road segment row.
    pub fn roads(&self) -> Result<Vec<RoadRecord>> {
        self.get_json(self.endpoints.roads())
    }

    /// Asks the provider for the segment nearest to `lat`/`lng` within `radius`.
    pub fn road_by_location(&self, lat: f64, lng: f64, radius: f64) -> Result<LocateResponse> {
        self.get_json(self.endpoints.roads_by_location(lat, lng, radius))
    }

    /// Lists the inspection videos.
    pub fn videos(&self) -> Result<Vec<VideoRecord>> {
        self.get_json(self.endpoints.videos())
    }

    /// Fetches one video with its geocoded frames.
    pub fn video(&self, video_id: u64) -> Result<VideoDetail> {
        self.get_json(self.endpoints.video(video_id))
    }

    fn get_json<T>(&self, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(%url, "provider request");
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|source| ApiError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "provider returned error status");
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| ApiError::Http {
            url: url.to_string(),
            source,
        })?;
        debug!(%url, bytes = body.len(), "provider response");
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
