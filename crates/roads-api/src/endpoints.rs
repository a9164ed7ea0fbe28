use reqwest::Url;

use crate::error::{ApiError, Result};

/// Provider address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// URL table for the provider routes.
///
/// # Example
/// ```
/// use roads_api::Endpoints;
///
/// let endpoints = Endpoints::new("http://localhost:8000").expect("valid");
/// assert_eq!(endpoints.video_file(7).as_str(), "http://localhost:8000/videos/7/file");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parses and validates the provider base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url.trim()).map_err(|error| ApiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: error.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: String::from("expected an http(s) url"),
            });
        }
        Ok(Self { base })
    }

    /// `GET /roads`
    pub fn roads(&self) -> Url {
        self.route(&["roads"])
    }

    /// `GET /roads/by-location?lat&lng&radius`
    pub fn roads_by_location(&self, lat: f64, lng: f64, radius: f64) -> Url {
        let mut url = self.route(&["roads", "by-location"]);
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lng", &lng.to_string())
            .append_pair("radius", &radius.to_string());
        url
    }

    /// `GET /videos`
    pub fn videos(&self) -> Url {
        self.route(&["videos"])
    }

    /// `GET /videos/{id}`
    pub fn video(&self, video_id: u64) -> Url {
        self.route(&["videos", &video_id.to_string()])
    }

    /// `GET /videos/{id}/file`, the stream handed to the video host.
    pub fn video_file(&self, video_id: u64) -> Url {
        self.route(&["videos", &video_id.to_string(), "file"])
    }

    fn route(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
