use tracing::debug;

use crate::model::{GeoPosition, PathSegment};

/// Search radius used when none is configured.
pub const DEFAULT_SEARCH_RADIUS: f64 = 200.0;

/// Monotonically increasing id of a locate query.
pub type RequestId = u64;

/// One nearest-segment query to run against the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocateRequest {
    pub id: RequestId,
    pub position: GeoPosition,
    pub radius: f64,
}

/// Successful provider answer to a [`LocateRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    Found(Box<PathSegment>),
    NotFound { message: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocatorState {
    Idle,
    Loading,
    Found(Box<PathSegment>),
    NotFound { message: Option<String> },
    Failed { message: String },
}

/// Client-side half of "click the map, show the nearest segment".
///
/// Only the answer to the most recently issued request is applied; slower
/// answers to older requests are dropped whatever order they arrive in.
///
/// # Example
/// ```
/// use engine::{GeoPosition, LocateOutcome, LocatorState, SegmentLocator};
///
/// let mut locator = SegmentLocator::default();
/// let first = locator.begin(GeoPosition { latitude: 28.6, longitude: 77.2 });
/// let second = locator.begin(GeoPosition { latitude: 28.7, longitude: 77.3 });
///
/// assert!(locator.resolve(second.id, Ok(LocateOutcome::NotFound { message: None })));
/// assert!(!locator.resolve(first.id, Err("timed out".to_owned())));
/// assert_eq!(locator.state(), &LocatorState::NotFound { message: None });
/// ```
#[derive(Debug)]
pub struct SegmentLocator {
    radius: f64,
    latest: RequestId,
    click_position: Option<GeoPosition>,
    state: LocatorState,
}

impl Default for SegmentLocator {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_RADIUS)
    }
}

impl SegmentLocator {
    /// Creates a locator querying within `radius`.
    ///
    /// `radius` must be finite and positive.
    pub fn new(radius: f64) -> Self {
        assert!(
            radius.is_finite() && radius > 0.0,
            "search radius must be positive"
        );
        Self {
            radius,
            latest: 0,
            click_position: None,
            state: LocatorState::Idle,
        }
    }

    pub fn state(&self) -> &LocatorState {
        &self.state
    }

    /// Last clicked position, kept regardless of the query outcome.
    pub fn click_position(&self) -> Option<GeoPosition> {
        self.click_position
    }

    /// Id of the request still awaiting an answer.
    pub fn pending(&self) -> Option<RequestId> {
        matches!(self.state, LocatorState::Loading).then_some(self.latest)
    }

    /// Records a map click and issues the query for it.
    pub fn begin(&mut self, position: GeoPosition) -> LocateRequest {
        self.latest += 1;
        self.click_position = Some(position);
        self.state = LocatorState::Loading;
        LocateRequest {
            id: self.latest,
            position,
            radius: self.radius,
        }
    }

    /// Applies the answer to request `id`. Returns `false` if it was stale.
    pub fn resolve(&mut self, id: RequestId, result: Result<LocateOutcome, String>) -> bool {
        if id != self.latest {
            debug!(request_id = id, latest = self.latest, "stale locate response dropped");
            return false;
        }

        self.state = match result {
            Ok(LocateOutcome::Found(segment)) => LocatorState::Found(segment),
            Ok(LocateOutcome::NotFound { message }) => LocatorState::NotFound { message },
            Err(message) => LocatorState::Failed { message },
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{LocateOutcome, LocatorState, SegmentLocator};
    use crate::model::{GeoPosition, PathSegment};

    fn click(latitude: f64) -> GeoPosition {
        GeoPosition {
            latitude,
            longitude: 77.2,
        }
    }

    #[test]
    fn begin_enters_loading_and_records_click() {
        let mut locator = SegmentLocator::default();
        assert_eq!(locator.state(), &LocatorState::Idle);

        let request = locator.begin(click(28.6));

        assert_eq!(request.id, 1);
        assert_eq!(request.radius, 200.0);
        assert_eq!(locator.state(), &LocatorState::Loading);
        assert_eq!(locator.click_position(), Some(click(28.6)));
    }

    #[test]
    fn newest_response_wins_when_older_arrives_last() {
        let mut locator = SegmentLocator::default();
        let first = locator.begin(click(28.6));
        let second = locator.begin(click(28.7));

        assert!(locator.resolve(
            second.id,
            Ok(LocateOutcome::Found(Box::new(PathSegment::new(22))))
        ));
        assert!(!locator.resolve(
            first.id,
            Ok(LocateOutcome::Found(Box::new(PathSegment::new(11))))
        ));

        let LocatorState::Found(segment) = locator.state() else {
            panic!("second response must be shown");
        };
        assert_eq!(segment.id, 22);
        assert_eq!(locator.click_position(), Some(click(28.7)));
    }

    #[test]
    fn older_response_is_dropped_while_newer_is_pending() {
        let mut locator = SegmentLocator::new(50.0);
        let first = locator.begin(click(1.0));
        let _second = locator.begin(click(2.0));

        assert!(!locator.resolve(first.id, Err("connection refused".to_owned())));
        assert_eq!(locator.state(), &LocatorState::Loading);
    }

    #[test]
    fn pending_tracks_latest_unanswered_request() {
        let mut locator = SegmentLocator::default();
        assert_eq!(locator.pending(), None);

        locator.begin(click(28.6));
        let second = locator.begin(click(28.7));
        assert_eq!(locator.pending(), Some(second.id));

        locator.resolve(second.id, Err("connection refused".to_owned()));
        assert_eq!(locator.pending(), None);
    }

    #[test]
    fn failure_keeps_click_position() {
        let mut locator = SegmentLocator::default();
        let request = locator.begin(click(3.0));

        assert!(locator.resolve(request.id, Err("status 500".to_owned())));

        assert_eq!(
            locator.state(),
            &LocatorState::Failed {
                message: "status 500".to_owned()
            }
        );
        assert_eq!(locator.click_position(), Some(click(3.0)));
    }
}
