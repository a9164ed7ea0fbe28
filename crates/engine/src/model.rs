use roads_api::{FrameRecord, RoadRecord, VideoRecord};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::format::or_zero;

/// Opaque identifier for road segments.
pub type SegmentId = u64;
/// Opaque identifier for inspection videos.
pub type VideoId = u64;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    /// Creates a validated position.
    ///
    /// # Example
    /// ```
    /// use engine::GeoPosition;
    ///
    /// assert!(GeoPosition::new(28.6139, 77.2090).is_ok());
    /// assert!(GeoPosition::new(91.0, 0.0).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let position = Self {
            latitude,
            longitude,
        };
        if !position.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(EngineError::InvalidPosition {
                latitude,
                longitude,
            });
        }
        Ok(position)
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Componentwise `self + (to - self) * t`.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        Self {
            latitude: self.latitude + (to.latitude - self.latitude) * t,
            longitude: self.longitude + (to.longitude - self.longitude) * t,
        }
    }
}

/// Carriageway lanes, left side first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    L1,
    L2,
    L3,
    L4,
    R1,
    R2,
    R3,
    R4,
}

impl Lane {
    pub const ALL: [Lane; 8] = [
        Lane::L1,
        Lane::L2,
        Lane::L3,
        Lane::L4,
        Lane::R1,
        Lane::R2,
        Lane::R3,
        Lane::R4,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::R1 => "R1",
            Self::R2 => "R2",
            Self::R3 => "R3",
            Self::R4 => "R4",
        }
    }

    /// Column prefix used by the provider.
    fn column_prefix(self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
            Self::L3 => "l3",
            Self::L4 => "l4",
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
            Self::R4 => "r4",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Survey readings for one lane. Every reading may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneMeasurements {
    /// Roughness (bump integrator), mm/km.
    pub roughness_bi: Option<f64>,
    /// Rut depth, mm.
    pub rut_depth: Option<f64>,
    /// Cracked area, % of lane area.
    pub crack_area: Option<f64>,
    /// Ravelled area, % of lane area.
    pub ravelling_area: Option<f64>,
}

/// Contractual limits the lane readings are compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementLimits {
    pub roughness_bi: Option<f64>,
    pub rut_depth: Option<f64>,
    pub crack_area: Option<f64>,
    pub ravelling_area: Option<f64>,
}

/// A contiguous chainage interval of road with its survey results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub id: SegmentId,
    pub nh_number: Option<String>,
    /// Kilometers from the reference origin.
    pub start_chainage: Option<f64>,
    pub end_chainage: Option<f64>,
    pub length: Option<f64>,
    /// Start of the first left lane, used to place the segment on the map.
    pub start: Option<GeoPosition>,
    pub overall_quality_score: Option<f64>,
    pub left_half_quality_score: Option<f64>,
    pub right_half_quality_score: Option<f64>,
    pub limits: MeasurementLimits,
    lanes: [LaneMeasurements; 8],
    pub structure_details: Option<String>,
    pub remark: Option<String>,
}

impl PathSegment {
    /// Creates a segment with every reading missing.
    pub fn new(id: SegmentId) -> Self {
        Self {
            id,
            nh_number: None,
            start_chainage: None,
            end_chainage: None,
            length: None,
            start: None,
            overall_quality_score: None,
            left_half_quality_score: None,
            right_half_quality_score: None,
            limits: MeasurementLimits::default(),
            lanes: [LaneMeasurements::default(); 8],
            structure_details: None,
            remark: None,
        }
    }

    pub fn with_lane(mut self, lane: Lane, measurements: LaneMeasurements) -> Self {
        self.lanes[lane.index()] = measurements;
        self
    }

    /// Folds one flat provider row into a segment.
    ///
    /// Fails when both chainages are present but not increasing, or when the
    /// starting coordinate is out of range.
    pub fn from_record(record: &RoadRecord) -> Result<Self> {
        let start_chainage = record.number("start_chainage");
        let end_chainage = record.number("end_chainage");
        if let (Some(start), Some(end)) = (start_chainage, end_chainage) {
            if start >= end {
                return Err(EngineError::InvalidChainage {
                    segment_id: record.id,
                    start,
                    end,
                });
            }
        }

        let start = match (
            record.number("l1_start_latitude"),
            record.number("l1_start_longitude"),
        ) {
            (Some(latitude), Some(longitude)) => Some(GeoPosition::new(latitude, longitude)?),
            _ => None,
        };

        let mut segment = Self {
            id: record.id,
            nh_number: record.text("nh_number"),
            start_chainage,
            end_chainage,
            length: record.number("length"),
            start,
            overall_quality_score: record.number("overall_quality_score"),
            left_half_quality_score: record.number("left_half_quality_score"),
            right_half_quality_score: record.number("right_half_quality_score"),
            limits: MeasurementLimits {
                roughness_bi: record.number("limitation_of_bi_as_per_morth_circular_in_mm_km"),
                rut_depth: record
                    .number("limitation_of_rut_depth_as_per_concession_agreement_in_mm"),
                crack_area: record
                    .number("limitation_of_cracking_as_per_concession_agreement_in_area"),
                ravelling_area: record
                    .number("limitation_of_ravelling_as_per_concession_agreement_in_area"),
            },
            lanes: [LaneMeasurements::default(); 8],
            structure_details: record.text("structure_details"),
            remark: record.text("remark"),
        };

        for lane in Lane::ALL {
            let prefix = lane.column_prefix();
            segment.lanes[lane.index()] = LaneMeasurements {
                roughness_bi: record.number(&format!("{prefix}_lane_roughness_bi_in_mm_km")),
                rut_depth: record.number(&format!("{prefix}_rut_depth_in_mm")),
                crack_area: record.number(&format!("{prefix}_crack_area_in_area")),
                ravelling_area: record.number(&format!("{prefix}_area_area")),
            };
        }

        Ok(segment)
    }

    /// Overall score with missing read as `0`.
    pub fn quality_score(&self) -> f64 {
        or_zero(self.overall_quality_score)
    }

    pub fn lane(&self, lane: Lane) -> &LaneMeasurements {
        &self.lanes[lane.index()]
    }
}

/// One geocoded video frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    pub latitude: f64,
    pub longitude: f64,
}

impl FrameSample {
    pub fn position(&self) -> GeoPosition {
        GeoPosition {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Returns `None` for rows without both coordinates.
    pub(crate) fn from_record(record: &FrameRecord) -> Option<Self> {
        Some(Self {
            latitude: record.latitude?,
            longitude: record.longitude?,
        })
    }
}

/// An inspection video known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDescriptor {
    pub id: VideoId,
    pub filename: String,
}

impl From<VideoRecord> for VideoDescriptor {
    fn from(value: VideoRecord) -> Self {
        Self {
            id: value.id,
            filename: value.filename,
        }
    }
}

/// Mean overall score of `segments` as a percentage, `0` when empty.
pub fn average_quality_percent(segments: &[PathSegment]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }

    let sum: f64 = segments.iter().map(PathSegment::quality_score).sum();
    sum / segments.len() as f64 * 100.0
}
