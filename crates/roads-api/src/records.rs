use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// One row of the provider's `road_data` table.
///
/// The provider serves rows as flat objects with one column per lane
/// measurement, so everything except the id is kept by column name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadRecord {
    pub id: u64,
    #[serde(flatten)]
    pub columns: BTreeMap<String, Value>,
}

impl RoadRecord {
    /// Reads a numeric column. `null`, missing and non-numeric values are `None`.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.columns.get(column).and_then(Value::as_f64)
    }

    /// Reads a text column. Numbers are rendered as text.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.columns.get(column)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

/// Body of `GET /roads/by-location`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocateResponse {
    pub segment: Option<RoadRecord>,
    pub distance: Option<f64>,
    pub message: Option<String>,
}

/// One entry of `GET /videos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoRecord {
    pub id: u64,
    pub filename: String,
}

/// Body of `GET /videos/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoDetail {
    pub video_path: Option<String>,
    #[serde(default)]
    pub coordinates: Vec<FrameRecord>,
}

/// One geocoded frame row, ordered by `frame_number`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FrameRecord {
    pub frame_number: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
