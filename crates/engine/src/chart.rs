use std::str::FromStr;

use crate::error::EngineError;
use crate::format::{display, or_zero, percent};
use crate::host::{MapCommand, SEGMENT_ZOOM};
use crate::model::PathSegment;

/// Viewport class the shell was started for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutMode {
    Compact,
    #[default]
    Regular,
}

impl LayoutMode {
    pub fn chart_layout(self) -> ChartLayout {
        match self {
            Self::Compact => ChartLayout::COMPACT,
            Self::Regular => ChartLayout::REGULAR,
        }
    }
}

impl FromStr for LayoutMode {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "regular" => Ok(Self::Regular),
            _ => Err(EngineError::InvalidLayoutMode(value.to_owned())),
        }
    }
}

/// Canvas size and inset shared by drawing and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl ChartLayout {
    pub const REGULAR: Self = Self {
        width: 250.0,
        height: 100.0,
        padding: 10.0,
    };
    pub const COMPACT: Self = Self {
        width: 200.0,
        height: 80.0,
        padding: 8.0,
    };

    pub fn inner_width(&self) -> f32 {
        self.width - 2.0 * self.padding
    }

    pub fn inner_height(&self) -> f32 {
        self.height - 2.0 * self.padding
    }

    /// Horizontal position of sample `index` out of `count`.
    ///
    /// A single sample sits in the middle of the plot.
    pub fn x_at(&self, index: usize, count: usize) -> f32 {
        if count <= 1 {
            return self.padding + self.inner_width() / 2.0;
        }
        self.padding + self.inner_width() * index as f32 / (count - 1) as f32
    }

    /// Vertical position of a score in `[0, 1]`, missing as `0`.
    pub fn y_at(&self, score: Option<f64>) -> f32 {
        self.padding + self.inner_height() * (1.0 - or_zero(score) as f32)
    }

    /// Maps a pointer x to the nearest sample index, `None` when outside.
    ///
    /// # Example
    /// ```
    /// use engine::ChartLayout;
    ///
    /// let layout = ChartLayout::REGULAR;
    /// assert_eq!(layout.hit_test(125.0, 5), Some(2));
    /// assert_eq!(layout.hit_test(-40.0, 5), None);
    /// ```
    pub fn hit_test(&self, x: f32, count: usize) -> Option<usize> {
        if count == 0 || !x.is_finite() {
            return None;
        }
        if count == 1 {
            let inside = x >= self.padding && x <= self.width - self.padding;
            return inside.then_some(0);
        }

        let step = self.inner_width() / (count - 1) as f32;
        let index = ((x - self.padding) / step).round();
        if index < 0.0 || index > (count - 1) as f32 {
            return None;
        }
        Some(index as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub x: f32,
    pub y: f32,
}

impl ChartPoint {
    fn midpoint(self, other: Self) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// One drawing instruction of the quality curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveStep {
    MoveTo(ChartPoint),
    QuadTo { control: ChartPoint, to: ChartPoint },
    LineTo(ChartPoint),
}

/// Places one point per score.
pub fn sample_points(layout: &ChartLayout, scores: &[Option<f64>]) -> Vec<ChartPoint> {
    scores
        .iter()
        .enumerate()
        .map(|(index, score)| ChartPoint {
            x: layout.x_at(index, scores.len()),
            y: layout.y_at(*score),
        })
        .collect()
}

/// Smooths `points` with quadratic segments through neighbour midpoints.
///
/// Fewer than two points produce no curve.
pub fn smoothed_curve(points: &[ChartPoint]) -> Vec<CurveStep> {
    let [first, .., last] = points else {
        return Vec::new();
    };

    let mut steps = Vec::with_capacity(points.len() + 1);
    steps.push(CurveStep::MoveTo(*first));
    for pair in points.windows(2) {
        steps.push(CurveStep::QuadTo {
            control: pair[0],
            to: pair[0].midpoint(pair[1]),
        });
    }
    steps.push(CurveStep::LineTo(*last));
    steps
}

/// Closed outline of the area between the curve and the plot floor.
pub fn area_outline(layout: &ChartLayout, points: &[ChartPoint]) -> Vec<CurveStep> {
    let mut steps = smoothed_curve(points);
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return steps;
    };
    if steps.is_empty() {
        return steps;
    }

    let floor = layout.height - layout.padding;
    steps.push(CurveStep::LineTo(ChartPoint {
        x: last.x,
        y: floor,
    }));
    steps.push(CurveStep::LineTo(ChartPoint {
        x: first.x,
        y: floor,
    }));
    steps
}

/// Quality classes used for markers and map dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityBand {
    Red,
    Orange,
    Yellow,
    Green,
}

impl QualityBand {
    /// Classifies a `[0, 1]` score. Each band includes its lower threshold.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Green
        } else if score >= 0.6 {
            Self::Yellow
        } else if score >= 0.4 {
            Self::Orange
        } else {
            Self::Red
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Red => [0xff, 0x6b, 0x6b],
            Self::Orange => [0xff, 0x92, 0x2b],
            Self::Yellow => [0xff, 0xd4, 0x3b],
            Self::Green => [0x51, 0xcf, 0x66],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl PathSegment {
    pub fn quality_band(&self) -> QualityBand {
        QualityBand::from_score(self.quality_score())
    }
}

/// Caption shown under the chart for the hovered sample.
pub fn hover_caption(segment: &PathSegment) -> String {
    format!(
        "Chainage {} - {}: {:.1}%",
        display(segment.start_chainage, 2),
        display(segment.end_chainage, 2),
        percent(segment.overall_quality_score)
    )
}

/// Camera move for a clicked sample, `None` when it has no coordinate.
pub fn navigate_command(segment: &PathSegment) -> Option<MapCommand> {
    segment.start.map(|position| MapCommand::Recenter {
        position,
        zoom: SEGMENT_ZOOM,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    use super::{
        ChartLayout, ChartPoint, CurveStep, LayoutMode, QualityBand, area_outline, hover_caption,
        navigate_command, sample_points, smoothed_curve,
    };
    use crate::host::MapCommand;
    use crate::model::{GeoPosition, PathSegment};

    #[test]
    fn hovering_third_sample_reports_its_band() {
        let scores = [Some(0.9), Some(0.3), Some(0.3), Some(0.7), Some(0.95)];
        let layout = ChartLayout::REGULAR;

        let x = layout.x_at(2, scores.len());
        assert_relative_eq!(x, 125.0);
        let index = layout.hit_test(x, scores.len()).expect("hovered sample");

        assert_eq!(index, 2);
        assert_eq!(
            QualityBand::from_score(scores[index].unwrap_or_default()),
            QualityBand::Red
        );
    }

    #[test]
    fn band_thresholds_include_lower_bound() {
        assert_eq!(QualityBand::from_score(0.8), QualityBand::Green);
        assert_eq!(QualityBand::from_score(0.799), QualityBand::Yellow);
        assert_eq!(QualityBand::from_score(0.6), QualityBand::Yellow);
        assert_eq!(QualityBand::from_score(0.4), QualityBand::Orange);
        assert_eq!(QualityBand::from_score(0.399), QualityBand::Red);
        assert_eq!(QualityBand::from_score(0.0), QualityBand::Red);
    }

    #[test]
    fn missing_score_is_drawn_at_the_floor() {
        let layout = ChartLayout::REGULAR;
        assert_relative_eq!(layout.y_at(None), 90.0);
        assert_relative_eq!(layout.y_at(Some(1.0)), 10.0);
    }

    #[test]
    fn single_sample_is_centered_and_hit() {
        let layout = ChartLayout::COMPACT;
        assert_relative_eq!(layout.x_at(0, 1), 100.0);
        assert_eq!(layout.hit_test(20.0, 1), Some(0));
        assert_eq!(layout.hit_test(4.0, 1), None);
        assert!(smoothed_curve(&sample_points(&layout, &[Some(0.5)])).is_empty());
    }

    #[test]
    fn hit_test_rejects_positions_past_either_end() {
        let layout = ChartLayout::REGULAR;
        assert_eq!(layout.hit_test(0.0, 5), Some(0));
        assert_eq!(layout.hit_test(-20.0, 5), None);
        assert_eq!(layout.hit_test(290.0, 5), None);
        assert_eq!(layout.hit_test(f32::NAN, 5), None);
        assert_eq!(layout.hit_test(100.0, 0), None);
    }

    #[test]
    fn curve_uses_previous_sample_as_control_point() {
        let points = [
            ChartPoint { x: 0.0, y: 0.0 },
            ChartPoint { x: 10.0, y: 20.0 },
            ChartPoint { x: 20.0, y: 0.0 },
        ];

        assert_eq!(
            smoothed_curve(&points),
            vec![
                CurveStep::MoveTo(points[0]),
                CurveStep::QuadTo {
                    control: points[0],
                    to: ChartPoint { x: 5.0, y: 10.0 },
                },
                CurveStep::QuadTo {
                    control: points[1],
                    to: ChartPoint { x: 15.0, y: 10.0 },
                },
                CurveStep::LineTo(points[2]),
            ]
        );
    }

    #[test]
    fn area_closes_along_the_floor() {
        let layout = ChartLayout::REGULAR;
        let points = sample_points(&layout, &[Some(1.0), Some(0.5)]);
        let steps = area_outline(&layout, &points);

        assert_eq!(
            steps[steps.len() - 2..],
            [
                CurveStep::LineTo(ChartPoint { x: 240.0, y: 90.0 }),
                CurveStep::LineTo(ChartPoint { x: 10.0, y: 90.0 }),
            ]
        );
    }

    #[test]
    fn layout_mode_parses_case_insensitively() {
        assert_eq!("Compact".parse::<LayoutMode>().ok(), Some(LayoutMode::Compact));
        assert_eq!(" regular ".parse::<LayoutMode>().ok(), Some(LayoutMode::Regular));
        assert!("tablet".parse::<LayoutMode>().is_err());
        assert_eq!(LayoutMode::Compact.chart_layout(), ChartLayout::COMPACT);
    }

    #[test]
    fn caption_and_navigation_follow_segment() {
        let mut segment = PathSegment::new(4);
        segment.start_chainage = Some(12.0);
        segment.end_chainage = Some(12.1);
        segment.overall_quality_score = Some(0.756);

        assert_eq!(hover_caption(&segment), "Chainage 12.00 - 12.10: 75.6%");
        assert_eq!(navigate_command(&segment), None);

        let position = GeoPosition {
            latitude: 28.5,
            longitude: 77.1,
        };
        segment.start = Some(position);
        assert_eq!(
            navigate_command(&segment),
            Some(MapCommand::Recenter { position, zoom: 16 })
        );
    }

    #[test]
    fn caption_shows_missing_chainage() {
        assert_eq!(hover_caption(&PathSegment::new(1)), "Chainage N/A - N/A: 0.0%");
    }

    proptest! {
        #[test]
        fn hit_test_inverts_sample_position(count in 2usize..400, seed in any::<usize>()) {
            let index = seed % count;
            for layout in [ChartLayout::REGULAR, ChartLayout::COMPACT] {
                let x = layout.x_at(index, count);
                prop_assert_eq!(layout.hit_test(x, count), Some(index));
            }
        }
    }
}
