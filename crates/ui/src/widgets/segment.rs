use engine::format::{display, display_difference, display_percent, expand_structure_abbreviations};
use engine::{Lane, LaneMeasurements, LocatorState, PathSegment};
use iced::widget::{Column, Row, column, container, scrollable, text};
use iced::{Element, Length};

use super::band_color;

/// One measurement row of the lane table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub label: &'static str,
    pub limit: String,
    /// Distance from the limit, one entry per lane in [`Lane::ALL`] order.
    pub lanes: Vec<String>,
}

/// Label/value pairs of the segment header.
pub fn summary_rows(segment: &PathSegment) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        (
            "NH Number",
            segment
                .nh_number
                .clone()
                .unwrap_or_else(|| engine::format::MISSING.to_owned()),
        ),
        (
            "Chainage",
            format!(
                "{} - {} km",
                display(segment.start_chainage, 2),
                display(segment.end_chainage, 2)
            ),
        ),
        ("Length", format!("{} km", display(segment.length, 2))),
        ("Overall", display_percent(segment.overall_quality_score, 1)),
        ("Left half", display_percent(segment.left_half_quality_score, 1)),
        ("Right half", display_percent(segment.right_half_quality_score, 1)),
    ];
    if let Some(structure) = &segment.structure_details {
        rows.push(("Structure", expand_structure_abbreviations(structure)));
    }
    if let Some(remark) = &segment.remark {
        rows.push(("Remark", remark.clone()));
    }
    rows
}

/// Lane readings compared against the segment's limits.
pub fn metric_rows(segment: &PathSegment) -> Vec<MetricRow> {
    let limits = segment.limits;
    vec![
        metric_row(segment, "Roughness (BI mm/km)", limits.roughness_bi, 0, |lane| {
            lane.roughness_bi
        }),
        metric_row(segment, "Rut depth (mm)", limits.rut_depth, 1, |lane| {
            lane.rut_depth
        }),
        metric_row(segment, "Cracking (% area)", limits.crack_area, 2, |lane| {
            lane.crack_area
        }),
        metric_row(segment, "Ravelling (% area)", limits.ravelling_area, 2, |lane| {
            lane.ravelling_area
        }),
    ]
}

fn metric_row(
    segment: &PathSegment,
    label: &'static str,
    limit: Option<f64>,
    precision: usize,
    read: fn(&LaneMeasurements) -> Option<f64>,
) -> MetricRow {
    MetricRow {
        label,
        limit: display(limit, precision),
        lanes: Lane::ALL
            .iter()
            .map(|lane| display_difference(read(segment.lane(*lane)), limit))
            .collect(),
    }
}

const METRIC_WIDTH: f32 = 170.0;
const LANE_WIDTH: f32 = 52.0;

fn details<'a, Message: 'a>(segment: &PathSegment) -> Element<'a, Message> {
    let mut header = Column::new().spacing(2);
    for (label, value) in summary_rows(segment) {
        header = header.push(text(format!("{label}: {value}")).size(13));
    }

    let mut heading = Row::new()
        .spacing(4)
        .push(text("Metric / limit").size(12).width(Length::Fixed(METRIC_WIDTH)));
    for lane in Lane::ALL {
        heading = heading.push(text(lane.label()).size(12).width(Length::Fixed(LANE_WIDTH)));
    }

    let mut table = Column::new().spacing(2).push(heading);
    for metric in metric_rows(segment) {
        let mut cells = Row::new().spacing(4).push(
            text(format!("{} / {}", metric.label, metric.limit))
                .size(12)
                .width(Length::Fixed(METRIC_WIDTH)),
        );
        for cell in metric.lanes {
            cells = cells.push(text(cell).size(12).width(Length::Fixed(LANE_WIDTH)));
        }
        table = table.push(cells);
    }

    column![
        text(format!("Segment {}", segment.id))
            .size(16)
            .color(band_color(segment.quality_band())),
        header,
        scrollable(table),
    ]
    .spacing(8)
    .into()
}

/// Renders the locator result panel.
pub fn view<'a, Message>(state: &LocatorState) -> Element<'a, Message>
where
    Message: 'a,
{
    let content: Element<'a, Message> = match state {
        LocatorState::Idle => text("Click on the map to view segment details").into(),
        LocatorState::Loading => text("Fetching segment details...").into(),
        LocatorState::Found(segment) => details(segment),
        LocatorState::NotFound { message } => text(
            message
                .clone()
                .unwrap_or_else(|| "No road segment found near this point".to_owned()),
        )
        .into(),
        LocatorState::Failed { message } => {
            text(format!("Segment lookup failed: {message}")).into()
        }
    };

    container(content).padding(8).width(Length::Fill).into()
}
