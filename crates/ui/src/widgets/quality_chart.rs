use engine::{ChartLayout, ChartPoint, CurveStep, PathSegment, QualityBand};
use engine::{area_outline, hover_caption, sample_points, smoothed_curve};
use iced::widget::canvas::{self, Path, Stroke, path};
use iced::widget::{column, container, text};
use iced::{Color, Element, Length, Point, Rectangle, Theme, mouse};

use super::band_color;

const HOVER_MARKER_RADIUS: f32 = 2.0;

fn curve_color() -> Color {
    Color::from_rgb8(0x4a, 0x9e, 0xff)
}

#[derive(Debug)]
struct QualityChartProgram<'a, Message> {
    layout: ChartLayout,
    segments: &'a [PathSegment],
    hovered: Option<usize>,
    cache: &'a canvas::Cache,
    on_hover: fn(Option<usize>) -> Message,
    on_select: fn(usize) -> Message,
}

impl<Message> QualityChartProgram<'_, Message> {
    fn points(&self) -> Vec<ChartPoint> {
        let scores: Vec<Option<f64>> = self
            .segments
            .iter()
            .map(|segment| segment.overall_quality_score)
            .collect();
        sample_points(&self.layout, &scores)
    }

    fn index_under(&self, bounds: Rectangle, cursor: mouse::Cursor) -> Option<usize> {
        let position = cursor.position_in(bounds)?;
        self.layout.hit_test(position.x, self.segments.len())
    }
}

fn trace(builder: &mut path::Builder, steps: &[CurveStep]) {
    for step in steps {
        match *step {
            CurveStep::MoveTo(point) => builder.move_to(to_point(point)),
            CurveStep::QuadTo { control, to } => {
                builder.quadratic_curve_to(to_point(control), to_point(to));
            }
            CurveStep::LineTo(point) => builder.line_to(to_point(point)),
        }
    }
}

fn to_point(point: ChartPoint) -> Point {
    Point::new(point.x, point.y)
}

impl<Message> canvas::Program<Message> for QualityChartProgram<'_, Message> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if self.segments.is_empty() {
            return (canvas::event::Status::Ignored, None);
        }

        match event {
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                let index = self.index_under(bounds, cursor);
                if index == self.hovered {
                    return (canvas::event::Status::Ignored, None);
                }
                (canvas::event::Status::Captured, Some((self.on_hover)(index)))
            }
            canvas::Event::Mouse(mouse::Event::CursorLeft) if self.hovered.is_some() => {
                (canvas::event::Status::Captured, Some((self.on_hover)(None)))
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                match self.index_under(bounds, cursor) {
                    Some(index) => (canvas::event::Status::Captured, Some((self.on_select)(index))),
                    None => (canvas::event::Status::Ignored, None),
                }
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let points = self.points();

        let curve = self.cache.draw(renderer, bounds.size(), |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::from_rgb8(0x1a, 0x1a, 0x1a));

            let area = area_outline(&self.layout, &points);
            if !area.is_empty() {
                let area = Path::new(|builder| {
                    trace(builder, &area);
                    builder.close();
                });
                frame.fill(&area, Color { a: 0.2, ..curve_color() });
            }

            let line = Path::new(|builder| trace(builder, &smoothed_curve(&points)));
            frame.stroke(
                &line,
                Stroke::default().with_width(3.0).with_color(curve_color()),
            );
        });

        let mut hover_frame = canvas::Frame::new(renderer, bounds.size());
        if let Some((point, segment)) = self
            .hovered
            .and_then(|index| Some((*points.get(index)?, self.segments.get(index)?)))
        {
            let marker = Path::circle(to_point(point), HOVER_MARKER_RADIUS);
            hover_frame.fill(&marker, band_color(segment.quality_band()));
            hover_frame.stroke(
                &marker,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }

        vec![curve, hover_frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.index_under(bounds, cursor).is_some() {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::None
        }
    }
}

/// Band of the hovered sample, used by the caption.
pub fn hovered_band(segments: &[PathSegment], hovered: Option<usize>) -> Option<QualityBand> {
    hovered
        .and_then(|index| segments.get(index))
        .map(PathSegment::quality_band)
}

/// Renders the quality chart with the hover caption underneath.
pub fn view<'a, Message>(
    layout: ChartLayout,
    segments: &'a [PathSegment],
    hovered: Option<usize>,
    cache: &'a canvas::Cache,
    on_hover: fn(Option<usize>) -> Message,
    on_select: fn(usize) -> Message,
) -> Element<'a, Message>
where
    Message: 'a,
{
    let hovered_segment = hovered.and_then(|index| segments.get(index));
    let caption = match (hovered_segment, hovered_band(segments, hovered)) {
        (Some(segment), Some(band)) => text(hover_caption(segment))
            .size(12)
            .color(band_color(band)),
        _ => text("Hover the chart to inspect a segment").size(12),
    };

    container(column![
        canvas::Canvas::new(QualityChartProgram {
            layout,
            segments,
            hovered,
            cache,
            on_hover,
            on_select,
        })
        .width(Length::Fixed(layout.width))
        .height(Length::Fixed(layout.height)),
        caption,
    ]
    .spacing(4))
    .into()
}
