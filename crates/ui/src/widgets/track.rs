use std::collections::HashMap;

use engine::{
    DEFAULT_CENTER, DEFAULT_ZOOM, FrameSample, GeoPosition, MapHost, MarkerIcon, PathSegment,
};
use iced::widget::canvas::{self, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Length, Point, Rectangle, Size, Theme, mouse};
use tracing::debug;

use super::band_color;

const TILE_SIZE: f64 = 256.0;
const MAX_ZOOM: u8 = 19;
const SEGMENT_DOT_RADIUS: f32 = 3.0;

/// Camera of the track canvas, acting as the dashboard's map host.
///
/// Positions are projected linearly, one degree spanning
/// `256 * 2^zoom / 360` pixels on both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackCamera {
    center: GeoPosition,
    zoom: u8,
    markers: HashMap<MarkerIcon, GeoPosition>,
}

impl Default for TrackCamera {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            markers: HashMap::new(),
        }
    }
}

impl TrackCamera {
    pub fn center(&self) -> GeoPosition {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker(&self, icon: MarkerIcon) -> Option<GeoPosition> {
        self.markers.get(&icon).copied()
    }

    /// Zooms one step in (`delta > 0`) or out.
    pub fn zoom_by(&mut self, delta: i8) {
        self.zoom = self.zoom.saturating_add_signed(delta).min(MAX_ZOOM);
    }

    fn degrees_per_pixel(&self) -> f64 {
        360.0 / (TILE_SIZE * f64::from(1_u32 << self.zoom))
    }

    /// Canvas point of `position` in a canvas of `size`.
    pub fn project(&self, position: GeoPosition, size: Size) -> Point {
        let scale = self.degrees_per_pixel();
        Point::new(
            size.width / 2.0 + ((position.longitude - self.center.longitude) / scale) as f32,
            size.height / 2.0 - ((position.latitude - self.center.latitude) / scale) as f32,
        )
    }

    /// Position under canvas point `point`, clamped to valid coordinates.
    pub fn unproject(&self, point: Point, size: Size) -> GeoPosition {
        let scale = self.degrees_per_pixel();
        let longitude = self.center.longitude + f64::from(point.x - size.width / 2.0) * scale;
        let latitude = self.center.latitude - f64::from(point.y - size.height / 2.0) * scale;
        GeoPosition {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }
}

impl MapHost for TrackCamera {
    fn recenter(&mut self, position: GeoPosition, zoom: u8) {
        debug!(
            latitude = position.latitude,
            longitude = position.longitude,
            zoom,
            "camera recentered"
        );
        self.center = position;
        self.zoom = zoom.min(MAX_ZOOM);
    }

    fn place_marker(&mut self, icon: MarkerIcon, position: Option<GeoPosition>) {
        match position {
            Some(position) => {
                self.markers.insert(icon, position);
            }
            None => {
                self.markers.remove(&icon);
            }
        }
    }
}

#[derive(Debug)]
struct TrackProgram<'a, Message> {
    camera: &'a TrackCamera,
    segments: &'a [PathSegment],
    route: &'a [FrameSample],
    cache: &'a canvas::Cache,
    on_click: fn(GeoPosition) -> Message,
    on_pointer: fn(GeoPosition) -> Message,
    on_zoom: fn(i8) -> Message,
}

impl<Message> canvas::Program<Message> for TrackProgram<'_, Message> {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let Some(point) = cursor.position_in(bounds) else {
            return (canvas::event::Status::Ignored, None);
        };
        let position = self.camera.unproject(point, bounds.size());

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                (canvas::event::Status::Captured, Some((self.on_click)(position)))
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                (canvas::event::Status::Captured, Some((self.on_pointer)(position)))
            }
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let (mouse::ScrollDelta::Lines { y, .. } | mouse::ScrollDelta::Pixels { y, .. }) =
                    delta;
                if y == 0.0 {
                    return (canvas::event::Status::Ignored, None);
                }
                let step = if y > 0.0 { 1 } else { -1 };
                (canvas::event::Status::Captured, Some((self.on_zoom)(step)))
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
        let size = bounds.size();
        let network = self.cache.draw(renderer, size, |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::from_rgb8(22, 24, 29));

            if let [first, rest @ ..] = self.route {
                let route = Path::new(|builder| {
                    builder.move_to(self.camera.project(first.position(), size));
                    for frame_sample in rest {
                        builder.line_to(self.camera.project(frame_sample.position(), size));
                    }
                });
                frame.stroke(
                    &route,
                    Stroke::default()
                        .with_width(2.0)
                        .with_color(Color::from_rgba8(0x4a, 0x9e, 0xff, 0.6)),
                );
            }

            for segment in self.segments {
                let Some(start) = segment.start else {
                    continue;
                };
                let dot = Path::circle(self.camera.project(start, size), SEGMENT_DOT_RADIUS);
                frame.fill(&dot, band_color(segment.quality_band()));
            }
        });

        let mut markers = canvas::Frame::new(renderer, size);
        if let Some(click) = self.camera.marker(MarkerIcon::ClickPosition) {
            let point = self.camera.project(click, size);
            let cross = Path::new(|builder| {
                builder.move_to(Point::new(point.x - 5.0, point.y - 5.0));
                builder.line_to(Point::new(point.x + 5.0, point.y + 5.0));
                builder.move_to(Point::new(point.x - 5.0, point.y + 5.0));
                builder.line_to(Point::new(point.x + 5.0, point.y - 5.0));
            });
            markers.stroke(
                &cross,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }
        if let Some(video) = self.camera.marker(MarkerIcon::VideoPosition) {
            let marker = Path::circle(self.camera.project(video, size), 6.0);
            markers.fill(&marker, Color::from_rgb8(0x4a, 0x9e, 0xff));
            markers.stroke(
                &marker,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );
        }

        vec![network, markers.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::None
        }
    }
}

/// Formats a position the way the pointer readout shows it.
pub fn coordinate_label(position: GeoPosition) -> String {
    format!(
        "Lat: {:.6}, Lng: {:.6}",
        position.latitude, position.longitude
    )
}

/// Renders the track canvas.
pub fn view<'a, Message>(
    camera: &'a TrackCamera,
    segments: &'a [PathSegment],
    route: &'a [FrameSample],
    cache: &'a canvas::Cache,
    on_click: fn(GeoPosition) -> Message,
    on_pointer: fn(GeoPosition) -> Message,
    on_zoom: fn(i8) -> Message,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(
        canvas::Canvas::new(TrackProgram {
            camera,
            segments,
            route,
            cache,
            on_click,
            on_pointer,
            on_zoom,
        })
        .width(Length::Fill)
        .height(Length::Fill),
    )
    .width(Length::Fill)
    .height(Length::FillPortion(3))
    .into()
}
