pub mod quality_chart;
pub mod segment;
pub mod track;
pub mod video;

use engine::QualityBand;
use iced::Color;

/// Fill color of a quality band.
pub fn band_color(band: QualityBand) -> Color {
    let [r, g, b] = band.rgb();
    Color::from_rgb8(r, g, b)
}
