//! Scrolling instrument tapes: a value box next to a ruler laid out by
//! [`TickLayout`](crate::tick::TickLayout).

pub mod circular;
pub mod linear;
pub mod radial;

pub use circular::CircularTape;
pub use linear::LinearTape;
pub use radial::{resolve_radius, RadialTape, RadiusInputs};

use crate::config::TapeGeometry;
use crate::error::Result;
use crate::surface::{Surface, TextAlign, TextBaseline};
use kurbo::Point;

/// `1.0` for the default orientation, `-1.0` for the mirrored one.
fn mirror_factor(mirrored: bool) -> f64 {
    if mirrored {
        -1.0
    } else {
        1.0
    }
}

/// Axis-aligned clip rectangle; `width`/`height` may be negative.
fn clip_rect<S: Surface + ?Sized>(surface: &mut S, x: f64, y: f64, width: f64, height: f64) {
    surface.begin_path();
    surface.move_to(Point::new(x, y));
    surface.line_to(Point::new(x + width, y));
    surface.line_to(Point::new(x + width, y + height));
    surface.line_to(Point::new(x, y + height));
    surface.close_path();
    surface.clip();
}

/// Value box of the heading and roll tapes: a rectangle with a notch
/// pointing at the ruler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchBox {
    pub font_size: f64,
    pub text_width: f64,
    pub length: f64,
    /// Height of the rectangular part.
    pub body: f64,
    /// Height including the notch.
    pub height: f64,
    text_top_border: f64,
}

impl NotchBox {
    pub fn measure<S: Surface + ?Sized>(
        surface: &mut S,
        example: &str,
        geometry: &TapeGeometry,
        font_scale: f64,
    ) -> Result<Self> {
        let font_size = geometry.value_font_size * font_scale;
        surface.set_font_size(font_size);
        let text_width = surface.measure_text(example)?;
        let length = geometry.text_side_border * 2.0 + text_width;
        let body = geometry.text_top_border * 1.5 + font_size;
        Ok(Self {
            font_size,
            text_width,
            length,
            body,
            height: body + length / 4.0,
            text_top_border: geometry.text_top_border,
        })
    }

    /// Draws the box with its top edge at the origin, growing along `mf`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, text: &str, mf: f64) -> Result<()> {
        surface.set_font_size(self.font_size);
        surface.set_text_align(TextAlign::Right);
        surface.set_text_baseline(TextBaseline::Middle);

        let half = self.length / 2.0;
        surface.begin_path();
        surface.move_to(Point::new(-half, 0.0));
        surface.line_to(Point::new(half, 0.0));
        surface.line_to(Point::new(half, mf * self.body));
        surface.line_to(Point::new(0.0, mf * self.height));
        surface.line_to(Point::new(-half, mf * self.body));
        surface.close_path();
        surface.stroke()?;

        let baseline = mf * (2.0 * self.text_top_border + self.font_size) / 2.0;
        surface.fill_text(text, Point::new(self.text_width / 2.0, baseline))
    }
}

/// Value box of the vertical tapes: a rectangle ending in a point aimed at
/// the ruler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerBox {
    pub font_size: f64,
    pub text_width: f64,
    pub height: f64,
    /// Total length including the point.
    pub length: f64,
    text_side_border: f64,
}

impl PointerBox {
    pub fn measure<S: Surface + ?Sized>(
        surface: &mut S,
        example: &str,
        geometry: &TapeGeometry,
        font_scale: f64,
    ) -> Result<Self> {
        let font_size = geometry.value_font_size * font_scale;
        surface.set_font_size(font_size);
        let text_width = surface.measure_text(example)?;
        let height = font_size + 2.0 * geometry.text_top_border;
        Ok(Self {
            font_size,
            text_width,
            height,
            length: geometry.text_side_border * 2.0 + text_width + height / 2.0,
            text_side_border: geometry.text_side_border,
        })
    }

    /// Draws the box starting at the origin and pointing along `mf`.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, text: &str, mf: f64) -> Result<()> {
        surface.set_font_size(self.font_size);
        surface.set_text_align(TextAlign::Right);
        surface.set_text_baseline(TextBaseline::Middle);

        let half = self.height / 2.0;
        let body = self.text_side_border * 2.0 + self.text_width;
        surface.begin_path();
        surface.move_to(Point::new(0.0, -half));
        surface.line_to(Point::new(mf * body, -half));
        surface.line_to(Point::new(mf * self.length, 0.0));
        surface.line_to(Point::new(mf * body, half));
        surface.line_to(Point::new(0.0, half));
        surface.close_path();
        surface.stroke()?;

        let x = if mf < 0.0 {
            -self.text_side_border
        } else {
            self.text_side_border + self.text_width
        };
        surface.fill_text(text, Point::new(x, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};

    #[test]
    fn notch_box_dimensions() {
        let mut surface = RecordingSurface::new();
        let notch = NotchBox::measure(&mut surface, "360", &TapeGeometry::default(), 1.0).unwrap();
        // 3 chars * 0.6 * 20px
        assert!((notch.text_width - 36.0).abs() < 1e-9);
        assert!((notch.length - 46.0).abs() < 1e-9);
        assert!((notch.body - 26.0).abs() < 1e-9);
        assert!((notch.height - 37.5).abs() < 1e-9);
    }

    #[test]
    fn pointer_box_mirrors_text_position() {
        let geometry = TapeGeometry::default();
        let mut surface = RecordingSurface::new();
        let pointer = PointerBox::measure(&mut surface, "9999", &geometry, 1.0).unwrap();
        assert!((pointer.height - 28.0).abs() < 1e-9);
        assert!((pointer.length - (10.0 + 48.0 + 14.0)).abs() < 1e-9);

        pointer.draw(&mut surface, "120", -1.0).unwrap();
        let tip = surface.calls().iter().find_map(|call| match call {
            DrawCall::LineTo(p) if p.y == 0.0 => Some(*p),
            _ => None,
        });
        assert_eq!(tip, Some(Point::new(-pointer.length, 0.0)));
        let text_at = surface.calls().iter().find_map(|call| match call {
            DrawCall::Text { at, .. } => Some(*at),
            _ => None,
        });
        assert_eq!(text_at, Some(Point::new(-5.0, 0.0)));
    }
}
