//! Software rasterizer drawing a [`Surface`] into an RGBA frame buffer.

use crate::config::Color;
use crate::error::{HudError, Result};
use crate::surface::{GraphicsState, PathBuilder, Subpath, Surface, TextAlign, TextBaseline};
use crate::transform::StateStack;
use kurbo::{Affine, Point, Vec2};
use rusttype::{point, Font, PositionedGlyph, Scale};

// ============================================================================
// CANVAS
// ============================================================================

/// Borrowed RGBA8 frame with alpha-blended plotting.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(self.frame.get(idx..idx + 4)?);
        Some(out)
    }

    /// Blends `color` over pixel `(x, y)` with the given coverage.
    fn set_pixel(&mut self, x: i64, y: i64, color: (u8, u8, u8), alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let src = [color.0 as f32, color.1 as f32, color.2 as f32];
        for (channel, value) in dst.iter_mut().zip(src) {
            *channel = (value * a + *channel as f32 * (1.0 - a)).round() as u8;
        }
        dst[3] = 0xff;
    }
}

/// Pen resolved to device units for one stroke or text run.
#[derive(Debug, Clone, Copy)]
struct Ink {
    color: (u8, u8, u8),
    alpha: f32,
}

impl Ink {
    fn of(state: &GraphicsState) -> Self {
        Self {
            color: state.color.as_tuple(),
            alpha: (state.color.a * state.alpha) as f32,
        }
    }
}

/// Even-odd point-in-polygon test.
pub fn polygon_contains(polygon: &[Point], p: Point) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn clip_allows(clip: &[Vec<Point>], p: Point) -> bool {
    clip.iter().all(|polygon| polygon_contains(polygon, p))
}

// ============================================================================
// STROKING
// ============================================================================

/// Splits segments into the "on" intervals of a dash pattern, carrying the
/// phase across joined segments.
struct Dasher {
    pattern: Vec<f64>,
    index: usize,
    remaining: f64,
}

impl Dasher {
    /// `None` for a solid line. Odd-length patterns are repeated once.
    fn new(dash: &[f64], scale: f64) -> Option<Self> {
        if dash.is_empty() || dash.iter().any(|d| !d.is_finite() || *d < 0.0) || dash.iter().sum::<f64>() <= 0.0 {
            return None;
        }
        let mut pattern: Vec<f64> = dash.iter().map(|d| d * scale).collect();
        if pattern.len() % 2 == 1 {
            pattern.extend_from_within(..);
        }
        let remaining = pattern[0];
        Some(Self {
            pattern,
            index: 0,
            remaining,
        })
    }

    fn split(&mut self, a: Point, b: Point, out: &mut Vec<(Point, Point)>) {
        let length = (b - a).hypot();
        let mut travelled = 0.0;
        while travelled < length {
            let step = self.remaining.min(length - travelled);
            if self.index % 2 == 0 && step > 0.0 {
                out.push((
                    a.lerp(b, travelled / length),
                    a.lerp(b, (travelled + step) / length),
                ));
            }
            travelled += step;
            self.remaining -= step;
            if self.remaining <= 1e-9 {
                self.index = (self.index + 1) % self.pattern.len();
                self.remaining = self.pattern[self.index];
            }
        }
    }
}

fn draw_thick_line_aa(canvas: &mut Canvas, clip: &[Vec<Point>], a: Point, b: Point, thickness: f64, ink: Ink) {
    let reach = thickness / 2.0 + 1.0;
    let min_x = (a.x.min(b.x) - reach).floor().max(0.0) as i64;
    let max_x = (a.x.max(b.x) + reach).ceil().min(canvas.width as f64 - 1.0) as i64;
    let min_y = (a.y.min(b.y) - reach).floor().max(0.0) as i64;
    let max_y = (a.y.max(b.y) + reach).ceil().min(canvas.height as f64 - 1.0) as i64;
    let d = b - a;
    let len_sq = d.hypot2();

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let t = if len_sq > 0.0 {
                ((center - a).dot(d) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let dist = (a + d * t - center).hypot();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)) as f32;
            if aa > 0.01 && clip_allows(clip, center) {
                canvas.set_pixel(x, y, ink.color, ink.alpha * aa);
            }
        }
    }
}

/// Strokes device-space subpaths with the pen in `state`.
pub fn stroke_subpaths(canvas: &mut Canvas, subpaths: &[Subpath], state: &GraphicsState) {
    let scale = state.scale_factor();
    let thickness = state.line_width * scale;
    let ink = Ink::of(state);
    let mut segments = Vec::new();

    for subpath in subpaths {
        let mut points = subpath.points.clone();
        if subpath.closed {
            if let Some(first) = points.first().copied() {
                points.push(first);
            }
        }
        let mut dasher = Dasher::new(&state.dash, scale);
        for pair in points.windows(2) {
            match dasher.as_mut() {
                Some(dasher) => dasher.split(pair[0], pair[1], &mut segments),
                None => segments.push((pair[0], pair[1])),
            }
        }
    }

    for (a, b) in segments {
        draw_thick_line_aa(canvas, &state.clip, a, b, thickness, ink);
    }
}

// ============================================================================
// TEXT
// ============================================================================

fn text_width(font: &Font, text: &str, scale: Scale) -> f64 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0) as f64
}

/// Splits one glyph coverage sample over the four nearest pixels.
fn draw_antialiased_pixel(canvas: &mut Canvas, clip: &[Vec<Point>], at: Point, ink: Ink, coverage: f32) {
    let x_floor = at.x.floor();
    let y_floor = at.y.floor();
    let x_frac = at.x - x_floor;
    let y_frac = at.y - y_floor;
    let samples = [
        (0, 0, (1.0 - x_frac) * (1.0 - y_frac)),
        (1, 0, x_frac * (1.0 - y_frac)),
        (0, 1, (1.0 - x_frac) * y_frac),
        (1, 1, x_frac * y_frac),
    ];
    for (dx, dy, weight) in samples {
        let alpha = ink.alpha * coverage * weight as f32;
        let px = x_floor as i64 + dx;
        let py = y_floor as i64 + dy;
        if alpha > 0.001 && clip_allows(clip, Point::new(px as f64 + 0.5, py as f64 + 0.5)) {
            canvas.set_pixel(px, py, ink.color, alpha);
        }
    }
}

fn draw_text(canvas: &mut Canvas, font: &Font, state: &GraphicsState, text: &str, at: Point) {
    let user_scale = Scale::uniform(state.font_size as f32);
    let v_metrics = font.v_metrics(user_scale);
    let width = text_width(font, text, user_scale);
    let dx = match state.align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -width / 2.0,
        TextAlign::Right => -width,
    };
    let dy = match state.baseline {
        TextBaseline::Top => v_metrics.ascent as f64,
        TextBaseline::Middle => (v_metrics.ascent + v_metrics.descent) as f64 / 2.0,
        TextBaseline::Bottom => v_metrics.descent as f64,
    };
    let origin = state.transform * (at + Vec2::new(dx, dy));
    let rotation = Affine::rotate(state.rotation());
    let ink = Ink::of(state);

    let device_scale = Scale::uniform((state.font_size * state.scale_factor()) as f32);
    let glyphs: Vec<PositionedGlyph> = font.layout(text, device_scale, point(0.0, 0.0)).collect();
    for glyph in &glyphs {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, v| {
            if v > 0.001 {
                let local = Point::new(
                    f64::from(bb.min.x) + f64::from(gx) + 0.5,
                    f64::from(bb.min.y) + f64::from(gy) + 0.5,
                );
                let device = origin + (rotation * local).to_vec2() - Vec2::new(0.5, 0.5);
                draw_antialiased_pixel(canvas, &state.clip, device, ink, v);
            }
        });
    }
}

// ============================================================================
// SURFACE
// ============================================================================

/// [`Surface`] drawing straight into a `pixels` frame.
pub struct RasterSurface<'a> {
    canvas: Canvas<'a>,
    font: &'a Font<'static>,
    state: StateStack<GraphicsState>,
    path: PathBuilder,
}

impl<'a> RasterSurface<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize, font: &'a Font<'static>) -> Self {
        Self {
            canvas: Canvas::new(frame, width, height),
            font,
            state: StateStack::new(GraphicsState::default()),
            path: PathBuilder::default(),
        }
    }

    fn text_scale(&self, text: &str) -> Result<Scale> {
        let state = self.state.current();
        let device_size = state.font_size * state.scale_factor();
        if !device_size.is_finite() || device_size <= 0.0 {
            return Err(HudError::Text {
                text: text.to_string(),
                reason: format!("invalid font size {}", state.font_size),
            });
        }
        Ok(Scale::uniform(state.font_size as f32))
    }
}

impl Surface for RasterSurface<'_> {
    fn clear(&mut self) {
        self.canvas.clear((0x00, 0x00, 0x00));
        self.path.clear();
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn transform(&self) -> Affine {
        self.state.current().transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.current_mut().transform = transform;
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, point: Point) {
        let device = self.state.current().transform * point;
        self.path.move_to(device);
    }

    fn line_to(&mut self, point: Point) {
        let device = self.state.current().transform * point;
        self.path.line_to(device);
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        let transform = self.state.current().transform;
        self.path.arc(transform, center, radius, start_angle, end_angle);
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn stroke(&mut self) -> Result<()> {
        stroke_subpaths(&mut self.canvas, self.path.subpaths(), self.state.current());
        Ok(())
    }

    fn clip(&mut self) {
        let polygons = self.path.polygons();
        self.state.current_mut().clip.extend(polygons);
    }

    fn set_line_width(&mut self, width: f64) {
        self.state.current_mut().line_width = width;
    }

    fn set_color(&mut self, color: Color) {
        self.state.current_mut().color = color;
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.state.current_mut().alpha = alpha;
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        self.state.current_mut().dash = dash.to_vec();
    }

    fn set_font_size(&mut self, size: f64) {
        self.state.current_mut().font_size = size;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.current_mut().align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.current_mut().baseline = baseline;
    }

    fn measure_text(&mut self, text: &str) -> Result<f64> {
        let scale = self.text_scale(text)?;
        Ok(text_width(self.font, text, scale))
    }

    fn fill_text(&mut self, text: &str, at: Point) -> Result<()> {
        self.text_scale(text)?;
        draw_text(&mut self.canvas, self.font, self.state.current(), text, at);
        Ok(())
    }
}
