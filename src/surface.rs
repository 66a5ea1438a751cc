//! The drawing collaborator every instrument renders onto.

use crate::config::Color;
use crate::error::Result;
use crate::transform::StateStack;
use kurbo::{Affine, Point, Vec2};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

/// Canvas-like vector drawing surface.
///
/// Path points are mapped through the transform current at the time they are
/// added. `save`/`restore` cover the transform, the pen and text state, and
/// the clip region.
pub trait Surface {
    fn clear(&mut self);
    fn save(&mut self);
    fn restore(&mut self);
    fn transform(&self) -> Affine;
    fn set_transform(&mut self, transform: Affine);

    fn begin_path(&mut self);
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point);
    /// Clockwise arc from `start_angle` to `end_angle`, joined to the current point.
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64);
    fn close_path(&mut self);
    fn stroke(&mut self) -> Result<()>;
    /// Intersects the clip region with the current path.
    fn clip(&mut self);

    fn set_line_width(&mut self, width: f64);
    fn set_color(&mut self, color: Color);
    fn set_alpha(&mut self, alpha: f64);
    /// Dash pattern in user units; an empty slice draws solid lines.
    fn set_line_dash(&mut self, dash: &[f64]);

    fn set_font_size(&mut self, size: f64);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn measure_text(&mut self, text: &str) -> Result<f64>;
    fn fill_text(&mut self, text: &str, at: Point) -> Result<()>;

    fn translate(&mut self, x: f64, y: f64) {
        let transform = self.transform() * Affine::translate((x, y));
        self.set_transform(transform);
    }

    fn rotate(&mut self, angle: f64) {
        let transform = self.transform() * Affine::rotate(angle);
        self.set_transform(transform);
    }
}

/// Pen, text and clip state saved and restored together with the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub transform: Affine,
    pub line_width: f64,
    pub color: Color,
    pub alpha: f64,
    pub dash: Vec<f64>,
    pub font_size: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
    /// Device-space polygons; a pixel is visible when it lies inside all of them.
    pub clip: Vec<Vec<Point>>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            line_width: 1.0,
            color: Color::new(0x00, 0x00, 0x00),
            alpha: 1.0,
            dash: Vec::new(),
            font_size: 10.0,
            align: TextAlign::Left,
            baseline: TextBaseline::Middle,
            clip: Vec::new(),
        }
    }
}

impl GraphicsState {
    /// Uniform scale factor of the current transform.
    pub fn scale_factor(&self) -> f64 {
        scale_of(self.transform)
    }

    /// Rotation of the current transform in radians.
    pub fn rotation(&self) -> f64 {
        rotation_of(self.transform)
    }
}

fn scale_of(transform: Affine) -> f64 {
    let [a, b, ..] = transform.as_coeffs();
    a.hypot(b)
}

fn rotation_of(transform: Affine) -> f64 {
    let [a, b, ..] = transform.as_coeffs();
    b.atan2(a)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Path under construction, flattened to device-space polylines.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    subpaths: Vec<Subpath>,
}

impl PathBuilder {
    const ARC_SEGMENT: f64 = 2.0;

    pub fn clear(&mut self) {
        self.subpaths.clear();
    }

    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    pub fn move_to(&mut self, point: Point) {
        self.subpaths.push(Subpath {
            points: vec![point],
            closed: false,
        });
    }

    pub fn line_to(&mut self, point: Point) {
        match self.subpaths.last_mut() {
            Some(subpath) if !subpath.closed => subpath.points.push(point),
            _ => self.move_to(point),
        }
    }

    pub fn close(&mut self) {
        if let Some(subpath) = self.subpaths.last_mut() {
            subpath.closed = true;
        }
    }

    /// Flattens an arc given in user space and appends it in device space.
    pub fn arc(
        &mut self,
        transform: Affine,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) {
        let sweep = (end_angle - start_angle).clamp(-TAU, TAU);
        let device_radius = radius * scale_of(transform);
        let segments = ((sweep.abs() * device_radius) / Self::ARC_SEGMENT)
            .ceil()
            .clamp(1.0, 4096.0) as usize;
        for i in 0..=segments {
            let angle = start_angle + sweep * (i as f64 / segments as f64);
            let local = center + Vec2::from_angle(angle) * radius;
            self.line_to(transform * local);
        }
    }

    /// Closed polygons suitable as a clip region.
    pub fn polygons(&self) -> Vec<Vec<Point>> {
        self.subpaths
            .iter()
            .filter(|subpath| subpath.points.len() >= 3)
            .map(|subpath| subpath.points.clone())
            .collect()
    }
}

/// One recorded drawing call, in device space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear,
    BeginPath,
    MoveTo(Point),
    LineTo(Point),
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    ClosePath,
    Stroke {
        width: f64,
        color: Color,
        alpha: f64,
        dash: Vec<f64>,
    },
    /// Device-space polygons intersected into the clip region.
    Clip(Vec<Vec<Point>>),
    Text {
        text: String,
        at: Point,
        rotation: f64,
        font_size: f64,
        align: TextAlign,
        baseline: TextBaseline,
        color: Color,
    },
}

/// Surface that records every call instead of drawing.
///
/// Text is measured as a monospace font whose advance is
/// `char_width * font_size` per character.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    state: StateStack<GraphicsState>,
    path: PathBuilder,
    calls: Vec<DrawCall>,
    pub char_width: f64,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            state: StateStack::new(GraphicsState::default()),
            path: PathBuilder::default(),
            calls: Vec::new(),
            char_width: 0.6,
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn state(&self) -> &GraphicsState {
        self.state.current()
    }

    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }

    /// Polygons of every clip call so far, in call order.
    pub fn clips(&self) -> Vec<&[Vec<Point>]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Clip(polygons) => Some(polygons.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Labels drawn so far, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn device(&self, point: Point) -> Point {
        self.state.current().transform * point
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear);
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
        self.calls.push(DrawCall::BeginPath);
    }

    fn move_to(&mut self, point: Point) {
        let point = self.device(point);
        self.path.move_to(point);
        self.calls.push(DrawCall::MoveTo(point));
    }

    fn line_to(&mut self, point: Point) {
        let point = self.device(point);
        self.path.line_to(point);
        self.calls.push(DrawCall::LineTo(point));
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, end_angle: f64) {
        let state = self.state.current();
        self.path.arc(state.transform, center, radius, start_angle, end_angle);
        let rotation = state.rotation();
        let call = DrawCall::Arc {
            center: state.transform * center,
            radius: radius * state.scale_factor(),
            start_angle: start_angle + rotation,
            end_angle: end_angle + rotation,
        };
        self.calls.push(call);
    }

    fn close_path(&mut self) {
        self.path.close();
        self.calls.push(DrawCall::ClosePath);
    }

    fn stroke(&mut self) -> Result<()> {
        let state = self.state.current();
        let call = DrawCall::Stroke {
            width: state.line_width * state.scale_factor(),
            color: state.color,
            alpha: state.alpha,
            dash: state.dash.clone(),
        };
        self.calls.push(call);
        Ok(())
    }

    fn clip(&mut self) {
        let polygons = self.path.polygons();
        self.state.current_mut().clip.extend(polygons.iter().cloned());
        self.calls.push(DrawCall::Clip(polygons));
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
        Ok(text.chars().count() as f64 * self.char_width * self.state.current().font_size)
    }

    fn fill_text(&mut self, text: &str, at: Point) -> Result<()> {
        let state = self.state.current();
        let call = DrawCall::Text {
            text: text.to_string(),
            at: state.transform * at,
            rotation: state.rotation(),
            font_size: state.font_size * state.scale_factor(),
            align: state.align,
            baseline: state.baseline,
            color: state.color,
        };
        self.calls.push(call);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn records_points_in_device_space() {
        let mut surface = RecordingSurface::new();
        surface.translate(10.0, 20.0);
        surface.move_to(Point::new(1.0, 2.0));
        assert_eq!(surface.calls(), &[DrawCall::MoveTo(Point::new(11.0, 22.0))]);
    }

    #[test]
    fn save_restore_covers_pen_state() {
        let mut surface = RecordingSurface::new();
        surface.set_line_width(2.0);
        surface.save();
        surface.set_line_width(5.0);
        surface.set_font_size(30.0);
        surface.restore();
        assert_eq!(surface.state().line_width, 2.0);
        assert_eq!(surface.state().font_size, 10.0);
    }

    #[test]
    fn measures_monospace_text() {
        let mut surface = RecordingSurface::new();
        surface.set_font_size(20.0);
        let width = surface.measure_text("9999").unwrap();
        assert!((width - 48.0).abs() < 1e-9);
    }

    #[test]
    fn clip_records_device_polygon_until_restore() {
        let mut surface = RecordingSurface::new();
        surface.save();
        surface.translate(10.0, 20.0);
        surface.begin_path();
        surface.move_to(Point::ZERO);
        surface.line_to(Point::new(5.0, 0.0));
        surface.line_to(Point::new(5.0, 5.0));
        surface.close_path();
        surface.clip();

        let triangle = vec![
            Point::new(10.0, 20.0),
            Point::new(15.0, 20.0),
            Point::new(15.0, 25.0),
        ];
        assert_eq!(surface.clips(), vec![std::slice::from_ref(&triangle)]);
        assert_eq!(surface.state().clip, vec![triangle]);

        surface.restore();
        assert!(surface.state().clip.is_empty());
    }

    #[test]
    fn path_builder_flattens_arcs_in_device_space() {
        let mut path = PathBuilder::default();
        path.move_to(Point::ZERO);
        path.arc(Affine::translate((100.0, 0.0)), Point::ZERO, 50.0, 0.0, PI);
        path.close();

        let subpath = &path.subpaths()[0];
        assert!(subpath.closed);
        let first_on_arc = subpath.points[1];
        let last = *subpath.points.last().unwrap();
        assert!((first_on_arc - Point::new(150.0, 0.0)).hypot() < 1e-9);
        assert!((last - Point::new(50.0, 0.0)).hypot() < 1e-9);
        assert_eq!(path.polygons().len(), 1);
    }

    #[test]
    fn rotation_and_scale_are_recovered_from_transform() {
        let state = GraphicsState {
            transform: Affine::scale(2.0) * Affine::rotate(FRAC_PI_2),
            ..GraphicsState::default()
        };
        assert!((state.scale_factor() - 2.0).abs() < 1e-12);
        assert!((state.rotation() - FRAC_PI_2).abs() < 1e-12);
    }
}
