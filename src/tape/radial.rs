use super::{mirror_factor, NotchBox};
use crate::config::{RollRadiusPolicy, TapeGeometry};
use crate::error::Result;
use crate::surface::{Surface, TextAlign};
use crate::tick::{TickLayout, Wrap};
use crate::transform::{scoped, TransformOp};
use kurbo::Point;
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::trace;

/// Canvas measurements the `Center` radius policy depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusInputs {
    pub step_width: f64,
    /// Half the canvas height.
    pub extent: f64,
    /// Distance from the tape origin to the edge it is anchored to.
    pub edge_distance: f64,
    pub box_height: f64,
    pub border: f64,
}

/// Radius of the roll arc in logical pixels.
///
/// `Exact` makes one degree of arc as long as one linear step. `Center`
/// places the arc centre in the middle of the canvas, which can yield zero
/// or a negative radius on short canvases.
pub fn resolve_radius(policy: RollRadiusPolicy, inputs: &RadiusInputs) -> f64 {
    match policy {
        RollRadiusPolicy::Fixed(radius) => radius,
        RollRadiusPolicy::Exact => inputs.step_width * 180.0 / PI,
        RollRadiusPolicy::Center => {
            inputs.extent - inputs.edge_distance - (inputs.box_height + inputs.border)
        }
    }
}

/// Roll tape: ticks on an arc around a centre below (or above) the value box.
#[derive(Debug, Clone, Copy)]
pub struct RadialTape<'a> {
    pub geometry: &'a TapeGeometry,
    pub font_scale: f64,
    pub visible_range: u32,
    pub bottom: bool,
    pub radius_policy: RollRadiusPolicy,
}

impl RadialTape<'_> {
    pub fn layout(&self, roll_degrees: f64) -> TickLayout {
        TickLayout::builder()
            .value(roll_degrees)
            .step_size(self.geometry.step_width)
            .visible_range(self.visible_range)
            .wrap(Wrap::Mod180Signed)
            .margin(self.geometry.step_margin)
            .build()
    }

    /// Draws the tape for `roll` (radians). Returns `false` without drawing
    /// anything when the resolved radius is not positive.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        origin: Point,
        roll: f64,
        canvas_height: f64,
    ) -> Result<bool> {
        let g = self.geometry;
        let mf = mirror_factor(self.bottom);
        let value = roll.to_degrees();

        scoped(surface, &[TransformOp::translate(origin.x, origin.y)], |s| {
            let notch = NotchBox::measure(s, "180", g, self.font_scale)?;
            let inputs = RadiusInputs {
                step_width: g.step_width,
                extent: canvas_height / 2.0,
                edge_distance: if self.bottom {
                    canvas_height - origin.y
                } else {
                    origin.y
                },
                box_height: notch.height,
                border: g.border,
            };
            let radius = resolve_radius(self.radius_policy, &inputs);
            if !(radius > 0.0) {
                trace!(radius, policy = ?self.radius_policy, "roll tape skipped");
                return Ok(false);
            }

            let shown = Wrap::Mod180Signed.normalize(value.round() as i64);
            notch.draw(s, &shown.to_string(), mf)?;

            let font_size = g.scale_font_size * self.font_scale;
            s.set_font_size(font_size);
            s.set_text_align(TextAlign::Center);
            s.translate(0.0, mf * (notch.height + g.border));
            s.translate(0.0, mf * radius);

            let base = if self.bottom { FRAC_PI_2 } else { 3.0 * FRAC_PI_2 };
            let sweep = f64::from(self.visible_range) * g.step_width / radius;
            s.begin_path();
            s.move_to(Point::ZERO);
            s.arc(Point::ZERO, radius, base - sweep / 2.0, base + sweep / 2.0);
            s.close_path();
            s.clip();

            let label_y = mf * (g.step_lengths[0] + g.arc_label_border + font_size / 2.0);
            s.begin_path();
            for tick in self.layout(value).ticks() {
                let ops = [
                    TransformOp::Rotate(mf * tick.offset / radius),
                    TransformOp::translate(0.0, -mf * radius),
                ];
                scoped(s, &ops, |s| {
                    s.move_to(Point::ZERO);
                    s.line_to(Point::new(0.0, mf * g.step_lengths[tick.magnitude.rank()]));
                    match &tick.label {
                        Some(label) => s.fill_text(label, Point::new(0.0, label_y)),
                        None => Ok(()),
                    }
                })?;
            }
            s.stroke()?;
            Ok(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};
    use kurbo::Affine;

    fn tape(geometry: &TapeGeometry, policy: RollRadiusPolicy) -> RadialTape<'_> {
        RadialTape {
            geometry,
            font_scale: 1.0,
            visible_range: 51,
            bottom: true,
            radius_policy: policy,
        }
    }

    fn inputs(extent: f64, edge_distance: f64) -> RadiusInputs {
        RadiusInputs {
            step_width: 8.0,
            extent,
            edge_distance,
            box_height: 37.5,
            border: 4.0,
        }
    }

    #[test]
    fn exact_radius_matches_linear_step() {
        let radius = resolve_radius(RollRadiusPolicy::Exact, &inputs(360.0, 16.0));
        assert!((radius - 458.366_236).abs() < 1e-6);
    }

    #[test]
    fn fixed_radius_is_used_verbatim() {
        assert_eq!(resolve_radius(RollRadiusPolicy::Fixed(260.0), &inputs(0.0, 0.0)), 260.0);
    }

    #[test]
    fn center_radius_from_canvas() {
        let radius = resolve_radius(RollRadiusPolicy::Center, &inputs(360.0, 16.0));
        assert!((radius - (360.0 - 16.0 - 41.5)).abs() < 1e-9);
        assert_eq!(resolve_radius(RollRadiusPolicy::Center, &inputs(57.5, 16.0)), 0.0);
        assert!(resolve_radius(RollRadiusPolicy::Center, &inputs(40.0, 16.0)) < 0.0);
    }

    #[test]
    fn non_positive_radius_draws_nothing() {
        let geometry = TapeGeometry::default();
        let mut surface = RecordingSurface::new();
        let drawn = tape(&geometry, RollRadiusPolicy::Center)
            .draw(&mut surface, Point::new(100.0, 50.0), 0.3, 60.0)
            .unwrap();
        assert!(!drawn);
        assert!(surface.calls().is_empty());
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn ticks_lie_on_the_arc() {
        let geometry = TapeGeometry::default();
        let origin = Point::new(640.0, 704.0);
        let mut surface = RecordingSurface::new();
        let drawn = tape(&geometry, RollRadiusPolicy::Fixed(260.0))
            .draw(&mut surface, origin, 0.2, 720.0)
            .unwrap();
        assert!(drawn);
        assert_eq!(surface.transform(), Affine::IDENTITY);

        // 37.5 notch height, 4 border, 260 radius, all upwards
        let center = Point::new(640.0, 704.0 - 37.5 - 4.0 - 260.0);
        let calls = surface.calls();
        let clip_at = calls
            .iter()
            .position(|call| matches!(call, DrawCall::Clip(_)))
            .unwrap();
        let tick_roots: Vec<Point> = calls[clip_at..]
            .iter()
            .filter_map(|call| match call {
                DrawCall::MoveTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(tick_roots.len(), 62);
        for root in tick_roots {
            assert!(((root - center).hypot() - 260.0).abs() < 1e-6);
            assert!(root.y > center.y);
        }
    }

    #[test]
    fn zero_roll_label_at_bottom_of_arc() {
        let geometry = TapeGeometry::default();
        let mut surface = RecordingSurface::new();
        tape(&geometry, RollRadiusPolicy::Fixed(260.0))
            .draw(&mut surface, Point::new(640.0, 704.0), 0.0, 720.0)
            .unwrap();
        let zero = surface.calls().iter().find_map(|call| match call {
            DrawCall::Text {
                text, at, rotation, ..
            } if text == "0" && at.y < 680.0 => Some((*at, *rotation)),
            _ => None,
        });
        let (at, rotation) = zero.unwrap();
        assert!((at.x - 640.0).abs() < 1e-9);
        assert!(rotation.abs() < 1e-12);
    }
}
