//! Artificial horizon: pitch ladder, horizon bar and flight-path marker.

use crate::config::{DisplayConfig, LadderGeometry, Style};
use crate::error::Result;
use crate::state::FlightState;
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::transform::{scoped, with_shadow, TransformOp};
use kurbo::Point;
use tracing::trace;

/// Lateral shift of the ladder in uncaged mode, in pixels.
///
/// Moves the ladder so its centreline passes through the flight-path marker.
/// Returns `None` when `tan(roll)` is undefined.
pub fn uncaged_offset(state: &FlightState, pixels_per_radian: f64) -> Option<f64> {
    if state.roll.cos().abs() < 1e-9 {
        return None;
    }
    Some(pixels_per_radian * (state.flight_path_heading - state.flight_path_pitch * state.roll.tan()))
}

/// Transform sequence applied, from the display centre, to the ladder.
pub fn ladder_ops(state: &FlightState, display: &DisplayConfig) -> Vec<TransformOp> {
    let ppr = display.pixels_per_radian();
    let mut ops = Vec::with_capacity(3);
    if display.uncaged_mode {
        match uncaged_offset(state, ppr) {
            Some(offset) => ops.push(TransformOp::translate(offset, 0.0)),
            None => trace!(roll = state.roll, "uncaged realignment skipped"),
        }
    }
    ops.push(TransformOp::Rotate(state.roll));
    ops.push(TransformOp::translate(0.0, state.pitch * ppr));
    ops
}

#[derive(Debug, Clone, Copy)]
pub struct AttitudeLadder<'a> {
    pub geometry: &'a LadderGeometry,
    pub display: &'a DisplayConfig,
    pub style: &'a Style,
}

impl AttitudeLadder<'_> {
    /// Draws the marker and ladder around `center`, each with its own shadow pass.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, center: Point, state: &FlightState) -> Result<()> {
        let ppr = self.display.pixels_per_radian();
        scoped(surface, &[TransformOp::translate(center.x, center.y)], |s| {
            let marker = Point::new(
                state.flight_path_heading * ppr,
                -state.flight_path_pitch * ppr,
            );
            with_shadow(s, self.style, |s| self.draw_flight_path_marker(s, marker))?;

            let ops = ladder_ops(state, self.display);
            with_shadow(s, self.style, |s| {
                scoped(s, &ops, |s| {
                    self.draw_horizon(s)?;
                    self.draw_rungs(s)
                })
            })
        })
    }

    fn draw_flight_path_marker<S: Surface + ?Sized>(&self, surface: &mut S, at: Point) -> Result<()> {
        let r = self.geometry.marker_radius;
        let line = self.geometry.marker_line;
        scoped(surface, &[TransformOp::translate(at.x, at.y)], |s| {
            s.begin_path();
            s.move_to(Point::new(0.0, -r));
            s.line_to(Point::new(r, 0.0));
            s.line_to(Point::new(0.0, r));
            s.line_to(Point::new(-r, 0.0));
            s.close_path();

            s.move_to(Point::new(r, 0.0));
            s.line_to(Point::new(r + line, 0.0));
            s.move_to(Point::new(0.0, -r));
            s.line_to(Point::new(0.0, -(r + line)));
            s.move_to(Point::new(-r, 0.0));
            s.line_to(Point::new(-(r + line), 0.0));
            s.stroke()
        })
    }

    fn draw_horizon<S: Surface + ?Sized>(&self, s: &mut S) -> Result<()> {
        let g = self.geometry;
        let half_gap = g.gap / 2.0;
        let half = g.horizon_length / 2.0;
        let q = g.chevron;

        s.begin_path();
        for side in [1.0, -1.0] {
            s.move_to(Point::new(side * half_gap, 0.0));
            s.line_to(Point::new(side * (half - q), 0.0));
            s.line_to(Point::new(side * half, q));
        }
        s.stroke()?;

        // -1, -2 and -3 degrees
        let ppd = self.display.pixels_per_degree();
        s.set_line_dash(&g.minor_mark_dash);
        s.begin_path();
        for k in 1..=3 {
            let y = f64::from(k) * ppd;
            for side in [1.0, -1.0] {
                s.move_to(Point::new(side * half_gap, y));
                s.line_to(Point::new(side * (half_gap + g.minor_mark_length), y));
            }
        }
        s.stroke()?;
        s.set_line_dash(&[]);
        Ok(())
    }

    fn draw_rungs<S: Surface + ?Sized>(&self, s: &mut S) -> Result<()> {
        let g = self.geometry;
        let step = g.pitch_step_degrees.max(1);
        s.set_font_size(g.label_font_size * self.style.font_scale);
        s.set_text_align(TextAlign::Right);
        s.set_text_baseline(TextBaseline::Middle);
        let label_width = s.measure_text("-90")?;

        for degrees in (step..=g.max_pitch_degrees).step_by(step as usize) {
            for signed in [degrees, -degrees] {
                self.draw_rung(s, signed, label_width)?;
            }
        }
        Ok(())
    }

    fn draw_rung<S: Surface + ?Sized>(&self, surface: &mut S, degrees: i32, label_width: f64) -> Result<()> {
        let g = self.geometry;
        let y = -f64::from(degrees) * self.display.pixels_per_degree();
        let half_gap = g.gap / 2.0;
        let half = g.rung_length / 2.0;
        // Chevrons point at the horizon.
        let q = if degrees > 0 { g.chevron } else { -g.chevron };

        scoped(surface, &[TransformOp::translate(0.0, y)], |s| {
            s.begin_path();
            for side in [1.0, -1.0] {
                s.move_to(Point::new(side * half_gap, 0.0));
                s.line_to(Point::new(side * (half - g.chevron), 0.0));
                s.line_to(Point::new(side * half, q));
            }
            s.stroke()?;

            let label = degrees.to_string();
            s.fill_text(&label, Point::new(half + g.label_border + label_width, q / 2.0))?;
            s.fill_text(&label, Point::new(-(half + g.label_border), q / 2.0))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCall, RecordingSurface};
    use crate::transform::compose;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn ladder<'a>(geometry: &'a LadderGeometry, display: &'a DisplayConfig, style: &'a Style) -> AttitudeLadder<'a> {
        AttitudeLadder {
            geometry,
            display,
            style,
        }
    }

    fn unshadowed() -> Style {
        Style {
            shadow: None,
            ..Style::default()
        }
    }

    #[test]
    fn uncaged_offset_formula() {
        let ppr = 12.0 * 180.0 / PI;
        let state = FlightState {
            flight_path_heading: 0.1,
            flight_path_pitch: 0.05,
            roll: 0.2,
            ..FlightState::default()
        };
        let offset = uncaged_offset(&state, ppr).unwrap();
        assert!((offset - ppr * (0.1 - 0.05 * 0.2f64.tan())).abs() < 1e-9);
    }

    #[test]
    fn uncaged_offset_undefined_at_vertical_bank() {
        let state = FlightState {
            roll: FRAC_PI_2,
            flight_path_pitch: 0.1,
            ..FlightState::default()
        };
        assert_eq!(uncaged_offset(&state, 600.0), None);
    }

    #[test]
    fn uncaged_ladder_centreline_passes_through_marker() {
        let mut display = DisplayConfig::default();
        display.uncaged_mode = true;
        let state = FlightState {
            flight_path_heading: 0.1,
            flight_path_pitch: 0.05,
            roll: 0.2,
            pitch: 0.07,
            ..FlightState::default()
        };
        let ppr = display.pixels_per_radian();
        let marker = Point::new(
            state.flight_path_heading * ppr,
            -state.flight_path_pitch * ppr,
        );
        let local = compose(&ladder_ops(&state, &display)).inverse() * marker;
        assert!(local.x.abs() < 1e-9);
    }

    #[test]
    fn caged_ops_are_rotate_then_pitch() {
        let display = DisplayConfig::default();
        let state = FlightState {
            pitch: 0.1,
            roll: 0.3,
            flight_path_heading: 0.2,
            ..FlightState::default()
        };
        assert_eq!(
            ladder_ops(&state, &display),
            vec![
                TransformOp::Rotate(0.3),
                TransformOp::translate(0.0, 0.1 * display.pixels_per_radian()),
            ]
        );
    }

    #[test]
    fn rungs_cover_both_signs() {
        let geometry = LadderGeometry::default();
        let display = DisplayConfig::default();
        let style = unshadowed();
        let mut surface = RecordingSurface::new();
        ladder(&geometry, &display, &style)
            .draw(&mut surface, Point::new(640.0, 360.0), &FlightState::default())
            .unwrap();

        let texts = surface.texts();
        assert_eq!(texts.len(), 36);
        assert_eq!(&texts[..4], ["10", "10", "-10", "-10"]);
        assert!(texts.contains(&"-90"));
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn rung_labels_sit_at_pitch_resolution() {
        let geometry = LadderGeometry::default();
        let display = DisplayConfig::default();
        let style = unshadowed();
        let mut surface = RecordingSurface::new();
        ladder(&geometry, &display, &style)
            .draw(&mut surface, Point::new(640.0, 360.0), &FlightState::default())
            .unwrap();

        let twenty = surface.calls().iter().find_map(|call| match call {
            DrawCall::Text { text, at, .. } if text == "20" => Some(*at),
            _ => None,
        });
        // 20 degrees up at 12 px/deg, label half a chevron below the rung
        assert_eq!(twenty.map(|p| p.y), Some(360.0 - 240.0 + 6.0));
    }

    #[test]
    fn minor_marks_are_dashed_and_dash_is_cleared() {
        let geometry = LadderGeometry::default();
        let display = DisplayConfig::default();
        let style = unshadowed();
        let mut surface = RecordingSurface::new();
        ladder(&geometry, &display, &style)
            .draw(&mut surface, Point::ZERO, &FlightState::default())
            .unwrap();
        let dashed = surface
            .calls()
            .iter()
            .filter(|call| matches!(call, DrawCall::Stroke { dash, .. } if !dash.is_empty()))
            .count();
        assert_eq!(dashed, 1);
        assert!(surface.state().dash.is_empty());
    }
}
