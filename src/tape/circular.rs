use super::{clip_rect, mirror_factor, NotchBox};
use crate::config::TapeGeometry;
use crate::error::Result;
use crate::surface::{Surface, TextAlign};
use crate::tick::{TickLayout, Wrap};
use crate::transform::{scoped, TransformOp};
use kurbo::Point;

/// Horizontal compass tape.
#[derive(Debug, Clone, Copy)]
pub struct CircularTape<'a> {
    pub geometry: &'a TapeGeometry,
    pub font_scale: f64,
    pub visible_range: u32,
    /// Draw upwards from the bottom edge instead of downwards from the top.
    pub bottom: bool,
}

impl CircularTape<'_> {
    pub fn layout(&self, heading_degrees: f64) -> TickLayout {
        TickLayout::builder()
            .value(heading_degrees)
            .step_size(self.geometry.step_width)
            .visible_range(self.visible_range)
            .wrap(Wrap::Mod360)
            .margin(self.geometry.step_margin)
            .build()
    }

    /// `heading` is in radians.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, origin: Point, heading: f64) -> Result<()> {
        let g = self.geometry;
        let mf = mirror_factor(self.bottom);
        let value = heading.to_degrees();

        scoped(surface, &[TransformOp::translate(origin.x, origin.y)], |s| {
            let notch = NotchBox::measure(s, "360", g, self.font_scale)?;
            let shown = Wrap::Mod360.normalize(value.round() as i64);
            notch.draw(s, &shown.to_string(), mf)?;

            let font_size = g.scale_font_size * self.font_scale;
            s.translate(0.0, mf * (notch.height + g.border));
            s.set_font_size(font_size);
            s.set_text_align(TextAlign::Center);

            let window = f64::from(self.visible_range) * g.step_width;
            clip_rect(
                s,
                -window / 2.0,
                0.0,
                window,
                mf * (g.step_lengths[0] + 2.0 * g.arc_label_border + font_size),
            );

            let label_y = mf * (g.step_lengths[0] + g.arc_label_border + font_size / 2.0);
            s.begin_path();
            for tick in self.layout(value).ticks() {
                let x = tick.offset;
                s.move_to(Point::new(x, 0.0));
                s.line_to(Point::new(x, mf * g.step_lengths[tick.magnitude.rank()]));
                if let Some(label) = &tick.label {
                    s.fill_text(label, Point::new(x, label_y))?;
                }
            }
            s.stroke()
        })
    }
}
