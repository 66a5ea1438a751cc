use super::{clip_rect, mirror_factor, PointerBox};
use crate::config::TapeGeometry;
use crate::error::Result;
use crate::surface::{Surface, TextAlign};
use crate::tick::{TickLayout, Wrap};
use crate::transform::{scoped, TransformOp};
use kurbo::Point;

/// Vertical tape used for speed and altitude.
///
/// The value box sits at the origin and points at the ruler. On the right
/// side of the screen the whole tape is mirrored so the ruler faces inwards.
#[derive(Debug, Clone, Copy)]
pub struct LinearTape<'a> {
    pub geometry: &'a TapeGeometry,
    pub font_scale: f64,
    /// Widest value the box must fit, e.g. `"9999"`.
    pub example: &'a str,
    pub visible_range: u32,
    pub right: bool,
}

impl LinearTape<'_> {
    pub fn layout(&self, value: f64) -> TickLayout {
        TickLayout::builder()
            .value(value)
            .step_size(self.geometry.step_width)
            .visible_range(self.visible_range)
            .wrap(Wrap::None)
            .margin(self.geometry.step_margin)
            .build()
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, origin: Point, value: f64) -> Result<()> {
        let g = self.geometry;
        let mf = mirror_factor(self.right);

        scoped(surface, &[TransformOp::translate(origin.x, origin.y)], |s| {
            let pointer = PointerBox::measure(s, self.example, g, self.font_scale)?;
            pointer.draw(s, &format!("{}", value.round() as i64), mf)?;

            s.translate(mf * (pointer.length + g.border), 0.0);
            s.set_font_size(g.scale_font_size * self.font_scale);
            s.set_text_align(if self.right {
                TextAlign::Right
            } else {
                TextAlign::Left
            });

            let label_width = s.measure_text(&format!("{}9", self.example))?;
            let window = f64::from(self.visible_range) * g.step_width;
            clip_rect(
                s,
                0.0,
                -window / 2.0,
                mf * (g.step_lengths[0] + 2.0 * g.linear_label_border + label_width),
                window,
            );

            let label_x = mf * (g.step_lengths[0] + g.linear_label_border);
            s.begin_path();
            for tick in self.layout(value).ticks() {
                // Values grow upwards.
                let y = -tick.offset;
                s.move_to(Point::new(0.0, y));
                s.line_to(Point::new(mf * g.step_lengths[tick.magnitude.rank()], y));
                if let Some(label) = &tick.label {
                    s.fill_text(label, Point::new(label_x, y))?;
                }
            }
            s.stroke()
        })
    }
}
