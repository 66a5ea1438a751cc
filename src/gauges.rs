//! Small fixed readouts: throttle dial and clock.

use crate::config::PanelLayout;
use crate::error::Result;
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::transform::{scoped, TransformOp};
use kurbo::Point;
use std::f64::consts::{FRAC_PI_2, PI};
use std::time::{SystemTime, UNIX_EPOCH};

const SECONDS_PER_DAY: i64 = 86_400;

/// Source of the time of day shown on the HUD.
pub trait Clock {
    /// Seconds since local midnight, in `0..86_400`.
    fn seconds_of_day(&self) -> u32;
}

/// Wall clock shifted by a fixed UTC offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    pub utc_offset_minutes: i32,
}

impl SystemClock {
    pub fn new(utc_offset_minutes: i32) -> Self {
        Self { utc_offset_minutes }
    }
}

impl Clock for SystemClock {
    fn seconds_of_day(&self) -> u32 {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let local = since_epoch + i64::from(self.utc_offset_minutes) * 60;
        local.rem_euclid(SECONDS_PER_DAY) as u32
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn seconds_of_day(&self) -> u32 {
        self.0 % SECONDS_PER_DAY as u32
    }
}

/// `HH:MM:SS`
pub fn format_clock(seconds_of_day: u32) -> String {
    let hours = seconds_of_day / 3600 % 24;
    let minutes = seconds_of_day / 60 % 60;
    let seconds = seconds_of_day % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Throttle dial: a 270° arc filled up to the current setting with the
/// percentage in the middle.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleGauge<'a> {
    pub layout: &'a PanelLayout,
    pub font_scale: f64,
}

impl ThrottleGauge<'_> {
    const START: f64 = FRAC_PI_2;
    const RANGE: f64 = 1.5 * PI;

    /// `anchor` is the bottom-left corner of the dial; `throttle` is in [0, 1].
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, anchor: Point, throttle: f64) -> Result<()> {
        let layout = self.layout;
        let throttle = throttle.clamp(0.0, 1.0);

        scoped(surface, &[], |s| {
            s.set_font_size(layout.throttle_font_size * self.font_scale);
            s.set_text_align(TextAlign::Center);
            s.set_text_baseline(TextBaseline::Middle);

            let radius = s.measure_text("100%")? / 2.0 + layout.throttle_border;
            let index = layout.throttle_index_length;
            let angle = Self::START + Self::RANGE * throttle;
            s.translate(anchor.x + radius + index, anchor.y - radius - index);

            s.fill_text(&format!("{}%", (throttle * 100.0).round() as i64), Point::ZERO)?;

            s.begin_path();
            s.arc(Point::ZERO, radius, Self::START, angle);
            s.line_to(Point::new(
                (radius + index) * angle.cos(),
                (radius + index) * angle.sin(),
            ));
            s.stroke()?;

            s.set_alpha(0.5);
            s.begin_path();
            s.arc(Point::ZERO, radius, angle, Self::START + Self::RANGE);
            s.stroke()
        })
    }
}

/// Time of day, left-aligned with its top edge at the anchor.
#[derive(Debug, Clone, Copy)]
pub struct ClockReadout<'a, C: Clock> {
    pub clock: &'a C,
    pub font_size: f64,
}

impl<C: Clock> ClockReadout<'_, C> {
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, anchor: Point) -> Result<()> {
        scoped(surface, &[TransformOp::translate(anchor.x, anchor.y)], |s| {
            s.set_font_size(self.font_size);
            s.set_text_align(TextAlign::Left);
            s.set_text_baseline(TextBaseline::Top);
            s.fill_text(&format_clock(self.clock.seconds_of_day()), Point::ZERO)
        })
    }
}
