//! Per-frame composition of every instrument.

use crate::config::{DisplayConfig, HudConfig, LadderGeometry, PanelLayout, Style, TapeGeometry};
use crate::error::Result;
use crate::gauges::{Clock, ClockReadout, ThrottleGauge};
use crate::ladder::AttitudeLadder;
use crate::state::{FlightState, SharedFlightState};
use crate::surface::Surface;
use crate::tape::{CircularTape, LinearTape, RadialTape};
use crate::transform::with_shadow;
use kurbo::{Affine, Point};
use tracing::{debug, trace};

/// Size of the backing buffer and the factor mapping logical to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stopped,
}

/// Renders complete frames from flight state snapshots.
pub struct FrameDriver<C: Clock> {
    display: DisplayConfig,
    style: Style,
    tapes: TapeGeometry,
    ladder: LadderGeometry,
    layout: PanelLayout,
    clock: C,
    viewport: Viewport,
    running: bool,
    frames: u64,
}

impl<C: Clock> FrameDriver<C> {
    pub fn new(config: &HudConfig, clock: C) -> Self {
        Self {
            display: config.display.clone(),
            style: config.style.clone(),
            tapes: config.tapes.clone(),
            ladder: config.ladder.clone(),
            layout: config.layout.clone(),
            clock,
            viewport: Viewport {
                width: config.window_width as u32,
                height: config.window_height as u32,
                scale_factor: 1.0,
            },
            running: false,
            frames: 0,
        }
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayConfig {
        &mut self.display
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Adopts a new buffer size. Returns `false` when nothing changed.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> bool {
        let viewport = Viewport {
            width,
            height,
            scale_factor,
        };
        if viewport == self.viewport {
            return false;
        }
        debug!(width, height, scale_factor, "viewport resized");
        self.viewport = viewport;
        true
    }

    pub fn start(&mut self) {
        debug!("frame driver started");
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(frames = self.frames, "frame driver stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Logical-to-device scale: window scale factor times UI scale.
    pub fn scale(&self) -> f64 {
        self.viewport.scale_factor * self.display.scale
    }

    /// Canvas size in logical pixels.
    pub fn logical_size(&self) -> (f64, f64) {
        let scale = self.scale();
        (
            f64::from(self.viewport.width) / scale,
            f64::from(self.viewport.height) / scale,
        )
    }

    pub fn render_shared<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        state: &SharedFlightState,
    ) -> Result<FrameStatus> {
        let snapshot = state.snapshot();
        self.render_frame(surface, &snapshot)
    }

    /// Clears the surface and draws one frame from `state`.
    ///
    /// A stopped driver only clears. Every instrument starts from the base
    /// scale transform with the configured pen.
    pub fn render_frame<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        state: &FlightState,
    ) -> Result<FrameStatus> {
        surface.set_transform(Affine::IDENTITY);
        surface.clear();
        if !self.running {
            return Ok(FrameStatus::Stopped);
        }

        let base = Affine::scale(self.scale());
        let (width, height) = self.logical_size();
        surface.set_transform(base);
        surface.set_line_width(self.style.line_width);
        surface.set_color(self.style.color);
        surface.set_alpha(1.0);
        surface.set_line_dash(&[]);

        let ladder = AttitudeLadder {
            geometry: &self.ladder,
            display: &self.display,
            style: &self.style,
        };
        ladder.draw(surface, Point::new(width / 2.0, height / 2.0), state)?;
        surface.set_transform(base);

        self.draw_tapes(surface, width, height, state)?;
        self.draw_gauges(surface, height, state)?;

        self.frames += 1;
        trace!(frame = self.frames, "frame rendered");
        Ok(FrameStatus::Continue)
    }

    fn draw_tapes<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        width: f64,
        height: f64,
        state: &FlightState,
    ) -> Result<()> {
        let layout = &self.layout;
        let border = layout.border;
        let font_scale = self.style.font_scale;

        let speed = LinearTape {
            geometry: &self.tapes,
            font_scale,
            example: &layout.speed_example,
            visible_range: layout.speed_visible_range,
            right: false,
        };
        with_shadow(surface, &self.style, |s| {
            speed.draw(s, Point::new(border, height / 2.0), state.speed)
        })?;

        let altitude = LinearTape {
            example: &layout.altitude_example,
            visible_range: layout.altitude_visible_range,
            right: true,
            ..speed
        };
        with_shadow(surface, &self.style, |s| {
            altitude.draw(s, Point::new(width - border, height / 2.0), state.altitude)
        })?;

        let heading = CircularTape {
            geometry: &self.tapes,
            font_scale,
            visible_range: layout.heading_visible_range,
            bottom: layout.heading_at_bottom,
        };
        let heading_y = if heading.bottom { height - border } else { border };
        with_shadow(surface, &self.style, |s| {
            heading.draw(s, Point::new(width / 2.0, heading_y), state.heading)
        })?;

        let roll = RadialTape {
            geometry: &self.tapes,
            font_scale,
            visible_range: layout.roll_visible_range,
            bottom: layout.roll_at_bottom,
            radius_policy: self.display.roll_radius_policy,
        };
        let roll_y = if roll.bottom { height - border } else { border };
        with_shadow(surface, &self.style, |s| {
            roll.draw(s, Point::new(width / 2.0, roll_y), state.roll, height)
                .map(|_| ())
        })
    }

    fn draw_gauges<S: Surface + ?Sized>(&self, surface: &mut S, height: f64, state: &FlightState) -> Result<()> {
        let layout = &self.layout;
        let font_scale = self.style.font_scale;
        // Clear of the speed tape's value box.
        let y_dif = self.tapes.value_font_size * font_scale + self.tapes.text_top_border;

        let throttle = ThrottleGauge { layout, font_scale };
        with_shadow(surface, &self.style, |s| {
            throttle.draw(s, Point::new(layout.border, height / 2.0 - y_dif), state.throttle)
        })?;

        let clock = ClockReadout {
            clock: &self.clock,
            font_size: layout.clock_font_size * font_scale,
        };
        with_shadow(surface, &self.style, |s| {
            clock.draw(s, Point::new(layout.border, height / 2.0 + y_dif))
        })
    }
}
