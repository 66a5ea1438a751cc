use crate::config::HudConfig;
use crate::error::{HudError, Result};
use crate::frame::{FrameDriver, FrameStatus};
use crate::gauges::SystemClock;
use crate::raster::RasterSurface;
use crate::state::{FlightCommand, SharedFlightState};

use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Opens the HUD window and renders until it is closed, stopped, or a frame fails.
pub(crate) fn run_window(
    config: &HudConfig,
    state: &SharedFlightState,
    receiver: Option<Receiver<FlightCommand>>,
    stop_requested: &AtomicBool,
) -> Result<()> {
    let font = Font::try_from_vec(config.font_data.clone()).ok_or(HudError::FontLoad {
        len: config.font_data.len(),
    })?;

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(LogicalSize::new(
            config.window_width as f64,
            config.window_height as f64,
        ))
        .with_resizable(true)
        .build(&event_loop)?;
    let window = Arc::new(window);

    let size = window.inner_size();
    let mut fb_width = size.width as usize;
    let mut fb_height = size.height as usize;
    let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

    let mut driver = FrameDriver::new(config, SystemClock::new(config.clock_utc_offset_minutes));
    driver.resize(size.width, size.height, window.scale_factor());
    driver.start();
    info!(
        width = size.width,
        height = size.height,
        scale_factor = window.scale_factor(),
        "hud window opened"
    );

    let frame_duration = Duration::from_secs_f64(1.0 / config.max_framerate.max(1.0));
    let mut last_frame = Instant::now();
    let mut failure: Option<HudError> = None;

    event_loop.run(|event, window_target| {
        window_target.set_control_flow(ControlFlow::Poll);
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    debug!("close requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    // Minimized
                    if new_size.width == 0 || new_size.height == 0 {
                        return;
                    }
                    let resized = pixels
                        .resize_buffer(new_size.width, new_size.height)
                        .and_then(|()| pixels.resize_surface(new_size.width, new_size.height));
                    if let Err(err) = resized {
                        error!(%err, "failed to resize frame buffer");
                        failure = Some(err.into());
                        window_target.exit();
                        return;
                    }
                    fb_width = new_size.width as usize;
                    fb_height = new_size.height as usize;
                    driver.resize(new_size.width, new_size.height, window.scale_factor());
                }
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    driver.resize(fb_width as u32, fb_height as u32, scale_factor);
                }
                WindowEvent::RedrawRequested => {
                    if let Some(receiver) = &receiver {
                        state.apply_all(receiver.try_iter());
                    }
                    if stop_requested.load(Ordering::Relaxed) {
                        driver.stop();
                    }

                    let snapshot = state.snapshot();
                    let frame = pixels.frame_mut();
                    let mut surface = RasterSurface::new(frame, fb_width, fb_height, &font);
                    match driver.render_frame(&mut surface, &snapshot) {
                        Ok(FrameStatus::Continue) => {}
                        Ok(FrameStatus::Stopped) => {
                            info!(frames = driver.frames(), "hud stopped");
                            window_target.exit();
                        }
                        Err(err) => {
                            error!(%err, "frame failed; stopping");
                            failure = Some(err);
                            window_target.exit();
                            return;
                        }
                    }

                    if let Err(err) = pixels.render() {
                        error!(%err, "failed to present frame");
                        failure = Some(err.into());
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                if last_frame.elapsed() >= frame_duration {
                    window.request_redraw();
                    last_frame = Instant::now();
                }
            }
            _ => {}
        }
    })?;

    failure.map_or(Ok(()), Err)
}
