// ============================================================================
// CRATE CONFIGURATION & MODULES
// ============================================================================

pub mod config;
pub mod error;
pub mod frame;
pub mod gauges;
pub mod ladder;
pub mod raster;
pub mod state;
pub mod surface;
pub mod tape;
pub mod tick;
pub mod transform;
mod window;

pub use config::{
    Color, DisplayConfig, HudConfig, LadderGeometry, PanelLayout, RollRadiusPolicy, Shadow, Style,
    TapeGeometry,
};
pub use error::{HudError, Result};
pub use frame::{FrameDriver, FrameStatus, Viewport};
pub use gauges::{Clock, FixedClock, SystemClock};
pub use state::{FlightCommand, FlightState, SharedFlightState};
pub use surface::{DrawCall, RecordingSurface, Surface};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Main HUD struct - the primary public interface
#[derive(Debug, Clone)]
pub struct Hud {
    config: HudConfig,
    state: SharedFlightState,
    stop_requested: Arc<AtomicBool>,
}

/// Asks a running HUD window to close after the current frame.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Hud {
    pub fn new(config: HudConfig) -> Self {
        Self {
            config,
            state: SharedFlightState::default(),
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &HudConfig {
        &self.config
    }

    /// Handle for writing flight values from any thread.
    pub fn flight_state(&self) -> SharedFlightState {
        self.state.clone()
    }

    /// Handle that closes the window from any thread. A stop issued before
    /// [`Hud::show`] is kept, so the window closes at its first frame.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_requested.clone())
    }

    /// Opens the window and blocks until it is closed.
    pub fn show(&mut self) -> Result<()> {
        self.run(None)
    }

    /// Like [`Hud::show`], draining `receiver` into the flight state before
    /// every frame.
    pub fn show_with_commands(&mut self, receiver: Receiver<FlightCommand>) -> Result<()> {
        self.run(Some(receiver))
    }

    fn run(&mut self, receiver: Option<Receiver<FlightCommand>>) -> Result<()> {
        window::run_window(&self.config, &self.state, receiver, &self.stop_requested)
    }
}
