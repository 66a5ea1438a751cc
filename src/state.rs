use crate::error::{HudError, Result};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Flight values the HUD draws. Angles are in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightState {
    pub pitch: f64,
    pub roll: f64,
    pub heading: f64,
    /// Velocity vector pitch relative to the attitude.
    pub flight_path_pitch: f64,
    /// Velocity vector heading relative to the attitude.
    pub flight_path_heading: f64,
    pub speed: f64,
    pub altitude: f64,
    /// Throttle position in [0, 1].
    pub throttle: f64,
}

/// Command enum for type-safe flight state updates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightCommand {
    SetPitch(f64),
    SetRoll(f64),
    SetHeading(f64),
    SetFlightPathPitch(f64),
    SetFlightPathHeading(f64),
    SetSpeed(f64),
    SetAltitude(f64),
    SetThrottle(f64),
    SetAttitude { pitch: f64, roll: f64, heading: f64 },
    SetFlightPath { pitch: f64, heading: f64 },
}

impl FlightState {
    pub fn apply(&mut self, command: FlightCommand) {
        match command {
            FlightCommand::SetPitch(value) => self.pitch = value,
            FlightCommand::SetRoll(value) => self.roll = value,
            FlightCommand::SetHeading(value) => self.heading = value,
            FlightCommand::SetFlightPathPitch(value) => self.flight_path_pitch = value,
            FlightCommand::SetFlightPathHeading(value) => self.flight_path_heading = value,
            FlightCommand::SetSpeed(value) => self.speed = value,
            FlightCommand::SetAltitude(value) => self.altitude = value,
            FlightCommand::SetThrottle(value) => self.throttle = value.clamp(0.0, 1.0),
            FlightCommand::SetAttitude {
                pitch,
                roll,
                heading,
            } => {
                self.pitch = pitch;
                self.roll = roll;
                self.heading = heading;
            }
            FlightCommand::SetFlightPath { pitch, heading } => {
                self.flight_path_pitch = pitch;
                self.flight_path_heading = heading;
            }
        }
    }
}

/// Feed lines look like `roll 0.25` or `speed=310`. Angles are radians.
impl FromStr for FlightCommand {
    type Err = HudError;

    fn from_str(line: &str) -> Result<Self> {
        let parse_error = |reason: &str| HudError::Parse {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = line.trim();
        let (field, value) = trimmed
            .split_once('=')
            .or_else(|| trimmed.split_once(char::is_whitespace))
            .ok_or_else(|| parse_error("expected `<field> <value>`"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| parse_error("value is not a number"))?;
        if !value.is_finite() {
            return Err(parse_error("value is not finite"));
        }

        match field.trim() {
            "pitch" => Ok(Self::SetPitch(value)),
            "roll" => Ok(Self::SetRoll(value)),
            "heading" => Ok(Self::SetHeading(value)),
            "fp_pitch" => Ok(Self::SetFlightPathPitch(value)),
            "fp_heading" => Ok(Self::SetFlightPathHeading(value)),
            "speed" => Ok(Self::SetSpeed(value)),
            "altitude" => Ok(Self::SetAltitude(value)),
            "throttle" => Ok(Self::SetThrottle(value)),
            _ => Err(parse_error("unknown field")),
        }
    }
}

/// Handle to the flight state shared between a feed and the renderer.
///
/// Writers may run on any thread. The renderer reads every field at once
/// through [`SharedFlightState::snapshot`] so a frame never mixes old and new
/// values.
#[derive(Debug, Clone, Default)]
pub struct SharedFlightState {
    inner: Arc<Mutex<FlightState>>,
}

impl SharedFlightState {
    pub fn new(initial: FlightState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> FlightState {
        *self.lock()
    }

    pub fn apply(&self, command: FlightCommand) {
        self.lock().apply(command);
    }

    /// Applies a batch of commands under a single lock.
    pub fn apply_all(&self, commands: impl IntoIterator<Item = FlightCommand>) {
        let mut state = self.lock();
        for command in commands {
            state.apply(command);
        }
    }

    pub fn set_pitch(&self, value: f64) {
        self.apply(FlightCommand::SetPitch(value));
    }

    pub fn set_roll(&self, value: f64) {
        self.apply(FlightCommand::SetRoll(value));
    }

    pub fn set_heading(&self, value: f64) {
        self.apply(FlightCommand::SetHeading(value));
    }

    pub fn set_flight_path_pitch(&self, value: f64) {
        self.apply(FlightCommand::SetFlightPathPitch(value));
    }

    pub fn set_flight_path_heading(&self, value: f64) {
        self.apply(FlightCommand::SetFlightPathHeading(value));
    }

    pub fn set_speed(&self, value: f64) {
        self.apply(FlightCommand::SetSpeed(value));
    }

    pub fn set_altitude(&self, value: f64) {
        self.apply(FlightCommand::SetAltitude(value));
    }

    pub fn set_throttle(&self, value: f64) {
        self.apply(FlightCommand::SetThrottle(value));
    }
}
