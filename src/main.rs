use hud::{FlightCommand, Hud, HudConfig, HudError, RollRadiusPolicy};
use rand::Rng;
use std::env;
use std::io::{self, BufRead};
use std::process;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

struct Args {
    title: String,
    font: Option<String>,
    pixels_per_degree: Option<f64>,
    uncaged: bool,
    roll_radius: Option<RollRadiusPolicy>,
    utc_offset_minutes: i32,
    demo: bool,
}

fn parse_roll_radius(value: &str) -> Option<RollRadiusPolicy> {
    match value {
        "exact" => Some(RollRadiusPolicy::Exact),
        "center" => Some(RollRadiusPolicy::Center),
        _ => value
            .strip_prefix("fixed:")
            .and_then(|r| r.parse().ok())
            .map(RollRadiusPolicy::Fixed),
    }
}

fn parse_args() -> Args {
    let mut parsed = Args {
        title: "HUD".to_string(),
        font: env::var("HUD_FONT").ok(),
        pixels_per_degree: None,
        uncaged: false,
        roll_radius: None,
        utc_offset_minutes: 0,
        demo: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--title" => {
                if let Some(title) = args.next() {
                    parsed.title = title;
                }
            }
            "--font" => parsed.font = args.next(),
            "--ppd" => match args.next().and_then(|v| v.parse().ok()) {
                Some(ppd) => parsed.pixels_per_degree = Some(ppd),
                None => warn!("--ppd expects a number"),
            },
            "--uncaged" => parsed.uncaged = true,
            "--roll-radius" => match args.next().as_deref().and_then(parse_roll_radius) {
                Some(policy) => parsed.roll_radius = Some(policy),
                None => warn!("--roll-radius expects fixed:<px>, exact or center"),
            },
            "--utc-offset" => match args.next().and_then(|v| v.parse().ok()) {
                Some(minutes) => parsed.utc_offset_minutes = minutes,
                None => warn!("--utc-offset expects minutes"),
            },
            "--demo" => parsed.demo = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    parsed
}

/// Forwards `field value` lines from stdin until it closes.
fn spawn_stdin_feed(sender: Sender<FlightCommand>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<FlightCommand>() {
                Ok(command) => {
                    if sender.send(command).is_err() {
                        break;
                    }
                }
                Err(err) => warn!(%err, "ignoring feed line"),
            }
        }
    });
}

fn lerp(current: f64, target: f64) -> f64 {
    current + (target - current) * 0.05
}

/// Random walk over every flight value, eased towards new targets.
fn spawn_demo_feed(sender: Sender<FlightCommand>) {
    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut current = [0.0, 0.0, 0.0, 0.0, 0.0, 250.0, 3000.0, 0.6];
        let mut target = current;
        loop {
            if rng.random_bool(0.02) {
                target = [
                    rng.random_range(-0.35..0.35),
                    rng.random_range(-0.8..0.8),
                    rng.random_range(0.0..std::f64::consts::TAU),
                    rng.random_range(-0.05..0.05),
                    rng.random_range(-0.05..0.05),
                    rng.random_range(120.0..480.0),
                    rng.random_range(500.0..12000.0),
                    rng.random_range(0.0..1.0),
                ];
            }
            for (value, goal) in current.iter_mut().zip(target) {
                *value = lerp(*value, goal);
            }
            let [pitch, roll, heading, fp_pitch, fp_heading, speed, altitude, throttle] = current;
            let commands = [
                FlightCommand::SetAttitude {
                    pitch,
                    roll,
                    heading,
                },
                FlightCommand::SetFlightPath {
                    pitch: fp_pitch,
                    heading: fp_heading,
                },
                FlightCommand::SetSpeed(speed),
                FlightCommand::SetAltitude(altitude),
                FlightCommand::SetThrottle(throttle),
            ];
            if commands.into_iter().any(|cmd| sender.send(cmd).is_err()) {
                break;
            }
            thread::sleep(Duration::from_millis(16));
        }
    });
}

fn run(args: Args) -> Result<(), HudError> {
    let Some(font_path) = args.font else {
        return Err(HudError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            "no font given; pass --font <path> or set HUD_FONT",
        )));
    };
    let font_data = std::fs::read(&font_path)?;

    let mut config = HudConfig::builder()
        .title(args.title)
        .font_data(font_data)
        .clock_utc_offset_minutes(args.utc_offset_minutes)
        .build();
    if let Some(ppd) = args.pixels_per_degree {
        config.display.set_pixels_per_degree(ppd);
    }
    if let Some(policy) = args.roll_radius {
        config.display.roll_radius_policy = policy;
    }
    config.display.uncaged_mode = args.uncaged;

    let (sender, receiver) = mpsc::channel();
    spawn_stdin_feed(sender.clone());
    if args.demo {
        info!("demo feed enabled");
        spawn_demo_feed(sender);
    }

    let mut hud = Hud::new(config);
    hud.show_with_commands(receiver)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run(parse_args()) {
        error!(%err, "hud exited with an error");
        process::exit(1);
    }
}
