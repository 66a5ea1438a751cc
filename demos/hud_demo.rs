use hud::{FlightCommand, Hud, HudConfig, RollRadiusPolicy};
use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let font_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HUD_FONT").ok())
        .ok_or("usage: hud_demo <font.ttf>")?;

    // Create a HUD using the bon-generated builder
    let mut config = HudConfig::builder()
        .title("HUD demo".to_string())
        .font_data(std::fs::read(font_path)?)
        .build();
    config.display.uncaged_mode = true;
    config.display.roll_radius_policy = RollRadiusPolicy::Exact;

    let mut hud = Hud::new(config);

    // Create a channel for sending random commands
    let (sender, receiver) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        let mut heading: f64 = 0.0;
        loop {
            heading = (heading + rng.random_range(-0.02..0.05)).rem_euclid(std::f64::consts::TAU);
            let commands = [
                FlightCommand::SetAttitude {
                    pitch: rng.random_range(-0.1..0.1),
                    roll: rng.random_range(-0.4..0.4),
                    heading,
                },
                FlightCommand::SetFlightPath {
                    pitch: rng.random_range(-0.03..0.03),
                    heading: rng.random_range(-0.03..0.03),
                },
                FlightCommand::SetSpeed(rng.random_range(240.0..260.0)),
                FlightCommand::SetAltitude(rng.random_range(4900.0..5100.0)),
                FlightCommand::SetThrottle(rng.random_range(0.5..0.7)),
            ];

            // Send all commands, break if any fail
            if commands.into_iter().any(|cmd| sender.send(cmd).is_err()) {
                break;
            }

            thread::sleep(Duration::from_millis(100));
        }
    });

    println!("Displaying HUD with a random flight feed (uncaged, exact roll radius)");
    println!("Press Ctrl+C or close the window to exit");

    hud.show_with_commands(receiver)?;
    Ok(())
}
