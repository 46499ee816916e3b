//! Fly a scripted mission against the simulated vehicle.

use clap::Parser;
use nalgebra::Vector3;
use offboard_flight::command::{self, Command};
use offboard_flight::config::{Config, MissionStep};
use offboard_flight::control::ControlLaw;
use offboard_flight::scheduler::Scheduler;
use offboard_flight::sim::SimVehicle;
use offboard_flight::{Copter, Result};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Offboard position control of a multi-copter")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the position control law from the configuration
    #[arg(long, value_enum)]
    control_law: Option<ControlLaw>,

    /// Stop after this many seconds
    #[arg(short, long, value_parser = parse_duration)]
    duration: Option<Duration>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(law) = args.control_law {
        config.control_law = law;
    }
    info!(law = ?config.control_law, rate = config.loop_rate_hz, "starting");

    let scheduler = Scheduler::new(config.loop_rate_hz)?;
    let mut sim = SimVehicle::new(Vector3::zeros(), config.loop_period())
        .with_thrust(config.thrust.hover_throttle, config.thrust.gravity);
    let origin = scheduler
        .capture_origin(&mut sim, config.startup_cycles)
        .await;

    let mut copter = Copter::builder()
        .config(&config)
        .trajectory(config.trajectory.clone())
        .link(sim)
        .origin(origin)
        .start_time(scheduler.now())
        .build()?;

    let (tx, rx) = command::slot();
    let mission = tokio::spawn(publish_mission(config.mission.clone(), tx));

    let duration = args.duration;
    let shutdown = async move {
        match duration {
            Some(duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                if let Err(error) = tokio::signal::ctrl_c().await {
                    warn!(%error, "failed to listen for ctrl-c");
                }
            }
        }
    };

    scheduler.run(&mut copter, rx, shutdown).await;
    mission.abort();

    let state = copter.link.peek();
    info!(
        position = ?state.position,
        armed = state.armed,
        mode = %state.mode,
        "finished"
    );

    Ok(())
}

fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let seconds: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid number of seconds: {s}"))?;

    Duration::try_from_secs_f32(seconds)
        .map_err(|_| format!("duration must be finite and not negative, got {s}"))
}

/// Publish each mission step at its scheduled time with increasing command ids.
async fn publish_mission(mut steps: Vec<MissionStep>, tx: watch::Sender<Command>) {
    steps.sort_by(|a, b| a.at.total_cmp(&b.at));

    let start = tokio::time::Instant::now();
    for (id, step) in (1..).zip(steps) {
        tokio::time::sleep_until(start + Duration::from_secs_f32(step.at)).await;

        info!(id, mode = ?step.mode, "command");
        tx.send_replace(Command::new(step.mode, id).with_reference(step.reference));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration() {
        let args = Args::try_parse_from(["offboard-flight", "--duration", "2.5"]).unwrap();
        assert_eq!(args.duration, Some(Duration::from_millis(2500)));

        for seconds in ["-1", "NaN", "inf", "soon"] {
            let result = Args::try_parse_from(["offboard-flight", "--duration", seconds]);
            assert!(result.is_err(), "{seconds}");
        }
    }

    #[test]
    fn control_law_override() {
        let args = Args::try_parse_from(["offboard-flight", "--control-law", "passivity", "-vv"]);
        let args = args.unwrap();
        assert_eq!(args.control_law, Some(ControlLaw::Passivity));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.duration, None);
    }
}
