//! Headless skidpad driver.
//!
//! Loads a level, drives it with the autopilot on the rapier backend for a
//! fixed number of frames, and reports what happened.
//!
//! Run with: cargo run -p skidpad-drive -- [level.toml] --telemetry run.csv

mod autopilot;
mod error;
mod hud;
mod level;
mod summary;
mod telemetry;

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use skidpad::schedule::priority;
use skidpad::{FrameTime, Phase, PhysicsWorld, RaceState, Simulation};
use skidpad_rapier::RapierPhysics;
use tracing::{error, info};

use crate::autopilot::{Autopilot, Observation};
use crate::error::{Error, Result};
use crate::hud::LogHud;
use crate::level::Level;
use crate::summary::{RaceSummary, RunSummary, SummaryTracker};
use crate::telemetry::{FileTelemetryOutput, TelemetryOutput, TelemetrySnapshot};

/// Level used when no path is given.
const BUILTIN_LEVEL: &str = include_str!("../levels/oval.toml");

/// The autopilot decides before the vehicle reads its input.
const AUTOPILOT_PRIORITY: i32 = priority::VEHICLE - 10;

type Drive = Simulation<RapierPhysics, Autopilot, LogHud>;

#[derive(Parser)]
#[command(about = "Drive a skidpad level headlessly with the autopilot")]
struct Args {
    /// Level file (TOML). Defaults to the built-in oval.
    level: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3600)]
    frames: u64,

    /// Fixed frame delta in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Write per-frame telemetry CSV to this path.
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Write the run summary as JSON to this path.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Override the level's vehicle RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop as soon as a race finishes.
    #[arg(long)]
    until_finish: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        let default_level = if args.verbose { "debug" } else { "info" };
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
            )
            .init();
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let summary = drive(args)?;
    if let Some(path) = &args.summary {
        summary.write_json(path)?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}

/// Load the level, simulate it and summarize the run.
fn drive(args: &Args) -> Result<RunSummary> {
    if !args.dt.is_finite() || args.dt <= 0.0 {
        return Err(skidpad::Error::InvalidParameter {
            name: "dt",
            value: args.dt,
        }
        .into());
    }

    let mut level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::parse(BUILTIN_LEVEL).map_err(|source| Error::Level {
            path: PathBuf::from("<built-in oval>"),
            source,
        })?,
    };
    if let Some(seed) = args.seed {
        level.vehicle.seed = seed;
    }

    let physics = RapierPhysics::with_statics(&level.statics_or_ground())?;
    let mut sim: Drive = Simulation::new(
        physics,
        Autopilot::new(),
        LogHud::new(),
        level.vehicle.clone(),
        level.circuit.clone(),
    )?;

    let mut scheduler = Drive::scheduler();
    scheduler.register(
        "autopilot",
        Phase::PrePhysics,
        AUTOPILOT_PRIORITY,
        |sim: &mut Drive, _| {
            let obs = observe(sim)?;
            sim.input.plan(&obs);
            Ok(())
        },
    );

    let telemetry = match &args.telemetry {
        Some(path) => {
            let output = FileTelemetryOutput::create(path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            let output = Rc::new(RefCell::new(output));
            telemetry::write_header(&mut *output.borrow_mut()).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            let writer = Rc::clone(&output);
            scheduler.register("telemetry", Phase::Render, 0, move |sim: &mut Drive, time| {
                let snapshot = snapshot(sim, time)?;
                telemetry::write_row(&snapshot, &mut *writer.borrow_mut()).map_err(|e| {
                    skidpad::Error::Callback {
                        phase: Phase::Render,
                        message: e.to_string(),
                    }
                })
            });
            info!(path = %path.display(), "writing telemetry");
            Some((path, output))
        }
        None => None,
    };

    info!(
        frames = args.frames,
        dt = args.dt,
        circuit = sim.circuit.is_some(),
        "starting run"
    );

    let mut tracker = SummaryTracker::new();
    for _ in 0..args.frames {
        let time = scheduler.run_frame(&mut sim, args.dt);
        tracker.record(time.elapsed, sim.vehicle.state());

        let finished = sim
            .circuit
            .as_ref()
            .is_some_and(|c| c.state() == RaceState::Finished);
        if args.until_finish && finished {
            break;
        }
    }

    if let Some((path, output)) = telemetry {
        output.borrow_mut().flush().map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
    }

    let race = sim.circuit.as_ref().map(|c| {
        RaceSummary::new(
            c.state(),
            c.reached_count(),
            c.finish_threshold(),
            c.last_result(),
        )
    });
    let summary = tracker.finish(race);
    info!(
        frames = summary.frames,
        seconds = summary.simulated_seconds,
        distance = summary.distance,
        max_speed = summary.max_speed,
        stuck_frames = summary.stuck_frames,
        checkpoints = sim.presentation.checkpoints_reached(),
        "run complete"
    );
    if let Some(race) = &summary.race {
        info!(
            state = race.state,
            reached = race.reached,
            of = race.finish_threshold,
            time = race.time_display.as_deref().unwrap_or("-"),
            "race"
        );
    }
    Ok(summary)
}

/// What the autopilot needs from the current frame.
fn observe(sim: &Drive) -> skidpad::Result<Observation> {
    let rotation = sim.physics.rotation(sim.vehicle.chassis())?;
    let circuit = sim.circuit.as_ref();
    Ok(Observation {
        position: sim.vehicle.position(),
        rotation,
        speed: sim.vehicle.state().speed,
        race: circuit.map(skidpad::RaceCircuit::state),
        target: circuit.and_then(|c| {
            c.target()
                .and_then(|index| c.ring().get(index))
                .map(skidpad::circuit::Checkpoint::position)
        }),
    })
}

fn snapshot(sim: &Drive, time: FrameTime) -> skidpad::Result<TelemetrySnapshot> {
    let state = sim.vehicle.state();
    let intent = sim.vehicle.intent();
    let wheels = *sim.vehicle.wheels();
    let circuit = sim.circuit.as_ref();
    Ok(TelemetrySnapshot {
        frame: time.frame,
        elapsed: time.elapsed,
        dt: time.delta,
        throttle: intent.throttle,
        turn: intent.turn,
        boost: intent.boost,
        brake: intent.brake,
        position: state.position,
        rotation: sim.physics.rotation(sim.vehicle.chassis())?,
        speed: state.speed,
        upside_down_ratio: state.upside_down_ratio,
        stopped: state.stopped,
        stuck: state.stuck,
        in_contact: wheels.map(|w| w.in_contact),
        suspension_length: wheels.map(|w| w.suspension_length),
        race_state: circuit.map_or(RaceState::Idle, skidpad::RaceCircuit::state),
        reached: circuit.map_or(0, skidpad::RaceCircuit::reached_count),
        race_time: circuit.map_or(0.0, |c| c.elapsed(time.elapsed)),
    })
}
