//! Wheeled-vehicle driving core with a timed checkpoint race.
//!
//! This crate provides the vehicle dynamics controller, the circuit race
//! state machine, and the priority-ordered per-frame scheduler that sequences
//! their reads and writes around an external physics step.
//!
//! # Design principles
//!
//! - **Backend-agnostic**: Physics, input and presentation are traits injected
//!   by the caller; the core never integrates physics itself
//! - **Phase discipline**: Controls are written before the step and derived
//!   state is read after it
//! - **Single-threaded**: Deferred work (countdown, result timeout) is pending
//!   state advanced by later frames
//!
//! # Example
//!
//! ```ignore
//! use skidpad::{ActionSnapshot, MemoryWorld, NullPresentation, Simulation, VehicleConfig};
//!
//! let mut sim = Simulation::new(
//!     MemoryWorld::new(),
//!     ActionSnapshot::new(),
//!     NullPresentation,
//!     VehicleConfig::default(),
//!     Some(layout),
//! )?;
//! let mut scheduler = Simulation::scheduler();
//! scheduler.run_frame(&mut sim, 1.0 / 60.0);
//! ```

pub mod circuit;
mod error;
pub mod geometry;
pub mod input;
pub mod physics;
pub mod presentation;
pub mod schedule;
mod simulation;
pub mod vehicle;

pub use circuit::timer::TimerDigits;
pub use circuit::{CircuitLayout, CircuitParams, RaceCircuit, RaceResult, RaceState};
pub use error::{Error, Result};
pub use input::{Action, ActionSnapshot, InputActionMap};
pub use physics::{MemoryWorld, PhysicsWorld, Pose};
pub use presentation::{NullPresentation, Presentation, RecordingPresentation};
pub use schedule::{FrameTime, Phase, TickScheduler};
pub use simulation::{Simulation, Subscriptions};
pub use vehicle::{DriveParams, SuspensionParams, VehicleConfig, VehicleController};
