//! End-of-run summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::Vec3;
use serde::Serialize;
use skidpad::vehicle::VehicleState;
use skidpad::{RaceResult, RaceState};

use crate::error::{Error, Result};

/// Aggregate numbers for one headless run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub simulated_seconds: f64,
    /// Path length driven by the chassis.
    pub distance: f32,
    pub max_speed: f32,
    pub final_position: [f32; 3],
    /// Frames in which the vehicle was flagged stuck.
    pub stuck_frames: u64,
    pub race: Option<RaceSummary>,
}

/// Race part of a [`RunSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RaceSummary {
    /// Final race phase, lowercase.
    pub state: &'static str,
    pub reached: usize,
    pub finish_threshold: usize,
    /// Finishing time, if a race finished during the run.
    pub time_seconds: Option<f32>,
    /// `time_seconds` as `MM:SS.mmm`.
    pub time_display: Option<String>,
}

impl RaceSummary {
    #[must_use]
    pub fn new(
        state: RaceState,
        reached: usize,
        finish_threshold: usize,
        result: Option<&RaceResult>,
    ) -> Self {
        Self {
            state: match state {
                RaceState::Idle => "idle",
                RaceState::Countdown => "countdown",
                RaceState::Running => "running",
                RaceState::Finished => "finished",
            },
            reached,
            finish_threshold,
            time_seconds: result.map(|r| r.elapsed),
            time_display: result.map(|r| r.digits.to_string()),
        }
    }
}

/// Accumulates a [`RunSummary`] frame by frame.
#[derive(Clone, Debug, Default)]
pub struct SummaryTracker {
    frames: u64,
    simulated_seconds: f64,
    distance: f32,
    max_speed: f32,
    last_position: Vec3,
    stuck_frames: u64,
}

impl SummaryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one frame of vehicle state.
    pub fn record(&mut self, elapsed: f64, state: &VehicleState) {
        self.frames += 1;
        self.simulated_seconds = elapsed;
        if state.position_delta.is_finite() {
            self.distance += state.position_delta.length();
        }
        self.max_speed = self.max_speed.max(state.speed);
        self.last_position = state.position;
        if state.stuck {
            self.stuck_frames += 1;
        }
    }

    #[must_use]
    pub fn finish(&self, race: Option<RaceSummary>) -> RunSummary {
        RunSummary {
            frames: self.frames,
            simulated_seconds: self.simulated_seconds,
            distance: self.distance,
            max_speed: self.max_speed,
            final_position: self.last_position.to_array(),
            stuck_frames: self.stuck_frames,
            race,
        }
    }
}

impl RunSummary {
    /// Write pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
