//! Timed circuit race.
//!
//! A [`RaceCircuit`] runs the countdown, checkpoint and timer state machine
//! on top of a [`VehicleController`]. It runs after the vehicle's
//! post-physics update so gate tests see the freshly stepped position.
//!
//! Countdown steps and the result timeout are deferred work held as
//! optional pending state and advanced on later frames; restarting replaces
//! both, so at most one of each is ever live.

pub mod checkpoint;
pub mod timer;

use serde::Deserialize;
use tracing::{debug, info};

pub use self::checkpoint::{Checkpoint, CheckpointDef, CheckpointRing};
use self::timer::{Countdown, CountdownStep, GO_TEXT, RaceTimer, TimerDigits};
use crate::error::{Error, Result};
use crate::geometry::ground_position;
use crate::input::{Action, InputActionMap};
use crate::physics::{PhysicsWorld, Pose};
use crate::presentation::Presentation;
use crate::schedule::FrameTime;
use crate::vehicle::VehicleController;

/// Race timing and detection tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CircuitParams {
    /// Radius of the circle around the vehicle tested against each gate.
    pub check_radius: f32,
    /// Seconds between countdown steps.
    pub countdown_interval: f32,
    /// Number of countdown steps, the last being "GO!".
    pub countdown_steps: u32,
    /// Seconds the result stays visible after finishing.
    pub result_display: f32,
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self {
            check_radius: 2.0,
            countdown_interval: 0.5,
            countdown_steps: 4,
            result_display: 6.0,
        }
    }
}

impl CircuitParams {
    /// Reject unusable timings.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("check_radius", self.check_radius, self.check_radius > 0.0),
            (
                "countdown_interval",
                self.countdown_interval,
                self.countdown_interval >= 0.0,
            ),
            (
                "result_display",
                self.result_display,
                self.result_display >= 0.0,
            ),
        ];
        for (name, value, ok) in checks {
            if !value.is_finite() || !ok {
                return Err(Error::InvalidParameter { name, value });
            }
        }
        if self.countdown_steps == 0 {
            return Err(Error::InvalidParameter {
                name: "countdown_steps",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Level description of a circuit.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CircuitLayout {
    /// Where the vehicle is placed on restart; should sit on the start gate.
    pub start: Pose,
    /// Checkpoints, ordered into a ring by name.
    pub checkpoints: Vec<CheckpointDef>,
    /// Timing overrides.
    #[serde(default)]
    pub params: CircuitParams,
}

/// Race phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RaceState {
    /// No race in progress.
    #[default]
    Idle,
    /// Control locked while the start sequence plays.
    Countdown,
    /// Timer running, targets cycling through the ring.
    Running,
    /// Timer frozen, result on display.
    Finished,
}

/// Outcome of a finished race.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaceResult {
    /// Race time in seconds.
    pub elapsed: f32,
    /// `elapsed` split for display.
    pub digits: TimerDigits,
    /// Gates reached, including both start/finish crossings.
    pub reached: usize,
}

/// Checkpoint race state machine.
pub struct RaceCircuit {
    ring: CheckpointRing,
    start: Pose,
    params: CircuitParams,
    state: RaceState,
    target: Option<usize>,
    reached_count: usize,
    timer: RaceTimer,
    countdown: Option<Countdown>,
    result_deadline: Option<f64>,
    last_result: Option<RaceResult>,
}

impl RaceCircuit {
    /// Build the ring and validate the layout.
    pub fn new(layout: CircuitLayout) -> Result<Self> {
        if !layout.start.is_finite() {
            return Err(Error::NonFinitePose { context: "start" });
        }
        layout.params.validate()?;
        let ring = CheckpointRing::from_defs(&layout.checkpoints)?;
        info!(checkpoints = ring.len(), "circuit loaded");

        Ok(Self {
            ring,
            start: layout.start,
            params: layout.params,
            state: RaceState::Idle,
            target: None,
            reached_count: 0,
            timer: RaceTimer::default(),
            countdown: None,
            result_deadline: None,
            last_result: None,
        })
    }

    /// Start a new race from any state.
    ///
    /// Cancels any pending countdown or result timeout, teleports the vehicle
    /// to the start pose with control locked, and targets the start gate.
    pub fn restart<P, D>(
        &mut self,
        vehicle: &mut VehicleController,
        physics: &mut P,
        presentation: &mut D,
        now: f64,
    ) -> Result<()>
    where
        P: PhysicsWorld + ?Sized,
        D: Presentation + ?Sized,
    {
        vehicle.teleport(physics, self.start)?;
        vehicle.set_locked(true);

        self.timer.reset();
        self.reached_count = 0;
        self.target = Some(0);
        self.countdown = Some(Countdown::new(
            now,
            self.params.countdown_interval,
            self.params.countdown_steps,
        ));
        self.result_deadline = None;
        self.state = RaceState::Countdown;

        presentation.hide_result();
        presentation.set_timer_visible(false);
        presentation.set_countdown_visible(false);
        presentation.checkpoint_targeted(0);
        info!(now, "race restarted");
        Ok(())
    }

    /// Per-frame update: start trigger, countdown, result timeout, then gate
    /// tests and timer display while running.
    pub fn update<P, I, D>(
        &mut self,
        vehicle: &mut VehicleController,
        physics: &mut P,
        input: &I,
        presentation: &mut D,
        time: FrameTime,
    ) -> Result<()>
    where
        P: PhysicsWorld + ?Sized,
        I: InputActionMap + ?Sized,
        D: Presentation + ?Sized,
    {
        let now = time.elapsed;
        if input.just_pressed(Action::StartRace) {
            self.restart(vehicle, physics, presentation, now)?;
        }

        self.advance_countdown(vehicle, presentation, now);

        if self.result_deadline.is_some_and(|deadline| now >= deadline) {
            self.result_deadline = None;
            presentation.hide_result();
            if self.state == RaceState::Finished {
                self.state = RaceState::Idle;
                debug!("result window closed");
            }
        }

        if self.state == RaceState::Running {
            let position = ground_position(vehicle.position());
            let radius = self.params.check_radius;
            let crossed: Vec<usize> = self
                .ring
                .iter()
                .filter(|c| c.crossed_by(position, radius))
                .map(Checkpoint::index)
                .collect();
            for index in crossed {
                self.reach(index, presentation, now);
            }
            if self.state == RaceState::Running {
                presentation.set_timer_digits(TimerDigits::from_seconds(self.elapsed(now)));
            }
        }
        Ok(())
    }

    /// Handle the gate of checkpoint `index` being crossed at `now`.
    ///
    /// Only the current target advances the race; any other checkpoint is
    /// ignored. Returns whether the race advanced.
    pub fn reach<D: Presentation + ?Sized>(
        &mut self,
        index: usize,
        presentation: &mut D,
        now: f64,
    ) -> bool {
        if self.state != RaceState::Running || self.target != Some(index) {
            return false;
        }

        self.reached_count += 1;
        presentation.checkpoint_reached(index);
        info!(index, reached = self.reached_count, "checkpoint reached");

        if self.reached_count >= self.finish_threshold() {
            self.finish(presentation, now);
        } else {
            let next = self.ring.wrap(self.reached_count);
            self.target = Some(next);
            presentation.checkpoint_targeted(next);
        }
        true
    }

    /// Race time as of `now`: live while running, frozen once finished.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f32 {
        self.timer.elapsed(now)
    }

    /// Number of gate reaches that finishes a race: every checkpoint plus a
    /// second crossing of the start/finish gate.
    #[must_use]
    pub fn finish_threshold(&self) -> usize {
        self.ring.len() + 1
    }

    /// Current race phase.
    #[must_use]
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Index of the checkpoint that must be crossed next.
    #[must_use]
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Gates reached in the current race.
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.reached_count
    }

    /// The most recent finished race, kept after the result window closes.
    #[must_use]
    pub fn last_result(&self) -> Option<&RaceResult> {
        self.last_result.as_ref()
    }

    /// The checkpoint ring.
    #[must_use]
    pub fn ring(&self) -> &CheckpointRing {
        &self.ring
    }

    /// Restart pose.
    #[must_use]
    pub fn start_pose(&self) -> Pose {
        self.start
    }

    /// Timing tuning.
    #[must_use]
    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// Whether a countdown step is still pending.
    #[must_use]
    pub fn has_pending_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    /// Whether the result timeout is still pending.
    #[must_use]
    pub fn has_pending_result_timeout(&self) -> bool {
        self.result_deadline.is_some()
    }

    fn advance_countdown<D: Presentation + ?Sized>(
        &mut self,
        vehicle: &mut VehicleController,
        presentation: &mut D,
        now: f64,
    ) {
        let Some(countdown) = self.countdown.as_mut() else {
            return;
        };
        while let Some(step) = countdown.poll(now) {
            match step {
                CountdownStep::Count(remaining) => {
                    presentation.set_countdown_visible(true);
                    presentation.set_countdown_text(&remaining.to_string());
                    debug!(remaining, "countdown");
                }
                CountdownStep::Go { at } => {
                    presentation.set_countdown_visible(true);
                    presentation.set_countdown_text(GO_TEXT);
                    vehicle.set_locked(false);
                    self.timer.start(at);
                    self.state = RaceState::Running;
                    presentation.set_timer_visible(true);
                    info!(at, "race started");
                }
                CountdownStep::Hide => presentation.set_countdown_visible(false),
            }
        }
        if countdown.is_finished() {
            self.countdown = None;
        }
    }

    fn finish<D: Presentation + ?Sized>(&mut self, presentation: &mut D, now: f64) {
        self.timer.stop(now);
        self.target = None;
        self.state = RaceState::Finished;
        self.result_deadline = Some(now + f64::from(self.params.result_display));

        let elapsed = self.timer.elapsed(now);
        let result = RaceResult {
            elapsed,
            digits: TimerDigits::from_seconds(elapsed),
            reached: self.reached_count,
        };
        self.last_result = Some(result);
        presentation.set_timer_digits(result.digits);
        presentation.show_result(&result);
        info!(elapsed, time = %result.digits, "race finished");
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::input::ActionSnapshot;
    use crate::physics::MemoryWorld;
    use crate::presentation::{NullPresentation, PresentationEvent, RecordingPresentation};
    use crate::vehicle::VehicleConfig;

    fn layout(gates: usize) -> CircuitLayout {
        CircuitLayout {
            start: Pose::new(Vec3::new(0.0, 1.0, 0.0), 0.0),
            checkpoints: (0..gates)
                .map(|i| CheckpointDef {
                    name: format!("cp{i:02}"),
                    position: Vec3::new(i as f32 * 50.0, 0.0, 0.0),
                    yaw: 0.0,
                    half_width: 5.0,
                })
                .collect(),
            params: CircuitParams::default(),
        }
    }

    fn setup(gates: usize) -> (MemoryWorld, VehicleController, RaceCircuit) {
        let mut world = MemoryWorld::new();
        let vehicle = VehicleController::new(&mut world, VehicleConfig::default()).unwrap();
        let circuit = RaceCircuit::new(layout(gates)).unwrap();
        (world, vehicle, circuit)
    }

    fn at(elapsed: f64) -> FrameTime {
        FrameTime {
            delta: 0.1,
            elapsed,
            frame: 0,
        }
    }

    #[test]
    fn test_new_starts_idle() {
        let (_, _, circuit) = setup(3);
        assert_eq!(circuit.state(), RaceState::Idle);
        assert_eq!(circuit.target(), None);
        assert_eq!(circuit.finish_threshold(), 4);
    }

    #[test]
    fn test_empty_layout_fails() {
        assert!(matches!(RaceCircuit::new(layout(0)), Err(Error::EmptyRing)));
    }

    #[test]
    fn test_non_finite_start_fails() {
        let mut bad = layout(2);
        bad.start.yaw = f32::INFINITY;
        assert!(matches!(
            RaceCircuit::new(bad),
            Err(Error::NonFinitePose { context: "start" })
        ));
    }

    #[test]
    fn test_restart_resets_bookkeeping() {
        let (mut world, mut vehicle, mut circuit) = setup(3);
        for _ in 0..3 {
            circuit
                .restart(&mut vehicle, &mut world, &mut NullPresentation, 0.0)
                .unwrap();
            assert_eq!(circuit.state(), RaceState::Countdown);
            assert_eq!(circuit.reached_count(), 0);
            assert_eq!(circuit.target(), Some(0));
            assert!(vehicle.is_locked());
        }
    }

    #[test]
    fn test_countdown_unlocks_at_go() {
        let (mut world, mut vehicle, mut circuit) = setup(3);
        let mut presentation = RecordingPresentation::new();
        let input = ActionSnapshot::new();
        circuit
            .restart(&mut vehicle, &mut world, &mut presentation, 1.0)
            .unwrap();

        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(2.9))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Countdown);
        assert!(vehicle.is_locked());
        assert_eq!(presentation.countdown_texts(), vec!["3", "2", "1"]);

        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(3.05))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Running);
        assert!(!vehicle.is_locked());
        assert_eq!(presentation.countdown_texts(), vec!["3", "2", "1", "GO!"]);
        // Timer starts at the scheduled instant, not the frame time.
        assert!((circuit.elapsed(3.05) - 0.05).abs() < 1e-5);

        presentation.clear();
        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(3.5))
            .unwrap();
        assert!(!circuit.has_pending_countdown());
        assert!(
            presentation
                .events
                .contains(&PresentationEvent::CountdownVisible(false))
        );
    }

    #[test]
    fn test_reach_ignores_non_target() {
        let (mut world, mut vehicle, mut circuit) = setup(3);
        let mut presentation = NullPresentation;
        circuit
            .restart(&mut vehicle, &mut world, &mut presentation, 0.0)
            .unwrap();
        // Not running yet.
        assert!(!circuit.reach(0, &mut presentation, 0.5));

        let input = ActionSnapshot::new();
        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(2.0))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Running);

        assert!(!circuit.reach(2, &mut presentation, 2.1));
        assert_eq!(circuit.reached_count(), 1);
        assert!(circuit.reach(1, &mut presentation, 2.2));
        assert_eq!(circuit.reached_count(), 2);
        assert!(!circuit.reach(1, &mut presentation, 2.3));
        assert_eq!(circuit.target(), Some(2));
    }

    #[test]
    fn test_single_gate_ring_finishes_on_second_crossing() {
        let (mut world, mut vehicle, mut circuit) = setup(1);
        let mut presentation = NullPresentation;
        circuit
            .restart(&mut vehicle, &mut world, &mut presentation, 0.0)
            .unwrap();
        let input = ActionSnapshot::new();
        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(2.0))
            .unwrap();
        assert_eq!(circuit.reached_count(), 1);
        assert_eq!(circuit.target(), Some(0));

        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(2.5))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Finished);
        assert_eq!(circuit.reached_count(), 2);
        assert!((circuit.elapsed(50.0) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_result_window_returns_to_idle() {
        let (mut world, mut vehicle, mut circuit) = setup(1);
        let mut presentation = RecordingPresentation::new();
        let input = ActionSnapshot::new();
        circuit
            .restart(&mut vehicle, &mut world, &mut presentation, 0.0)
            .unwrap();
        for t in [2.0, 2.5] {
            circuit
                .update(&mut vehicle, &mut world, &input, &mut presentation, at(t))
                .unwrap();
        }
        assert_eq!(circuit.state(), RaceState::Finished);
        assert!(circuit.has_pending_result_timeout());

        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(8.4))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Finished);

        circuit
            .update(&mut vehicle, &mut world, &input, &mut presentation, at(8.5))
            .unwrap();
        assert_eq!(circuit.state(), RaceState::Idle);
        assert!(!circuit.has_pending_result_timeout());
        assert_eq!(presentation.events.last(), Some(&PresentationEvent::HideResult));
        let result = circuit.last_result().unwrap();
        assert_eq!(result.reached, 2);
        assert!((result.elapsed - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut bad = layout(2);
        bad.params.check_radius = 0.0;
        assert!(RaceCircuit::new(bad).is_err());
        let mut bad = layout(2);
        bad.params.countdown_steps = 0;
        assert!(RaceCircuit::new(bad).is_err());
    }
}
