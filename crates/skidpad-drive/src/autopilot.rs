//! Scripted input that drives the vehicle around a circuit.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec2, Vec3};
use skidpad::geometry::ground_position;
use skidpad::{Action, ActionSnapshot, InputActionMap, RaceState};

/// Heading error (radians) below which the autopilot drives straight.
const STEER_DEADBAND: f32 = 0.08;

/// Heading error above which the autopilot slows to cornering speed.
const CORNER_ANGLE: f32 = 0.35;

/// Target speed on straights (m/s).
const CRUISE_SPEED: f32 = 6.0;

/// Target speed while turning hard (m/s). Full lock at this speed stays
/// well inside the tip-over limit.
const CORNER_SPEED: f32 = 3.0;

/// How far over the target speed the autopilot tolerates before braking.
const BRAKE_MARGIN: f32 = 1.0;

/// What the autopilot sees each frame.
#[derive(Clone, Copy, Debug)]
pub struct Observation {
    /// Chassis position.
    pub position: Vec3,
    /// Chassis orientation.
    pub rotation: Quat,
    /// Chassis speed (m/s).
    pub speed: f32,
    /// Race phase, or `None` on levels without a circuit.
    pub race: Option<RaceState>,
    /// Center of the gate to drive through.
    pub target: Option<Vec3>,
}

/// An [`InputActionMap`] that presses the start trigger once, then steers
/// toward the current target gate, holding a speed suited to the turn.
#[derive(Clone, Debug, Default)]
pub struct Autopilot {
    actions: ActionSnapshot,
    started: bool,
}

impl Autopilot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide this frame's actions.
    pub fn plan(&mut self, obs: &Observation) {
        self.actions.begin_frame();
        self.actions.clear();

        if obs.race.is_some() && !self.started {
            self.actions.press(Action::StartRace);
            self.started = true;
            return;
        }

        match obs.race {
            Some(RaceState::Countdown) => return,
            Some(RaceState::Finished | RaceState::Idle) => {
                self.actions.press(Action::Brake);
                return;
            }
            Some(RaceState::Running) | None => {}
        }

        let error = obs
            .target
            .map_or(0.0, |target| heading_error(obs.position, obs.rotation, target));
        let limit = if error.abs() > CORNER_ANGLE {
            CORNER_SPEED
        } else {
            CRUISE_SPEED
        };
        if obs.speed > limit + BRAKE_MARGIN {
            // Straight-line braking; turning at this speed would tip it over.
            self.actions.press(Action::Brake);
            return;
        }
        if obs.speed < limit {
            self.actions.press(Action::Forward);
        }

        if error > STEER_DEADBAND {
            self.actions.press(Action::Left);
        } else if error < -STEER_DEADBAND {
            self.actions.press(Action::Right);
        }
    }
}

impl InputActionMap for Autopilot {
    fn is_held(&self, action: Action) -> bool {
        self.actions.is_held(action)
    }

    fn just_pressed(&self, action: Action) -> bool {
        self.actions.just_pressed(action)
    }
}

/// Heading around +Y of a ground-plane direction, matching `Quat::from_rotation_y`.
fn yaw_of(direction: Vec2) -> f32 {
    (-direction.y).atan2(direction.x)
}

/// Signed yaw (positive = turn left) from the chassis heading to `target`.
fn heading_error(position: Vec3, rotation: Quat, target: Vec3) -> f32 {
    let forward = ground_position(rotation * Vec3::X);
    let wanted = ground_position(target) - ground_position(position);
    if forward.length_squared() < 1e-6 || wanted.length_squared() < 1e-6 {
        return 0.0;
    }
    let error = yaw_of(wanted) - yaw_of(forward);
    (error + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(rotation: Quat, target: Vec3) -> Observation {
        Observation {
            position: Vec3::ZERO,
            rotation,
            speed: 0.0,
            race: Some(RaceState::Running),
            target: Some(target),
        }
    }

    #[test]
    fn test_start_trigger_pressed_once() {
        let mut pilot = Autopilot::new();
        let mut obs = running(Quat::IDENTITY, Vec3::X);
        obs.race = Some(RaceState::Idle);
        pilot.plan(&obs);
        assert!(pilot.just_pressed(Action::StartRace));

        obs.race = Some(RaceState::Countdown);
        pilot.plan(&obs);
        assert!(!pilot.is_held(Action::StartRace));
        assert!(!pilot.is_held(Action::Forward));
    }

    #[test]
    fn test_steers_toward_target() {
        let mut pilot = Autopilot::new();
        pilot.started = true;

        // Straight ahead.
        pilot.plan(&running(Quat::IDENTITY, Vec3::new(10.0, 0.0, 0.0)));
        assert!(pilot.is_held(Action::Forward));
        assert!(!pilot.is_held(Action::Left) && !pilot.is_held(Action::Right));

        // A positive yaw turns -Z into the left-hand side.
        pilot.plan(&running(Quat::IDENTITY, Vec3::new(10.0, 0.0, -3.0)));
        assert!(pilot.is_held(Action::Left));

        pilot.plan(&running(Quat::IDENTITY, Vec3::new(10.0, 0.0, 3.0)));
        assert!(pilot.is_held(Action::Right));

        // Target behind: keep rolling so the turn can happen.
        pilot.plan(&running(Quat::IDENTITY, Vec3::new(-10.0, 0.0, -1.0)));
        assert!(pilot.is_held(Action::Forward));
        assert!(pilot.is_held(Action::Left));
    }

    #[test]
    fn test_holds_speed_for_the_turn() {
        let mut pilot = Autopilot::new();
        pilot.started = true;
        let ahead = Vec3::new(10.0, 0.0, 0.0);
        let behind = Vec3::new(-10.0, 0.0, -1.0);

        let mut obs = running(Quat::IDENTITY, ahead);
        obs.speed = CRUISE_SPEED + 0.5;
        pilot.plan(&obs);
        assert!(!pilot.is_held(Action::Forward));
        assert!(!pilot.is_held(Action::Brake));

        // Too fast for a hard turn: brake before steering.
        let mut obs = running(Quat::IDENTITY, behind);
        obs.speed = CRUISE_SPEED;
        pilot.plan(&obs);
        assert!(pilot.is_held(Action::Brake));
        assert!(!pilot.is_held(Action::Forward));
        assert!(!pilot.is_held(Action::Left));

        obs.speed = CORNER_SPEED - 1.0;
        pilot.plan(&obs);
        assert!(pilot.is_held(Action::Forward));
        assert!(!pilot.is_held(Action::Brake));
        assert!(pilot.is_held(Action::Left));
    }

    #[test]
    fn test_heading_error_wraps() {
        let rotation = Quat::from_rotation_y(3.0);
        let target = Quat::from_rotation_y(-3.0) * Vec3::X * 10.0;
        let error = heading_error(Vec3::ZERO, rotation, target);
        assert!((error - (TAU - 6.0)).abs() < 1e-4, "error {error}");
    }

    #[test]
    fn test_brakes_after_finish() {
        let mut pilot = Autopilot::new();
        pilot.started = true;
        let mut obs = running(Quat::IDENTITY, Vec3::X);
        obs.race = Some(RaceState::Finished);
        pilot.plan(&obs);
        assert!(pilot.is_held(Action::Brake));
        assert!(!pilot.is_held(Action::Forward));
    }

    #[test]
    fn test_free_drive_without_circuit() {
        let mut pilot = Autopilot::new();
        pilot.plan(&Observation {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            speed: 0.0,
            race: None,
            target: None,
        });
        assert!(pilot.is_held(Action::Forward));
        assert!(!pilot.is_held(Action::StartRace));
    }
}
