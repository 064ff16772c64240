//! Core vehicle control calculations.
//!
//! Pure functions that can be tested without a physics backend. The
//! controller feeds them input and stepped physics state, then writes the
//! results back through the physics collaborator.

use glam::{Quat, Vec3};

use super::params::{DriveParams, STEERING_WHEELS};
use crate::geometry::clamp01;
use crate::input::{Action, InputActionMap};

/// Below this squared length the up/world-up cross product has no usable axis.
const MIN_AXIS_LENGTH_SQ: f32 = 1e-6;

/// Clock differences below this are rounding in the f32 frame deltas.
const CLOCK_EPSILON: f64 = 1e-6;

/// Driver intent decoded from input for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveIntent {
    /// Throttle direction (-1, 0 or 1, positive = forward).
    pub throttle: f32,
    /// Turn direction (-1, 0 or 1, positive = left).
    pub turn: f32,
    /// Boost held.
    pub boost: bool,
    /// Brake held.
    pub brake: bool,
}

impl DriveIntent {
    /// Decode the held drive actions.
    pub fn from_input<I: InputActionMap + ?Sized>(input: &I) -> Self {
        let axis = |positive: Action, negative: Action| {
            f32::from(u8::from(input.is_held(positive))) - f32::from(u8::from(input.is_held(negative)))
        };
        Self {
            throttle: axis(Action::Forward, Action::Backward),
            turn: axis(Action::Left, Action::Right),
            boost: input.is_held(Action::Boost),
            brake: input.is_held(Action::Brake),
        }
    }

    /// Whether the driver is asking the vehicle to move.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.throttle != 0.0 || self.turn != 0.0
    }
}

/// Control values written to every wheel before the physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriveCommand {
    /// Engine force applied to each wheel.
    pub engine_force: f32,
    /// Steering angle for the steering pair.
    pub steering: f32,
    /// Brake applied to each wheel.
    pub brake: f32,
}

/// Compute the drive command for an intent.
pub fn compute_drive_command(params: &DriveParams, intent: &DriveIntent) -> DriveCommand {
    let mut engine_force = params.engine_force * intent.throttle;
    if intent.boost {
        engine_force *= params.boost_multiplier;
    }
    if intent.brake {
        engine_force *= params.brake_engine_multiplier;
    }

    DriveCommand {
        engine_force,
        steering: params.steering_limit * intent.turn,
        brake: if intent.brake {
            params.brake_strength
        } else {
            params.coast_brake
        },
    }
}

/// Drive command while control is locked: no drive, brakes held.
pub fn locked_drive_command(params: &DriveParams) -> DriveCommand {
    DriveCommand {
        engine_force: 0.0,
        steering: 0.0,
        brake: params.brake_strength,
    }
}

/// Steering angle for a given wheel. Only the steering pair turns.
pub fn wheel_steering(wheel: usize, steering: f32) -> f32 {
    if STEERING_WHEELS.contains(&wheel) {
        steering
    } else {
        0.0
    }
}

/// Kinematics derived from one stepped frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    /// Displacement since the previous frame.
    pub position_delta: Vec3,
    /// Displacement length over frame time (m/s).
    pub speed: f32,
    /// Chassis up vector in world space.
    pub up: Vec3,
    /// 0 when upright, 1 when fully inverted.
    pub upside_down_ratio: f32,
}

/// Derive kinematics from the previous and current chassis pose.
///
/// Returns `None` when the frame is degenerate: a non-positive or non-finite
/// `dt`, or a non-finite pose.
pub fn compute_kinematics(
    previous: Vec3,
    position: Vec3,
    rotation: Quat,
    dt: f32,
) -> Option<Kinematics> {
    if !dt.is_finite() || dt <= 0.0 {
        return None;
    }
    if !previous.is_finite() || !position.is_finite() || !rotation.is_finite() {
        return None;
    }

    let position_delta = position - previous;
    let up = rotation * Vec3::Y;
    Some(Kinematics {
        position_delta,
        speed: position_delta.length() / dt,
        up,
        upside_down_ratio: upside_down_ratio(up),
    })
}

/// How inverted a chassis with the given up vector is.
pub fn upside_down_ratio(up: Vec3) -> f32 {
    clamp01(up.dot(Vec3::NEG_Y) * 0.5 + 0.5)
}

/// Dead-band tracker for the stopped/moving state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StopTracker {
    /// Whether the vehicle is currently considered stopped.
    pub stopped: bool,
    /// Simulated time at which the vehicle last became stopped.
    pub stopped_since: f64,
}

impl StopTracker {
    /// Feed one speed sample taken at `now`. Returns `true` if the state changed.
    pub fn update(&mut self, speed: f32, now: f64, params: &DriveParams) -> bool {
        if !self.stopped && speed < params.stop_speed {
            self.stopped = true;
            self.stopped_since = now;
            true
        } else if self.stopped && speed > params.resume_speed {
            self.stopped = false;
            true
        } else {
            false
        }
    }

    /// Seconds spent stopped as of `now`, or zero while moving.
    #[must_use]
    pub fn stopped_for(&self, now: f64) -> f64 {
        if self.stopped {
            now - self.stopped_since
        } else {
            0.0
        }
    }

    /// Forget the current stop, as after a teleport.
    pub fn restart(&mut self, now: f64) {
        self.stopped_since = now;
    }
}

/// Edge detector for the stuck condition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StuckDetector {
    /// Whether the vehicle is currently stuck.
    pub stuck: bool,
}

impl StuckDetector {
    /// Re-evaluate the stuck condition. Returns `true` only on the frame the
    /// condition becomes true.
    ///
    /// A stop lasting exactly `stuck_delay` does not count, even when the
    /// frame deltas summed to a hair over it.
    pub fn update(
        &mut self,
        stopped: bool,
        stopped_for: f64,
        upside_down_ratio: f32,
        params: &DriveParams,
    ) -> bool {
        let condition = stopped
            && stopped_for > f64::from(params.stuck_delay) + CLOCK_EPSILON
            && upside_down_ratio > params.stuck_tilt;
        let triggered = condition && !self.stuck;
        self.stuck = condition;
        triggered
    }
}

/// A pair of impulses applied to the chassis in one go.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Impulse {
    /// Linear impulse at the centre of mass.
    pub linear: Vec3,
    /// Angular impulse.
    pub angular: Vec3,
}

/// Jump impulse: straight up, plus a yaw kick toward the held turn.
///
/// `jitter` perturbs the spin so repeated jumps do not land identically.
pub fn jump_impulse(params: &DriveParams, mass: f32, turn: f32, jitter: f32) -> Impulse {
    Impulse {
        linear: Vec3::Y * params.jump_force * mass,
        angular: Vec3::Y * (turn + jitter) * params.jump_spin * mass,
    }
}

/// Recovery impulse for a stuck vehicle: a hop plus a torque that rolls the
/// chassis toward upright, scaled by how inverted it is.
pub fn recovery_impulse(params: &DriveParams, mass: f32, rotation: Quat, ratio: f32) -> Impulse {
    let up = rotation * Vec3::Y;
    let cross = up.cross(Vec3::Y);
    // Fully inverted has no unique axis; roll around forward.
    let axis = if cross.length_squared() > MIN_AXIS_LENGTH_SQ {
        cross.normalize()
    } else {
        rotation * Vec3::X
    };
    Impulse {
        linear: Vec3::Y * params.jump_force * mass,
        angular: axis * ratio * params.flip_torque * mass,
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::*;
    use crate::input::ActionSnapshot;

    fn intent(throttle: f32, turn: f32, boost: bool, brake: bool) -> DriveIntent {
        DriveIntent {
            throttle,
            turn,
            boost,
            brake,
        }
    }

    #[test]
    fn test_intent_from_opposing_actions_cancels() {
        let mut input = ActionSnapshot::new();
        input.press(Action::Forward);
        input.press(Action::Backward);
        input.press(Action::Left);
        let intent = DriveIntent::from_input(&input);
        assert_eq!(intent.throttle, 0.0);
        assert_eq!(intent.turn, 1.0);
        assert!(intent.is_active());
    }

    #[test]
    fn test_drive_command_scaling() {
        let params = DriveParams::default();

        let plain = compute_drive_command(&params, &intent(1.0, 0.0, false, false));
        assert_eq!(plain.engine_force, 6.0);
        assert_eq!(plain.brake, 0.04);

        let boosted = compute_drive_command(&params, &intent(1.0, 0.0, true, false));
        assert_eq!(boosted.engine_force, 15.0);

        let braking = compute_drive_command(&params, &intent(-1.0, 0.0, false, true));
        assert_eq!(braking.engine_force, -3.0);
        assert_eq!(braking.brake, 0.5);

        let both = compute_drive_command(&params, &intent(1.0, 0.0, true, true));
        assert_eq!(both.engine_force, 7.5);
    }

    #[test]
    fn test_steering_only_on_steering_pair() {
        let params = DriveParams::default();
        let command = compute_drive_command(&params, &intent(0.0, -1.0, false, false));
        assert_eq!(command.steering, -0.5);
        assert_eq!(wheel_steering(0, command.steering), -0.5);
        assert_eq!(wheel_steering(1, command.steering), 0.0);
        assert_eq!(wheel_steering(2, command.steering), -0.5);
        assert_eq!(wheel_steering(3, command.steering), 0.0);
    }

    #[test]
    fn test_locked_command_holds_brake() {
        let command = locked_drive_command(&DriveParams::default());
        assert_eq!(command.engine_force, 0.0);
        assert_eq!(command.steering, 0.0);
        assert_eq!(command.brake, 0.5);
    }

    #[test]
    fn test_kinematics_speed() {
        let k = compute_kinematics(Vec3::ZERO, Vec3::new(3.0, 0.0, 4.0), Quat::IDENTITY, 0.5)
            .unwrap();
        assert!((k.speed - 10.0).abs() < 1e-5);
        assert_eq!(k.upside_down_ratio, 0.0);
    }

    #[test]
    fn test_kinematics_skips_degenerate_frames() {
        assert!(compute_kinematics(Vec3::ZERO, Vec3::X, Quat::IDENTITY, 0.0).is_none());
        assert!(compute_kinematics(Vec3::ZERO, Vec3::X, Quat::IDENTITY, -0.1).is_none());
        assert!(
            compute_kinematics(Vec3::ZERO, Vec3::splat(f32::NAN), Quat::IDENTITY, 0.1).is_none()
        );
        assert!(
            compute_kinematics(Vec3::ZERO, Vec3::X, Quat::from_xyzw(f32::INFINITY, 0.0, 0.0, 1.0), 0.1)
                .is_none()
        );
    }

    #[test]
    fn test_upside_down_ratio_range() {
        assert!((upside_down_ratio(Vec3::Y)).abs() < 1e-6);
        assert!((upside_down_ratio(Vec3::NEG_Y) - 1.0).abs() < 1e-6);
        let side = Quat::from_rotation_x(FRAC_PI_2) * Vec3::Y;
        assert!((upside_down_ratio(side) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_stop_hysteresis_sequence() {
        let params = DriveParams::default();
        let mut tracker = StopTracker::default();
        let samples = [0.2, 0.03, 0.03, 0.03, 0.15];
        let expected = [false, true, true, true, false];
        for (i, (speed, stopped)) in samples.iter().zip(expected).enumerate() {
            tracker.update(*speed, i as f64 * 0.1, &params);
            assert_eq!(tracker.stopped, stopped, "sample {i}");
        }
        assert!((tracker.stopped_since - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_stop_dead_band_never_changes_state() {
        let params = DriveParams::default();
        let mut moving = StopTracker::default();
        let mut stopped = StopTracker {
            stopped: true,
            stopped_since: 0.0,
        };
        for speed in [0.05, 0.07, 0.1] {
            assert!(!moving.update(speed, 1.0, &params));
            assert!(!stopped.update(speed, 1.0, &params));
        }
        assert!(!moving.stopped);
        assert!(stopped.stopped);
        assert_eq!(stopped.stopped_for(1.0), 1.0);
    }

    #[test]
    fn test_stuck_boundary_is_exclusive() {
        let params = DriveParams::default();
        let mut detector = StuckDetector::default();
        assert!(!detector.update(true, 1.0, 0.30, &params));
        assert!(!detector.stuck);
    }

    #[test]
    fn test_stuck_triggers_once_while_condition_persists() {
        let params = DriveParams::default();
        let mut detector = StuckDetector::default();
        assert!(detector.update(true, 1.01, 0.31, &params));
        for i in 1..50 {
            let stopped_for = 1.01 + f64::from(i) * 0.1;
            assert!(!detector.update(true, stopped_for, 0.31, &params));
            assert!(detector.stuck);
        }
    }

    #[test]
    fn test_stuck_clears_and_retriggers() {
        let params = DriveParams::default();
        let mut detector = StuckDetector::default();
        assert!(detector.update(true, 2.0, 0.9, &params));
        // Righted: tilt condition fails.
        assert!(!detector.update(true, 2.1, 0.1, &params));
        assert!(!detector.stuck);
        assert!(detector.update(true, 2.2, 0.9, &params));
        // Moving again: stopped condition fails.
        assert!(!detector.update(false, 0.0, 0.9, &params));
        assert!(!detector.stuck);
    }

    #[test]
    fn test_jump_impulse_scales_with_mass_and_turn() {
        let params = DriveParams::default();
        let impulse = jump_impulse(&params, 2.0, 1.0, 0.0);
        assert_eq!(impulse.linear, Vec3::new(0.0, 16.0, 0.0));
        assert_eq!(impulse.angular, Vec3::new(0.0, 1.0, 0.0));

        let right = jump_impulse(&params, 2.0, -1.0, 0.25);
        assert!(right.angular.y < 0.0);
    }

    #[test]
    fn test_recovery_torque_rolls_toward_upright() {
        let params = DriveParams::default();
        let rotation = Quat::from_rotation_x(2.0);
        let up = rotation * Vec3::Y;
        let ratio = upside_down_ratio(up);
        let impulse = recovery_impulse(&params, 1.0, rotation, ratio);

        let nudged = Quat::from_scaled_axis(impulse.angular * 0.01) * up;
        assert!(nudged.y > up.y);
        assert_eq!(impulse.linear, Vec3::new(0.0, 8.0, 0.0));
    }

    #[test]
    fn test_recovery_torque_when_fully_inverted() {
        let params = DriveParams::default();
        let rotation = Quat::from_rotation_z(PI);
        let impulse = recovery_impulse(&params, 1.0, rotation, 1.0);
        let forward = rotation * Vec3::X;
        assert!(impulse.angular.normalize().dot(forward).abs() > 0.99);
        assert!((impulse.angular.length() - 2.0).abs() < 1e-5);
    }
}
