//! Four-wheeled ray-cast vehicle controller.
//!
//! The controller owns no physics. Before the step it turns input into
//! per-wheel engine, steering and brake values; after the step it reads the
//! chassis pose and wheel contacts back and derives speed, tilt, and the
//! stopped/stuck state machines.

pub mod core;
pub mod params;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use self::core::{
    DriveCommand, DriveIntent, Impulse, StopTracker, StuckDetector, compute_drive_command,
    compute_kinematics, jump_impulse, locked_drive_command, recovery_impulse, upside_down_ratio,
    wheel_steering,
};
pub use self::params::{DriveParams, STEERING_WHEELS, SuspensionParams, VehicleConfig, WHEEL_COUNT};
use crate::error::{Error, Result};
use crate::input::{Action, InputActionMap};
use crate::physics::{BodyHandle, ChassisDesc, PhysicsWorld, Pose, VehicleHandle, WheelDesc};
use crate::schedule::FrameTime;

/// Maximum magnitude of the random spin added to a jump.
const JUMP_SPIN_JITTER: f32 = 0.5;

/// Per-wheel state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelState {
    /// Chassis-space attachment point.
    pub base_position: Vec3,
    /// Engine force written this frame.
    pub engine_force: f32,
    /// Steering angle written this frame.
    pub steering: f32,
    /// Brake written this frame.
    pub brake: f32,
    /// Suspension length after the last step.
    pub suspension_length: f32,
    /// Whether the wheel touched the ground during the last step.
    pub in_contact: bool,
}

/// Chassis state derived after each physics step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleState {
    /// Chassis position after the last step.
    pub position: Vec3,
    /// Chassis position one step earlier.
    pub previous_position: Vec3,
    /// `position - previous_position`.
    pub position_delta: Vec3,
    /// Chassis up vector in world space.
    pub up: Vec3,
    /// Speed over the last frame (m/s).
    pub speed: f32,
    /// 0 when upright, 1 when fully inverted.
    pub upside_down_ratio: f32,
    /// Stopped/moving hysteresis state.
    pub stopped: bool,
    /// Simulated time at which the vehicle last became stopped.
    pub stopped_since: f64,
    /// Stopped and tilted for long enough to need recovery.
    pub stuck: bool,
}

impl VehicleState {
    fn at_rest(pose: Pose) -> Self {
        let up = pose.rotation() * Vec3::Y;
        Self {
            position: pose.position,
            previous_position: pose.position,
            position_delta: Vec3::ZERO,
            up,
            speed: 0.0,
            upside_down_ratio: upside_down_ratio(up),
            stopped: false,
            stopped_since: 0.0,
            stuck: false,
        }
    }
}

/// Converts input into wheel controls and derives kinematics from the
/// stepped chassis.
pub struct VehicleController {
    chassis: BodyHandle,
    vehicle: VehicleHandle,
    config: VehicleConfig,
    wheels: [WheelState; WHEEL_COUNT],
    state: VehicleState,
    stop: StopTracker,
    stuck: StuckDetector,
    intent: DriveIntent,
    locked: bool,
    /// Recovery computed after a step, applied before the next one.
    pending_recovery: Option<Impulse>,
    now: f64,
    rng: StdRng,
}

impl VehicleController {
    /// Create the chassis and its four wheels in `physics`.
    pub fn new<P: PhysicsWorld + ?Sized>(physics: &mut P, config: VehicleConfig) -> Result<Self> {
        config.validate()?;

        let chassis = physics.create_chassis(&ChassisDesc {
            pose: config.spawn,
            half_extents: config.chassis_half_extents,
            density: config.chassis_density,
        })?;
        let vehicle = physics.create_vehicle(chassis)?;

        let mut wheels = [WheelState::default(); WHEEL_COUNT];
        for (wheel, position) in wheels.iter_mut().zip(config.wheel_positions) {
            physics.add_wheel(
                vehicle,
                &WheelDesc {
                    connection: position,
                    direction: Vec3::NEG_Y,
                    // Wheel forward is ground normal x axle, so +Z drives +X.
                    axle: Vec3::Z,
                    suspension: config.suspension,
                },
            )?;
            wheel.base_position = position;
            wheel.suspension_length = config.suspension.rest_length;
        }

        info!(?chassis, ?vehicle, spawn = ?config.spawn.position, "vehicle created");
        Ok(Self {
            chassis,
            vehicle,
            state: VehicleState::at_rest(config.spawn),
            wheels,
            stop: StopTracker::default(),
            stuck: StuckDetector::default(),
            intent: DriveIntent::default(),
            locked: false,
            pending_recovery: None,
            now: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    /// Write wheel controls and handle the jump and reset actions.
    ///
    /// Reads no stepped physics state besides the sleep flag and mass.
    pub fn pre_physics<P, I>(&mut self, physics: &mut P, input: &I) -> Result<()>
    where
        P: PhysicsWorld + ?Sized,
        I: InputActionMap + ?Sized,
    {
        let (intent, command) = if self.locked {
            (DriveIntent::default(), locked_drive_command(&self.config.drive))
        } else {
            let intent = DriveIntent::from_input(input);
            (intent, compute_drive_command(&self.config.drive, &intent))
        };
        self.intent = intent;
        self.apply_command(physics, command)?;

        if intent.is_active() && physics.is_sleeping(self.chassis)? {
            physics.wake_up(self.chassis)?;
        }

        if let Some(impulse) = self.pending_recovery.take() {
            self.apply_impulse(physics, impulse)?;
        }

        if !self.locked {
            if input.just_pressed(Action::Reset) {
                self.reset(physics)?;
            } else if input.just_pressed(Action::Jump) {
                self.jump(physics)?;
            }
        }
        Ok(())
    }

    /// Read the stepped chassis and wheels and update the derived state.
    ///
    /// Degenerate frames (non-positive delta, non-finite physics data) leave
    /// the previous state untouched.
    pub fn post_physics<P: PhysicsWorld + ?Sized>(&mut self, physics: &P, time: FrameTime) -> Result<()> {
        if !time.delta.is_finite() || time.delta <= 0.0 {
            debug!(frame = time.frame, delta = time.delta, "skipping vehicle update");
            return Ok(());
        }
        self.now = time.elapsed;

        let translation = physics.translation(self.chassis)?;
        let rotation = physics.rotation(self.chassis)?;
        let mut contacts = [false; WHEEL_COUNT];
        let mut lengths = [0.0; WHEEL_COUNT];
        for (i, (contact, length)) in contacts.iter_mut().zip(&mut lengths).enumerate() {
            *contact = physics.wheel_is_in_contact(self.vehicle, i)?;
            *length = physics.wheel_suspension_length(self.vehicle, i)?;
        }

        let kinematics = if lengths.iter().all(|l| l.is_finite()) {
            compute_kinematics(self.state.position, translation, rotation, time.delta)
        } else {
            None
        };
        let Some(kinematics) = kinematics else {
            warn!(
                frame = time.frame,
                ?translation,
                ?rotation,
                "non-finite physics state, keeping previous vehicle state"
            );
            return Ok(());
        };

        for ((wheel, contact), length) in self.wheels.iter_mut().zip(contacts).zip(lengths) {
            wheel.in_contact = contact;
            wheel.suspension_length = length;
        }

        self.state.previous_position = self.state.position;
        self.state.position = translation;
        self.state.position_delta = kinematics.position_delta;
        self.state.up = kinematics.up;
        self.state.speed = kinematics.speed;
        self.state.upside_down_ratio = kinematics.upside_down_ratio;

        let params = &self.config.drive;
        if self.stop.update(kinematics.speed, self.now, params) {
            debug!(stopped = self.stop.stopped, speed = kinematics.speed, "vehicle stop state changed");
        }
        let triggered = self.stuck.update(
            self.stop.stopped,
            self.stop.stopped_for(self.now),
            kinematics.upside_down_ratio,
            params,
        );
        if triggered {
            let mass = physics.mass(self.chassis)?;
            let impulse = recovery_impulse(params, mass, rotation, kinematics.upside_down_ratio);
            info!(
                ratio = kinematics.upside_down_ratio,
                stopped_for = self.stop.stopped_for(self.now),
                "vehicle stuck, recovering"
            );
            self.pending_recovery = Some(impulse);
        }
        self.sync_state();
        Ok(())
    }

    /// Hop if any wheel touched the ground during the last step.
    ///
    /// Returns whether the jump happened.
    pub fn jump<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P) -> Result<bool> {
        if !self.wheels.iter().any(|w| w.in_contact) {
            debug!("jump ignored while airborne");
            return Ok(false);
        }
        let mass = physics.mass(self.chassis)?;
        let jitter = self.rng.random_range(-JUMP_SPIN_JITTER..JUMP_SPIN_JITTER);
        let impulse = jump_impulse(&self.config.drive, mass, self.intent.turn, jitter);
        self.apply_impulse(physics, impulse)?;
        debug!(?impulse, "jump");
        Ok(true)
    }

    /// Return to the spawn pose at rest.
    pub fn reset<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P) -> Result<()> {
        self.teleport(physics, self.config.spawn)
    }

    /// Move the chassis to `pose` and zero its velocities.
    ///
    /// The derived state is rebased so the jump does not register as speed.
    pub fn teleport<P: PhysicsWorld + ?Sized>(&mut self, physics: &mut P, pose: Pose) -> Result<()> {
        if !pose.is_finite() {
            return Err(Error::NonFinitePose {
                context: "teleport",
            });
        }
        physics.set_translation(self.chassis, pose.position)?;
        physics.set_rotation(self.chassis, pose.rotation())?;
        physics.set_linear_velocity(self.chassis, Vec3::ZERO)?;
        physics.set_angular_velocity(self.chassis, Vec3::ZERO)?;
        physics.wake_up(self.chassis)?;

        self.state = VehicleState::at_rest(pose);
        self.stop.restart(self.now);
        self.stuck = StuckDetector::default();
        self.pending_recovery = None;
        self.sync_state();

        info!(position = ?pose.position, yaw = pose.yaw, "vehicle teleported");
        Ok(())
    }

    /// Lock or unlock player control. While locked, drive, jump and reset
    /// input is ignored and the brakes are held.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            debug!(locked, "vehicle control lock changed");
        }
        self.locked = locked;
    }

    /// Whether player control is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The chassis rigid body.
    #[must_use]
    pub fn chassis(&self) -> BodyHandle {
        self.chassis
    }

    /// The physics vehicle controller.
    #[must_use]
    pub fn vehicle(&self) -> VehicleHandle {
        self.vehicle
    }

    /// Derived chassis state.
    #[must_use]
    pub fn state(&self) -> &VehicleState {
        &self.state
    }

    /// Chassis position after the last step.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    /// Intent decoded during the last pre-physics update.
    #[must_use]
    pub fn intent(&self) -> DriveIntent {
        self.intent
    }

    /// All four wheels.
    #[must_use]
    pub fn wheels(&self) -> &[WheelState; WHEEL_COUNT] {
        &self.wheels
    }

    /// A single wheel.
    ///
    /// # Panics
    ///
    /// If `index` is not a valid wheel index.
    #[must_use]
    pub fn wheel(&self, index: usize) -> &WheelState {
        assert!(index < WHEEL_COUNT, "wheel index {index} out of range");
        &self.wheels[index]
    }

    /// The spawn pose used by the reset action.
    #[must_use]
    pub fn spawn(&self) -> Pose {
        self.config.spawn
    }

    /// Drive tuning.
    #[must_use]
    pub fn params(&self) -> &DriveParams {
        &self.config.drive
    }

    /// Replace the drive tuning; takes effect on the next frame.
    ///
    /// Rejected tuning leaves the current values in place.
    pub fn set_params(&mut self, params: DriveParams) -> Result<()> {
        params.validate()?;
        debug!(?params, "drive tuning updated");
        self.config.drive = params;
        Ok(())
    }

    /// Current suspension tuning.
    #[must_use]
    pub fn suspension(&self) -> &SuspensionParams {
        &self.config.suspension
    }

    /// Replace the suspension tuning on every wheel.
    pub fn set_suspension<P: PhysicsWorld + ?Sized>(
        &mut self,
        physics: &mut P,
        suspension: SuspensionParams,
    ) -> Result<()> {
        suspension.validate()?;
        for wheel in 0..WHEEL_COUNT {
            physics.set_wheel_suspension(self.vehicle, wheel, &suspension)?;
        }
        self.config.suspension = suspension;
        debug!(?suspension, "suspension updated");
        Ok(())
    }

    fn apply_command<P: PhysicsWorld + ?Sized>(
        &mut self,
        physics: &mut P,
        command: DriveCommand,
    ) -> Result<()> {
        for (i, wheel) in self.wheels.iter_mut().enumerate() {
            let steering = wheel_steering(i, command.steering);
            physics.set_wheel_engine_force(self.vehicle, i, command.engine_force)?;
            physics.set_wheel_steering(self.vehicle, i, steering)?;
            physics.set_wheel_brake(self.vehicle, i, command.brake)?;
            wheel.engine_force = command.engine_force;
            wheel.steering = steering;
            wheel.brake = command.brake;
        }
        Ok(())
    }

    fn apply_impulse<P: PhysicsWorld + ?Sized>(
        &mut self,
        physics: &mut P,
        impulse: Impulse,
    ) -> Result<()> {
        physics.apply_impulse(self.chassis, impulse.linear)?;
        physics.apply_torque_impulse(self.chassis, impulse.angular)
    }

    fn sync_state(&mut self) {
        self.state.stopped = self.stop.stopped;
        self.state.stopped_since = self.stop.stopped_since;
        self.state.stuck = self.stuck.stuck;
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;
    use crate::input::ActionSnapshot;
    use crate::physics::MemoryWorld;

    fn setup() -> (MemoryWorld, VehicleController) {
        let mut world = MemoryWorld::new();
        let vehicle = VehicleController::new(&mut world, VehicleConfig::default()).unwrap();
        (world, vehicle)
    }

    fn frame(delta: f32, elapsed: f64) -> FrameTime {
        FrameTime {
            delta,
            elapsed,
            frame: 1,
        }
    }

    #[test]
    fn test_new_creates_four_wheels() {
        let (world, vehicle) = setup();
        let wheels = &world.vehicle(vehicle.vehicle()).unwrap().wheels;
        assert_eq!(wheels.len(), WHEEL_COUNT);
        assert_eq!(wheels[0].desc.connection, Vec3::new(0.65, -0.2, 0.75));
        // Engine force must push the chassis along its +X heading.
        assert!(wheels.iter().all(|w| Vec3::Y.cross(w.desc.axle) == Vec3::X));
        assert_eq!(vehicle.wheel(3).base_position, Vec3::new(-0.65, -0.2, -0.75));
    }

    #[test]
    #[should_panic(expected = "wheel index 4 out of range")]
    fn test_wheel_index_out_of_range_panics() {
        let (_, vehicle) = setup();
        let _ = vehicle.wheel(4);
    }

    #[test]
    fn test_pre_physics_writes_controls() {
        let (mut world, mut vehicle) = setup();
        let mut input = ActionSnapshot::new();
        input.press(Action::Forward);
        input.press(Action::Right);
        vehicle.pre_physics(&mut world, &input).unwrap();

        let wheels = &world.vehicle(vehicle.vehicle()).unwrap().wheels;
        for (i, wheel) in wheels.iter().enumerate() {
            assert_eq!(wheel.engine_force, 6.0);
            assert_eq!(wheel.brake, 0.04);
            let expected = if i % 2 == 0 { -0.5 } else { 0.0 };
            assert_eq!(wheel.steering, expected, "wheel {i}");
        }
    }

    #[test]
    fn test_locked_controller_ignores_input() {
        let (mut world, mut vehicle) = setup();
        world.set_grounded(vehicle.vehicle(), true).unwrap();
        vehicle.post_physics(&world, frame(0.1, 0.1)).unwrap();
        vehicle.set_locked(true);

        let mut input = ActionSnapshot::new();
        input.press(Action::Forward);
        input.press(Action::Jump);
        vehicle.pre_physics(&mut world, &input).unwrap();

        let wheel = &world.vehicle(vehicle.vehicle()).unwrap().wheels[0];
        assert_eq!(wheel.engine_force, 0.0);
        assert_eq!(wheel.brake, 0.5);
        assert_eq!(world.body(vehicle.chassis()).unwrap().total_impulse, Vec3::ZERO);
    }

    #[test]
    fn test_jump_requires_contact() {
        let (mut world, mut vehicle) = setup();
        let mut input = ActionSnapshot::new();
        input.press(Action::Jump);
        vehicle.pre_physics(&mut world, &input).unwrap();
        assert_eq!(world.body(vehicle.chassis()).unwrap().total_impulse, Vec3::ZERO);

        world.set_grounded(vehicle.vehicle(), true).unwrap();
        vehicle.post_physics(&world, frame(0.1, 0.1)).unwrap();
        input.begin_frame();
        input.release(Action::Jump);
        input.begin_frame();
        input.press(Action::Jump);
        vehicle.pre_physics(&mut world, &input).unwrap();

        let mass = world.mass(vehicle.chassis()).unwrap();
        let impulse = world.body(vehicle.chassis()).unwrap().total_impulse;
        assert!((impulse.y - 8.0 * mass).abs() < 1e-4);
    }

    #[test]
    fn test_held_jump_fires_once() {
        let (mut world, mut vehicle) = setup();
        world.set_grounded(vehicle.vehicle(), true).unwrap();
        vehicle.post_physics(&world, frame(0.1, 0.1)).unwrap();

        let mut input = ActionSnapshot::new();
        input.press(Action::Jump);
        vehicle.pre_physics(&mut world, &input).unwrap();
        input.begin_frame();
        vehicle.pre_physics(&mut world, &input).unwrap();

        let mass = world.mass(vehicle.chassis()).unwrap();
        let impulse = world.body(vehicle.chassis()).unwrap().total_impulse;
        assert!((impulse.y - 8.0 * mass).abs() < 1e-4);
    }

    #[test]
    fn test_post_physics_derives_speed() {
        let (mut world, mut vehicle) = setup();
        world
            .set_translation(vehicle.chassis(), Vec3::new(1.0, 1.0, 0.0))
            .unwrap();
        vehicle.post_physics(&world, frame(0.5, 0.5)).unwrap();
        let state = vehicle.state();
        assert!((state.speed - 2.0).abs() < 1e-5);
        assert_eq!(state.previous_position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(state.position_delta, Vec3::X);
        assert!(!state.stopped);
    }

    #[test]
    fn test_post_physics_skips_zero_delta() {
        let (mut world, mut vehicle) = setup();
        world
            .set_translation(vehicle.chassis(), Vec3::new(5.0, 1.0, 0.0))
            .unwrap();
        vehicle.post_physics(&world, frame(0.0, 0.0)).unwrap();
        assert_eq!(vehicle.position(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_post_physics_keeps_state_on_nan() {
        let (mut world, mut vehicle) = setup();
        world
            .set_translation(vehicle.chassis(), Vec3::new(1.0, 1.0, 0.0))
            .unwrap();
        vehicle.post_physics(&world, frame(0.5, 0.5)).unwrap();
        let before = *vehicle.state();

        world
            .set_translation(vehicle.chassis(), Vec3::new(f32::NAN, 1.0, 0.0))
            .unwrap();
        vehicle.post_physics(&world, frame(0.5, 1.0)).unwrap();
        assert_eq!(*vehicle.state(), before);
    }

    #[test]
    fn test_upside_down_vehicle_recovers_once() {
        let (mut world, mut vehicle) = setup();
        let chassis = vehicle.chassis();
        world
            .set_rotation(chassis, Quat::from_rotation_x(std::f32::consts::PI))
            .unwrap();
        let input = ActionSnapshot::new();

        let dt = 0.1;
        let mut triggered_at = None;
        for i in 1..=40 {
            let elapsed = f64::from(i) * f64::from(dt);
            vehicle.pre_physics(&mut world, &input).unwrap();
            // Hold the chassis still so the recovery hop does not move it.
            world.set_linear_velocity(chassis, Vec3::ZERO).unwrap();
            world.set_angular_velocity(chassis, Vec3::ZERO).unwrap();
            vehicle.post_physics(&world, frame(dt, elapsed)).unwrap();
            if vehicle.state().stuck && triggered_at.is_none() {
                triggered_at = Some(elapsed);
            }
        }

        // Stopped from the first frame at 0.1 s, stuck once more than 1 s later.
        let at = triggered_at.unwrap();
        assert!(at > 1.05 && at < 1.35, "triggered at {at}");
        let mass = world.mass(chassis).unwrap();
        let impulse = world.body(chassis).unwrap().total_impulse;
        assert!((impulse.y - 8.0 * mass).abs() < 1e-3);
        assert!(vehicle.state().stopped);
    }

    #[test]
    fn test_reset_teleports_to_spawn_at_rest() {
        let (mut world, mut vehicle) = setup();
        let chassis = vehicle.chassis();
        world
            .set_translation(chassis, Vec3::new(10.0, 3.0, -4.0))
            .unwrap();
        world.set_linear_velocity(chassis, Vec3::X).unwrap();
        vehicle.post_physics(&world, frame(0.1, 0.1)).unwrap();

        let mut input = ActionSnapshot::new();
        input.press(Action::Reset);
        vehicle.pre_physics(&mut world, &input).unwrap();

        let body = world.body(chassis).unwrap();
        assert_eq!(body.translation, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
        assert_eq!(vehicle.state().previous_position, Vec3::new(0.0, 1.0, 0.0));

        // The teleport itself must not register as speed.
        vehicle.post_physics(&world, frame(0.1, 0.2)).unwrap();
        assert_eq!(vehicle.state().speed, 0.0);
    }

    #[test]
    fn test_sleeping_chassis_wakes_on_drive() {
        let (mut world, mut vehicle) = setup();
        world.body_mut(vehicle.chassis()).unwrap().sleeping = true;
        let mut input = ActionSnapshot::new();
        input.press(Action::Forward);
        vehicle.pre_physics(&mut world, &input).unwrap();
        assert!(!world.is_sleeping(vehicle.chassis()).unwrap());
    }

    #[test]
    fn test_set_suspension_reaches_every_wheel() {
        let (mut world, mut vehicle) = setup();
        let suspension = SuspensionParams {
            stiffness: 40.0,
            ..SuspensionParams::default()
        };
        vehicle.set_suspension(&mut world, suspension).unwrap();
        let wheels = &world.vehicle(vehicle.vehicle()).unwrap().wheels;
        assert!(wheels.iter().all(|w| w.desc.suspension.stiffness == 40.0));
        assert_eq!(vehicle.suspension().stiffness, 40.0);

        let bad = SuspensionParams {
            wheel_radius: 0.0,
            ..SuspensionParams::default()
        };
        assert!(vehicle.set_suspension(&mut world, bad).is_err());
    }

    #[test]
    fn test_set_params_changes_next_command() {
        let (mut world, mut vehicle) = setup();
        vehicle
            .set_params(DriveParams {
                engine_force: 10.0,
                ..DriveParams::default()
            })
            .unwrap();
        let mut input = ActionSnapshot::new();
        input.press(Action::Forward);
        vehicle.pre_physics(&mut world, &input).unwrap();
        assert_eq!(vehicle.wheel(1).engine_force, 10.0);
    }

    #[test]
    fn test_set_params_rejects_broken_dead_band() {
        let (_, mut vehicle) = setup();
        let inverted = DriveParams {
            stop_speed: 0.5,
            resume_speed: 0.2,
            ..DriveParams::default()
        };
        assert!(matches!(
            vehicle.set_params(inverted),
            Err(Error::InvalidParameter {
                name: "resume_speed",
                ..
            })
        ));
        let over_tilted = DriveParams {
            stuck_tilt: 1.5,
            ..DriveParams::default()
        };
        assert!(matches!(
            vehicle.set_params(over_tilted),
            Err(Error::InvalidParameter {
                name: "stuck_tilt",
                ..
            })
        ));
        assert_eq!(vehicle.params(), &DriveParams::default());
    }
}
