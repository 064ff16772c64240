//! Vehicle tunables.
//!
//! All structs deserialize with `#[serde(default)]`, so level files only need
//! to name the values they override.

use glam::Vec3;
use serde::Deserialize;

use crate::error::{Error, Result};
pub use crate::physics::SuspensionParams;
use crate::physics::Pose;

/// Number of wheels on every vehicle.
pub const WHEEL_COUNT: usize = 4;

/// Indices of the wheels that receive steering input.
pub const STEERING_WHEELS: [usize; 2] = [0, 2];

/// Drive, jump and recovery tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriveParams {
    /// Base engine force per wheel.
    pub engine_force: f32,
    /// Engine force multiplier while boost is held.
    pub boost_multiplier: f32,
    /// Engine force multiplier while brake is held.
    pub brake_engine_multiplier: f32,
    /// Steering angle at full lock (radians).
    pub steering_limit: f32,
    /// Brake applied when coasting.
    pub coast_brake: f32,
    /// Brake applied while the brake action is held.
    pub brake_strength: f32,
    /// Upward velocity change per jump or recovery (impulse per unit mass).
    pub jump_force: f32,
    /// Yaw torque impulse per unit mass added to a jump.
    pub jump_spin: f32,
    /// Speed below which a moving vehicle counts as stopped (m/s).
    pub stop_speed: f32,
    /// Speed above which a stopped vehicle counts as moving again (m/s).
    pub resume_speed: f32,
    /// Seconds stopped before a tilted vehicle is considered stuck.
    pub stuck_delay: f32,
    /// Upside-down ratio above which a stopped vehicle is considered stuck.
    pub stuck_tilt: f32,
    /// Corrective torque impulse per unit mass at full inversion.
    pub flip_torque: f32,
}

impl Default for DriveParams {
    fn default() -> Self {
        Self {
            engine_force: 6.0,
            boost_multiplier: 2.5,
            brake_engine_multiplier: 0.5,
            steering_limit: 0.5,
            coast_brake: 0.04,
            brake_strength: 0.5,
            jump_force: 8.0,
            jump_spin: 0.5,
            stop_speed: 0.05,
            resume_speed: 0.1,
            stuck_delay: 1.0,
            stuck_tilt: 0.3,
            flip_torque: 2.0,
        }
    }
}

impl SuspensionParams {
    /// Reject non-physical suspension settings.
    pub fn validate(&self) -> Result<()> {
        non_negative("rest_length", self.rest_length)?;
        positive("stiffness", self.stiffness)?;
        non_negative("max_travel", self.max_travel)?;
        positive("wheel_radius", self.wheel_radius)?;
        non_negative("damping", self.damping)
    }
}

impl DriveParams {
    /// Reject values that would break the controller's state machines.
    pub fn validate(&self) -> Result<()> {
        non_negative("engine_force", self.engine_force)?;
        non_negative("boost_multiplier", self.boost_multiplier)?;
        non_negative("brake_engine_multiplier", self.brake_engine_multiplier)?;
        non_negative("steering_limit", self.steering_limit)?;
        non_negative("coast_brake", self.coast_brake)?;
        non_negative("brake_strength", self.brake_strength)?;
        non_negative("jump_force", self.jump_force)?;
        non_negative("jump_spin", self.jump_spin)?;
        non_negative("stop_speed", self.stop_speed)?;
        non_negative("stuck_delay", self.stuck_delay)?;
        non_negative("flip_torque", self.flip_torque)?;
        if self.resume_speed.is_nan() || self.resume_speed < self.stop_speed {
            return Err(Error::InvalidParameter {
                name: "resume_speed",
                value: self.resume_speed,
            });
        }
        if !(0.0..=1.0).contains(&self.stuck_tilt) {
            return Err(Error::InvalidParameter {
                name: "stuck_tilt",
                value: self.stuck_tilt,
            });
        }
        Ok(())
    }
}

/// Everything needed to build a vehicle.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    /// Where the vehicle is created and where the reset action returns it.
    pub spawn: Pose,
    /// Chassis collider half-extents (x forward, y up, z right).
    pub chassis_half_extents: Vec3,
    /// Chassis collider density.
    pub chassis_density: f32,
    /// Chassis-space wheel attachment points, in wheel-index order.
    pub wheel_positions: [Vec3; WHEEL_COUNT],
    /// Drive tuning.
    pub drive: DriveParams,
    /// Suspension tuning.
    pub suspension: SuspensionParams,
    /// Seed for the jump spin jitter.
    pub seed: u64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            spawn: Pose::new(Vec3::new(0.0, 1.0, 0.0), 0.0),
            chassis_half_extents: Vec3::new(1.0, 0.25, 0.75),
            // 15 kg: full boost stays well under the tip-over acceleration.
            chassis_density: 10.0,
            // Front-right, rear-right, front-left, rear-left: 0 and 2 steer.
            wheel_positions: [
                Vec3::new(0.65, -0.2, 0.75),
                Vec3::new(-0.65, -0.2, 0.75),
                Vec3::new(0.65, -0.2, -0.75),
                Vec3::new(-0.65, -0.2, -0.75),
            ],
            drive: DriveParams::default(),
            suspension: SuspensionParams::default(),
            seed: 0,
        }
    }
}

impl VehicleConfig {
    /// Validate every nested section.
    pub fn validate(&self) -> Result<()> {
        if !self.spawn.is_finite() {
            return Err(Error::NonFinitePose { context: "spawn" });
        }
        let extents = self.chassis_half_extents;
        for (name, value) in [
            ("chassis_half_extents.x", extents.x),
            ("chassis_half_extents.y", extents.y),
            ("chassis_half_extents.z", extents.z),
            ("chassis_density", self.chassis_density),
        ] {
            positive(name, value)?;
        }
        if let Some(bad) = self.wheel_positions.iter().find(|p| !p.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "wheel_positions",
                value: bad.x + bad.y + bad.z,
            });
        }
        self.drive.validate()?;
        self.suspension.validate()
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}
