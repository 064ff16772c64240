//! Physics collaborator contract.
//!
//! The core never integrates physics itself. It talks to an opaque rigid-body
//! world with a ray-cast wheeled-vehicle controller through [`PhysicsWorld`],
//! referring to bodies and controllers by handle.
//!
//! [`MemoryWorld`] is a minimal in-process implementation used by tests and
//! headless tooling that do not need collision detection.

use glam::{Quat, Vec3};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Handle to a rigid body owned by the physics world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

/// Handle to a wheeled-vehicle controller owned by the physics world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VehicleHandle(pub u32);

/// A ground-aligned placement: position plus heading around world up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// Heading around +Y in radians.
    #[serde(default)]
    pub yaw: f32,
}

impl Pose {
    /// Create a pose from a position and heading.
    #[must_use]
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Rotation corresponding to the heading.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Whether every component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.yaw.is_finite()
    }
}

/// Description of the chassis rigid body.
#[derive(Clone, Debug)]
pub struct ChassisDesc {
    /// Initial placement.
    pub pose: Pose,
    /// Collider half-extents (x forward, y up, z right).
    pub half_extents: Vec3,
    /// Collider density; mass follows from volume.
    pub density: f32,
}

/// Suspension and wheel size, shared by all four wheels of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuspensionParams {
    /// Suspension length at rest.
    pub rest_length: f32,
    /// Spring stiffness.
    pub stiffness: f32,
    /// Maximum compression travel.
    pub max_travel: f32,
    /// Wheel radius.
    pub wheel_radius: f32,
    /// Spring damping per unit chassis mass, in both directions.
    pub damping: f32,
}

impl Default for SuspensionParams {
    fn default() -> Self {
        Self {
            rest_length: 0.125,
            stiffness: 24.0,
            max_travel: 1.0,
            wheel_radius: 0.5,
            damping: 2.5,
        }
    }
}

/// Description of one wheel attached to a vehicle controller.
#[derive(Clone, Copy, Debug)]
pub struct WheelDesc {
    /// Chassis-space attachment point.
    pub connection: Vec3,
    /// Chassis-space suspension direction (usually down).
    pub direction: Vec3,
    /// Chassis-space axle.
    pub axle: Vec3,
    /// Suspension settings and wheel radius.
    pub suspension: SuspensionParams,
}

/// Opaque rigid-body world with wheeled-vehicle controllers.
///
/// Lookups of unknown handles return [`Error::UnknownBody`] or
/// [`Error::UnknownVehicle`]. Wheel indices outside the controller's wheel
/// count are programmer errors and panic.
pub trait PhysicsWorld {
    /// Advance the world by `dt` seconds, updating every vehicle controller
    /// before integrating.
    fn step(&mut self, dt: f32) -> Result<()>;

    /// Create a dynamic chassis body with a box collider.
    fn create_chassis(&mut self, desc: &ChassisDesc) -> Result<BodyHandle>;

    /// Create a vehicle controller driving `chassis`.
    fn create_vehicle(&mut self, chassis: BodyHandle) -> Result<VehicleHandle>;

    /// Current world-space position.
    fn translation(&self, body: BodyHandle) -> Result<Vec3>;

    /// Current world-space orientation.
    fn rotation(&self, body: BodyHandle) -> Result<Quat>;

    /// Teleport a body.
    fn set_translation(&mut self, body: BodyHandle, translation: Vec3) -> Result<()>;

    /// Override a body's orientation.
    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat) -> Result<()>;

    /// Override a body's linear velocity.
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()>;

    /// Override a body's angular velocity.
    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()>;

    /// Apply a linear impulse at the centre of mass.
    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()>;

    /// Apply an angular impulse.
    fn apply_torque_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()>;

    /// Body mass.
    fn mass(&self, body: BodyHandle) -> Result<f32>;

    /// Whether the body has been put to sleep by the solver.
    fn is_sleeping(&self, body: BodyHandle) -> Result<bool>;

    /// Wake a sleeping body.
    fn wake_up(&mut self, body: BodyHandle) -> Result<()>;

    /// Attach a wheel, returning its index.
    fn add_wheel(&mut self, vehicle: VehicleHandle, desc: &WheelDesc) -> Result<usize>;

    /// Set the engine force of one wheel.
    fn set_wheel_engine_force(&mut self, vehicle: VehicleHandle, wheel: usize, force: f32)
    -> Result<()>;

    /// Set the steering angle of one wheel.
    fn set_wheel_steering(&mut self, vehicle: VehicleHandle, wheel: usize, angle: f32)
    -> Result<()>;

    /// Set the brake force of one wheel.
    fn set_wheel_brake(&mut self, vehicle: VehicleHandle, wheel: usize, brake: f32) -> Result<()>;

    /// Replace the suspension settings and radius of one wheel.
    fn set_wheel_suspension(
        &mut self,
        vehicle: VehicleHandle,
        wheel: usize,
        suspension: &SuspensionParams,
    ) -> Result<()>;

    /// Whether the wheel's ray hit the ground during the last update.
    fn wheel_is_in_contact(&self, vehicle: VehicleHandle, wheel: usize) -> Result<bool>;

    /// Current suspension length of the wheel.
    fn wheel_suspension_length(&self, vehicle: VehicleHandle, wheel: usize) -> Result<f32>;

    /// Run the vehicle controller's ray casts and wheel impulses for `dt`.
    fn update_vehicle(&mut self, vehicle: VehicleHandle, dt: f32) -> Result<()>;
}

/// Rigid body state tracked by [`MemoryWorld`].
#[derive(Clone, Debug)]
pub struct MemoryBody {
    /// World position.
    pub translation: Vec3,
    /// World orientation.
    pub rotation: Quat,
    /// Linear velocity.
    pub linear_velocity: Vec3,
    /// Angular velocity.
    pub angular_velocity: Vec3,
    /// Mass derived from the chassis description.
    pub mass: f32,
    /// Sleep flag; set by callers, cleared by [`PhysicsWorld::wake_up`].
    pub sleeping: bool,
    /// Sum of impulses applied since creation.
    pub total_impulse: Vec3,
    /// Sum of torque impulses applied since creation.
    pub total_torque_impulse: Vec3,
}

/// Per-wheel state tracked by [`MemoryWorld`].
#[derive(Clone, Debug)]
pub struct MemoryWheel {
    /// Attachment description.
    pub desc: WheelDesc,
    /// Last engine force written.
    pub engine_force: f32,
    /// Last steering angle written.
    pub steering: f32,
    /// Last brake written.
    pub brake: f32,
    /// Contact flag reported to readers.
    pub in_contact: bool,
    /// Suspension length reported to readers.
    pub suspension_length: f32,
}

/// Vehicle controller state tracked by [`MemoryWorld`].
#[derive(Clone, Debug)]
pub struct MemoryVehicle {
    /// Chassis body.
    pub chassis: BodyHandle,
    /// Attached wheels.
    pub wheels: Vec<MemoryWheel>,
}

/// A collision-free physics world.
///
/// Bodies integrate their velocities without gravity; wheel contact and
/// suspension length are whatever the caller last wrote. Engine force
/// accelerates the chassis along its +X axis and brakes damp its velocity.
/// Every field is public so tests can script poses directly.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    /// Bodies indexed by handle.
    pub bodies: Vec<MemoryBody>,
    /// Vehicles indexed by handle.
    pub vehicles: Vec<MemoryVehicle>,
    /// Number of completed steps.
    pub steps: u64,
}

impl MemoryWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a body, for scripting poses in tests.
    pub fn body_mut(&mut self, body: BodyHandle) -> Result<&mut MemoryBody> {
        self.bodies
            .get_mut(body.0 as usize)
            .ok_or(Error::UnknownBody(body))
    }

    /// Shared access to a body.
    pub fn body(&self, body: BodyHandle) -> Result<&MemoryBody> {
        self.bodies
            .get(body.0 as usize)
            .ok_or(Error::UnknownBody(body))
    }

    /// Mutable access to a vehicle, for scripting wheel contact in tests.
    pub fn vehicle_mut(&mut self, vehicle: VehicleHandle) -> Result<&mut MemoryVehicle> {
        self.vehicles
            .get_mut(vehicle.0 as usize)
            .ok_or(Error::UnknownVehicle(vehicle))
    }

    /// Shared access to a vehicle.
    pub fn vehicle(&self, vehicle: VehicleHandle) -> Result<&MemoryVehicle> {
        self.vehicles
            .get(vehicle.0 as usize)
            .ok_or(Error::UnknownVehicle(vehicle))
    }

    /// Set every wheel of `vehicle` in or out of contact.
    pub fn set_grounded(&mut self, vehicle: VehicleHandle, grounded: bool) -> Result<()> {
        for wheel in &mut self.vehicle_mut(vehicle)?.wheels {
            wheel.in_contact = grounded;
        }
        Ok(())
    }

    fn wheel_mut(&mut self, vehicle: VehicleHandle, wheel: usize) -> Result<&mut MemoryWheel> {
        Ok(&mut self.vehicle_mut(vehicle)?.wheels[wheel])
    }

    fn wheel(&self, vehicle: VehicleHandle, wheel: usize) -> Result<&MemoryWheel> {
        Ok(&self.vehicle(vehicle)?.wheels[wheel])
    }
}

impl PhysicsWorld for MemoryWorld {
    fn step(&mut self, dt: f32) -> Result<()> {
        for index in 0..self.vehicles.len() {
            self.update_vehicle(VehicleHandle(index as u32), dt)?;
        }
        for body in &mut self.bodies {
            if body.sleeping {
                continue;
            }
            body.translation += body.linear_velocity * dt;
            let spin = Quat::from_scaled_axis(body.angular_velocity * dt);
            body.rotation = (spin * body.rotation).normalize();
        }
        self.steps += 1;
        Ok(())
    }

    fn create_chassis(&mut self, desc: &ChassisDesc) -> Result<BodyHandle> {
        let volume = 8.0 * desc.half_extents.x * desc.half_extents.y * desc.half_extents.z;
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(MemoryBody {
            translation: desc.pose.position,
            rotation: desc.pose.rotation(),
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: desc.density * volume,
            sleeping: false,
            total_impulse: Vec3::ZERO,
            total_torque_impulse: Vec3::ZERO,
        });
        Ok(handle)
    }

    fn create_vehicle(&mut self, chassis: BodyHandle) -> Result<VehicleHandle> {
        self.body(chassis)?;
        let handle = VehicleHandle(self.vehicles.len() as u32);
        self.vehicles.push(MemoryVehicle {
            chassis,
            wheels: Vec::new(),
        });
        Ok(handle)
    }

    fn translation(&self, body: BodyHandle) -> Result<Vec3> {
        Ok(self.body(body)?.translation)
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quat> {
        Ok(self.body(body)?.rotation)
    }

    fn set_translation(&mut self, body: BodyHandle, translation: Vec3) -> Result<()> {
        self.body_mut(body)?.translation = translation;
        Ok(())
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat) -> Result<()> {
        self.body_mut(body)?.rotation = rotation;
        Ok(())
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(body)?.linear_velocity = velocity;
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(body)?.angular_velocity = velocity;
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()> {
        let body = self.body_mut(body)?;
        body.linear_velocity += impulse / body.mass.max(f32::EPSILON);
        body.total_impulse += impulse;
        body.sleeping = false;
        Ok(())
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()> {
        let body = self.body_mut(body)?;
        body.angular_velocity += impulse / body.mass.max(f32::EPSILON);
        body.total_torque_impulse += impulse;
        body.sleeping = false;
        Ok(())
    }

    fn mass(&self, body: BodyHandle) -> Result<f32> {
        Ok(self.body(body)?.mass)
    }

    fn is_sleeping(&self, body: BodyHandle) -> Result<bool> {
        Ok(self.body(body)?.sleeping)
    }

    fn wake_up(&mut self, body: BodyHandle) -> Result<()> {
        self.body_mut(body)?.sleeping = false;
        Ok(())
    }

    fn add_wheel(&mut self, vehicle: VehicleHandle, desc: &WheelDesc) -> Result<usize> {
        let wheels = &mut self.vehicle_mut(vehicle)?.wheels;
        wheels.push(MemoryWheel {
            desc: *desc,
            engine_force: 0.0,
            steering: 0.0,
            brake: 0.0,
            in_contact: false,
            suspension_length: desc.suspension.rest_length,
        });
        Ok(wheels.len() - 1)
    }

    fn set_wheel_engine_force(
        &mut self,
        vehicle: VehicleHandle,
        wheel: usize,
        force: f32,
    ) -> Result<()> {
        self.wheel_mut(vehicle, wheel)?.engine_force = force;
        Ok(())
    }

    fn set_wheel_steering(
        &mut self,
        vehicle: VehicleHandle,
        wheel: usize,
        angle: f32,
    ) -> Result<()> {
        self.wheel_mut(vehicle, wheel)?.steering = angle;
        Ok(())
    }

    fn set_wheel_brake(&mut self, vehicle: VehicleHandle, wheel: usize, brake: f32) -> Result<()> {
        self.wheel_mut(vehicle, wheel)?.brake = brake;
        Ok(())
    }

    fn set_wheel_suspension(
        &mut self,
        vehicle: VehicleHandle,
        wheel: usize,
        suspension: &SuspensionParams,
    ) -> Result<()> {
        self.wheel_mut(vehicle, wheel)?.desc.suspension = *suspension;
        Ok(())
    }

    fn wheel_is_in_contact(&self, vehicle: VehicleHandle, wheel: usize) -> Result<bool> {
        Ok(self.wheel(vehicle, wheel)?.in_contact)
    }

    fn wheel_suspension_length(&self, vehicle: VehicleHandle, wheel: usize) -> Result<f32> {
        Ok(self.wheel(vehicle, wheel)?.suspension_length)
    }

    fn update_vehicle(&mut self, vehicle: VehicleHandle, dt: f32) -> Result<()> {
        let controller = self.vehicle(vehicle)?;
        let grounded: Vec<&MemoryWheel> =
            controller.wheels.iter().filter(|w| w.in_contact).collect();
        if grounded.is_empty() {
            return Ok(());
        }
        let engine: f32 = grounded.iter().map(|w| w.engine_force).sum();
        let brake: f32 = grounded.iter().map(|w| w.brake).sum();
        let chassis = controller.chassis;

        let body = self.body_mut(chassis)?;
        let forward = body.rotation * Vec3::X;
        body.linear_velocity += forward * engine / body.mass.max(f32::EPSILON) * dt;
        body.linear_velocity *= (-brake * dt).exp();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chassis(world: &mut MemoryWorld) -> BodyHandle {
        world
            .create_chassis(&ChassisDesc {
                pose: Pose::new(Vec3::new(0.0, 1.0, 0.0), 0.0),
                half_extents: Vec3::new(1.0, 0.5, 0.5),
                density: 2.0,
            })
            .unwrap()
    }

    #[test]
    fn test_memory_world_mass_from_volume() {
        let mut world = MemoryWorld::new();
        let body = chassis(&mut world);
        assert!((world.mass(body).unwrap() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_memory_world_unknown_handles() {
        let world = MemoryWorld::new();
        assert!(matches!(
            world.translation(BodyHandle(3)),
            Err(Error::UnknownBody(BodyHandle(3)))
        ));
        assert!(matches!(
            world.wheel_is_in_contact(VehicleHandle(0), 0),
            Err(Error::UnknownVehicle(_))
        ));
    }

    #[test]
    fn test_memory_world_impulse_integrates() {
        let mut world = MemoryWorld::new();
        let body = chassis(&mut world);
        world.apply_impulse(body, Vec3::new(8.0, 0.0, 0.0)).unwrap();
        world.step(0.5).unwrap();
        let position = world.translation(body).unwrap();
        assert!((position - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_memory_world_engine_needs_contact() {
        let mut world = MemoryWorld::new();
        let body = chassis(&mut world);
        let vehicle = world.create_vehicle(body).unwrap();
        let wheel = world
            .add_wheel(
                vehicle,
                &WheelDesc {
                    connection: Vec3::ZERO,
                    direction: Vec3::NEG_Y,
                    axle: Vec3::Z,
                    suspension: SuspensionParams::default(),
                },
            )
            .unwrap();
        world.set_wheel_engine_force(vehicle, wheel, 4.0).unwrap();

        world.step(1.0).unwrap();
        assert_eq!(world.translation(body).unwrap(), Vec3::new(0.0, 1.0, 0.0));

        world.set_grounded(vehicle, true).unwrap();
        world.step(1.0).unwrap();
        assert!(world.translation(body).unwrap().x > 0.0);
    }
}
