//! rapier3d backend for the skidpad physics contract.
//!
//! [`RapierPhysics`] owns a complete rapier world: rigid bodies, colliders,
//! the physics pipeline and one ray-cast vehicle controller per vehicle.
//! Every step first updates the vehicle controllers against the current
//! scene, then integrates the world.

mod convert;
pub mod statics;

use glam::{Quat, Vec3};
use rapier3d::control::{DynamicRayCastVehicleController, Wheel, WheelTuning};
use rapier3d::na::Translation3;
use rapier3d::prelude::*;
use skidpad::physics::{BodyHandle, ChassisDesc, SuspensionParams, VehicleHandle, WheelDesc};
use skidpad::{Error, PhysicsWorld, Result};
use tracing::{debug, trace};

pub use crate::statics::{StaticDef, StaticShape};
use crate::convert::{from_rotation, from_vector, to_point, to_rotation, to_vector};

/// Standard gravity along -Y (m/s²).
pub const GRAVITY: f32 = -9.81;

/// A rapier world implementing [`PhysicsWorld`].
pub struct RapierPhysics {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Dynamic bodies created through the contract, indexed by [`BodyHandle`].
    handles: Vec<RigidBodyHandle>,
    /// Vehicle controllers, indexed by [`VehicleHandle`].
    vehicles: Vec<DynamicRayCastVehicleController>,
}

impl Default for RapierPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl RapierPhysics {
    /// Create an empty world with standard gravity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, GRAVITY, 0.0],
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handles: Vec::new(),
            vehicles: Vec::new(),
        }
    }

    /// Create a world and insert the given statics.
    pub fn with_statics(statics: &[StaticDef]) -> Result<Self> {
        let mut world = Self::new();
        for def in statics {
            world.add_static(def)?;
        }
        Ok(world)
    }

    /// Insert one immutable collider.
    pub fn add_static(&mut self, def: &StaticDef) -> Result<()> {
        def.validate()?;
        let body = RigidBodyBuilder::fixed().pose(def.pose()).build();
        let handle = self.bodies.insert(body);
        self.colliders
            .insert_with_parent(def.collider(), handle, &mut self.bodies);
        debug!(shape = ?def.shape, position = ?def.position, "static collider added");
        Ok(())
    }

    /// Number of dynamic bodies created through the contract.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn body(&self, body: BodyHandle) -> Result<&RigidBody> {
        self.handles
            .get(body.0 as usize)
            .and_then(|h| self.bodies.get(*h))
            .ok_or(Error::UnknownBody(body))
    }

    fn body_mut(&mut self, body: BodyHandle) -> Result<&mut RigidBody> {
        self.handles
            .get(body.0 as usize)
            .and_then(|h| self.bodies.get_mut(*h))
            .ok_or(Error::UnknownBody(body))
    }

    fn vehicle(&self, vehicle: VehicleHandle) -> Result<&DynamicRayCastVehicleController> {
        self.vehicles
            .get(vehicle.0 as usize)
            .ok_or(Error::UnknownVehicle(vehicle))
    }

    fn vehicle_mut(
        &mut self,
        vehicle: VehicleHandle,
    ) -> Result<&mut DynamicRayCastVehicleController> {
        self.vehicles
            .get_mut(vehicle.0 as usize)
            .ok_or(Error::UnknownVehicle(vehicle))
    }

    fn wheel_mut(&mut self, vehicle: VehicleHandle, wheel: usize) -> Result<&mut Wheel> {
        Ok(&mut self.vehicle_mut(vehicle)?.wheels_mut()[wheel])
    }

    fn wheel(&self, vehicle: VehicleHandle, wheel: usize) -> Result<&Wheel> {
        Ok(&self.vehicle(vehicle)?.wheels()[wheel])
    }
}

fn wheel_tuning(suspension: &SuspensionParams) -> WheelTuning {
    WheelTuning {
        suspension_stiffness: suspension.stiffness,
        suspension_compression: suspension.damping,
        suspension_damping: suspension.damping,
        max_suspension_travel: suspension.max_travel,
        ..WheelTuning::default()
    }
}

impl PhysicsWorld for RapierPhysics {
    fn step(&mut self, dt: f32) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "dt",
                value: dt,
            });
        }
        self.integration_parameters.dt = dt;

        for index in 0..self.vehicles.len() {
            self.update_vehicle(VehicleHandle(index as u32), dt)?;
        }

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        trace!(dt, "physics stepped");
        Ok(())
    }

    fn create_chassis(&mut self, desc: &ChassisDesc) -> Result<BodyHandle> {
        let pose = Isometry::from_parts(
            Translation3::from(to_vector(desc.pose.position)),
            to_rotation(desc.pose.rotation()),
        );
        let body = RigidBodyBuilder::dynamic().pose(pose).build();
        let handle = self.bodies.insert(body);
        let extents = desc.half_extents;
        let collider = ColliderBuilder::cuboid(extents.x, extents.y, extents.z)
            .density(desc.density)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        let body = BodyHandle(self.handles.len() as u32);
        self.handles.push(handle);
        debug!(?body, ?extents, density = desc.density, "chassis created");
        Ok(body)
    }

    fn create_vehicle(&mut self, chassis: BodyHandle) -> Result<VehicleHandle> {
        let handle = *self
            .handles
            .get(chassis.0 as usize)
            .ok_or(Error::UnknownBody(chassis))?;
        let vehicle = VehicleHandle(self.vehicles.len() as u32);
        self.vehicles
            .push(DynamicRayCastVehicleController::new(handle));
        Ok(vehicle)
    }

    fn translation(&self, body: BodyHandle) -> Result<Vec3> {
        Ok(from_vector(self.body(body)?.translation()))
    }

    fn rotation(&self, body: BodyHandle) -> Result<Quat> {
        Ok(from_rotation(self.body(body)?.rotation()))
    }

    fn set_translation(&mut self, body: BodyHandle, translation: Vec3) -> Result<()> {
        self.body_mut(body)?
            .set_translation(to_vector(translation), true);
        Ok(())
    }

    fn set_rotation(&mut self, body: BodyHandle, rotation: Quat) -> Result<()> {
        self.body_mut(body)?
            .set_rotation(to_rotation(rotation), true);
        Ok(())
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(body)?.set_linvel(to_vector(velocity), true);
        Ok(())
    }

    fn set_angular_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<()> {
        self.body_mut(body)?.set_angvel(to_vector(velocity), true);
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()> {
        self.body_mut(body)?.apply_impulse(to_vector(impulse), true);
        Ok(())
    }

    fn apply_torque_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<()> {
        self.body_mut(body)?
            .apply_torque_impulse(to_vector(impulse), true);
        Ok(())
    }

    fn mass(&self, body: BodyHandle) -> Result<f32> {
        Ok(self.body(body)?.mass())
    }

    fn is_sleeping(&self, body: BodyHandle) -> Result<bool> {
        Ok(self.body(body)?.is_sleeping())
    }

    fn wake_up(&mut self, body: BodyHandle) -> Result<()> {
        self.body_mut(body)?.wake_up(true);
        Ok(())
    }

    fn add_wheel(&mut self, vehicle: VehicleHandle, desc: &WheelDesc) -> Result<usize> {
        let controller = self.vehicle_mut(vehicle)?;
        controller.add_wheel(
            to_point(desc.connection),
            to_vector(desc.direction),
            to_vector(desc.axle),
            desc.suspension.rest_length,
            desc.suspension.wheel_radius,
            &wheel_tuning(&desc.suspension),
        );
        Ok(controller.wheels().len() - 1)
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
        let wheel = self.wheel_mut(vehicle, wheel)?;
        wheel.suspension_rest_length = suspension.rest_length;
        wheel.suspension_stiffness = suspension.stiffness;
        wheel.max_suspension_travel = suspension.max_travel;
        wheel.radius = suspension.wheel_radius;
        wheel.damping_compression = suspension.damping;
        wheel.damping_relaxation = suspension.damping;
        Ok(())
    }

    fn wheel_is_in_contact(&self, vehicle: VehicleHandle, wheel: usize) -> Result<bool> {
        Ok(self.wheel(vehicle, wheel)?.raycast_info().is_in_contact)
    }

    fn wheel_suspension_length(&self, vehicle: VehicleHandle, wheel: usize) -> Result<f32> {
        Ok(self.wheel(vehicle, wheel)?.raycast_info().suspension_length)
    }

    fn update_vehicle(&mut self, vehicle: VehicleHandle, dt: f32) -> Result<()> {
        let controller = self
            .vehicles
            .get_mut(vehicle.0 as usize)
            .ok_or(Error::UnknownVehicle(vehicle))?;
        let filter = QueryFilter::exclude_dynamic().exclude_rigid_body(controller.chassis);
        controller.update_vehicle(
            dt,
            self.broad_phase.as_query_pipeline_mut(
                self.narrow_phase.query_dispatcher(),
                &mut self.bodies,
                &mut self.colliders,
                filter,
            ),
        );
        Ok(())
    }
}
