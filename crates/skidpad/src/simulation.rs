//! The per-frame context shared by every scheduler callback.
//!
//! [`Simulation`] owns the collaborators and subsystems; [`Simulation::install`]
//! wires them into a [`TickScheduler`] with the priorities that keep the
//! write-before-step, read-after-step ordering.

use tracing::debug;

use crate::circuit::{CircuitLayout, RaceCircuit};
use crate::error::Result;
use crate::input::InputActionMap;
use crate::physics::PhysicsWorld;
use crate::presentation::Presentation;
use crate::schedule::{Phase, SubscriptionHandle, TickScheduler, priority};
use crate::vehicle::{VehicleConfig, VehicleController};

/// Everything a frame touches.
pub struct Simulation<P, I, D> {
    /// Physics collaborator.
    pub physics: P,
    /// Input collaborator.
    pub input: I,
    /// Presentation collaborator.
    pub presentation: D,
    /// The player vehicle.
    pub vehicle: VehicleController,
    /// Race mode, if the level has a circuit.
    pub circuit: Option<RaceCircuit>,
}

/// Handles of the subscriptions created by [`Simulation::install`].
#[derive(Clone, Copy, Debug)]
pub struct Subscriptions {
    pub vehicle_pre: SubscriptionHandle,
    pub physics_step: SubscriptionHandle,
    pub vehicle_post: SubscriptionHandle,
    pub circuit: SubscriptionHandle,
}

impl<P, I, D> Simulation<P, I, D>
where
    P: PhysicsWorld + 'static,
    I: InputActionMap + 'static,
    D: Presentation + 'static,
{
    /// Create the vehicle in `physics` and load the optional circuit.
    pub fn new(
        mut physics: P,
        input: I,
        presentation: D,
        vehicle: VehicleConfig,
        circuit: Option<CircuitLayout>,
    ) -> Result<Self> {
        let vehicle = VehicleController::new(&mut physics, vehicle)?;
        let circuit = circuit.map(RaceCircuit::new).transpose()?;
        Ok(Self {
            physics,
            input,
            presentation,
            vehicle,
            circuit,
        })
    }

    /// Register the vehicle, physics step and circuit callbacks.
    pub fn install(scheduler: &mut TickScheduler<Self>) -> Subscriptions {
        let vehicle_pre = scheduler.register(
            "vehicle.pre_physics",
            Phase::PrePhysics,
            priority::VEHICLE,
            |sim: &mut Self, _| sim.vehicle.pre_physics(&mut sim.physics, &sim.input),
        );
        let physics_step = scheduler.register(
            "physics.step",
            Phase::PhysicsStep,
            priority::PHYSICS,
            |sim: &mut Self, time| {
                if !time.delta.is_finite() || time.delta <= 0.0 {
                    debug!(delta = time.delta, "skipping physics step");
                    return Ok(());
                }
                sim.physics.step(time.delta)
            },
        );
        let vehicle_post = scheduler.register(
            "vehicle.post_physics",
            Phase::PostPhysics,
            priority::VEHICLE,
            |sim: &mut Self, time| sim.vehicle.post_physics(&sim.physics, time),
        );
        let circuit = scheduler.register(
            "circuit.update",
            Phase::PostPhysics,
            priority::CIRCUIT,
            |sim: &mut Self, time| match sim.circuit.as_mut() {
                Some(circuit) => circuit.update(
                    &mut sim.vehicle,
                    &mut sim.physics,
                    &sim.input,
                    &mut sim.presentation,
                    time,
                ),
                None => Ok(()),
            },
        );
        Subscriptions {
            vehicle_pre,
            physics_step,
            vehicle_post,
            circuit,
        }
    }

    /// A scheduler with [`Simulation::install`] already applied.
    #[must_use]
    pub fn scheduler() -> TickScheduler<Self> {
        let mut scheduler = TickScheduler::new();
        Self::install(&mut scheduler);
        scheduler
    }
}
