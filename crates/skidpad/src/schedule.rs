//! Priority-ordered per-frame tick scheduling.
//!
//! A frame is split into four fixed [`Phase`]s that always run in the same
//! order. Within a phase, subscriptions run in ascending priority, with ties
//! broken by registration order. Callbacks receive the shared frame context
//! mutably, so subsystems never hold references to each other.

use tracing::{error, trace};

use crate::error::Result;

/// The fixed per-frame scheduler slots, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Write control parameters before the physics step.
    PrePhysics,
    /// Advance the physics world.
    PhysicsStep,
    /// Read stepped physics state and run game logic.
    PostPhysics,
    /// Presentation only.
    Render,
}

impl Phase {
    /// All phases in the order they are dispatched each frame.
    pub const ALL: [Phase; 4] = [
        Phase::PrePhysics,
        Phase::PhysicsStep,
        Phase::PostPhysics,
        Phase::Render,
    ];
}

/// Well-known priorities used by the built-in subsystems.
pub mod priority {
    /// Physics world step.
    pub const PHYSICS: i32 = 0;
    /// Vehicle controller, both pre- and post-physics.
    pub const VEHICLE: i32 = 0;
    /// Circuit race logic. Must run after the vehicle's post-physics update.
    pub const CIRCUIT: i32 = 10;
}

/// Timing information passed to every callback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Simulated seconds since the scheduler started.
    ///
    /// Accumulated in f64 so long sessions keep sub-millisecond resolution.
    pub elapsed: f64,
    /// Frame counter, starting at 1 for the first frame.
    pub frame: u64,
}

/// A per-frame callback over the shared context `C`.
pub type TickCallback<C> = Box<dyn FnMut(&mut C, FrameTime) -> Result<()>>;

/// Identifies a registered subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

struct Subscription<C> {
    handle: SubscriptionHandle,
    name: &'static str,
    phase: Phase,
    priority: i32,
    callback: TickCallback<C>,
}

/// Orders per-frame callbacks by phase and priority.
pub struct TickScheduler<C> {
    /// Kept sorted by `(priority, handle)`.
    subscriptions: Vec<Subscription<C>>,
    next_id: u64,
    elapsed: f64,
    frame: u64,
}

impl<C> Default for TickScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TickScheduler<C> {
    /// Create an empty scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Register a callback for `phase`.
    ///
    /// Lower priorities run first. Callbacks with equal priority run in the
    /// order they were registered.
    pub fn register<F>(
        &mut self,
        name: &'static str,
        phase: Phase,
        priority: i32,
        callback: F,
    ) -> SubscriptionHandle
    where
        F: FnMut(&mut C, FrameTime) -> Result<()> + 'static,
    {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;

        // Handles grow monotonically, so inserting after every equal priority
        // keeps registration order among ties.
        let index = self
            .subscriptions
            .partition_point(|s| s.priority <= priority);
        self.subscriptions.insert(
            index,
            Subscription {
                handle,
                name,
                phase,
                priority,
                callback: Box::new(callback),
            },
        );
        handle
    }

    /// Remove a subscription. Returns `false` if the handle was not registered.
    pub fn unregister(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.handle != handle);
        self.subscriptions.len() != before
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Simulated seconds accumulated by [`TickScheduler::run_frame`].
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Run every subscription registered for `phase`.
    ///
    /// A failing callback is logged and skipped; the remaining subscriptions
    /// for the phase still run. Returns the number of callbacks that failed.
    pub fn dispatch(&mut self, phase: Phase, context: &mut C, time: FrameTime) -> usize {
        let mut failures = 0;
        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.phase == phase)
        {
            trace!(name = subscription.name, ?phase, "tick");
            if let Err(e) = (subscription.callback)(context, time) {
                failures += 1;
                error!(
                    name = subscription.name,
                    ?phase,
                    frame = time.frame,
                    "tick callback failed: {e}"
                );
            }
        }
        failures
    }

    /// Advance the clock by `delta` and dispatch all four phases in order.
    ///
    /// The delta is forwarded to callbacks unchanged, so subsystems can skip
    /// degenerate frames themselves; only non-negative finite deltas advance
    /// the elapsed clock.
    pub fn run_frame(&mut self, context: &mut C, delta: f32) -> FrameTime {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += f64::from(delta);
        }
        self.frame += 1;

        let time = FrameTime {
            delta,
            elapsed: self.elapsed,
            frame: self.frame,
        };
        for phase in Phase::ALL {
            self.dispatch(phase, context, time);
        }
        time
    }
}
