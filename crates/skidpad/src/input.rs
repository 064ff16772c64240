//! Named input actions.
//!
//! Device decoding (keyboard, gamepad, touch) happens elsewhere; the core only
//! consumes a read-only view of named boolean actions with edge detection.

/// Number of distinct [`Action`]s.
pub const ACTION_COUNT: usize = 9;

/// Gameplay actions consumed by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Drive forward.
    Forward,
    /// Drive backward.
    Backward,
    /// Steer left.
    Left,
    /// Steer right.
    Right,
    /// Multiply engine force.
    Boost,
    /// Hold the brakes and halve engine force.
    Brake,
    /// Hop (edge-triggered).
    Jump,
    /// Teleport back to the spawn point (edge-triggered).
    Reset,
    /// Start or restart a race (edge-triggered).
    StartRace,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Forward,
        Action::Backward,
        Action::Left,
        Action::Right,
        Action::Boost,
        Action::Brake,
        Action::Jump,
        Action::Reset,
        Action::StartRace,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Read-only view of the current input state.
pub trait InputActionMap {
    /// Whether the action is currently held.
    fn is_held(&self, action: Action) -> bool;

    /// Whether the action became held this frame.
    fn just_pressed(&self, action: Action) -> bool;
}

/// A plain per-frame action buffer.
///
/// Call [`ActionSnapshot::begin_frame`] once per frame before writing the new
/// levels; edges are derived from the previous frame's levels.
#[derive(Clone, Debug, Default)]
pub struct ActionSnapshot {
    held: [bool; ACTION_COUNT],
    previous: [bool; ACTION_COUNT],
}

impl ActionSnapshot {
    /// Create a snapshot with every action released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the current levels so the next writes produce edges.
    pub fn begin_frame(&mut self) {
        self.previous = self.held;
    }

    /// Set the level of an action for this frame.
    pub fn set(&mut self, action: Action, held: bool) {
        self.held[action.index()] = held;
    }

    /// Hold an action.
    pub fn press(&mut self, action: Action) {
        self.set(action, true);
    }

    /// Release an action.
    pub fn release(&mut self, action: Action) {
        self.set(action, false);
    }

    /// Release every action.
    pub fn clear(&mut self) {
        self.held = [false; ACTION_COUNT];
    }
}

impl InputActionMap for ActionSnapshot {
    fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    fn just_pressed(&self, action: Action) -> bool {
        self.held[action.index()] && !self.previous[action.index()]
    }
}
