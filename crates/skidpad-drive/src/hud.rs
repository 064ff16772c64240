//! A text HUD: presentation updates become log lines.

use skidpad::{Presentation, RaceResult, TimerDigits};
use tracing::{debug, info};

/// Logs race notifications and remembers the last timer digits.
#[derive(Clone, Debug, Default)]
pub struct LogHud {
    digits: TimerDigits,
    checkpoints_reached: usize,
}

impl LogHud {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint notifications received over the whole run.
    #[must_use]
    pub fn checkpoints_reached(&self) -> usize {
        self.checkpoints_reached
    }
}

impl Presentation for LogHud {
    fn set_timer_digits(&mut self, digits: TimerDigits) {
        self.digits = digits;
    }

    fn set_countdown_text(&mut self, text: &str) {
        info!("{text}");
    }

    fn show_result(&mut self, result: &RaceResult) {
        info!(
            time = %result.digits,
            gates = result.reached,
            "race finished"
        );
    }

    fn checkpoint_targeted(&mut self, index: usize) {
        debug!(index, "next checkpoint");
    }

    fn checkpoint_reached(&mut self, index: usize) {
        self.checkpoints_reached += 1;
        info!(index, split = %self.digits, "checkpoint reached");
    }
}
