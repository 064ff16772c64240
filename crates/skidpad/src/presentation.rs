//! Presentation notifications.
//!
//! The core pushes display updates through [`Presentation`]; every method has
//! a no-op default so collaborators only implement what they show.

use crate::circuit::RaceResult;
use crate::circuit::timer::TimerDigits;

/// Receiver for HUD and race visuals.
pub trait Presentation {
    /// New timer digits for a running or finished race.
    fn set_timer_digits(&mut self, _digits: TimerDigits) {}

    /// Show or hide the race timer.
    fn set_timer_visible(&mut self, _visible: bool) {}

    /// Replace the countdown text.
    fn set_countdown_text(&mut self, _text: &str) {}

    /// Show or hide the countdown text.
    fn set_countdown_visible(&mut self, _visible: bool) {}

    /// Show the result of a finished race.
    fn show_result(&mut self, _result: &RaceResult) {}

    /// Hide the race result.
    fn hide_result(&mut self) {}

    /// A checkpoint became the active target.
    fn checkpoint_targeted(&mut self, _index: usize) {}

    /// The active target was reached.
    fn checkpoint_reached(&mut self, _index: usize) {}
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresentation;

impl Presentation for NullPresentation {}

/// A single presentation notification.
#[derive(Clone, Debug, PartialEq)]
pub enum PresentationEvent {
    TimerDigits(TimerDigits),
    TimerVisible(bool),
    CountdownText(String),
    CountdownVisible(bool),
    ShowResult(RaceResult),
    HideResult,
    CheckpointTargeted(usize),
    CheckpointReached(usize),
}

/// Records notifications in order, for tests and headless runs.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresentation {
    /// Every notification received so far.
    pub events: Vec<PresentationEvent>,
}

impl RecordingPresentation {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Countdown texts received so far, in order.
    #[must_use]
    pub fn countdown_texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresentationEvent::CountdownText(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded notifications.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Presentation for RecordingPresentation {
    fn set_timer_digits(&mut self, digits: TimerDigits) {
        self.events.push(PresentationEvent::TimerDigits(digits));
    }

    fn set_timer_visible(&mut self, visible: bool) {
        self.events.push(PresentationEvent::TimerVisible(visible));
    }

    fn set_countdown_text(&mut self, text: &str) {
        self.events
            .push(PresentationEvent::CountdownText(text.to_owned()));
    }

    fn set_countdown_visible(&mut self, visible: bool) {
        self.events.push(PresentationEvent::CountdownVisible(visible));
    }

    fn show_result(&mut self, result: &RaceResult) {
        self.events.push(PresentationEvent::ShowResult(*result));
    }

    fn hide_result(&mut self) {
        self.events.push(PresentationEvent::HideResult);
    }

    fn checkpoint_targeted(&mut self, index: usize) {
        self.events.push(PresentationEvent::CheckpointTargeted(index));
    }

    fn checkpoint_reached(&mut self, index: usize) {
        self.events.push(PresentationEvent::CheckpointReached(index));
    }
}
