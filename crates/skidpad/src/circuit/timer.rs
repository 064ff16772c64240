//! Race timer, display digits and the start countdown.

use std::fmt;

/// Text shown on the final countdown step.
pub const GO_TEXT: &str = "GO!";

/// Elapsed race time split for display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerDigits {
    pub minutes: u32,
    pub seconds: u32,
    pub milliseconds: u32,
}

impl TimerDigits {
    /// Split `t` seconds into minutes, seconds and milliseconds.
    ///
    /// Negative and non-finite times display as zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn from_seconds(t: f32) -> Self {
        let t = if t.is_finite() { f64::from(t.max(0.0)) } else { 0.0 };
        Self {
            minutes: (t / 60.0).floor() as u32,
            seconds: (t % 60.0).floor() as u32,
            milliseconds: ((t * 1000.0) % 1000.0).floor() as u32,
        }
    }
}

impl fmt::Display for TimerDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}.{:03}",
            self.minutes, self.seconds, self.milliseconds
        )
    }
}

/// Start/stop race clock over simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RaceTimer {
    start: Option<f64>,
    end: Option<f64>,
}

impl RaceTimer {
    /// Start counting from `at`, clearing any previous stop.
    pub fn start(&mut self, at: f64) {
        self.start = Some(at);
        self.end = None;
    }

    /// Freeze the clock at `at`. No-op unless running.
    pub fn stop(&mut self, at: f64) {
        if self.is_running() {
            self.end = Some(at);
        }
    }

    /// Forget both start and stop.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the clock is counting.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.start.is_some() && self.end.is_none()
    }

    /// Seconds on the clock as of `now`.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f32 {
        let seconds = match (self.start, self.end) {
            (Some(start), None) => (now - start).max(0.0),
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        };
        seconds as f32
    }
}

/// One due step of a [`Countdown`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CountdownStep {
    /// Show a remaining count.
    Count(u32),
    /// The race starts at the scheduled instant `at`.
    Go {
        /// Exact scheduled time of the step.
        at: f64,
    },
    /// Hide the countdown text.
    Hide,
}

/// Deferred countdown sequence: `steps - 1` counts, a go step, then a hide
/// step, one per interval after the start time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    started_at: f64,
    interval: f32,
    steps: u32,
    /// Number of steps already delivered.
    delivered: u32,
}

impl Countdown {
    /// Schedule a countdown starting at `started_at`.
    #[must_use]
    pub fn new(started_at: f64, interval: f32, steps: u32) -> Self {
        Self {
            started_at,
            interval,
            steps: steps.max(1),
            delivered: 0,
        }
    }

    /// Scheduled time of the go step.
    #[must_use]
    pub fn go_time(&self) -> f64 {
        self.due(self.steps)
    }

    /// Whether every step, including the hide, has been delivered.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.delivered > self.steps
    }

    /// Return the next step if it is due at `now`. Call repeatedly to drain
    /// several steps that fell due in one frame.
    pub fn poll(&mut self, now: f64) -> Option<CountdownStep> {
        if self.is_finished() {
            return None;
        }
        let step = self.delivered + 1;
        let due = self.due(step);
        if now < due {
            return None;
        }
        self.delivered = step;

        Some(if step < self.steps {
            CountdownStep::Count(self.steps - step)
        } else if step == self.steps {
            CountdownStep::Go { at: due }
        } else {
            CountdownStep::Hide
        })
    }

    fn due(&self, step: u32) -> f64 {
        self.started_at + f64::from(self.interval) * f64::from(step)
    }
}
