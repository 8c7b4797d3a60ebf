use serde::{Deserialize, Serialize};

use crate::keys::{DirectionKey, KeyState};

/// One timed entry of the autopilot script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutopilotStep {
    /// Keys held for the duration of this step.
    pub keys: Vec<DirectionKey>,
    /// Step length in seconds.
    pub duration: f64,
}

impl AutopilotStep {
    pub fn new(keys: &[DirectionKey], duration: f64) -> Self {
        Self {
            keys: keys.to_vec(),
            duration,
        }
    }

    fn span(&self) -> f64 {
        if self.duration.is_finite() {
            self.duration.max(0.0)
        } else {
            0.0
        }
    }
}

/// Default patrol: a rectangle traced clockwise.
pub fn default_sequence() -> Vec<AutopilotStep> {
    vec![
        AutopilotStep::new(&[DirectionKey::ArrowRight], 1.2),
        AutopilotStep::new(&[DirectionKey::ArrowDown], 1.0),
        AutopilotStep::new(&[DirectionKey::ArrowLeft], 1.2),
        AutopilotStep::new(&[DirectionKey::ArrowUp], 1.0),
    ]
}

/// Scripted key driver cycling through a fixed step sequence.
///
/// While enabled, exactly the keys of the current step are held.
#[derive(Clone, Debug, PartialEq)]
pub struct Autopilot {
    sequence: Vec<AutopilotStep>,
    index: usize,
    enabled: bool,
    /// Accumulated in f64 so per-frame deltas land exactly on step boundaries.
    elapsed: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(default_sequence())
    }
}

impl Autopilot {
    pub fn new(sequence: Vec<AutopilotStep>) -> Self {
        Self {
            sequence,
            index: 0,
            enabled: false,
            elapsed: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Seconds spent in the current step.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn sequence(&self) -> &[AutopilotStep] {
        &self.sequence
    }

    pub fn current_step(&self) -> Option<&AutopilotStep> {
        self.sequence.get(self.index)
    }

    /// Total length of one pass through the sequence.
    pub fn cycle_duration(&self) -> f64 {
        self.sequence.iter().map(AutopilotStep::span).sum()
    }

    /// Switch the autopilot on or off. Returns whether anything changed.
    ///
    /// Enabling restarts the script from step 0; disabling releases every
    /// directional key. An empty sequence cannot be enabled.
    pub fn set_enabled(&mut self, enabled: bool, keys: &mut KeyState) -> bool {
        if self.enabled == enabled {
            return false;
        }
        if enabled && self.sequence.is_empty() {
            return false;
        }

        self.enabled = enabled;
        if enabled {
            self.index = 0;
            self.elapsed = 0.0;
            self.apply(keys);
        } else {
            keys.release_all();
        }
        true
    }

    /// Advance the script clock by `delta` seconds and re-apply the keys of
    /// whichever step is now current.
    pub fn update(&mut self, delta: f64, keys: &mut KeyState) {
        if !self.enabled || self.sequence.is_empty() {
            return;
        }

        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }

        let cycle = self.cycle_duration();
        if cycle > 0.0 {
            // Whole cycles land back on the same step.
            if self.elapsed >= cycle {
                self.elapsed %= cycle;
            }
            while self.elapsed >= self.sequence[self.index].span() {
                self.elapsed -= self.sequence[self.index].span();
                self.index = (self.index + 1) % self.sequence.len();
            }
        }

        self.apply(keys);
    }

    fn apply(&self, keys: &mut KeyState) {
        if let Some(step) = self.current_step() {
            keys.hold_exclusive(&step.keys);
        }
    }
}
