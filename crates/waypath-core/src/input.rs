//! Per-frame input snapshots and edge detection.

use crate::vehicle::{ControlInput, SteerIntent, ThrottleIntent};

/// Everything the frame driver reads from the input collaborator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Driving intents.
    pub control: ControlInput,
    /// Level of the cycle-camera command (held = true).
    pub cycle_camera: bool,
}

impl InputSnapshot {
    /// Build a snapshot from raw key levels.
    #[must_use]
    pub fn from_keys(keys: KeyLevels) -> Self {
        Self {
            control: ControlInput {
                steer: SteerIntent::from_keys(keys.left, keys.right),
                throttle: ThrottleIntent::from_keys(keys.accelerate, keys.brake),
            },
            cycle_camera: keys.cycle_camera,
        }
    }
}

/// Raw pressed/released levels of the driving keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyLevels {
    pub accelerate: bool,
    pub brake: bool,
    pub left: bool,
    pub right: bool,
    pub cycle_camera: bool,
}

/// Input collaborator, sampled once per frame.
pub trait InputSource {
    /// Current input state.
    fn sample(&mut self) -> InputSnapshot;
}

impl InputSource for InputSnapshot {
    fn sample(&mut self) -> InputSnapshot {
        *self
    }
}

/// Turns a level signal into single rising-edge events.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeTrigger {
    previous: bool,
}

impl EdgeTrigger {
    /// Feed the current level; true only on the frame it goes high.
    pub fn rising(&mut self, level: bool) -> bool {
        let fired = level && !self.previous;
        self.previous = level;
        fired
    }
}
