//! Normalized frame samples, independent of any particular tracking SDK

use serde::{Deserialize, Serialize};

/// Position and orientation of a single tracked point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in meters (x, y, z)
    pub position: [f32; 3],
    /// Orientation quaternion (x, y, z, w)
    pub orientation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            // identity rotation
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Pose {
    pub fn new(position: [f32; 3], orientation: [f32; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// One hand controller: tracking flag, pose, and analog trigger
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Whether the controller was tracked this frame; when false the pose
    /// holds whatever the source last reported (or the default pose)
    pub tracked: bool,
    pub pose: Pose,
    /// Analog trigger value, nominally in [0, 1]; passed through unclamped
    pub trigger: f32,
}

/// Named boolean buttons captured alongside each frame.
///
/// The set of buttons is fixed at build time. Only `button_a` takes part in
/// the row and collector encodings; the others ride along for hosts that
/// inspect samples directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub button_a: bool,
    pub button_b: bool,
    pub menu_button: bool,
}

/// One normalized frame of motion telemetry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Producer-supplied seconds; expected monotonic within a session
    pub timestamp: f64,
    pub head: Pose,
    pub left: ControllerState,
    pub right: ControllerState,
    pub input: InputState,
}

impl Sample {
    /// Sample with default (untracked) state at the given timestamp.
    ///
    /// This is what a source adapter reports before its first real frame
    /// arrives.
    pub fn at(timestamp: f64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}
