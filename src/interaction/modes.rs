//! Behaviour switches for an interactable object
//!
//! Each family is a closed enum resolved by exactly one function in the
//! controller / orientation modules.

use serde::{Deserialize, Serialize};

/// When an object starts and stops following the pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationMode {
    /// Follows from a click on the object until the click is released
    #[default]
    Drag,
    /// A click on the object picks it up, the next click anywhere drops it
    Toggle,
    /// Follows while targeted, no click needed
    Touch,
}

/// Where a following object moves to
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum MotionMode {
    /// Never moves; activation still fires (button-like objects)
    None,
    /// Goes to the pointer position
    #[default]
    Seek,
    /// Stays `distance` along the pointer ray from the hand
    Offset { distance: f32 },
    /// Lands on whatever surface the pointer ray hits
    SnapToCollider,
}

/// How quickly a following object catches up with its target.
///
/// Each speed is a fixed (process, measurement) variance pair for the
/// object's own filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
    VeryFast,
    /// No smoothing, the object jumps straight to its target
    None,
}

impl TrackingSpeed {
    /// (Q, R) for this speed.
    ///
    /// `None` uses R = 0, which makes the filter gain exactly 1: the object
    /// lands on its target every frame instead of sharing `VeryFast`'s
    /// near-pass-through R.
    pub fn variances(&self) -> (f32, f32) {
        match self {
            TrackingSpeed::Slow => (0.001, 0.6),
            TrackingSpeed::Medium => (0.001, 0.06),
            TrackingSpeed::Fast => (0.001, 0.005),
            TrackingSpeed::VeryFast => (0.001, 0.00001),
            TrackingSpeed::None => (0.001, 0.0),
        }
    }
}

/// How a following object's rotation changes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrientationMode {
    /// Rotation untouched
    #[default]
    KeepHeading,
    /// Yaw only, like a revolving door
    Horizontal,
    /// Faces the direction, no roll
    TwoAxis,
    /// Copies the source rotation
    Free,
    Free90Left,
    Free90Right,
    FreeTwist90Right,
    FreeTwist90Left,
    Free90Up,
    Free90Down,
}

/// What the orientation is derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrientationSource {
    /// Pointer → hand direction and the pointer's rotation
    #[default]
    Pointer,
    /// Normal of the surface the pointer ray hits
    SurfaceNormal,
}
