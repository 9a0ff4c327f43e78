//! Interaction module - objects reacting to a pointer
//!
//! Re-exports only. All logic in submodules.

mod controller;
mod modes;
mod orientation;
mod sticky;

pub use controller::{
    InteractableBinding, InteractionController, InteractionEvent, InteractionHandler,
    InteractionUpdate, Pose,
};
pub use modes::{ActivationMode, MotionMode, OrientationMode, OrientationSource, TrackingSpeed};
pub use orientation::{look_rotation, resolve_orientation, surface_rotation};
pub use sticky::StickyFollower;
