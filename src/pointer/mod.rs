//! Pointer module - sphere fit, range mapping, smoothing and selection
//!
//! Re-exports only. All logic in submodules.

mod config;
mod error;
mod filter;
mod joints;
mod pipeline;
mod range;
mod selection;
mod sphere_fit;
mod twist;
mod world;

pub use config::PointerConfig;
pub use error::{ConfigError, PointerError};
pub use filter::{MeasurementOrder, VectorFilter, DEFAULT_P, DEFAULT_Q, DEFAULT_R};
pub use joints::{
    Hand, HandFrame, HandJoint, RootAnchor, SampleSet, JOINT_COUNT, MIN_SAMPLES, ROOT_WEIGHTS,
    SAMPLED_JOINTS,
};
pub use pipeline::{Pointer, PointerPipeline};
pub use range::{RangeMapper, DEFAULT_FAR, DEFAULT_NEAR};
pub use selection::{
    SelectionEdge, SelectionState, SelectionStateMachine, DEFAULT_RELEASE_DEPTH,
    DEFAULT_SELECT_DEPTH,
};
pub use sphere_fit::{SphereFit, SphereFitSolver};
pub use twist::{signed_angle, twist_angle};
pub use world::{Aabb, AabbScene, Containment, NoHits, ObjectId, Ray, RayHit, RayIntersector};
