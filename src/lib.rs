//! Sphere Pointer Web - hand-tracked far-field pointer
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - Re-exports of the native core API and the wasm_bindgen entry points

mod bridge;
mod interaction;
mod pointer;

use wasm_bindgen::prelude::*;

// Native core API
pub use interaction::{
    look_rotation, resolve_orientation, surface_rotation, ActivationMode, InteractableBinding,
    InteractionController, InteractionEvent, InteractionHandler, InteractionUpdate, MotionMode,
    OrientationMode, OrientationSource, Pose, StickyFollower, TrackingSpeed,
};
pub use pointer::{
    signed_angle, twist_angle, Aabb, AabbScene, ConfigError, Containment, Hand, HandFrame,
    HandJoint, MeasurementOrder, NoHits, ObjectId, Pointer, PointerConfig, PointerError,
    PointerPipeline, RangeMapper, Ray, RayHit, RayIntersector, RootAnchor, SampleSet,
    SelectionEdge, SelectionState, SelectionStateMachine, SphereFit, SphereFitSolver,
    VectorFilter, DEFAULT_FAR, DEFAULT_NEAR, DEFAULT_P, DEFAULT_Q, DEFAULT_R,
    DEFAULT_RELEASE_DEPTH, DEFAULT_SELECT_DEPTH, JOINT_COUNT, MIN_SAMPLES, ROOT_WEIGHTS,
    SAMPLED_JOINTS,
};

// Re-export wasm_bindgen functions for JS access
pub use bridge::{
    apply_hand_joints, clear_raycaster, configure_pointer, get_debug_sphere, get_pointer,
    get_pointer_config, get_pointer_flags, get_pointer_hit, get_pointer_recovery,
    register_interactable, release_interactable, remove_interactable, reset_pointer,
    set_interactable_position, set_raycaster, step_interactables, HIT_FLOATS, POINTER_FLOATS,
    RECORD_FLOATS, SKELETON_FLOATS, SKELETON_WITH_ROTATION_FLOATS,
};

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    bridge::init_logging();
    console_log!(
        "sphere pointer ready: {} floats per hand frame, {} per interactable record",
        SKELETON_FLOATS,
        RECORD_FLOATS
    );
}
