//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod config;
mod console;
mod hand_joints;
mod interactables;
mod raycaster;

pub use config::{configure_pointer, get_pointer_config};

pub(crate) use console::init_logging;

pub use hand_joints::{
    // WASM entry points
    apply_hand_joints,
    get_pointer,
    get_pointer_flags,
    get_pointer_hit,
    get_debug_sphere,
    get_pointer_recovery,
    reset_pointer,
    // Wire layout
    SKELETON_FLOATS,
    SKELETON_WITH_ROTATION_FLOATS,
    POINTER_FLOATS,
};

pub use interactables::{
    register_interactable,
    remove_interactable,
    set_interactable_position,
    release_interactable,
    step_interactables,
    RECORD_FLOATS,
};

pub use raycaster::{set_raycaster, clear_raycaster, HIT_FLOATS};
