//! Interactable objects registered from JS
//!
//! Each object has a JSON binding and a box. The boxes double as the ray
//! scene when no JS raycaster is installed.

use nalgebra::{Point3, Vector3};
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use super::hand_joints::current_pointer;
use crate::interaction::{
    InteractableBinding, InteractionController, InteractionEvent, InteractionUpdate, Pose,
};
use crate::pointer::{Aabb, AabbScene, ConfigError, Hand, ObjectId, Pointer};

/// `[id, event, moved, px,py,pz, qx,qy,qz,qw, collision]`
///
/// event: 0 none, 1 selected, 2 deselected.
/// collision: -1 unchanged, 0 disabled, 1 enabled.
pub const RECORD_FLOATS: usize = 11;

fn encode(object: ObjectId, update: &InteractionUpdate, pose: &Pose) -> [f32; RECORD_FLOATS] {
    let event = match update.event {
        None => 0.0,
        Some(InteractionEvent::Selected) => 1.0,
        Some(InteractionEvent::Deselected) => 2.0,
    };
    let collision = match update.collision_enabled {
        None => -1.0,
        Some(false) => 0.0,
        Some(true) => 1.0,
    };
    let q = pose.rotation.coords;
    [
        object as f32,
        event,
        update.pose.is_some() as u8 as f32,
        pose.position.x,
        pose.position.y,
        pose.position.z,
        q.x,
        q.y,
        q.z,
        q.w,
        collision,
    ]
}

// ============================================================================
// REGISTRY
// ============================================================================

struct Entry {
    controller: InteractionController,
    half_extents: Vector3<f32>,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    scene: AabbScene,
}

impl Registry {
    /// Add or replace the object with `binding.object`
    fn register(&mut self, binding: InteractableBinding, center: Point3<f32>, half_extents: Vector3<f32>) {
        let id = binding.object;
        self.remove(id);
        self.scene.insert(id, Aabb::from_center(center, half_extents));
        self.entries.push(Entry {
            controller: InteractionController::new(binding, Pose::new(center)),
            half_extents,
        });
    }

    fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.controller.object() != id);
        self.scene.remove(id);
        self.entries.len() != before
    }

    fn entry_mut(&mut self, id: ObjectId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.controller.object() == id)
    }

    /// Host moved the object itself
    fn set_position(&mut self, id: ObjectId, center: Point3<f32>) -> bool {
        let Some(entry) = self.entry_mut(id) else {
            return false;
        };
        let rotation = entry.controller.pose().rotation;
        entry.controller.set_pose(Pose {
            position: center,
            rotation,
        });
        let bounds = Aabb::from_center(center, entry.half_extents);
        self.scene.insert(id, bounds);
        true
    }

    fn release(&mut self, id: ObjectId) -> Option<InteractionEvent> {
        let event = self.entry_mut(id)?.controller.release();
        self.scene.set_collidable(id, true);
        event
    }

    /// Run every controller against one pointer; one record per object
    fn step(&mut self, pointer: &Pointer) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.entries.len() * RECORD_FLOATS);
        for entry in &mut self.entries {
            let id = entry.controller.object();
            let bounds = Aabb::from_center(entry.controller.pose().position, entry.half_extents);
            let update = entry.controller.update(pointer, &bounds);

            let pose = *entry.controller.pose();
            if update.pose.is_some() {
                self.scene.insert(id, Aabb::from_center(pose.position, entry.half_extents));
            }
            if let Some(collidable) = update.collision_enabled {
                self.scene.set_collidable(id, collidable);
            }
            out.extend_from_slice(&encode(id, &update, &pose));
        }
        out
    }
}

thread_local! {
    static INTERACTABLES: RefCell<Registry> = RefCell::new(Registry::default());
}

pub(super) fn with_scene<R>(f: impl FnOnce(&AabbScene) -> R) -> R {
    INTERACTABLES.with(|cell| f(&cell.borrow().scene))
}

// ============================================================================
// WASM API
// ============================================================================

/// Register (or replace) an object from a JSON binding, e.g.
/// `{"object": 3, "activation": "Toggle", "motion": {"Offset": {"distance": 0.4}}}`
#[wasm_bindgen]
pub fn register_interactable(
    binding_json: &str,
    cx: f32,
    cy: f32,
    cz: f32,
    hx: f32,
    hy: f32,
    hz: f32,
) -> Result<(), JsValue> {
    let binding: InteractableBinding = serde_json::from_str(binding_json).map_err(ConfigError::from)?;
    if !(hx > 0.0 && hy > 0.0 && hz > 0.0) {
        return Err(ConfigError::NonPositive("half_extents").into());
    }
    let id = binding.object;
    INTERACTABLES.with(|cell| {
        cell.borrow_mut()
            .register(binding, Point3::new(cx, cy, cz), Vector3::new(hx, hy, hz))
    });
    web_sys::console::log_1(&format!("interactable {} registered", id).into());
    Ok(())
}

#[wasm_bindgen]
pub fn remove_interactable(id: ObjectId) -> bool {
    INTERACTABLES.with(|cell| cell.borrow_mut().remove(id))
}

#[wasm_bindgen]
pub fn set_interactable_position(id: ObjectId, x: f32, y: f32, z: f32) -> bool {
    INTERACTABLES.with(|cell| cell.borrow_mut().set_position(id, Point3::new(x, y, z)))
}

/// Drop an object without waiting for the pointer. True when it was following.
#[wasm_bindgen]
pub fn release_interactable(id: ObjectId) -> bool {
    INTERACTABLES.with(|cell| cell.borrow_mut().release(id).is_some())
}

/// Advance all interactables with one hand's latest pointer. Returns
/// [`RECORD_FLOATS`] floats per object, empty before the hand's first frame.
#[wasm_bindgen]
pub fn step_interactables(hand: usize) -> Result<Vec<f32>, JsValue> {
    let hand = Hand::from_index(hand)?;
    let Some(pointer) = current_pointer(hand) else {
        return Ok(Vec::new());
    };
    Ok(INTERACTABLES.with(|cell| cell.borrow_mut().step(&pointer)))
}
