//! Ray queries answered by a JS callback
//!
//! The host installs `fn(ox, oy, oz, dx, dy, dz, maxDistance)` returning
//! `null` or `[px, py, pz, nx, ny, nz, id]`. Without one, rays are tested
//! against the registered interactable boxes.

use nalgebra::{Point3, Unit, Vector3};
use wasm_bindgen::prelude::*;

use super::hand_joints::set_hand_raycaster;
use crate::pointer::{Hand, ObjectId, Ray, RayHit, RayIntersector};

pub const HIT_FLOATS: usize = 7;

pub(super) struct JsRayIntersector {
    callback: js_sys::Function,
}

impl JsRayIntersector {
    pub(super) fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

/// Decode a hit record. Rejects short records, zero normals and ids that
/// are not whole non-negative numbers.
pub(super) fn parse_hit(values: &[f64], ray: &Ray) -> Option<RayHit> {
    if values.len() < HIT_FLOATS || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let point = Point3::new(values[0] as f32, values[1] as f32, values[2] as f32);
    let normal = Unit::try_new(
        Vector3::new(values[3] as f32, values[4] as f32, values[5] as f32),
        1e-9,
    )?;
    let id = values[6];
    if id < 0.0 || id.fract() != 0.0 || id > ObjectId::MAX as f64 {
        return None;
    }
    Some(RayHit {
        point,
        normal,
        object: id as ObjectId,
        distance: (point - ray.origin).norm(),
    })
}

impl RayIntersector for JsRayIntersector {
    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let args = js_sys::Array::new();
        for v in [
            ray.origin.x,
            ray.origin.y,
            ray.origin.z,
            ray.direction.x,
            ray.direction.y,
            ray.direction.z,
            max_distance,
        ] {
            args.push(&JsValue::from_f64(v as f64));
        }

        let result = match self.callback.apply(&JsValue::NULL, &args) {
            Ok(result) => result,
            Err(e) => {
                web_sys::console::warn_2(&"raycaster threw:".into(), &e);
                return None;
            }
        };
        if result.is_null() || result.is_undefined() {
            return None;
        }
        if !js_sys::Array::is_array(&result) {
            web_sys::console::warn_1(&"raycaster must return null or an array".into());
            return None;
        }
        let values: Vec<f64> = js_sys::Array::from(&result)
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect();
        let hit = parse_hit(&values, ray);
        if hit.is_none() {
            web_sys::console::warn_1(&format!("malformed raycaster hit: {:?}", values).into());
        }
        hit
    }
}

// ============================================================================
// WASM API
// ============================================================================

/// Install the hand's ray query. It runs while the hand is mid-update, so
/// the callback must not call back into this module's per-hand functions
/// (`get_pointer`, `configure_pointer`, ...). Those calls are refused with
/// a console warning or an error instead of reading half-updated state.
#[wasm_bindgen]
pub fn set_raycaster(hand: usize, callback: js_sys::Function) -> Result<(), JsValue> {
    let hand = Hand::from_index(hand)?;
    set_hand_raycaster(hand, Some(JsRayIntersector::new(callback)))?;
    web_sys::console::log_1(&format!("raycaster installed for {} hand", hand.as_str()).into());
    Ok(())
}

/// Go back to testing rays against registered interactables
#[wasm_bindgen]
pub fn clear_raycaster(hand: usize) -> Result<(), JsValue> {
    let hand = Hand::from_index(hand)?;
    set_hand_raycaster(hand, None)?;
    Ok(())
}
