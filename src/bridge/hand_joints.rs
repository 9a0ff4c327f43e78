//! Hand joint input and per-hand pointer state
//!
//! JS pushes one tracked skeleton per hand per frame. Each hand owns an
//! independent pipeline and, optionally, a JS raycaster.

use nalgebra::{Point3, Quaternion, UnitQuaternion};
use std::cell::RefCell;
use std::fmt;
use wasm_bindgen::prelude::*;

use super::interactables::with_scene;
use super::raycaster::JsRayIntersector;
use crate::pointer::{Hand, HandFrame, Pointer, PointerPipeline, JOINT_COUNT};

// ============================================================================
// WIRE LAYOUT
// ============================================================================

/// 26 joints × xyz
pub const SKELETON_FLOATS: usize = JOINT_COUNT * 3;
/// Skeleton followed by the hand rotation quaternion (x, y, z, w)
pub const SKELETON_WITH_ROTATION_FLOATS: usize = SKELETON_FLOATS + 4;

/// `[px,py,pz, ox,oy,oz, dx,dy,dz, range, twist, qx,qy,qz,qw, depth]`
pub const POINTER_FLOATS: usize = 16;

pub(super) fn parse_skeleton(flat: &[f32]) -> Option<[Point3<f32>; JOINT_COUNT]> {
    if flat.len() < SKELETON_FLOATS {
        return None;
    }
    let mut skeleton = [Point3::origin(); JOINT_COUNT];
    for (joint, xyz) in skeleton.iter_mut().zip(flat.chunks_exact(3)) {
        *joint = Point3::new(xyz[0], xyz[1], xyz[2]);
    }
    Some(skeleton)
}

/// Identity when absent or not normalizable
pub(super) fn parse_rotation(flat: &[f32]) -> UnitQuaternion<f32> {
    match flat.get(SKELETON_FLOATS..SKELETON_WITH_ROTATION_FLOATS) {
        Some(&[x, y, z, w]) => {
            let q = Quaternion::new(w, x, y, z);
            if q.norm() > 1e-6 {
                UnitQuaternion::from_quaternion(q)
            } else {
                UnitQuaternion::identity()
            }
        }
        _ => UnitQuaternion::identity(),
    }
}

pub(super) fn pack_pointer(pointer: &Pointer) -> Vec<f32> {
    let p = pointer.position;
    let o = pointer.ray.origin;
    let d = pointer.ray.direction;
    let q = pointer.rotation.coords;
    vec![
        p.x, p.y, p.z,
        o.x, o.y, o.z,
        d.x, d.y, d.z,
        pointer.range,
        pointer.twist,
        q.x, q.y, q.z, q.w,
        pointer.depth,
    ]
}

// ============================================================================
// STATE
// ============================================================================

struct HandSlot {
    pipeline: PointerPipeline,
    raycaster: Option<JsRayIntersector>,
}

impl HandSlot {
    fn new(hand: Hand) -> Self {
        Self {
            pipeline: PointerPipeline::with_defaults(hand),
            raycaster: None,
        }
    }
}

thread_local! {
    static HANDS: RefCell<[HandSlot; 2]> =
        RefCell::new([HandSlot::new(Hand::Left), HandSlot::new(Hand::Right)]);
}

/// Hand state is already borrowed. Happens when a raycaster callback calls
/// back into this module while `apply_hand_joints` is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct HandsBusy;

impl fmt::Display for HandsBusy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hand state is busy: pointer calls are not allowed inside a raycaster callback")
    }
}

impl std::error::Error for HandsBusy {}

fn borrow_slots<R>(
    cell: &RefCell<[HandSlot; 2]>,
    f: impl FnOnce(&mut [HandSlot; 2]) -> R,
) -> Result<R, HandsBusy> {
    let mut slots = cell.try_borrow_mut().map_err(|_| HandsBusy)?;
    Ok(f(&mut slots))
}

fn with_slots<R>(f: impl FnOnce(&mut [HandSlot; 2]) -> R) -> Result<R, HandsBusy> {
    HANDS.with(|cell| borrow_slots(cell, f))
}

pub(super) fn with_pipeline<R>(
    hand: Hand,
    f: impl FnOnce(&mut PointerPipeline) -> R,
) -> Result<R, HandsBusy> {
    with_slots(|slots| f(&mut slots[hand.index()].pipeline))
}

pub(super) fn set_hand_raycaster(
    hand: Hand,
    raycaster: Option<JsRayIntersector>,
) -> Result<(), HandsBusy> {
    with_slots(|slots| slots[hand.index()].raycaster = raycaster)
}

/// Latest pointer of a hand, `None` before its first frame or while the
/// hand is mid-update
pub(super) fn current_pointer(hand: Hand) -> Option<Pointer> {
    let pointer = with_slots(|slots| {
        let pipeline = &slots[hand.index()].pipeline;
        (pipeline.frame_count() > 0).then(|| pipeline.pointer().clone())
    });
    match pointer {
        Ok(pointer) => pointer,
        Err(busy) => {
            web_sys::console::warn_1(&busy.to_string().into());
            None
        }
    }
}

fn hand_or_warn(hand: usize) -> Option<Hand> {
    match Hand::from_index(hand) {
        Ok(hand) => Some(hand),
        Err(e) => {
            web_sys::console::warn_1(&e.to_string().into());
            None
        }
    }
}

// ============================================================================
// WASM API
// ============================================================================

/// Called every frame with one hand's joints: 78 floats (26 joints × xyz),
/// optionally followed by the hand rotation as 4 floats (x, y, z, w).
#[wasm_bindgen]
pub fn apply_hand_joints(flat_data: &[f32], hand: usize) {
    let Some(hand) = hand_or_warn(hand) else {
        return;
    };
    if flat_data.len() != SKELETON_FLOATS && flat_data.len() != SKELETON_WITH_ROTATION_FLOATS {
        web_sys::console::warn_1(
            &format!(
                "Expected {} or {} joint floats, got {}",
                SKELETON_FLOATS,
                SKELETON_WITH_ROTATION_FLOATS,
                flat_data.len()
            )
            .into(),
        );
        return;
    }
    let Some(skeleton) = parse_skeleton(flat_data) else {
        return;
    };
    let rotation = parse_rotation(flat_data);

    let updated = with_slots(|slots| {
        let slot = &mut slots[hand.index()];
        let anchor = slot.pipeline.config().root_anchor;
        let frame = HandFrame::from_skeleton(&skeleton, anchor).with_rotation(rotation);
        match &slot.raycaster {
            Some(raycaster) => {
                slot.pipeline.update(&frame, raycaster);
            }
            None => with_scene(|scene| {
                slot.pipeline.update(&frame, scene);
            }),
        }
    });
    if let Err(busy) = updated {
        web_sys::console::warn_1(&busy.to_string().into());
    }
}

/// Pointer pose, see [`POINTER_FLOATS`]. Empty before the first frame.
#[wasm_bindgen]
pub fn get_pointer(hand: usize) -> Vec<f32> {
    hand_or_warn(hand)
        .and_then(current_pointer)
        .map(|pointer| pack_pointer(&pointer))
        .unwrap_or_default()
}

/// `[selected, just_pressed, just_released, has_hit]` as 0/1
#[wasm_bindgen]
pub fn get_pointer_flags(hand: usize) -> Vec<u8> {
    hand_or_warn(hand)
        .and_then(current_pointer)
        .map(|p| {
            vec![
                p.selected as u8,
                p.just_pressed as u8,
                p.just_released as u8,
                p.last_hit.is_some() as u8,
            ]
        })
        .unwrap_or_default()
}

/// `[px,py,pz, nx,ny,nz, id]` of the current ray hit, empty when none
#[wasm_bindgen]
pub fn get_pointer_hit(hand: usize) -> Vec<f32> {
    hand_or_warn(hand)
        .and_then(current_pointer)
        .and_then(|p| p.last_hit)
        .map(|hit| {
            vec![
                hit.point.x,
                hit.point.y,
                hit.point.z,
                hit.normal.x,
                hit.normal.y,
                hit.normal.z,
                hit.object as f32,
            ]
        })
        .unwrap_or_default()
}

/// `[cx,cy,cz, radius]` of the sphere used this frame, for debug drawing
#[wasm_bindgen]
pub fn get_debug_sphere(hand: usize) -> Vec<f32> {
    hand_or_warn(hand)
        .and_then(current_pointer)
        .and_then(|p| p.sphere)
        .map(|s| vec![s.center.x, s.center.y, s.center.z, s.radius])
        .unwrap_or_default()
}

/// Description of the error recovered from on the latest frame, if any
#[wasm_bindgen]
pub fn get_pointer_recovery(hand: usize) -> Option<String> {
    let hand = hand_or_warn(hand)?;
    match with_pipeline(hand, |pipeline| pipeline.last_recovery()) {
        Ok(recovery) => recovery.map(|e| e.to_string()),
        Err(busy) => {
            web_sys::console::warn_1(&busy.to_string().into());
            None
        }
    }
}

/// Forget the hand's history (filter, selection, last fit)
#[wasm_bindgen]
pub fn reset_pointer(hand: usize) {
    let Some(hand) = hand_or_warn(hand) else {
        return;
    };
    if let Err(busy) = with_pipeline(hand, |pipeline| pipeline.reset()) {
        web_sys::console::warn_1(&busy.to_string().into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_parse_skeleton_order() {
        let flat: Vec<f32> = (0..SKELETON_FLOATS).map(|i| i as f32).collect();
        let skeleton = parse_skeleton(&flat).unwrap();
        assert_eq!(skeleton[0], Point3::new(0.0, 1.0, 2.0));
        assert_eq!(skeleton[25], Point3::new(75.0, 76.0, 77.0));
        assert!(parse_skeleton(&flat[..10]).is_none());
    }

    #[test]
    fn test_parse_rotation() {
        let mut flat = vec![0.0; SKELETON_FLOATS];
        assert_eq!(parse_rotation(&flat), UnitQuaternion::identity());

        let half = std::f32::consts::FRAC_1_SQRT_2;
        flat.extend_from_slice(&[0.0, half, 0.0, half]);
        let rot = parse_rotation(&flat);
        // Quarter turn about +Y
        assert!((rot * Vector3::z() - Vector3::x()).norm() < 1e-5);

        flat[SKELETON_FLOATS..].copy_from_slice(&[0.0; 4]);
        assert_eq!(parse_rotation(&flat), UnitQuaternion::identity());
    }

    #[test]
    fn test_reentrant_borrow_is_refused() {
        let cell = RefCell::new([HandSlot::new(Hand::Left), HandSlot::new(Hand::Right)]);
        assert_eq!(borrow_slots(&cell, |slots| slots[1].pipeline.hand()), Ok(Hand::Right));

        let held = cell.borrow();
        assert_eq!(borrow_slots(&cell, |_| ()), Err(HandsBusy));
        drop(held);
        assert!(borrow_slots(&cell, |_| ()).is_ok());
    }

    #[test]
    fn test_pack_pointer_layout() {
        let pointer = Pointer {
            position: Point3::new(1.0, 2.0, 3.0),
            range: 4.0,
            twist: 5.0,
            depth: 6.0,
            ..Pointer::default()
        };
        let packed = pack_pointer(&pointer);
        assert_eq!(packed.len(), POINTER_FLOATS);
        assert_eq!(&packed[0..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&packed[6..9], &[0.0, 0.0, 1.0]);
        assert_eq!(packed[9], 4.0);
        assert_eq!(packed[10], 5.0);
        assert_eq!(&packed[11..15], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(packed[15], 6.0);
    }
}
