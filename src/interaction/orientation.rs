//! Orientation resolution for following objects
//!
//! Convention: an object's forward is local +Z and its up is local +Y.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use super::modes::OrientationMode;

/// Rotation whose forward (+Z) points along `direction` with no roll.
///
/// `None` for a zero direction. Straight up/down uses +Z as the up hint.
pub fn look_rotation(direction: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    let dir = Unit::try_new(*direction, 1e-9)?;
    let up = if dir.cross(&Vector3::y()).norm() < 1e-6 {
        Vector3::z()
    } else {
        Vector3::y()
    };
    Some(UnitQuaternion::face_towards(&dir, &up))
}

/// Source rotation when orienting to a surface: face along the normal,
/// rolled by the hand twist (degrees).
pub fn surface_rotation(normal: &Unit<Vector3<f32>>, twist_degrees: f32) -> UnitQuaternion<f32> {
    let look = look_rotation(normal).unwrap_or_else(UnitQuaternion::identity);
    UnitQuaternion::from_axis_angle(normal, twist_degrees.to_radians()) * look
}

/// Fixed offset applied after the source rotation by the `Free*` modes
fn free_offset(mode: OrientationMode) -> Option<UnitQuaternion<f32>> {
    let quarter = std::f32::consts::FRAC_PI_2;
    let (axis, angle) = match mode {
        OrientationMode::Free => return Some(UnitQuaternion::identity()),
        OrientationMode::Free90Left => (Vector3::y_axis(), quarter),
        OrientationMode::Free90Right => (Vector3::y_axis(), -quarter),
        OrientationMode::FreeTwist90Right => (Vector3::z_axis(), quarter),
        OrientationMode::FreeTwist90Left => (Vector3::z_axis(), -quarter),
        OrientationMode::Free90Up => (Vector3::x_axis(), quarter),
        OrientationMode::Free90Down => (Vector3::x_axis(), -quarter),
        OrientationMode::KeepHeading | OrientationMode::Horizontal | OrientationMode::TwoAxis => {
            return None
        }
    };
    Some(UnitQuaternion::from_axis_angle(&axis, angle))
}

/// New rotation for an object, or `None` to leave it unchanged.
pub fn resolve_orientation(
    mode: OrientationMode,
    direction: &Vector3<f32>,
    source: &UnitQuaternion<f32>,
) -> Option<UnitQuaternion<f32>> {
    match mode {
        OrientationMode::KeepHeading => None,
        OrientationMode::Horizontal => {
            if direction.x.abs() < 1e-9 && direction.z.abs() < 1e-9 {
                return None;
            }
            let yaw = direction.x.atan2(direction.z);
            Some(UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw))
        }
        OrientationMode::TwoAxis => look_rotation(direction),
        _ => free_offset(mode).map(|offset| source * offset),
    }
}
