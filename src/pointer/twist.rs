//! Wrist roll around the pointing axis
//!
//! Compares the hand's "up" (root → index knuckle) with world up, both
//! projected onto the plane perpendicular to the pointing direction. The
//! signed angle between them, measured about the pointing axis, is the twist.

use nalgebra::Vector3;

/// Vectors shorter than this have no usable direction
const MIN_LENGTH: f32 = 1e-6;

/// Component of `v` perpendicular to `axis`
fn reject(v: &Vector3<f32>, axis: &Vector3<f32>) -> Vector3<f32> {
    let len_sq = axis.norm_squared();
    if len_sq < MIN_LENGTH * MIN_LENGTH {
        return *v;
    }
    v - axis * (v.dot(axis) / len_sq)
}

/// Signed angle in degrees from `from` to `to`, sign taken about `axis`.
///
/// Returns 0 when either vector is degenerate.
pub fn signed_angle(from: &Vector3<f32>, to: &Vector3<f32>, axis: &Vector3<f32>) -> f32 {
    if from.norm() < MIN_LENGTH || to.norm() < MIN_LENGTH {
        return 0.0;
    }
    if axis.norm() < MIN_LENGTH {
        return from.angle(to).to_degrees();
    }
    let sin = from.cross(to).dot(&axis.normalize());
    let cos = from.dot(to);
    sin.atan2(cos).to_degrees()
}

/// Twist of the hand about `pointing` in degrees.
///
/// Zero when the index knuckle is straight "up" relative to the pointing
/// direction; `reverse` flips the sign (mirror for the other hand).
pub fn twist_angle(pointing: &Vector3<f32>, hand_up: &Vector3<f32>, reverse: bool) -> f32 {
    let hand_plane = reject(hand_up, pointing);
    let world_plane = reject(&Vector3::y(), pointing);
    let twist = signed_angle(&hand_plane, &world_plane, pointing);
    if reverse {
        -twist
    } else {
        twist
    }
}
