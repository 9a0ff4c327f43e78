//! Interfaces to the scene the pointer lives in
//!
//! The pointer core never owns geometry. It asks a [`RayIntersector`] for
//! the first hit along its ray and asks interactables whether they contain a
//! point through [`Containment`]. [`AabbScene`] is a small box-only
//! implementation for tests and hosts without a physics engine.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Identifier of a hittable object, assigned by the host
pub type ObjectId = u32;

/// A ray with a unit direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    /// `None` when `direction` has no length
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        Unit::try_new(direction, 1e-9).map(|direction| Self { origin, direction })
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }
}

/// First surface hit along a ray
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
    pub object: ObjectId,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Segment intersection service (physics raycast or equivalent)
pub trait RayIntersector {
    /// First hit along `ray` no further than `max_distance`
    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;
}

/// Scene with nothing to hit
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHits;

impl RayIntersector for NoHits {
    fn intersect(&self, _ray: &Ray, _max_distance: f32) -> Option<RayHit> {
        None
    }
}

/// Point containment test for an interactable's bounds
pub trait Containment {
    fn contains(&self, point: &Point3<f32>) -> bool;
}

// ============================================================================
// AXIS-ALIGNED BOXES
// ============================================================================

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self {
            min: min.inf(&max),
            max: min.sup(&max),
        }
    }

    pub fn from_center(center: Point3<f32>, half_extents: Vector3<f32>) -> Self {
        let half = half_extents.abs();
        Self::new(center - half, center + half)
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Move the box so its center sits at `center`
    pub fn recentered(&self, center: Point3<f32>) -> Self {
        let half = (self.max - self.min) * 0.5;
        Self::new(center - half, center + half)
    }

    /// Slab test. Returns the entry distance and the outward face normal.
    ///
    /// A ray starting inside reports distance 0 with the normal of the face
    /// it exits through.
    pub fn ray_intersection(&self, ray: &Ray, max_distance: f32) -> Option<(f32, Unit<Vector3<f32>>)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_axis = 0;
        let mut far_axis = 0;
        let dir = ray.direction.into_inner();

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = dir[axis];
            if d.abs() < 1e-12 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_near {
                t_near = t0;
                near_axis = axis;
            }
            if t1 < t_far {
                t_far = t1;
                far_axis = axis;
            }
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 {
            return None;
        }
        let (t, axis, sign) = if t_near >= 0.0 {
            (t_near, near_axis, -dir[near_axis].signum())
        } else {
            (0.0, far_axis, dir[far_axis].signum())
        };
        if t > max_distance {
            return None;
        }
        let mut normal = Vector3::zeros();
        normal[axis] = sign;
        Some((t, Unit::new_unchecked(normal)))
    }
}

impl Containment for Aabb {
    fn contains(&self, point: &Point3<f32>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

/// Box-only scene answering ray queries by brute force
#[derive(Clone, Debug, Default)]
pub struct AabbScene {
    objects: Vec<(ObjectId, Aabb, bool)>,
}

impl AabbScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an object's box
    pub fn insert(&mut self, id: ObjectId, bounds: Aabb) {
        match self.objects.iter_mut().find(|(oid, _, _)| *oid == id) {
            Some(entry) => entry.1 = bounds,
            None => self.objects.push((id, bounds, true)),
        }
    }

    pub fn remove(&mut self, id: ObjectId) {
        self.objects.retain(|(oid, _, _)| *oid != id);
    }

    pub fn bounds(&self, id: ObjectId) -> Option<&Aabb> {
        self.objects.iter().find(|(oid, _, _)| *oid == id).map(|(_, b, _)| b)
    }

    /// Exclude or re-include an object from ray queries
    pub fn set_collidable(&mut self, id: ObjectId, collidable: bool) {
        if let Some(entry) = self.objects.iter_mut().find(|(oid, _, _)| *oid == id) {
            entry.2 = collidable;
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl RayIntersector for AabbScene {
    fn intersect(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.objects
            .iter()
            .filter(|(_, _, collidable)| *collidable)
            .filter_map(|(id, bounds, _)| {
                bounds
                    .ray_intersection(ray, max_distance)
                    .map(|(t, normal)| RayHit {
                        point: ray.at(t),
                        normal,
                        object: *id,
                        distance: t,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
