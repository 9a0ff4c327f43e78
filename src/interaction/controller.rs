//! Per-object interaction controller
//!
//! Consumes one [`Pointer`] per frame and decides whether the object is
//! following the pointer, where it should be and how it should be turned.
//! Select / deselect fire exactly once per transition.

use nalgebra::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::modes::{ActivationMode, MotionMode, OrientationMode, OrientationSource, TrackingSpeed};
use super::orientation::{resolve_orientation, surface_rotation};
use crate::pointer::{Containment, ObjectId, Pointer, VectorFilter};

/// How one object reacts to a pointer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractableBinding {
    pub object: ObjectId,
    pub activation: ActivationMode,
    pub motion: MotionMode,
    pub tracking_speed: TrackingSpeed,
    pub orientation: OrientationMode,
    pub orientation_source: OrientationSource,
    /// Ray hits on this object count as targeting it even when the pointer
    /// sits behind it
    pub select_behind: bool,
    /// Surfaces a `SnapToCollider` object may land on. Empty means any.
    pub snap_targets: Vec<ObjectId>,
}

impl Default for InteractableBinding {
    fn default() -> Self {
        Self {
            object: 0,
            activation: ActivationMode::default(),
            motion: MotionMode::default(),
            tracking_speed: TrackingSpeed::default(),
            orientation: OrientationMode::default(),
            orientation_source: OrientationSource::default(),
            select_behind: true,
            snap_targets: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Pose {
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionEvent {
    Selected,
    Deselected,
}

/// Receiver for select / deselect
pub trait InteractionHandler {
    fn on_select(&mut self, _object: ObjectId) {}
    fn on_deselect(&mut self, _object: ObjectId) {}
}

impl InteractionEvent {
    pub fn dispatch<H: InteractionHandler + ?Sized>(self, object: ObjectId, handler: &mut H) {
        match self {
            InteractionEvent::Selected => handler.on_select(object),
            InteractionEvent::Deselected => handler.on_deselect(object),
        }
    }
}

/// What changed this frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionUpdate {
    pub event: Option<InteractionEvent>,
    /// New pose, only while following with a moving motion mode
    pub pose: Option<Pose>,
    /// For `SnapToCollider`: whether the object should currently block rays
    pub collision_enabled: Option<bool>,
}

pub struct InteractionController {
    binding: InteractableBinding,
    filter: VectorFilter,
    following: bool,
    targeted: bool,
    previous_target: Point3<f32>,
    pose: Pose,
}

impl InteractionController {
    /// The object's filter starts out at `initial.position`.
    pub fn new(binding: InteractableBinding, initial: Pose) -> Self {
        let (q, r) = binding.tracking_speed.variances();
        let mut filter = VectorFilter::new(q, r);
        filter.reset_to(initial.position.coords);
        Self {
            binding,
            filter,
            following: false,
            targeted: false,
            previous_target: initial.position,
            pose: initial,
        }
    }

    pub fn binding(&self) -> &InteractableBinding {
        &self.binding
    }

    pub fn object(&self) -> ObjectId {
        self.binding.object
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn is_targeted(&self) -> bool {
        self.targeted
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Move the object from outside (e.g. the host teleported it). Resets
    /// the smoothing so it does not drift back.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.previous_target = pose.position;
        self.filter.reset_to(pose.position.coords);
    }

    /// One frame. `bounds` is the object's own volume at its current pose.
    pub fn update(&mut self, pointer: &Pointer, bounds: &dyn Containment) -> InteractionUpdate {
        let targeted = self.targets(pointer, bounds);
        let event = self.resolve_activation(pointer, targeted);
        self.targeted = targeted;

        if let Some(event) = event {
            debug!(object = self.binding.object, ?event, "interaction edge");
        }

        let mut update = InteractionUpdate {
            event,
            ..Default::default()
        };

        let Some(target) = self.resolve_motion(pointer) else {
            return update;
        };

        if self.following {
            let position = Point3::from(self.filter.update(target.coords, None, None));
            let rotation = self.resolve_rotation(pointer).unwrap_or(self.pose.rotation);
            self.pose = Pose { position, rotation };
            update.pose = Some(self.pose);
        }
        self.previous_target = target;

        if self.binding.motion == MotionMode::SnapToCollider {
            update.collision_enabled = Some(!self.following);
        }
        update
    }

    /// Like [`update`](Self::update), delivering the edge to `handler`.
    pub fn update_with<H: InteractionHandler + ?Sized>(
        &mut self,
        pointer: &Pointer,
        bounds: &dyn Containment,
        handler: &mut H,
    ) -> InteractionUpdate {
        let update = self.update(pointer, bounds);
        if let Some(event) = update.event {
            event.dispatch(self.binding.object, handler);
        }
        update
    }

    /// Stop following without waiting for the pointer. Fires deselect when
    /// the object was following. A Touch object is not selected again until
    /// targeting drops and returns.
    pub fn release(&mut self) -> Option<InteractionEvent> {
        let was = std::mem::replace(&mut self.following, false);
        was.then_some(InteractionEvent::Deselected)
    }

    fn targets(&self, pointer: &Pointer, bounds: &dyn Containment) -> bool {
        let in_range = match self.binding.motion {
            MotionMode::Offset { distance } => pointer.range > distance,
            _ => true,
        };
        let hit_self = self.binding.select_behind
            && pointer
                .last_hit
                .map_or(false, |hit| hit.object == self.binding.object);
        in_range && (hit_self || bounds.contains(&pointer.position))
    }

    fn resolve_activation(&mut self, pointer: &Pointer, targeted: bool) -> Option<InteractionEvent> {
        let next = match self.binding.activation {
            ActivationMode::Drag => {
                if pointer.just_pressed && targeted {
                    true
                } else if !pointer.selected {
                    false
                } else {
                    self.following
                }
            }
            ActivationMode::Toggle => {
                if self.following {
                    !pointer.just_pressed
                } else {
                    pointer.just_pressed && targeted
                }
            }
            // Selects on the targeting edge only, so a released object stays
            // dropped until the pointer leaves and comes back
            ActivationMode::Touch => targeted && (self.following || !self.targeted),
        };

        let event = match (self.following, next) {
            (false, true) => Some(InteractionEvent::Selected),
            (true, false) => Some(InteractionEvent::Deselected),
            _ => None,
        };
        self.following = next;
        event
    }

    fn resolve_motion(&self, pointer: &Pointer) -> Option<Point3<f32>> {
        match self.binding.motion {
            MotionMode::None => None,
            MotionMode::Seek => Some(pointer.position),
            MotionMode::Offset { distance } => Some(pointer.ray.at(distance)),
            MotionMode::SnapToCollider => Some(match pointer.last_hit {
                Some(hit)
                    if self.binding.snap_targets.is_empty()
                        || self.binding.snap_targets.contains(&hit.object) =>
                {
                    hit.point
                }
                Some(_) => self.previous_target,
                None => pointer.position,
            }),
        }
    }

    fn resolve_rotation(&self, pointer: &Pointer) -> Option<UnitQuaternion<f32>> {
        let surface = match self.binding.orientation_source {
            OrientationSource::SurfaceNormal => pointer.last_hit,
            OrientationSource::Pointer => None,
        };
        let (direction, source) = match surface {
            Some(hit) => (hit.normal.into_inner(), surface_rotation(&hit.normal, pointer.twist)),
            // No surface under the ray: fall back to the pointer
            None => (pointer.ray.origin - pointer.position, pointer.rotation),
        };
        resolve_orientation(self.binding.orientation, &direction, &source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{Aabb, Ray, RayHit};
    use nalgebra::Vector3;

    fn pointer_at(position: Point3<f32>, selected: bool, just_pressed: bool) -> Pointer {
        let origin = Point3::origin();
        Pointer {
            position,
            ray: Ray::new(origin, position - origin).unwrap(),
            range: (position - origin).norm(),
            selected,
            just_pressed,
            just_released: false,
            ..Pointer::default()
        }
    }

    fn cube() -> Aabb {
        Aabb::from_center(Point3::new(0.0, 0.0, 1.0), Vector3::repeat(0.05))
    }

    fn controller(activation: ActivationMode, motion: MotionMode) -> InteractionController {
        InteractionController::new(
            InteractableBinding {
                object: 7,
                activation,
                motion,
                tracking_speed: TrackingSpeed::None,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        )
    }

    #[test]
    fn test_drag_follows_until_release() {
        let mut c = controller(ActivationMode::Drag, MotionMode::Seek);
        let inside = Point3::new(0.0, 0.0, 1.0);

        let u = c.update(&pointer_at(inside, true, true), &cube());
        assert_eq!(u.event, Some(InteractionEvent::Selected));
        assert!(c.is_following());

        // Leaving the bounds does not drop a dragged object
        let outside = Point3::new(0.5, 0.0, 1.0);
        let u = c.update(&pointer_at(outside, true, false), &cube());
        assert_eq!(u.event, None);
        assert_eq!(u.pose.unwrap().position, outside);

        let u = c.update(&pointer_at(outside, false, false), &cube());
        assert_eq!(u.event, Some(InteractionEvent::Deselected));
        assert!(!c.is_following());

        // No repeat deselect
        let u = c.update(&pointer_at(outside, false, false), &cube());
        assert_eq!(u.event, None);
    }

    #[test]
    fn test_drag_needs_target() {
        let mut c = controller(ActivationMode::Drag, MotionMode::Seek);
        let u = c.update(&pointer_at(Point3::new(1.0, 1.0, 1.0), true, true), &cube());
        assert_eq!(u.event, None);
        assert!(!c.is_following());
        assert!(u.pose.is_none());
    }

    #[test]
    fn test_toggle_drops_on_next_click_anywhere() {
        let mut c = controller(ActivationMode::Toggle, MotionMode::Seek);
        let inside = Point3::new(0.0, 0.0, 1.0);
        let far = Point3::new(2.0, 0.0, 0.0);

        assert_eq!(
            c.update(&pointer_at(inside, true, true), &cube()).event,
            Some(InteractionEvent::Selected)
        );
        // Releasing the click keeps it
        assert_eq!(c.update(&pointer_at(far, false, false), &cube()).event, None);
        assert!(c.is_following());
        assert_eq!(
            c.update(&pointer_at(far, true, true), &cube()).event,
            Some(InteractionEvent::Deselected)
        );
        assert!(!c.is_following());
    }

    #[test]
    fn test_touch_mirrors_targeting() {
        let mut c = controller(ActivationMode::Touch, MotionMode::None);
        let inside = Point3::new(0.0, 0.0, 1.0);
        let outside = Point3::new(0.0, 1.0, 1.0);

        assert_eq!(
            c.update(&pointer_at(inside, false, false), &cube()).event,
            Some(InteractionEvent::Selected)
        );
        assert_eq!(c.update(&pointer_at(inside, false, false), &cube()).event, None);
        assert_eq!(
            c.update(&pointer_at(outside, false, false), &cube()).event,
            Some(InteractionEvent::Deselected)
        );
    }

    #[test]
    fn test_motion_none_never_moves() {
        let mut c = controller(ActivationMode::Touch, MotionMode::None);
        let u = c.update(&pointer_at(Point3::new(0.01, 0.0, 1.0), false, false), &cube());
        assert!(u.event.is_some());
        assert!(u.pose.is_none());
        assert_eq!(c.pose().position, Point3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_offset_needs_range() {
        let mut c = controller(ActivationMode::Touch, MotionMode::Offset { distance: 2.0 });
        // Inside bounds but range 1 < offset 2
        let u = c.update(&pointer_at(Point3::new(0.0, 0.0, 1.0), false, false), &cube());
        assert_eq!(u.event, None);

        let mut c = controller(ActivationMode::Touch, MotionMode::Offset { distance: 0.5 });
        let u = c.update(&pointer_at(Point3::new(0.0, 0.0, 1.0), false, false), &cube());
        assert_eq!(u.event, Some(InteractionEvent::Selected));
        let pos = u.pose.unwrap().position;
        assert!((pos - Point3::new(0.0, 0.0, 0.5)).norm() < 1e-6);
    }

    #[test]
    fn test_select_behind_uses_hit() {
        let mut c = controller(ActivationMode::Drag, MotionMode::Seek);
        let mut p = pointer_at(Point3::new(0.0, 0.0, 3.0), true, true);
        p.last_hit = Some(RayHit {
            point: Point3::new(0.0, 0.0, 0.95),
            normal: -Vector3::z_axis(),
            object: 7,
            distance: 0.95,
        });
        assert_eq!(c.update(&p, &cube()).event, Some(InteractionEvent::Selected));

        let mut c = InteractionController::new(
            InteractableBinding {
                object: 7,
                select_behind: false,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        );
        assert_eq!(c.update(&p, &cube()).event, None);
    }

    #[test]
    fn test_snap_to_collider() {
        let mut c = InteractionController::new(
            InteractableBinding {
                object: 7,
                activation: ActivationMode::Toggle,
                motion: MotionMode::SnapToCollider,
                tracking_speed: TrackingSpeed::None,
                snap_targets: vec![1],
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        );
        let u = c.update(&pointer_at(Point3::new(0.0, 0.0, 1.0), true, true), &cube());
        assert_eq!(u.collision_enabled, Some(false));

        let wall = Point3::new(0.0, 0.0, 2.0);
        let mut p = pointer_at(Point3::new(0.0, 0.0, 3.0), false, false);
        p.last_hit = Some(RayHit {
            point: wall,
            normal: -Vector3::z_axis(),
            object: 1,
            distance: 2.0,
        });
        assert_eq!(c.update(&p, &cube()).pose.unwrap().position, wall);

        // Not an allowed surface: stay put
        p.last_hit = Some(RayHit {
            point: Point3::new(0.0, 0.0, 2.5),
            normal: -Vector3::z_axis(),
            object: 2,
            distance: 2.5,
        });
        assert_eq!(c.update(&p, &cube()).pose.unwrap().position, wall);

        // Nothing hit: the pointer itself
        p.last_hit = None;
        assert_eq!(c.update(&p, &cube()).pose.unwrap().position, p.position);

        p.just_pressed = true;
        let u = c.update(&p, &cube());
        assert_eq!(u.event, Some(InteractionEvent::Deselected));
        assert_eq!(u.collision_enabled, Some(true));
    }

    #[test]
    fn test_two_axis_faces_hand() {
        let mut c = InteractionController::new(
            InteractableBinding {
                object: 7,
                activation: ActivationMode::Touch,
                tracking_speed: TrackingSpeed::None,
                orientation: OrientationMode::TwoAxis,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        );
        let u = c.update(&pointer_at(Point3::new(0.0, 0.0, 1.0), false, false), &cube());
        let forward = u.pose.unwrap().rotation * Vector3::z();
        assert!((forward - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_smoothing_lags() {
        let mut c = InteractionController::new(
            InteractableBinding {
                object: 7,
                activation: ActivationMode::Touch,
                tracking_speed: TrackingSpeed::Slow,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        );
        let target = Point3::new(0.04, 0.0, 1.0);
        let u = c.update(&pointer_at(target, false, false), &cube());
        let x = u.pose.unwrap().position.x;
        assert!(x > 0.0 && x < 0.04);
    }

    #[test]
    fn test_touch_release_waits_for_new_target() {
        let mut c = controller(ActivationMode::Touch, MotionMode::None);
        let inside = pointer_at(Point3::new(0.0, 0.0, 1.0), false, false);
        let outside = pointer_at(Point3::new(0.0, 1.0, 1.0), false, false);

        assert_eq!(c.update(&inside, &cube()).event, Some(InteractionEvent::Selected));
        assert_eq!(c.release(), Some(InteractionEvent::Deselected));
        // Still targeted: no second select for the same entry
        for _ in 0..3 {
            assert_eq!(c.update(&inside, &cube()).event, None);
            assert!(!c.is_following());
        }
        // Leaving after a release has nothing left to deselect
        assert_eq!(c.update(&outside, &cube()).event, None);
        assert_eq!(c.update(&inside, &cube()).event, Some(InteractionEvent::Selected));
    }

    fn surface_controller(orientation: OrientationMode) -> InteractionController {
        InteractionController::new(
            InteractableBinding {
                object: 7,
                activation: ActivationMode::Touch,
                tracking_speed: TrackingSpeed::None,
                orientation,
                orientation_source: OrientationSource::SurfaceNormal,
                select_behind: false,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        )
    }

    #[test]
    fn test_surface_normal_two_axis_faces_along_normal() {
        let mut c = surface_controller(OrientationMode::TwoAxis);
        let mut p = pointer_at(Point3::new(0.0, 0.0, 1.0), false, false);
        p.last_hit = Some(RayHit {
            point: Point3::new(0.0, 0.0, 1.05),
            normal: Vector3::x_axis(),
            object: 3,
            distance: 1.05,
        });
        let forward = c.update(&p, &cube()).pose.unwrap().rotation * Vector3::z();
        assert!((forward - Vector3::x()).norm() < 1e-5);
    }

    #[test]
    fn test_surface_normal_free_carries_pointer_twist() {
        let mut c = surface_controller(OrientationMode::Free);
        let mut p = pointer_at(Point3::new(0.0, 0.0, 1.0), false, false);
        p.twist = 90.0;
        p.last_hit = Some(RayHit {
            point: Point3::new(0.0, 0.0, 1.05),
            normal: -Vector3::z_axis(),
            object: 3,
            distance: 1.05,
        });
        let rotation = c.update(&p, &cube()).pose.unwrap().rotation;
        let expected = surface_rotation(&-Vector3::z_axis(), 90.0);
        assert!(rotation.angle_to(&expected) < 1e-5);
        assert!((rotation * Vector3::z() - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);
    }

    #[test]
    fn test_surface_normal_without_hit_uses_pointer() {
        let mut c = surface_controller(OrientationMode::TwoAxis);
        // Same as the pointer source: face back along the ray to the hand
        let p = pointer_at(Point3::new(0.0, 0.0, 1.0), false, false);
        let forward = c.update(&p, &cube()).pose.unwrap().rotation * Vector3::z();
        assert!((forward - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-5);

        let mut c = surface_controller(OrientationMode::Free);
        let mut p = pointer_at(Point3::new(0.0, 0.0, 1.0), false, false);
        p.rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
        let rotation = c.update(&p, &cube()).pose.unwrap().rotation;
        assert!(rotation.angle_to(&p.rotation) < 1e-5);
    }

    #[test]
    fn test_first_follow_is_smoothed() {
        let mut c = InteractionController::new(
            InteractableBinding {
                object: 7,
                activation: ActivationMode::Touch,
                tracking_speed: TrackingSpeed::Medium,
                ..Default::default()
            },
            Pose::new(Point3::new(0.0, 0.0, 1.0)),
        );
        let big = Aabb::from_center(Point3::new(0.0, 0.0, 1.0), Vector3::repeat(1.0));
        let u = c.update(&pointer_at(Point3::new(0.4, 0.0, 1.0), false, false), &big);
        let fraction = u.pose.unwrap().position.x / 0.4;
        assert!((fraction - 0.49).abs() < 0.01, "fraction {fraction}");
    }

    #[derive(Default)]
    struct Counter {
        selects: u32,
        deselects: u32,
    }

    impl InteractionHandler for Counter {
        fn on_select(&mut self, _object: ObjectId) {
            self.selects += 1;
        }
        fn on_deselect(&mut self, _object: ObjectId) {
            self.deselects += 1;
        }
    }

    #[test]
    fn test_handler_receives_edges_once() {
        let mut c = controller(ActivationMode::Drag, MotionMode::Seek);
        let mut counter = Counter::default();
        let inside = Point3::new(0.0, 0.0, 1.0);
        c.update_with(&pointer_at(inside, true, true), &cube(), &mut counter);
        for _ in 0..5 {
            c.update_with(&pointer_at(inside, true, false), &cube(), &mut counter);
        }
        for _ in 0..5 {
            c.update_with(&pointer_at(inside, false, false), &cube(), &mut counter);
        }
        assert_eq!(counter.selects, 1);
        assert_eq!(counter.deselects, 1);
    }
}
