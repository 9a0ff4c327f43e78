//! Objects that latch onto the pointer on contact

use nalgebra::Point3;
use tracing::debug;

use crate::pointer::{Containment, ObjectId, Pointer};

/// Sticks to the pointer position from the first frame the pointer is
/// inside its bounds until [`release`](Self::release) is called.
#[derive(Clone, Debug)]
pub struct StickyFollower {
    object: ObjectId,
    stuck: bool,
}

impl StickyFollower {
    pub fn new(object: ObjectId) -> Self {
        Self {
            object,
            stuck: false,
        }
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck
    }

    /// Target position for this frame, `None` while not stuck
    pub fn update(&mut self, pointer: &Pointer, bounds: &dyn Containment) -> Option<Point3<f32>> {
        if !self.stuck && bounds.contains(&pointer.position) {
            debug!(object = self.object, "stuck to pointer");
            self.stuck = true;
        }
        self.stuck.then_some(pointer.position)
    }

    pub fn release(&mut self) {
        self.stuck = false;
    }
}
