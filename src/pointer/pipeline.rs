//! Per-hand pointer pipeline
//!
//! One pass per frame:
//!
//! 1. Fit a sphere to the joint samples (hold the last good fit on failure)
//! 2. `pointing = center - root`, `m = |pointing|`
//! 3. `raw = root + pointing/m · range(m)`
//! 4. Smooth `raw` with R = m³·k_r (far pointers are smoothed harder)
//! 5. Twist of the index knuckle about `pointing`
//! 6. Fingertip depth into the sphere drives selection
//! 7. Ray root → pointer, hit-tested up to the pointer's range
//!
//! The published [`Pointer`] is replaced as a whole at the end of the pass.

use nalgebra::{Point3, UnitQuaternion, Vector3};
use tracing::{debug, error, info};

use super::config::PointerConfig;
use super::error::{ConfigError, PointerError};
use super::filter::VectorFilter;
use super::joints::{Hand, HandFrame};
use super::selection::SelectionStateMachine;
use super::sphere_fit::{SphereFit, SphereFitSolver};
use super::twist::twist_angle;
use super::world::{Ray, RayHit, RayIntersector};

/// Pointing vectors shorter than this have no direction (meters)
const MIN_POINTING: f32 = 1e-6;

/// Output of one pipeline pass
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    /// Smoothed pointing target
    pub position: Point3<f32>,
    /// Root → position
    pub ray: Ray,
    /// Distance from the root to `position`
    pub range: f32,
    /// Roll of the hand about the pointing axis (degrees)
    pub twist: f32,
    /// Tracked hand rotation composed with the rig calibration
    pub rotation: UnitQuaternion<f32>,
    pub selected: bool,
    /// True only on the frame selection starts
    pub just_pressed: bool,
    /// True only on the frame selection ends
    pub just_released: bool,
    /// Fingertip penetration into the selection sphere
    pub depth: f32,
    pub last_hit: Option<RayHit>,
    /// Sphere used this frame, for debug rendering
    pub sphere: Option<SphereFit>,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            ray: Ray {
                origin: Point3::origin(),
                direction: Vector3::z_axis(),
            },
            range: 0.0,
            twist: 0.0,
            rotation: UnitQuaternion::identity(),
            selected: false,
            just_pressed: false,
            just_released: false,
            depth: f32::NEG_INFINITY,
            last_hit: None,
            sphere: None,
        }
    }
}

/// Turns one hand's joint samples into a [`Pointer`] every frame
pub struct PointerPipeline {
    hand: Hand,
    config: PointerConfig,
    solver: SphereFitSolver,
    filter: VectorFilter,
    selection: SelectionStateMachine,
    /// Last successful fit, reused when the samples go degenerate
    last_fit: Option<SphereFit>,
    pointer: Pointer,
    /// Error recovered from on the most recent frame
    last_recovery: Option<PointerError>,
    frames: u64,
}

impl PointerPipeline {
    pub fn new(hand: Hand, config: PointerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(hand, config))
    }

    /// Pipeline with [`PointerConfig::default`], which is always valid
    pub fn with_defaults(hand: Hand) -> Self {
        Self::build(hand, PointerConfig::default())
    }

    fn build(hand: Hand, config: PointerConfig) -> Self {
        info!(hand = hand.as_str(), ?config, "pointer pipeline created");
        Self {
            hand,
            filter: VectorFilter::new(config.process_variance, config.measurement_variance),
            selection: SelectionStateMachine::new(config.select_depth, config.release_depth),
            config,
            solver: SphereFitSolver::new(),
            last_fit: None,
            pointer: Pointer::default(),
            last_recovery: None,
            frames: 0,
        }
    }

    /// Run one frame. Always returns a usable pointer; frames that could
    /// not be computed leave it where it was.
    pub fn update(&mut self, frame: &HandFrame, world: &dyn RayIntersector) -> &Pointer {
        self.frames += 1;
        self.last_recovery = None;

        let fit = match self.solver.fit(&frame.samples) {
            Ok(fit) => {
                self.last_fit = Some(fit);
                Some(fit)
            }
            Err(PointerError::DegenerateInput) => {
                debug!(hand = self.hand.as_str(), frame = self.frames, "degenerate samples, holding last fit");
                self.last_recovery = Some(PointerError::DegenerateInput);
                self.last_fit
            }
            Err(err) => {
                error!(hand = self.hand.as_str(), %err, "sphere fit invariant violated");
                self.last_recovery = Some(err);
                None
            }
        };

        let Some(fit) = fit else {
            self.hold();
            return &self.pointer;
        };

        match self.advance(frame, fit, world) {
            Ok(pointer) => self.pointer = pointer,
            Err(err) => {
                debug!(hand = self.hand.as_str(), frame = self.frames, %err, "holding pointer");
                self.last_recovery = Some(err);
                self.hold();
            }
        }
        &self.pointer
    }

    fn advance(
        &mut self,
        frame: &HandFrame,
        fit: SphereFit,
        world: &dyn RayIntersector,
    ) -> Result<Pointer, PointerError> {
        let pointing = fit.center - frame.root;
        let m = pointing.norm();
        if !(m > MIN_POINTING) {
            return Err(PointerError::ZeroPointingMagnitude);
        }

        let raw_target = frame.root + pointing / m * self.config.range.map(m);
        let r = m * m * m * self.config.distance_variance_gain;
        let position = Point3::from(self.filter.update(raw_target.coords, None, Some(r)));

        let hand_up = frame.index_root - frame.root;
        let twist = twist_angle(&pointing, &hand_up, self.config.twist_reverse);

        // Penetration into whichever sphere the fingertip is nearer to:
        // the fitted one, or one of the same radius around the pointer
        let to_center = (frame.index_tip - fit.center).norm();
        let to_pointer = (frame.index_tip - position).norm();
        let depth = fit.radius - to_center.min(to_pointer);
        self.selection.update(depth);

        let offset = position - frame.root;
        let range = offset.norm();
        let ray = Ray::new(frame.root, offset).unwrap_or(Ray {
            origin: frame.root,
            direction: self.pointer.ray.direction,
        });
        let last_hit = if self.config.hit_test && range > 0.0 {
            world.intersect(&ray, range)
        } else {
            None
        };

        Ok(Pointer {
            position,
            ray,
            range,
            twist,
            rotation: frame.hand_rotation * self.config.rotation_calibration,
            selected: self.selection.is_selected(),
            just_pressed: self.selection.just_pressed(),
            just_released: self.selection.just_released(),
            depth,
            last_hit,
            sphere: Some(fit),
        })
    }

    /// Keep last frame's pointer but drop its one-frame edges
    fn hold(&mut self) {
        self.selection.clear_edge();
        self.pointer.just_pressed = false;
        self.pointer.just_released = false;
    }

    /// Forget all smoothing and selection state
    pub fn reset(&mut self) {
        self.filter.reset();
        self.selection.reset();
        self.last_fit = None;
        self.pointer = Pointer::default();
        self.last_recovery = None;
    }

    /// Swap in a new config. Smoothing and selection restart from scratch.
    pub fn set_config(&mut self, config: PointerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        info!(hand = self.hand.as_str(), ?config, "pointer config updated");
        self.filter = VectorFilter::new(config.process_variance, config.measurement_variance);
        self.selection = SelectionStateMachine::new(config.select_depth, config.release_depth);
        self.config = config;
        self.last_fit = None;
        self.pointer = Pointer::default();
        Ok(())
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn hand(&self) -> Hand {
        self.hand
    }

    pub fn config(&self) -> &PointerConfig {
        &self.config
    }

    pub fn last_recovery(&self) -> Option<PointerError> {
        self.last_recovery
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::joints::SampleSet;
    use crate::pointer::world::{Aabb, AabbScene, NoHits};

    /// Eight cube-corner samples on a sphere
    fn sphere_samples(center: Point3<f32>, radius: f32) -> SampleSet {
        let a = radius / 3.0_f32.sqrt();
        let mut pts = Vec::new();
        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    pts.push(center + Vector3::new(sx * a, sy * a, sz * a));
                }
            }
        }
        SampleSet::new(pts).unwrap()
    }

    fn frame(center: Point3<f32>, radius: f32, tip: Point3<f32>) -> HandFrame {
        HandFrame::new(
            sphere_samples(center, radius),
            Point3::origin(),
            Point3::new(0.0, 0.03, 0.0),
            tip,
        )
    }

    fn pipeline() -> PointerPipeline {
        PointerPipeline::new(Hand::Right, PointerConfig::default()).unwrap()
    }

    #[test]
    fn test_converges_along_pointing_direction() {
        let mut p = pipeline();
        let center = Point3::new(0.0, 0.0, 0.08);
        let f = frame(center, 0.05, Point3::new(0.0, 0.0, 0.0));
        for _ in 0..500 {
            p.update(&f, &NoHits);
        }
        let expected = PointerConfig::default().range.map(0.08);
        let pointer = p.pointer();
        assert!((pointer.position.z - expected).abs() / expected < 1e-3);
        assert!(pointer.position.x.abs() < 1e-4);
        assert!((pointer.range - pointer.position.z).abs() < 1e-3);
        assert!((pointer.ray.direction.z - 1.0).abs() < 1e-5);
        assert_eq!(p.last_recovery(), None);
    }

    #[test]
    fn test_degenerate_holds_previous_fit() {
        let mut p = pipeline();
        let good = frame(Point3::new(0.0, 0.0, 0.08), 0.05, Point3::origin());
        p.update(&good, &NoHits);
        let fit_before = p.pointer().sphere.unwrap();

        let flat = SampleSet::new(vec![
            Point3::new(0.0, 0.0, 0.1),
            Point3::new(0.1, 0.0, 0.1),
            Point3::new(0.0, 0.1, 0.1),
            Point3::new(0.1, 0.1, 0.1),
        ])
        .unwrap();
        let bad = HandFrame::new(flat, Point3::origin(), Point3::new(0.0, 0.03, 0.0), Point3::origin());
        let pointer = p.update(&bad, &NoHits).clone();
        assert_eq!(p.last_recovery(), Some(PointerError::DegenerateInput));
        assert_eq!(pointer.sphere.unwrap(), fit_before);
        assert!(pointer.position.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_degenerate_first_frame_stays_default() {
        let mut p = pipeline();
        let flat = SampleSet::new(vec![Point3::new(0.2, 0.2, 0.2); 6]).unwrap();
        let bad = HandFrame::new(flat, Point3::origin(), Point3::origin(), Point3::origin());
        let pointer = p.update(&bad, &NoHits);
        assert_eq!(*pointer, Pointer::default());
    }

    #[test]
    fn test_zero_pointing_holds_pointer() {
        let mut p = pipeline();
        let center = Point3::new(0.0, 0.0, 0.08);
        p.update(&frame(center, 0.05, Point3::origin()), &NoHits);
        let before = p.pointer().position;

        // Root sitting exactly on the fitted center
        let mut f = frame(center, 0.05, Point3::origin());
        f.root = center;
        p.update(&f, &NoHits);
        assert_eq!(p.last_recovery(), Some(PointerError::ZeroPointingMagnitude));
        assert_eq!(p.pointer().position, before);
    }

    #[test]
    fn test_fingertip_press_and_release() {
        let mut p = pipeline();
        let center = Point3::new(0.0, 0.0, 0.08);
        let outside = Point3::new(0.0, 0.06, 0.08);
        let inside = Point3::new(0.0, 0.04, 0.08);

        p.update(&frame(center, 0.05, outside), &NoHits);
        assert!(!p.pointer().selected);

        let pointer = p.update(&frame(center, 0.05, inside), &NoHits);
        assert!(pointer.selected);
        assert!(pointer.just_pressed);
        assert!((pointer.depth - 0.01).abs() < 1e-4);

        let pointer = p.update(&frame(center, 0.05, inside), &NoHits);
        assert!(pointer.selected && !pointer.just_pressed);

        let pointer = p.update(&frame(center, 0.05, outside), &NoHits);
        assert!(!pointer.selected);
        assert!(pointer.just_released);
    }

    #[test]
    fn test_hit_test_stops_at_range() {
        let mut p = pipeline();
        let mut scene = AabbScene::new();
        scene.insert(7, Aabb::from_center(Point3::new(0.0, 0.0, 0.5), Vector3::new(0.2, 0.2, 0.05)));
        let f = frame(Point3::new(0.0, 0.0, 0.08), 0.05, Point3::origin());
        for _ in 0..50 {
            p.update(&f, &scene);
        }
        let hit = p.pointer().last_hit.unwrap();
        assert_eq!(hit.object, 7);
        assert!((hit.point.z - 0.45).abs() < 1e-4);

        scene.insert(7, Aabb::from_center(Point3::new(0.0, 0.0, 50.0), Vector3::new(0.2, 0.2, 0.05)));
        p.update(&f, &scene);
        assert!(p.pointer().last_hit.is_none());
    }

    #[test]
    fn test_twist_reported() {
        let mut p = pipeline();
        let mut f = frame(Point3::new(0.0, 0.0, 0.08), 0.05, Point3::origin());
        f.index_root = Point3::new(0.03, 0.0, 0.0);
        let twist = p.update(&f, &NoHits).twist;
        assert!((twist - 90.0).abs() < 1e-2);
    }

    #[test]
    fn test_rotation_calibration_applied() {
        let calibration = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.5);
        let config = PointerConfig {
            rotation_calibration: calibration,
            ..PointerConfig::default()
        };
        let mut p = PointerPipeline::new(Hand::Left, config).unwrap();
        let hand = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 0.25);
        let f = frame(Point3::new(0.0, 0.0, 0.08), 0.05, Point3::origin()).with_rotation(hand);
        let rotation = p.update(&f, &NoHits).rotation;
        assert!(rotation.angle_to(&(hand * calibration)) < 1e-5);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut p = pipeline();
        p.update(&frame(Point3::new(0.0, 0.0, 0.08), 0.05, Point3::new(0.0, 0.04, 0.08)), &NoHits);
        assert!(p.pointer().selected);
        p.reset();
        assert_eq!(*p.pointer(), Pointer::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PointerConfig {
            release_depth: 0.01,
            ..PointerConfig::default()
        };
        assert!(PointerPipeline::new(Hand::Right, config).is_err());
    }
}
