//! Hand joint ordering and per-frame sample sets
//!
//! Joints follow the XR_EXT_hand_tracking order (26 per hand). The sphere fit
//! uses a fixed 16-joint subset given by `SAMPLED_JOINTS`; the tracking side
//! and the pipeline both index through that table.

use nalgebra::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

// ============================================================================
// JOINT INDICES (XR_EXT_hand_tracking - 26 total)
// ============================================================================

/// The 26 hand joints in tracking order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Palm,
    Wrist,
    ThumbMetacarpal,
    ThumbProximal,
    ThumbDistal,
    ThumbTip,
    IndexMetacarpal,
    IndexProximal,
    IndexIntermediate,
    IndexDistal,
    IndexTip,
    MiddleMetacarpal,
    MiddleProximal,
    MiddleIntermediate,
    MiddleDistal,
    MiddleTip,
    RingMetacarpal,
    RingProximal,
    RingIntermediate,
    RingDistal,
    RingTip,
    LittleMetacarpal,
    LittleProximal,
    LittleIntermediate,
    LittleDistal,
    LittleTip,
}

/// Joints per hand skeleton
pub const JOINT_COUNT: usize = 26;

impl HandJoint {
    /// Slot of this joint in a full skeleton array
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Joints fed to the sphere fit, in sample-set order.
///
/// Knuckles, middle joints and tips of all fingers except the index finger's
/// outer joints, which move independently when clicking.
pub const SAMPLED_JOINTS: [HandJoint; 16] = [
    HandJoint::ThumbProximal,
    HandJoint::ThumbDistal,
    HandJoint::IndexProximal,
    HandJoint::MiddleProximal,
    HandJoint::MiddleIntermediate,
    HandJoint::MiddleDistal,
    HandJoint::RingProximal,
    HandJoint::RingIntermediate,
    HandJoint::RingDistal,
    HandJoint::LittleProximal,
    HandJoint::LittleIntermediate,
    HandJoint::LittleDistal,
    HandJoint::ThumbTip,
    HandJoint::MiddleTip,
    HandJoint::RingTip,
    HandJoint::LittleTip,
];

/// Weighted knuckle average used as the hand root. Weights sum to 1.
pub const ROOT_WEIGHTS: [(HandJoint, f32); 3] = [
    (HandJoint::IndexProximal, 0.4),
    (HandJoint::LittleProximal, 0.3),
    (HandJoint::ThumbMetacarpal, 0.3),
];

/// Minimum points for a non-degenerate sphere
pub const MIN_SAMPLES: usize = 4;

// ============================================================================
// HAND / ANCHOR SELECTION
// ============================================================================

/// Which hand a pointer instance follows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn index(&self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }

    pub fn from_index(idx: usize) -> Result<Self, ConfigError> {
        match idx {
            0 => Ok(Hand::Left),
            1 => Ok(Hand::Right),
            _ => Err(ConfigError::UnknownHand(idx)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// How the hand root (origin of the pointing ray) is derived
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RootAnchor {
    /// Weighted average of the knuckles in `ROOT_WEIGHTS`
    #[default]
    WeightedKnuckles,
    /// The tracker's palm joint
    Palm,
}

impl RootAnchor {
    fn resolve(&self, skeleton: &[Point3<f32>; JOINT_COUNT]) -> Point3<f32> {
        match self {
            RootAnchor::WeightedKnuckles => {
                let sum = ROOT_WEIGHTS
                    .iter()
                    .fold(nalgebra::Vector3::zeros(), |acc, (joint, w)| {
                        acc + skeleton[joint.index()].coords * *w
                    });
                Point3::from(sum)
            }
            RootAnchor::Palm => skeleton[HandJoint::Palm.index()],
        }
    }
}

// ============================================================================
// SAMPLE SET / FRAME INPUT
// ============================================================================

/// Ordered points the sphere is fitted to
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    points: Vec<Point3<f32>>,
}

impl SampleSet {
    /// Build from raw points. Needs at least `MIN_SAMPLES`.
    pub fn new(points: Vec<Point3<f32>>) -> Result<Self, ConfigError> {
        if points.len() < MIN_SAMPLES {
            return Err(ConfigError::TooFewSamples(points.len()));
        }
        Ok(Self { points })
    }

    /// Pick the `SAMPLED_JOINTS` out of a full skeleton
    pub fn from_skeleton(skeleton: &[Point3<f32>; JOINT_COUNT]) -> Self {
        Self {
            points: SAMPLED_JOINTS.iter().map(|j| skeleton[j.index()]).collect(),
        }
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Everything the pipeline consumes for one hand in one frame
#[derive(Clone, Debug)]
pub struct HandFrame {
    pub samples: SampleSet,
    /// Origin of the pointing ray
    pub root: Point3<f32>,
    /// Index knuckle; defines the hand's "up" for twist
    pub index_root: Point3<f32>,
    /// Index fingertip; pushed into the sphere to click
    pub index_tip: Point3<f32>,
    /// Tracked hand orientation, if the source provides one
    pub hand_rotation: UnitQuaternion<f32>,
}

impl HandFrame {
    pub fn new(
        samples: SampleSet,
        root: Point3<f32>,
        index_root: Point3<f32>,
        index_tip: Point3<f32>,
    ) -> Self {
        Self {
            samples,
            root,
            index_root,
            index_tip,
            hand_rotation: UnitQuaternion::identity(),
        }
    }

    /// Build from a full tracked skeleton
    pub fn from_skeleton(skeleton: &[Point3<f32>; JOINT_COUNT], anchor: RootAnchor) -> Self {
        Self::new(
            SampleSet::from_skeleton(skeleton),
            anchor.resolve(skeleton),
            skeleton[HandJoint::IndexProximal.index()],
            skeleton[HandJoint::IndexTip.index()],
        )
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.hand_rotation = rotation;
        self
    }
}
